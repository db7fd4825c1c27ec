// extractor.rs
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::domain::{ListingFields, ListingSnapshot};
use crate::scraper::ScraperError;

pub const DEFAULT_BASE_URL: &str = "https://your-house.nl/";

const CONTAINER_SELECTOR: &str = "article.objectcontainer";
const STREET_SELECTOR: &str = "span.street";
const PRICE_SELECTOR: &str = "span.obj_price";
const ZIPCODE_SELECTOR: &str = "span.zipcode";
const LINK_SELECTOR: &str = "a.img-container[href]";
const SURFACE_SELECTOR: &str = "span.object_sqfeet";

/// Pulls the newest listing card out of the overview page.
pub struct ListingExtractor {
    base_url: Url,
    container: Selector,
    street: Selector,
    price: Selector,
    zipcode: Selector,
    link: Selector,
    surface: Selector,
    digits: Regex,
}

impl ListingExtractor {
    pub fn new(base_url: &str) -> Result<Self, ScraperError> {
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            container: parse_selector(CONTAINER_SELECTOR)?,
            street: parse_selector(STREET_SELECTOR)?,
            price: parse_selector(PRICE_SELECTOR)?,
            zipcode: parse_selector(ZIPCODE_SELECTOR)?,
            link: parse_selector(LINK_SELECTOR)?,
            surface: parse_selector(SURFACE_SELECTOR)?,
            digits: Regex::new(r"\d+").map_err(|e| ScraperError::HtmlParse(e.to_string()))?,
        })
    }

    /// Parse the page and stamp the result with the current time.
    pub fn extract(&self, html: &str) -> Result<ListingSnapshot, ScraperError> {
        let snapshot = ListingSnapshot::observe(self.extract_fields(html)?);

        if snapshot.is_fully_missing {
            warn!("No information retrieved. It is possible that the IP got blocked.");
        }

        Ok(snapshot)
    }

    /// Raw field values of the first listing card.
    ///
    /// A missing card is an error; a missing field inside the card is `None`.
    pub fn extract_fields(&self, html: &str) -> Result<ListingFields, ScraperError> {
        let document = Html::parse_document(html);
        let card = document
            .select(&self.container)
            .next()
            .ok_or(ScraperError::MissingListing)?;

        let address = self.text_of(card, &self.street, STREET_SELECTOR);
        let zipcode = self.text_of(card, &self.zipcode, ZIPCODE_SELECTOR);
        let price = self
            .text_of(card, &self.price, PRICE_SELECTOR)
            .and_then(|t| self.first_digit_run(&t, "price"));
        let surface_area = self
            .text_of(card, &self.surface, SURFACE_SELECTOR)
            .and_then(|t| self.first_digit_run(&t, "surface"));
        let url = self.detail_url(card);

        Ok(ListingFields {
            address,
            price,
            zipcode,
            url,
            surface_area,
        })
    }

    /// Text of the first match, as rendered. Only empty text counts as missing.
    fn text_of(&self, card: ElementRef<'_>, selector: &Selector, css: &str) -> Option<String> {
        let text = card
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .filter(|t| !t.is_empty());

        if text.is_none() {
            debug!(selector = css, "field missing from listing card");
        }
        text
    }

    /// First contiguous run of decimal digits: "€ 1.250 per month" -> "1".
    fn first_digit_run(&self, text: &str, field: &str) -> Option<String> {
        let run = self.digits.find(text).map(|m| m.as_str().to_string());
        if run.is_none() {
            debug!(field, text, "no digits in field text");
        }
        run
    }

    fn detail_url(&self, card: ElementRef<'_>) -> Option<String> {
        let href = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|h| !h.trim().is_empty());

        let Some(href) = href else {
            debug!(selector = LINK_SELECTOR, "detail link missing from listing card");
            return None;
        };

        match self.base_url.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!(href, error = %e, "could not resolve detail link");
                None
            }
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::HtmlParse(format!("{css}: {e}")))
}
