// src/config.rs

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use crate::errors::{WatchError, WatchResult};
use crate::scraper::DEFAULT_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Settings read from `config.toml`. Keys without a default are required.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Overview page to watch.
    pub url: String,
    /// Seconds between polls.
    pub refresh_time_secs: u64,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    pub log_dir: PathBuf,
    pub db_path: String,

    /// Prefix for relative detail links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,

    pub mail: MailSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailSettings {
    pub sender_email: String,
    /// App password for the sender account.
    pub app_password: String,
    pub receiver_email: String,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_subject() -> String {
    "YourHouse refresh - new post".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> WatchResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| WatchError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> WatchResult<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| WatchError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> WatchResult<()> {
        url::Url::parse(&self.url)
            .map_err(|e| WatchError::Config(format!("url {:?}: {e}", self.url)))?;
        url::Url::parse(&self.base_url)
            .map_err(|e| WatchError::Config(format!("base_url {:?}: {e}", self.base_url)))?;

        if self.refresh_time_secs == 0 {
            return Err(WatchError::Config("refresh_time_secs must be > 0".into()));
        }
        if self.http_timeout_secs == 0 || self.mail.timeout_secs == 0 {
            return Err(WatchError::Config("timeouts must be > 0".into()));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_time_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn level_filter(&self) -> WatchResult<LevelFilter> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| WatchError::Config(format!("unknown log_level {:?}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        url = "https://your-house.nl/en/rental-properties"
        refresh_time_secs = 300
        log_level = "info"
        log_dir = "logs"
        db_path = "housing.sqlite3"

        [mail]
        sender_email = "watcher@gmail.com"
        app_password = "secret"
        receiver_email = "me@example.com"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let s = Settings::from_toml(MINIMAL).unwrap();
        assert_eq!(s.refresh_interval(), Duration::from_secs(300));
        assert_eq!(s.base_url, "https://your-house.nl/");
        assert_eq!(s.http_timeout(), Duration::from_secs(30));
        assert_eq!(s.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(s.mail.smtp_port, 465);
        assert_eq!(s.mail.subject, "YourHouse refresh - new post");
        assert_eq!(s.level_filter().unwrap(), LevelFilter::INFO);
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let without_db = MINIMAL.replace("db_path = \"housing.sqlite3\"", "");
        let err = Settings::from_toml(&without_db).unwrap_err();
        assert!(matches!(err, WatchError::Config(ref msg) if msg.contains("db_path")));
    }

    #[test]
    fn missing_mail_password_is_an_error() {
        let without_pw = MINIMAL.replace("app_password = \"secret\"", "");
        assert!(Settings::from_toml(&without_pw).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = MINIMAL.replace("refresh_time_secs = 300", "refresh_time_secs = 0");
        assert!(Settings::from_toml(&cfg).is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let cfg = MINIMAL.replace("log_level = \"info\"", "log_level = \"loud\"");
        assert!(Settings::from_toml(&cfg).is_err());
    }

    #[test]
    fn bad_url_is_rejected() {
        let cfg = MINIMAL.replace("https://your-house.nl/en/rental-properties", "your-house");
        assert!(Settings::from_toml(&cfg).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let s = Settings::load(file.path()).unwrap();
        assert_eq!(s.db_path, "housing.sqlite3");
        assert_eq!(s.mail.receiver_email, "me@example.com");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Settings::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, WatchError::Config(_)));
    }
}
