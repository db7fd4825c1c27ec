// src/domain/fingerprint.rs

/// Hex width of an MD5 digest.
pub const FINGERPRINT_LEN: usize = 32;

/// Content hash used for change detection.
///
/// Hashes `price + address + zipcode + surface` with no separators, in that
/// order. Rows written by earlier versions of the watcher were hashed the same
/// way, so changing the order or adding a separator would make every poll look
/// like a change.
pub fn fingerprint(price: &str, address: &str, zipcode: &str, surface: &str) -> String {
    let mut buf = String::with_capacity(price.len() + address.len() + zipcode.len() + surface.len());
    buf.push_str(price);
    buf.push_str(address);
    buf.push_str(zipcode);
    buf.push_str(surface);

    format!("{:x}", md5::compute(buf.as_bytes()))
}
