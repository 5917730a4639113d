// # URL Validator
//
// Pure input validation for long URLs, applied before any network call.
//
// ## Rules (in order)
//
// 1. Trim whitespace; empty input is rejected
// 2. Any remaining whitespace character is rejected
// 3. The input must parse as an absolute URL
// 4. Only http and https schemes are accepted
//
// On success the *parser's* serialization is returned, not the raw input:
// downstream display and comparison rely on the normalized form (the parser
// may add a default port, lowercase the host, or append a trailing slash).

use url::Url;

use crate::error::ValidationError;

/// Validate and normalize a raw URL string
///
/// Synchronous, side-effect-free, safe to call repeatedly and from multiple
/// pending operations.
///
/// # Example
///
/// ```rust
/// use kitsu_core::validate;
///
/// assert_eq!(
///     validate("  https://example.com  ").unwrap(),
///     "https://example.com/"
/// );
/// assert!(validate("ftp://x.com").is_err());
/// ```
pub fn validate(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    // Checked before parsing: the WHATWG parser percent-encodes interior
    // spaces instead of rejecting them.
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::Malformed);
    }

    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::Malformed)?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(ValidationError::UnsupportedScheme(other.to_string())),
    }
}
