use url::Url;

use crate::error::{AppError, Result};

/// The longest target URL accepted, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Validates a submitted redirect target.
///
/// Only absolute `http`/`https` URLs with a host pass; `javascript:`,
/// `data:` and friends are rejected here so the resolver never has to.
///
/// # Returns
///
/// The value to store: the trimmed input when it is plain visible ASCII
/// spelled as `scheme://...`, otherwise the parser's serialization.
/// Forms like `http:example.com` parse fine but a browser reads them as
/// relative in a `Location` header, so they are stored normalized.
pub fn validate_target_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(AppError::InvalidUrl("URL is required".to_string()));
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AppError::InvalidUrl(format!(
            "URL must be at most {} bytes",
            MAX_URL_LENGTH
        )));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| AppError::InvalidUrl(format!("Not an absolute URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::InvalidUrl(format!(
                "Unsupported scheme `{}`, use http or https",
                other
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::InvalidUrl("URL must include a host".to_string()));
    }

    let has_authority = trimmed
        .get(parsed.scheme().len()..)
        .is_some_and(|rest| rest.starts_with("://"));

    if has_authority && trimmed.bytes().all(|b| b.is_ascii_graphic()) {
        Ok(trimmed.to_string())
    } else {
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(raw: &str) -> bool {
        matches!(validate_target_url(raw), Err(AppError::InvalidUrl(_)))
    }

    #[test]
    fn keeps_plain_urls_verbatim() {
        assert_eq!(
            validate_target_url("https://example.com").unwrap(),
            "https://example.com"
        );
        assert_eq!(
            validate_target_url("  http://example.com/a?b=c#d ").unwrap(),
            "http://example.com/a?b=c#d"
        );
    }

    #[test]
    fn rejects_non_urls_and_unsafe_schemes() {
        assert!(rejected("not a url"));
        assert!(rejected(""));
        assert!(rejected("/relative/path"));
        assert!(rejected("javascript:alert(1)"));
        assert!(rejected("data:text/html,<script>alert(1)</script>"));
        assert!(rejected("ftp://example.com/file"));
        assert!(rejected("mailto:someone@example.com"));
        assert!(rejected("http://"));
    }

    #[test]
    fn rejects_oversized_urls() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(rejected(&long));
    }

    #[test]
    fn encodes_non_ascii_targets_for_the_location_header() {
        let stored = validate_target_url("https://example.com/caf\u{e9} menu").unwrap();
        assert_eq!(stored, "https://example.com/caf%C3%A9%20menu");
        assert!(stored.bytes().all(|b| b.is_ascii_graphic()));
    }

    #[test]
    fn normalizes_targets_missing_the_double_slash() {
        assert_eq!(
            validate_target_url("http:example.com").unwrap(),
            "http://example.com/"
        );
        assert_eq!(
            validate_target_url("https:example.com/path").unwrap(),
            "https://example.com/path"
        );
        assert_eq!(
            validate_target_url("https:/example.com").unwrap(),
            "https://example.com/"
        );
        assert_eq!(
            validate_target_url("http:\\\\example.com\\a").unwrap(),
            "http://example.com/a"
        );
        assert_eq!(
            validate_target_url("HTTPS://Example.com/a").unwrap(),
            "HTTPS://Example.com/a"
        );
    }
}
