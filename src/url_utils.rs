//! URL validation and address-bar normalization.

use url::Url;

use crate::types::errors::ValidationError;

/// True for absolute `http` or `https` URLs.
pub fn is_valid_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Validates `input` and returns it unchanged.
pub fn validate_url(input: &str) -> Result<&str, ValidationError> {
    if is_valid_url(input) {
        Ok(input)
    } else {
        Err(ValidationError::InvalidUrl(input.to_string()))
    }
}

/// Turns address-bar text into a navigable URL.
///
/// Text that does not start with `http` becomes `https://<text>` when it
/// looks like a host (contains a dot) and a search query otherwise.
/// Returns `Ok(None)` for blank input.
pub fn normalize_input(text: &str, search_url: &str) -> Result<Option<String>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let candidate = if text.to_ascii_lowercase().starts_with("http") {
        text.to_string()
    } else if text.contains('.') {
        format!("https://{}", text)
    } else {
        Url::parse_with_params(search_url, &[("q", text)])
            .map_err(|_| ValidationError::InvalidUrl(search_url.to_string()))?
            .to_string()
    };

    validate_url(&candidate)?;
    Ok(Some(candidate))
}
