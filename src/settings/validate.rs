//! Validation for URLs typed into the control panel.

use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    Empty,
    TooLong { len: usize },
    Invalid,
    Duplicate,
}

impl std::fmt::Display for UrlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlError::Empty => write!(f, "URL cannot be empty"),
            UrlError::TooLong { len } => write!(
                f,
                "URL is {} characters long; the limit is {}",
                len, MAX_URL_LENGTH
            ),
            UrlError::Invalid => write!(f, "Please enter a valid URL"),
            UrlError::Duplicate => write!(f, "URL is already in the list"),
        }
    }
}

impl std::error::Error for UrlError {}

/// Check a user-entered URL: non-empty, at most `MAX_URL_LENGTH`
/// characters, and parseable. Duplicates are checked by the caller.
pub fn validate_url(input: &str) -> Result<(), UrlError> {
    if input.trim().is_empty() {
        return Err(UrlError::Empty);
    }
    let len = input.chars().count();
    if len > MAX_URL_LENGTH {
        return Err(UrlError::TooLong { len });
    }
    Url::parse(input).map_err(|_| UrlError::Invalid)?;
    Ok(())
}
