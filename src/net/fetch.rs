use std::time::Duration;

use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of fetching a URL
#[derive(Clone, Debug)]
pub struct FetchResult {
    pub html: String,
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: String,
}

/// Error during fetch
#[derive(Debug)]
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// Add `https://` to bare host input from the address bar.
pub fn normalize_input(url_str: &str) -> String {
    let trimmed = url_str.trim();
    if trimmed.contains("://") || trimmed.starts_with("about:") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Fetch a URL and return the HTML content (blocking).
pub fn fetch_url(url_str: &str, timeout: Duration) -> Result<FetchResult, FetchError> {
    let parsed = Url::parse(url_str).map_err(|e| FetchError {
        message: format!("Invalid URL: {}", e),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError {
            message: format!("Unsupported scheme: {}", parsed.scheme()),
        });
    }

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(
            "Mozilla/5.0 (compatible; link-peek/",
            env!("CARGO_PKG_VERSION"),
            ")"
        ))
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError {
            message: format!("Client error: {}", e),
        })?;

    let response = client
        .get(parsed.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .map_err(|e| FetchError {
            message: format!("Request failed: {}", e),
        })?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let final_url = response.url().to_string();
    log::debug!("Fetched {} -> {} ({})", url_str, final_url, status);

    let html = response.text().map_err(|e| FetchError {
        message: format!("Failed to read body: {}", e),
    })?;

    Ok(FetchResult {
        html,
        url: final_url,
        status,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bare_hosts() {
        assert_eq!(normalize_input("example.com"), "https://example.com");
        assert_eq!(normalize_input(" http://a.test/ "), "http://a.test/");
        assert_eq!(normalize_input("about:blank"), "about:blank");
    }

    #[test]
    fn rejects_non_http_without_network() {
        let err = fetch_url("mailto:a@b.test", DEFAULT_TIMEOUT).unwrap_err();
        assert!(err.message.contains("Unsupported scheme"));
        let err = fetch_url("not a url", DEFAULT_TIMEOUT).unwrap_err();
        assert!(err.message.starts_with("Invalid URL"));
    }
}
