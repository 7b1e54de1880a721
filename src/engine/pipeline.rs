use std::time::Duration;

use crate::dom::parser::parse_html;
use crate::dom::DomTree;
use crate::net::fetch::{fetch_url, DEFAULT_TIMEOUT};

/// Result of loading and processing a web page
#[derive(Debug, Clone)]
pub struct PageResult {
    pub dom: DomTree,
    pub fetch_status: u16,
}

/// Error during page loading
#[derive(Debug)]
pub struct PageError {
    pub message: String,
    pub phase: &'static str,
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for PageError {}

/// Page pipeline: Fetch → Parse
#[derive(Debug, Clone)]
pub struct PageLoader {
    timeout: Duration,
}

impl Default for PageLoader {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl PageLoader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Load a URL through the full pipeline (blocking).
    pub fn load_page(&self, url: &str) -> Result<PageResult, PageError> {
        let fetch_result = fetch_url(url, self.timeout).map_err(|e| PageError {
            message: e.message,
            phase: "fetch",
        })?;

        if !fetch_result.content_type.contains("html") && !fetch_result.content_type.contains("xml") {
            log::debug!(
                "{} served {}, parsing as HTML anyway",
                fetch_result.url,
                fetch_result.content_type
            );
        }

        Ok(self.process_html(&fetch_result.html, &fetch_result.url, fetch_result.status))
    }

    /// Process raw HTML through the pipeline (for testing)
    pub fn process_html(&self, html: &str, url: &str, status: u16) -> PageResult {
        PageResult {
            dom: parse_html(html, url),
            fetch_status: status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_html_keeps_final_url() {
        let loader = PageLoader::default();
        let page = loader.process_html(
            "<title>Moved</title><a href='next'>n</a>",
            "https://a.test/dir/",
            200,
        );
        assert_eq!(page.dom.url, "https://a.test/dir/");
        assert_eq!(page.dom.title, "Moved");
        assert_eq!(page.dom.links()[0].href, "https://a.test/dir/next");
    }

    #[test]
    fn fetch_failures_carry_phase() {
        let err = PageLoader::default().load_page("ftp://a.test/").unwrap_err();
        assert_eq!(err.phase, "fetch");
        assert!(err.to_string().starts_with("[fetch]"));
    }
}
