//! Embedded frame loading.
//!
//! The preview target is fetched and parsed on a background thread; the
//! finished document comes back as a `FrameReport` tagged with the load
//! token of the preview that asked for it.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use crate::dom::DomTree;
use crate::engine::pipeline::{PageLoader, PageResult};
use crate::nav::coordinator::LoadToken;

/// A load the overlay wants started.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRequest {
    pub token: LoadToken,
    /// URL the frame is pointed at, including the theme parameter.
    pub src: String,
}

/// Outcome of one frame load. A failed fetch still counts as a completed
/// load; the frame simply has no readable title.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub token: LoadToken,
    /// Where the frame ended up, after redirects.
    pub location: Option<String>,
    pub title: Option<String>,
    pub document: Option<DomTree>,
    pub error: Option<String>,
}

impl FrameReport {
    pub fn from_page(token: LoadToken, page: PageResult) -> Self {
        let title = Some(page.dom.title.trim().to_string()).filter(|t| !t.is_empty());
        Self {
            token,
            location: Some(page.dom.url.clone()),
            title,
            document: Some(page.dom),
            error: None,
        }
    }

    pub fn failed(token: LoadToken, error: impl Into<String>) -> Self {
        Self {
            token,
            location: None,
            title: None,
            document: None,
            error: Some(error.into()),
        }
    }
}

/// Runs frame loads off the UI thread. Only the newest load is tracked;
/// starting another drops the receiver of the previous one.
pub struct FrameLoader {
    loader: PageLoader,
    pending: Option<(LoadToken, Receiver<FrameReport>)>,
}

impl FrameLoader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            loader: PageLoader::new(timeout),
            pending: None,
        }
    }

    pub fn start(&mut self, request: FrameRequest) {
        let (tx, rx) = mpsc::channel();
        self.pending = Some((request.token, rx));
        let loader = self.loader.clone();
        log::debug!("Loading preview frame {}", request.src);
        std::thread::spawn(move || {
            let report = match loader.load_page(&request.src) {
                Ok(page) => FrameReport::from_page(request.token, page),
                Err(e) => {
                    log::info!("Preview frame failed to load: {}", e);
                    FrameReport::failed(request.token, e.to_string())
                }
            };
            let _ = tx.send(report);
        });
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Poll the background load and return the report once it arrives.
    pub fn poll(&mut self) -> Option<FrameReport> {
        let (token, rx) = self.pending.as_ref()?;
        let report = match rx.try_recv() {
            Ok(report) => report,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => FrameReport::failed(*token, "frame loader stopped"),
        };
        self.pending = None;
        Some(report)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_takes_document_title() {
        let page = PageLoader::default().process_html(
            "<title> Welcome </title>",
            "https://b.test/x?theme=light",
            200,
        );
        let report = FrameReport::from_page(LoadToken::default(), page);
        assert_eq!(report.title.as_deref(), Some("Welcome"));
        assert_eq!(report.location.as_deref(), Some("https://b.test/x?theme=light"));
    }

    #[test]
    fn untitled_documents_report_no_title() {
        let page = PageLoader::default().process_html("<p>hi</p>", "https://b.test/", 200);
        let report = FrameReport::from_page(LoadToken::default(), page);
        assert_eq!(report.title, None);
    }

    #[test]
    fn unsupported_targets_complete_with_error() {
        let mut loader = FrameLoader::new(Duration::from_secs(1));
        loader.start(FrameRequest {
            token: LoadToken::default(),
            src: "ftp://b.test/".into(),
        });
        assert!(loader.is_loading());
        let mut report = None;
        for _ in 0..400 {
            report = loader.poll();
            if report.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        let report = report.expect("frame report");
        assert!(report.error.is_some());
        assert_eq!(report.title, None);
        assert!(!loader.is_loading());
    }
}
