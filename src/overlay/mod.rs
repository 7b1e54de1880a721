//! Preview overlay.
//!
//! The overlay renders a `PreviewState` it does not own. It keeps only its
//! local surface state (frame document, copy button, on-screen bounds) and
//! asks the coordinator for every state change by returning an
//! `OverlayRequest`.

pub mod copy;
pub mod frame;

use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::config::PreviewConfig;
use crate::dom::DomTree;
use crate::nav::coordinator::{LoadToken, PreviewState};
use crate::nav::Rect;

use copy::{Clipboard, CopyIndicator, CopyState};
use frame::{FrameReport, FrameRequest};

/// Location of a frame that has not loaded anything yet.
pub const BLANK: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Frame URL for `target`: the target with a `theme` query parameter so
/// theme-aware pages match the host.
pub fn frame_src(target: &str, theme: Theme) -> String {
    match Url::parse(target) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("theme", theme.as_str());
            url.to_string()
        }
        Err(_) => {
            let sep = if target.contains('?') { '&' } else { '?' };
            format!("{}{}theme={}", target, sep, theme.as_str())
        }
    }
}

/// Window controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    Close,
    Expand,
    OpenInNewTab,
    CopyLink,
}

/// State changes the overlay asks of the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayRequest {
    Close,
    LoadComplete {
        token: LoadToken,
        title: Option<String>,
    },
    NavigateMain(String),
    OpenNewTab(String),
}

pub struct PreviewOverlay {
    theme: Theme,
    clipboard: Arc<dyn Clipboard>,
    copy: CopyIndicator,
    token: Option<LoadToken>,
    src: Option<String>,
    frame_location: Option<String>,
    document: Option<DomTree>,
    frame_error: Option<String>,
    bounds: Option<Rect>,
}

impl PreviewOverlay {
    pub fn new(config: &PreviewConfig, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            theme: Theme::Light,
            clipboard,
            copy: CopyIndicator::new(config.copy_feedback),
            token: None,
            src: None,
            frame_location: None,
            document: None,
            frame_error: None,
            bounds: None,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Bring the surface in line with `state`. Returns the frame load to
    /// start when a new preview has been opened (or replaced in place).
    pub fn sync(&mut self, state: &PreviewState) -> Option<FrameRequest> {
        if !state.is_open() {
            if self.token.is_some() {
                self.reset();
            }
            return None;
        }
        if self.token == Some(state.load_token()) {
            return None;
        }

        self.reset();
        let target = state.target_url()?;
        let src = frame_src(target, self.theme);
        self.token = Some(state.load_token());
        self.src = Some(src.clone());
        Some(FrameRequest {
            token: state.load_token(),
            src,
        })
    }

    fn reset(&mut self) {
        self.token = None;
        self.src = None;
        self.frame_location = None;
        self.document = None;
        self.frame_error = None;
        self.bounds = None;
    }

    /// Frame finished loading. Reports for anything but the current preview
    /// are dropped.
    pub fn on_frame_report(&mut self, report: FrameReport) -> Option<OverlayRequest> {
        if self.token != Some(report.token) {
            log::debug!("Dropping frame report for stale preview {:?}", report.token);
            return None;
        }
        // Only remember the location if the frame moved off its source
        self.frame_location = report
            .location
            .filter(|loc| Some(loc) != self.src.as_ref());
        self.frame_error = report.error;
        self.document = report.document;
        Some(OverlayRequest::LoadComplete {
            token: report.token,
            title: report.title,
        })
    }

    /// Navigate the frame itself to `href`. The load keeps the current
    /// token, so its completion updates the same preview.
    pub fn follow_link(&mut self, href: &str) -> Option<FrameRequest> {
        let token = self.token?;
        log::debug!("Preview frame navigating to {}", href);
        Some(FrameRequest {
            token,
            src: href.to_string(),
        })
    }

    /// URL the controls act on: the frame's own location once it has
    /// navigated somewhere real, otherwise the previewed target.
    pub fn effective_url(&self, state: &PreviewState) -> Option<String> {
        if !state.is_open() {
            return None;
        }
        match self.frame_location.as_deref() {
            Some(loc) if !loc.is_empty() && loc != BLANK => Some(loc.to_string()),
            _ => state.target_url().map(str::to_string),
        }
    }

    pub fn act(&mut self, action: OverlayAction, state: &PreviewState) -> Option<OverlayRequest> {
        if !state.is_open() {
            return None;
        }
        match action {
            OverlayAction::Close => Some(OverlayRequest::Close),
            OverlayAction::Expand => self.effective_url(state).map(OverlayRequest::NavigateMain),
            OverlayAction::OpenInNewTab => self.effective_url(state).map(OverlayRequest::OpenNewTab),
            OverlayAction::CopyLink => {
                if let Some(url) = self.effective_url(state) {
                    self.copy.start(url, Arc::clone(&self.clipboard));
                }
                None
            }
        }
    }

    pub fn poll(&mut self, now: Instant) {
        self.copy.poll(now);
    }

    pub fn copy_state(&self) -> CopyState {
        self.copy.state()
    }

    pub fn copy_enabled(&self) -> bool {
        self.copy.is_enabled()
    }

    pub fn copy_indicator(&self) -> &CopyIndicator {
        &self.copy
    }

    /// Where the overlay was last drawn, for outside-click detection.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn document(&self) -> Option<&DomTree> {
        self.document.as_ref()
    }

    pub fn frame_error(&self) -> Option<&str> {
        self.frame_error.as_deref()
    }

    /// The page underneath must not scroll while a preview is shown.
    pub fn scroll_locked(&self, state: &PreviewState) -> bool {
        state.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::copy::tests::{settle, FakeClipboard};
    use super::*;
    use crate::nav::coordinator::Coordinator;
    use crate::nav::gesture::Key;
    use crate::nav::host::QueuedHost;
    use crate::nav::{NavigationIntent, Point};

    const PAGE: &str = "https://a.test/page";

    fn opened(target: &str) -> (Coordinator, PreviewOverlay, FrameRequest, Arc<FakeClipboard>) {
        let mut coordinator = Coordinator::new(PAGE, PreviewConfig::default());
        let clipboard = Arc::new(FakeClipboard::default());
        let mut overlay = PreviewOverlay::new(&PreviewConfig::default(), clipboard.clone());
        coordinator.on_key_down(Key::Shift);
        coordinator.handle(
            NavigationIntent::LinkClick {
                href: target.into(),
                text: Some("B Site".into()),
                point: Point::new(5.0, 5.0),
            },
            &mut QueuedHost::new(),
        );
        let request = overlay.sync(coordinator.state()).expect("frame request");
        (coordinator, overlay, request, clipboard)
    }

    #[test]
    fn frame_src_appends_theme() {
        assert_eq!(
            frame_src("https://b.test/x", Theme::Dark),
            "https://b.test/x?theme=dark"
        );
        assert_eq!(
            frame_src("https://b.test/x?a=1", Theme::Light),
            "https://b.test/x?a=1&theme=light"
        );
        assert_eq!(frame_src("weird", Theme::Light), "weird?theme=light");
    }

    #[test]
    fn sync_requests_one_load_per_open() {
        let (coordinator, mut overlay, request, _) = opened("https://b.test/x");
        assert_eq!(request.src, "https://b.test/x?theme=light");
        assert_eq!(request.token, coordinator.state().load_token());
        assert!(overlay.sync(coordinator.state()).is_none());
    }

    #[test]
    fn effective_url_prefers_redirected_frame_location() {
        let (coordinator, mut overlay, request, _) = opened("https://b.test/x");
        assert_eq!(
            overlay.effective_url(coordinator.state()).as_deref(),
            Some("https://b.test/x")
        );

        // Loaded at its own src: not a navigation
        let mut report = FrameReport::failed(request.token, "x");
        report.location = Some(request.src.clone());
        report.error = None;
        overlay.on_frame_report(report);
        assert_eq!(
            overlay.effective_url(coordinator.state()).as_deref(),
            Some("https://b.test/x")
        );

        let mut moved = FrameReport::failed(request.token, "x");
        moved.location = Some("https://c.test/landing".into());
        overlay.on_frame_report(moved);
        assert_eq!(
            overlay.effective_url(coordinator.state()).as_deref(),
            Some("https://c.test/landing")
        );

        let mut blank = FrameReport::failed(request.token, "x");
        blank.location = Some(BLANK.into());
        overlay.on_frame_report(blank);
        assert_eq!(
            overlay.effective_url(coordinator.state()).as_deref(),
            Some("https://b.test/x")
        );
    }

    #[test]
    fn in_frame_navigation_keeps_token() {
        let (mut coordinator, mut overlay, request, _) = opened("https://b.test/x");
        let next = overlay.follow_link("https://b.test/y").unwrap();
        assert_eq!(next.token, request.token);

        let mut report = FrameReport::failed(next.token, "x");
        report.location = Some(next.src.clone());
        report.title = Some("Y".into());
        let loaded = overlay.on_frame_report(report).unwrap();
        coordinator.apply(loaded, &mut QueuedHost::new());
        assert_eq!(coordinator.state().title(), Some("Y"));
        assert_eq!(
            overlay.effective_url(coordinator.state()).as_deref(),
            Some("https://b.test/y")
        );
    }

    #[test]
    fn stale_reports_are_dropped() {
        let (_coordinator, mut overlay, request, _) = opened("https://b.test/x");
        let stale = FrameReport::failed(LoadToken::default(), "old");
        assert_ne!(stale.token, request.token);
        assert!(overlay.on_frame_report(stale).is_none());
    }

    #[test]
    fn controls_map_to_requests() {
        let (coordinator, mut overlay, _, clipboard) = opened("https://b.test/x");
        let state = coordinator.state();
        assert_eq!(overlay.act(OverlayAction::Close, state), Some(OverlayRequest::Close));
        assert_eq!(
            overlay.act(OverlayAction::Expand, state),
            Some(OverlayRequest::NavigateMain("https://b.test/x".into()))
        );
        assert_eq!(
            overlay.act(OverlayAction::OpenInNewTab, state),
            Some(OverlayRequest::OpenNewTab("https://b.test/x".into()))
        );
        assert_eq!(overlay.act(OverlayAction::CopyLink, state), None);
        assert_eq!(overlay.copy_state(), CopyState::Loading);
        assert!(!overlay.copy_enabled());
        settle(&mut overlay.copy);
        assert_eq!(overlay.copy_state(), CopyState::Success);
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["https://b.test/x"]);
    }

    #[test]
    fn dragged_window_bounds_drive_outside_clicks() {
        let (mut coordinator, mut overlay, _, _) = opened("https://b.test/x");
        overlay.set_bounds(Rect::new(100.0, 100.0, 400.0, 300.0));
        // Window dragged to the left; the old area is now outside it
        overlay.set_bounds(Rect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(overlay.bounds(), Some(Rect::new(0.0, 0.0, 400.0, 300.0)));
        assert!(!coordinator.on_pointer_down(Point::new(20.0, 20.0), overlay.bounds()));
        assert!(coordinator.state().is_open());
        assert!(coordinator.on_pointer_down(Point::new(450.0, 350.0), overlay.bounds()));
        assert!(!coordinator.state().is_open());
    }

    #[test]
    fn closed_state_renders_nothing() {
        let (mut coordinator, mut overlay, _, _) = opened("https://b.test/x");
        overlay.set_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        coordinator.close();
        assert!(overlay.sync(coordinator.state()).is_none());
        assert_eq!(overlay.bounds(), None);
        assert_eq!(overlay.effective_url(coordinator.state()), None);
        assert_eq!(overlay.act(OverlayAction::Expand, coordinator.state()), None);
        assert!(!overlay.scroll_locked(coordinator.state()));
    }
}
