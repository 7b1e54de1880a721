//! Interception coordinator.
//!
//! Owns the page's `PreviewState` and is the only thing that writes to it.
//! Every navigation intent is decided synchronously: either the preview
//! opens (and the caller suppresses the native navigation) or the host is
//! told to proceed.
//!
//! ```text
//!   Idle ──intent + gesture + eligible──▶ Opening ──frame loaded──▶ Loaded
//!    ▲                                       │                        │
//!    └──────── close / Escape / outside click / expand ───────────────┘
//! ```

use crate::config::PreviewConfig;
use crate::messaging::{HostMessage, PageEndpoint};
use crate::overlay::OverlayRequest;
use crate::settings::Settings;

use super::classify::{page_key_str, resolve_against, should_intercept};
use super::gesture::{GestureTracker, Key};
use super::host::NavigationHost;
use super::{NavigationIntent, Point, Rect};

/// Generation number of one preview open. Frame loads carry it back so a
/// report for an older preview can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LoadToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Opening,
    Loaded,
}

/// Why a navigation was allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// Interception is switched off for this page.
    Disabled,
    /// History navigation while history interception is off.
    HistoryPassThrough,
    NoGesture,
    /// The intent carried no URL.
    NoTarget,
    /// The URL could not be resolved against the page.
    Unresolvable,
    /// The classifier rejected the target.
    NotEligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Preview opened; the caller must suppress the native navigation.
    Preview(LoadToken),
    /// Navigation handed back to the host.
    Proceed(PassReason),
}

impl Decision {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Decision::Preview(_))
    }
}

/// Preview state of one page context.
#[derive(Debug, Clone)]
pub struct PreviewState {
    is_open: bool,
    target_url: Option<String>,
    title: Option<String>,
    is_loading: bool,
    origin_point: Point,
    gesture: GestureTracker,
    interception_enabled: bool,
    load_token: LoadToken,
}

impl PreviewState {
    fn new(modifier: Key) -> Self {
        Self {
            is_open: false,
            target_url: None,
            title: None,
            is_loading: false,
            origin_point: Point::default(),
            gesture: GestureTracker::new(modifier),
            interception_enabled: true,
            load_token: LoadToken::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Last requested target, even when closed. Renderers want
    /// `visible_target` instead.
    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    /// Target to render; `None` whenever the overlay is closed.
    pub fn visible_target(&self) -> Option<&str> {
        if self.is_open {
            self.target_url.as_deref()
        } else {
            None
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn origin_point(&self) -> Point {
        self.origin_point
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture.is_active()
    }

    pub fn interception_enabled(&self) -> bool {
        self.interception_enabled
    }

    pub fn load_token(&self) -> LoadToken {
        self.load_token
    }

    pub fn phase(&self) -> Phase {
        match (self.is_open, self.is_loading) {
            (false, _) => Phase::Idle,
            (true, true) => Phase::Opening,
            (true, false) => Phase::Loaded,
        }
    }
}

pub struct Coordinator {
    page_url: String,
    config: PreviewConfig,
    state: PreviewState,
    endpoint: Option<PageEndpoint>,
    next_token: u64,
    revision: u64,
}

impl Coordinator {
    /// Coordinator for a page with interception on.
    pub fn new(page_url: impl Into<String>, config: PreviewConfig) -> Self {
        let state = PreviewState::new(config.modifier);
        Self {
            page_url: page_url.into(),
            config,
            state,
            endpoint: None,
            next_token: 0,
            revision: 0,
        }
    }

    /// Coordinator for a page, starting disabled when the page is on the
    /// opt-out list.
    pub fn for_page(page_url: impl Into<String>, settings: &Settings, config: PreviewConfig) -> Self {
        let mut coordinator = Self::new(page_url, config);
        coordinator.state.interception_enabled = !is_opted_out(&coordinator.page_url, settings);
        coordinator
    }

    /// A new document replaced the old one in this context.
    pub fn load_page(&mut self, page_url: impl Into<String>, settings: &Settings) {
        self.page_url = page_url.into();
        self.close();
        self.state.interception_enabled = !is_opted_out(&self.page_url, settings);
        log::debug!(
            "Page {} loaded, interception {}",
            self.page_url,
            if self.state.interception_enabled { "on" } else { "off" }
        );
        self.touch();
    }

    /// Listen for host messages on `endpoint`.
    pub fn attach(&mut self, endpoint: PageEndpoint) {
        self.endpoint = Some(endpoint);
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Bumped on every state change; renderers redraw when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ── Host messages ───────────────────────────────────────────────────────

    /// Apply every queued host message. Returns how many were handled.
    pub fn pump_host_messages(&mut self) -> usize {
        let mut messages = Vec::new();
        if let Some(endpoint) = &self.endpoint {
            while let Some(message) = endpoint.try_next() {
                messages.push(message);
            }
        }
        let count = messages.len();
        for message in messages {
            self.apply_host_message(message);
        }
        count
    }

    /// Toggle interception. An open preview stays open either way.
    pub fn apply_host_message(&mut self, message: HostMessage) {
        let enabled = matches!(message, HostMessage::Enable);
        if self.state.interception_enabled != enabled {
            log::info!(
                "Interception {} on {}",
                if enabled { "enabled" } else { "disabled" },
                self.page_url
            );
            self.state.interception_enabled = enabled;
            self.touch();
        }
    }

    // ── Input ───────────────────────────────────────────────────────────────

    /// Returns `true` when the key was consumed (Escape closing the preview).
    pub fn on_key_down(&mut self, key: Key) -> bool {
        if key == Key::Escape && self.state.is_open {
            self.state.gesture.release();
            self.close();
            return true;
        }
        let was = self.state.gesture.is_active();
        self.state.gesture.on_key_down(key);
        if was != self.state.gesture.is_active() {
            self.touch();
        }
        false
    }

    pub fn on_key_up(&mut self, key: Key) {
        let was = self.state.gesture.is_active();
        self.state.gesture.on_key_up(key);
        if was != self.state.gesture.is_active() {
            self.touch();
        }
    }

    /// Window lost focus; the modifier release will never be seen.
    pub fn on_blur(&mut self) {
        if self.state.gesture.is_active() {
            self.state.gesture.release();
            self.touch();
        }
    }

    /// Pointer pressed at `point`. Closes the preview when the press lands
    /// outside `overlay_bounds`. Returns `true` if it closed.
    pub fn on_pointer_down(&mut self, point: Point, overlay_bounds: Option<Rect>) -> bool {
        if !self.state.is_open {
            return false;
        }
        match overlay_bounds {
            Some(bounds) if !bounds.contains(point) => {
                log::debug!("Outside click at ({}, {}) closes preview", point.x, point.y);
                self.close();
                true
            }
            _ => false,
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// Decide what happens to `intent`. On `Proceed` the host has already
    /// been asked to carry the navigation out.
    pub fn handle(&mut self, intent: NavigationIntent, host: &mut dyn NavigationHost) -> Decision {
        match self.classify(&intent) {
            Ok(target) => {
                let token = self.open(target, intent.title_hint(), intent.point());
                Decision::Preview(token)
            }
            Err(reason) => {
                log::debug!("Letting {} through: {:?}", intent.kind_name(), reason);
                host.proceed(&intent);
                Decision::Proceed(reason)
            }
        }
    }

    fn classify(&self, intent: &NavigationIntent) -> Result<String, PassReason> {
        if !self.state.interception_enabled {
            return Err(PassReason::Disabled);
        }
        if intent.is_history() && !self.config.intercept_history {
            return Err(PassReason::HistoryPassThrough);
        }
        if !self.state.gesture.is_active() {
            return Err(PassReason::NoGesture);
        }
        let raw = intent.raw_target().ok_or(PassReason::NoTarget)?;
        let target = resolve_against(&self.page_url, raw).ok_or_else(|| {
            log::warn!("Could not resolve {:?} against {}", raw, self.page_url);
            PassReason::Unresolvable
        })?;
        if should_intercept(&target, &self.page_url) {
            Ok(target)
        } else {
            Err(PassReason::NotEligible)
        }
    }

    /// Open the preview, replacing any preview already shown.
    fn open(&mut self, target: String, title: Option<String>, point: Option<Point>) -> LoadToken {
        if self.state.is_open {
            log::debug!("Replacing preview of {:?}", self.state.target_url);
        }
        self.next_token += 1;
        let token = LoadToken(self.next_token);
        log::info!("Previewing {}", target);

        self.state.load_token = token;
        self.state.target_url = Some(target);
        self.state.title = title;
        if let Some(p) = point {
            self.state.origin_point = p;
        }
        self.state.is_loading = true;
        self.state.is_open = true;
        self.touch();
        token
    }

    /// Frame reported load completion. Ignored once the preview is closed
    /// or replaced. Returns `true` if it was applied.
    pub fn on_frame_loaded(&mut self, token: LoadToken, title: Option<String>) -> bool {
        if !self.state.is_open {
            log::debug!("Ignoring frame load after close");
            return false;
        }
        if token != self.state.load_token {
            log::debug!("Ignoring frame load for replaced preview {:?}", token);
            return false;
        }
        self.state.is_loading = false;
        if let Some(t) = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
            self.state.title = Some(t);
        }
        self.touch();
        true
    }

    pub fn close(&mut self) {
        if !self.state.is_open && !self.state.is_loading {
            return;
        }
        log::debug!("Closing preview");
        self.state.is_open = false;
        self.state.is_loading = false;
        self.touch();
    }

    /// Apply a request coming from the overlay.
    pub fn apply(&mut self, request: OverlayRequest, host: &mut dyn NavigationHost) {
        match request {
            OverlayRequest::Close => self.close(),
            OverlayRequest::LoadComplete { token, title } => {
                self.on_frame_loaded(token, title);
            }
            OverlayRequest::NavigateMain(url) => {
                if self.state.is_open {
                    host.navigate_main(&url);
                    self.close();
                }
            }
            OverlayRequest::OpenNewTab(url) => {
                if self.state.is_open {
                    host.open_new_tab(&url);
                    if self.config.close_on_new_tab {
                        self.close();
                    }
                }
            }
        }
    }
}

fn is_opted_out(page_url: &str, settings: &Settings) -> bool {
    page_key_str(page_url)
        .map(|key| settings.contains(&key))
        .unwrap_or(false)
}
