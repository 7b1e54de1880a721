//! Control panel logic.
//!
//! Edits the opt-out list and tells the active tab about the change. Every
//! operation leaves a short-lived `Feedback` for the panel to show.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::messaging::{HostChannel, HostMessage, TabId};
use crate::nav::classify::page_key_str;
use crate::overlay::copy::Clipboard;
use crate::settings::{validate_url, SettingsPatch, SettingsStore, StoreError, UrlError};

#[derive(Debug)]
pub enum ControlError {
    Url(UrlError),
    Store(StoreError),
    /// No active tab, or its URL has no page key.
    NoActivePage,
    Clipboard(String),
}

impl std::fmt::Display for ControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlError::Url(e) => write!(f, "{}", e),
            ControlError::Store(e) => write!(f, "{}", e),
            ControlError::NoActivePage => write!(f, "No page is open in the active tab"),
            ControlError::Clipboard(msg) => write!(f, "Failed to copy URL: {}", msg),
        }
    }
}

impl std::error::Error for ControlError {}

impl From<UrlError> for ControlError {
    fn from(e: UrlError) -> Self {
        ControlError::Url(e)
    }
}

impl From<StoreError> for ControlError {
    fn from(e: StoreError) -> Self {
        ControlError::Store(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub kind: FeedbackKind,
    shown_at: Instant,
}

pub struct ControlPanel {
    store: Arc<dyn SettingsStore>,
    channel: HostChannel,
    active: Option<(TabId, String)>,
    feedback: Option<Feedback>,
    feedback_duration: Duration,
}

impl ControlPanel {
    pub fn new(store: Arc<dyn SettingsStore>, channel: HostChannel, feedback_duration: Duration) -> Self {
        Self {
            store,
            channel,
            active: None,
            feedback: None,
            feedback_duration,
        }
    }

    pub fn set_active_tab(&mut self, tab: TabId, url: impl Into<String>) {
        self.active = Some((tab, url.into()));
    }

    pub fn clear_active_tab(&mut self) {
        self.active = None;
    }

    /// Page key (origin + path) of the active tab.
    pub fn current_key(&self) -> Option<String> {
        self.active.as_ref().and_then(|(_, url)| page_key_str(url))
    }

    /// Current list, newest first. Store failures read as empty.
    pub fn url_list(&self) -> Vec<String> {
        self.load_list().unwrap_or_else(|e| {
            log::warn!("Could not read settings: {}", e);
            Vec::new()
        })
    }

    /// Stored list; a corrupt file counts as empty and is replaced on the
    /// next write.
    fn load_list(&self) -> Result<Vec<String>, StoreError> {
        match self.store.get() {
            Ok(settings) => Ok(settings.url_list),
            Err(StoreError::Parse(e)) => {
                log::warn!("Ignoring corrupt settings: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_current_disabled(&self) -> bool {
        match self.current_key() {
            Some(key) => self.url_list().contains(&key),
            None => false,
        }
    }

    /// Flip interception for the active page.
    pub fn toggle_current(&mut self) -> Result<(), ControlError> {
        let result = self.try_toggle_current();
        match &result {
            Ok(true) => self.notify(FeedbackKind::Success, "Previews disabled on this page"),
            Ok(false) => self.notify(FeedbackKind::Success, "Previews enabled on this page"),
            Err(e) => self.notify(FeedbackKind::Error, e.to_string()),
        }
        result.map(|_| ())
    }

    /// Returns whether the page is now disabled.
    fn try_toggle_current(&mut self) -> Result<bool, ControlError> {
        let key = self.current_key().ok_or(ControlError::NoActivePage)?;
        let mut list = self.load_list()?;
        if let Some(pos) = list.iter().position(|u| *u == key) {
            list.remove(pos);
            self.store.set(SettingsPatch::url_list(list))?;
            self.broadcast(&key, HostMessage::Enable);
            Ok(false)
        } else {
            list.insert(0, key.clone());
            self.store.set(SettingsPatch::url_list(list))?;
            self.broadcast(&key, HostMessage::Disable);
            Ok(true)
        }
    }

    /// Validate and prepend `input` to the list.
    pub fn add_url(&mut self, input: &str) -> Result<(), ControlError> {
        let result = self.try_add_url(input);
        match &result {
            Ok(()) => self.notify(FeedbackKind::Success, "URL added"),
            Err(e) => self.notify(FeedbackKind::Error, e.to_string()),
        }
        result
    }

    fn try_add_url(&mut self, input: &str) -> Result<(), ControlError> {
        validate_url(input)?;
        // Stored as a page key so entries compare equal to pages at load
        let url = page_key_str(input.trim()).ok_or(UrlError::Invalid)?;
        let mut list = self.load_list()?;
        if list.contains(&url) {
            return Err(UrlError::Duplicate.into());
        }
        list.insert(0, url.clone());
        self.store.set(SettingsPatch::url_list(list))?;
        log::info!("Added {} to the opt-out list", url);
        self.broadcast(&url, HostMessage::Disable);
        Ok(())
    }

    pub fn remove_url(&mut self, url: &str) -> Result<(), ControlError> {
        let result = self.try_remove_url(url);
        match &result {
            Ok(()) => self.notify(FeedbackKind::Success, "URL removed"),
            Err(e) => self.notify(FeedbackKind::Error, e.to_string()),
        }
        result
    }

    fn try_remove_url(&mut self, url: &str) -> Result<(), ControlError> {
        let mut list = self.load_list()?;
        let before = list.len();
        list.retain(|u| u != url);
        if list.len() != before {
            self.store.set(SettingsPatch::url_list(list))?;
            log::info!("Removed {} from the opt-out list", url);
        }
        self.broadcast(url, HostMessage::Enable);
        Ok(())
    }

    pub fn copy_url(&mut self, url: &str, clipboard: &dyn Clipboard) -> Result<(), ControlError> {
        match clipboard.write_text(url) {
            Ok(()) => {
                self.notify(FeedbackKind::Success, "URL copied to clipboard");
                Ok(())
            }
            Err(e) => {
                let err = ControlError::Clipboard(e.message);
                self.notify(FeedbackKind::Error, err.to_string());
                Err(err)
            }
        }
    }

    /// Tell the active tab, if `url` is exactly its page key. Entries are
    /// matched by string equality, the same way pages check the list.
    fn broadcast(&self, url: &str, message: HostMessage) {
        let Some((tab, _)) = &self.active else {
            return;
        };
        if self.current_key().as_deref() == Some(url) {
            self.channel.send_or_log(*tab, message);
        }
    }

    fn notify(&mut self, kind: FeedbackKind, message: impl Into<String>) {
        self.feedback = Some(Feedback {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Feedback still visible at `now`.
    pub fn feedback(&self, now: Instant) -> Option<&Feedback> {
        self.feedback
            .as_ref()
            .filter(|f| now.saturating_duration_since(f.shown_at) < self.feedback_duration)
    }

    /// Drop expired feedback. Returns the time left on visible feedback.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        let remaining = self
            .feedback
            .as_ref()
            .map(|f| self.feedback_duration.saturating_sub(now.saturating_duration_since(f.shown_at)));
        match remaining {
            Some(left) if left.is_zero() => {
                self.feedback = None;
                None
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreviewConfig;
    use crate::nav::coordinator::{Coordinator, Decision, PassReason};
    use crate::nav::gesture::Key;
    use crate::nav::host::QueuedHost;
    use crate::nav::{NavigationIntent, Point};
    use crate::overlay::copy::tests::FakeClipboard;
    use crate::settings::{MemoryStore, Settings, MAX_URL_LENGTH};

    const PAGE: &str = "https://a.test/page";

    fn panel(store: Arc<MemoryStore>, channel: &HostChannel) -> ControlPanel {
        let mut panel = ControlPanel::new(store, channel.clone(), Duration::from_secs(2));
        panel.set_active_tab(1, PAGE);
        panel
    }

    fn shift_click(c: &mut Coordinator) -> Decision {
        c.handle(
            NavigationIntent::LinkClick {
                href: "https://b.test/x".into(),
                text: Some("B Site".into()),
                point: Point::new(1.0, 1.0),
            },
            &mut QueuedHost::new(),
        )
    }

    #[test]
    fn adding_current_page_disables_its_tab() {
        let channel = HostChannel::new();
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = Coordinator::new(PAGE, PreviewConfig::default());
        coordinator.attach(channel.connect(1));
        coordinator.on_key_down(Key::Shift);

        let mut panel = panel(store.clone(), &channel);
        panel.add_url("https://a.test/page").unwrap();
        assert_eq!(store.get().unwrap().url_list, vec!["https://a.test/page"]);
        assert!(panel.is_current_disabled());

        coordinator.pump_host_messages();
        assert!(!coordinator.state().interception_enabled());
        assert_eq!(shift_click(&mut coordinator), Decision::Proceed(PassReason::Disabled));

        panel.remove_url("https://a.test/page").unwrap();
        coordinator.pump_host_messages();
        assert!(shift_click(&mut coordinator).is_suppressed());
    }

    #[test]
    fn invalid_input_leaves_list_unchanged() {
        let channel = HostChannel::new();
        let store = Arc::new(MemoryStore::with_settings(Settings {
            url_list: vec!["https://c.test/".into()],
        }));
        let mut panel = panel(store.clone(), &channel);

        let long = "x".repeat(3000);
        assert!(matches!(
            panel.add_url(&long),
            Err(ControlError::Url(UrlError::TooLong { len: 3000 }))
        ));
        let feedback = panel.feedback(Instant::now()).unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Error);
        assert!(feedback.message.contains(&MAX_URL_LENGTH.to_string()));

        assert!(matches!(
            panel.add_url("not a url"),
            Err(ControlError::Url(UrlError::Invalid))
        ));
        assert!(matches!(
            panel.add_url("https://c.test/"),
            Err(ControlError::Url(UrlError::Duplicate))
        ));
        assert_eq!(store.get().unwrap().url_list, vec!["https://c.test/"]);
    }

    #[test]
    fn new_entries_are_prepended() {
        let channel = HostChannel::new();
        let store = Arc::new(MemoryStore::new());
        let mut panel = panel(store, &channel);
        panel.add_url("https://c.test/").unwrap();
        panel.add_url("https://d.test/x").unwrap();
        assert_eq!(panel.url_list(), vec!["https://d.test/x", "https://c.test/"]);
    }

    #[test]
    fn added_urls_are_stored_as_page_keys() {
        let channel = HostChannel::new();
        let endpoint = channel.connect(1);
        let store = Arc::new(MemoryStore::new());
        let mut panel = panel(store.clone(), &channel);

        panel.add_url("  HTTPS://A.test/page?q=1#top ").unwrap();
        assert_eq!(store.get().unwrap().url_list, vec!["https://a.test/page"]);
        assert!(panel.is_current_disabled());
        assert_eq!(endpoint.try_next(), Some(HostMessage::Disable));

        panel.add_url("https://c.test").unwrap();
        assert_eq!(panel.url_list()[0], "https://c.test/");
        assert!(matches!(
            panel.add_url("https://A.TEST/page"),
            Err(ControlError::Url(UrlError::Duplicate))
        ));
    }

    #[test]
    fn unrelated_urls_do_not_message_the_tab() {
        let channel = HostChannel::new();
        let endpoint = channel.connect(1);
        let mut panel = panel(Arc::new(MemoryStore::new()), &channel);
        panel.add_url("https://c.test/").unwrap();
        panel.remove_url("https://c.test/").unwrap();
        assert_eq!(endpoint.try_next(), None);
    }

    #[test]
    fn toggle_flips_current_page() {
        let channel = HostChannel::new();
        let endpoint = channel.connect(1);
        let store = Arc::new(MemoryStore::new());
        let mut panel = panel(store.clone(), &channel);
        panel.set_active_tab(1, "https://a.test/page?q=1#frag");

        panel.toggle_current().unwrap();
        assert_eq!(store.get().unwrap().url_list, vec!["https://a.test/page"]);
        assert_eq!(endpoint.try_next(), Some(HostMessage::Disable));

        panel.toggle_current().unwrap();
        assert!(store.get().unwrap().url_list.is_empty());
        assert_eq!(endpoint.try_next(), Some(HostMessage::Enable));
    }

    #[test]
    fn toggle_without_page_reports_error() {
        let mut panel = ControlPanel::new(
            Arc::new(MemoryStore::new()),
            HostChannel::new(),
            Duration::from_secs(2),
        );
        assert!(matches!(panel.toggle_current(), Err(ControlError::NoActivePage)));
        assert_eq!(
            panel.feedback(Instant::now()).map(|f| f.kind),
            Some(FeedbackKind::Error)
        );
    }

    #[test]
    fn unreachable_tab_is_not_an_error() {
        // Tab 1 never connected
        let mut panel = panel(Arc::new(MemoryStore::new()), &HostChannel::new());
        assert!(panel.add_url(PAGE).is_ok());
    }

    #[test]
    fn copy_reports_feedback() {
        let mut panel = panel(Arc::new(MemoryStore::new()), &HostChannel::new());
        let clipboard = FakeClipboard::default();
        panel.copy_url("https://c.test/", &clipboard).unwrap();
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["https://c.test/"]);

        let failing = FakeClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(panel.copy_url("https://c.test/", &failing).is_err());
        assert_eq!(
            panel.feedback(Instant::now()).map(|f| f.kind),
            Some(FeedbackKind::Error)
        );
    }

    #[test]
    fn feedback_expires() {
        let mut panel = panel(Arc::new(MemoryStore::new()), &HostChannel::new());
        panel.add_url("https://c.test/").unwrap();
        let now = Instant::now();
        assert!(panel.feedback(now).is_some());
        assert!(panel.poll(now).is_some());
        let later = now + Duration::from_secs(3);
        assert!(panel.feedback(later).is_none());
        assert_eq!(panel.poll(later), None);
        assert!(panel.feedback(now).is_none());
    }
}
