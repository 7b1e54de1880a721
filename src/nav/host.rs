//! The seam between the coordinator and whatever actually navigates.

use super::NavigationIntent;

/// Side effects the coordinator asks of its host page.
pub trait NavigationHost {
    /// Carry out a navigation the coordinator decided not to preview.
    fn proceed(&mut self, intent: &NavigationIntent);

    /// Navigate the host page itself to `url`.
    fn navigate_main(&mut self, url: &str);

    /// Open `url` in a new top-level browsing context.
    fn open_new_tab(&mut self, url: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    Proceed(NavigationIntent),
    NavigateMain(String),
    OpenNewTab(String),
}

/// Host that records requested actions for the caller to apply once the
/// current event pass is finished.
#[derive(Debug, Default)]
pub struct QueuedHost {
    actions: Vec<HostAction>,
}

impl QueuedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[HostAction] {
        &self.actions
    }

    pub fn drain(&mut self) -> Vec<HostAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl NavigationHost for QueuedHost {
    fn proceed(&mut self, intent: &NavigationIntent) {
        self.actions.push(HostAction::Proceed(intent.clone()));
    }

    fn navigate_main(&mut self, url: &str) {
        self.actions.push(HostAction::NavigateMain(url.to_string()));
    }

    fn open_new_tab(&mut self, url: &str) {
        self.actions.push(HostAction::OpenNewTab(url.to_string()));
    }
}
