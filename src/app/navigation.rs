//! Navigation methods for `BrowserApp`.
//!
//! Covers history management (`go_back`, `go_forward`, `navigate`), the
//! asynchronous page-fetch lifecycle (`load_current`, `check_fetch`) and
//! carrying out the `HostAction`s the coordinator hands back.

use std::sync::mpsc;

use eframe::egui;

use link_peek::engine::pipeline::PageLoader;
use link_peek::nav::classify::resolve_against;
use link_peek::nav::host::{HostAction, QueuedHost};
use link_peek::nav::{HistoryKind, NavigationIntent};
use link_peek::net::fetch::normalize_input;

use super::BrowserApp;

impl BrowserApp {
    /// Navigate the active tab one step back in history. The traversal is
    /// offered to the coordinator first, like any other navigation.
    pub fn go_back(&mut self, ctx: &egui::Context) {
        let target = match self.tabs.get(self.active) {
            Some(tab) if tab.history_idx > 0 => tab.history_idx - 1,
            _ => return,
        };
        self.traverse(target, ctx);
    }

    /// Navigate the active tab one step forward in history.
    pub fn go_forward(&mut self, ctx: &egui::Context) {
        let target = match self.tabs.get(self.active) {
            Some(tab) if tab.history_idx + 1 < tab.history.len() => tab.history_idx + 1,
            _ => return,
        };
        self.traverse(target, ctx);
    }

    fn traverse(&mut self, target_idx: usize, ctx: &egui::Context) {
        let index = self.active;
        let tab = &mut self.tabs[index];
        let url = tab.history[target_idx].clone();
        let mut host = QueuedHost::new();
        let decision = tab
            .coordinator
            .handle(NavigationIntent::PopState { url: url.clone() }, &mut host);
        if decision.is_suppressed() {
            return;
        }
        tab.history_idx = target_idx;
        tab.url_input = url;
        self.load_current(index, ctx);
    }

    /// Push the active tab's address bar URL to history and start loading.
    pub fn navigate(&mut self, ctx: &egui::Context) {
        let index = self.active;
        if let Some(tab) = self.tabs.get(index) {
            let url = normalize_input(&tab.url_input);
            self.navigate_to(index, &url, ctx);
        }
    }

    /// Load `url` in tab `index`, recording it in that tab's history.
    pub fn navigate_to(&mut self, index: usize, url: &str, ctx: &egui::Context) {
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        tab.url_input = url.to_string();
        if tab.history.is_empty() || tab.history[tab.history_idx] != url {
            // Truncate forward history before pushing
            tab.history.truncate(tab.history_idx + 1);
            tab.history.push(url.to_string());
            tab.history_idx = tab.history.len() - 1;
        }
        self.load_current(index, ctx);
    }

    /// Start an async fetch of the tab's address bar URL without touching
    /// history.
    pub fn load_current(&mut self, index: usize, ctx: &egui::Context) {
        let timeout = self.config.fetch_timeout;
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        tab.loading = true;
        tab.error = None;
        tab.coordinator.close();

        let (tx, rx) = mpsc::channel();
        tab.fetch_rx = Some(rx);

        let url = tab.url_input.clone();
        let ctx = ctx.clone();
        log::debug!("Tab {} loading {}", tab.id, url);

        std::thread::spawn(move || {
            let loader = PageLoader::new(timeout);
            let result = loader.load_page(&url);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Poll tab `index`'s fetch channel and update its state when a result
    /// arrives.
    pub fn check_fetch(&mut self, index: usize) {
        let settings = self.settings();
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        let Some(rx) = &tab.fetch_rx else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };

        match result {
            Ok(page) => {
                // Follow redirects in the address bar and the history entry
                if page.dom.url != tab.url_input {
                    tab.url_input = page.dom.url.clone();
                    if let Some(entry) = tab.history.get_mut(tab.history_idx) {
                        *entry = page.dom.url.clone();
                    }
                }
                tab.coordinator.load_page(page.dom.url.clone(), &settings);
                tab.page = Some(page);
                tab.error = None;
            }
            Err(e) => {
                tab.error = Some(e.to_string());
                tab.page = None;
            }
        }
        tab.loading = false;
        tab.fetch_rx = None;

        let (id, url) = (tab.id, tab.coordinator.page_url().to_string());
        if index == self.active {
            self.control.set_active_tab(id, url);
        }
    }

    /// Offer `intent` to tab `index`'s coordinator and carry out whatever
    /// it lets through.
    pub fn dispatch(&mut self, index: usize, intent: NavigationIntent, ctx: &egui::Context) {
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        let mut host = QueuedHost::new();
        tab.coordinator.handle(intent, &mut host);
        self.apply_host_actions(index, host, ctx);
    }

    pub fn apply_host_actions(&mut self, index: usize, mut host: QueuedHost, ctx: &egui::Context) {
        for action in host.drain() {
            match action {
                HostAction::Proceed(intent) => self.proceed(index, intent, ctx),
                HostAction::NavigateMain(url) => self.navigate_to(index, &url, ctx),
                HostAction::OpenNewTab(url) => self.open_tab(&url, ctx),
            }
        }
    }

    /// Carry out a navigation the coordinator declined to preview.
    fn proceed(&mut self, index: usize, intent: NavigationIntent, ctx: &egui::Context) {
        let base = match self.tabs.get(index) {
            Some(tab) => tab.coordinator.page_url().to_string(),
            None => return,
        };
        let resolve = |raw: &str| resolve_against(&base, raw).unwrap_or_else(|| raw.to_string());

        match intent {
            NavigationIntent::LinkClick { href, .. } => self.navigate_to(index, &resolve(&href), ctx),
            NavigationIntent::FormSubmit { action, .. } => {
                self.navigate_to(index, &resolve(&action), ctx)
            }
            NavigationIntent::ProgrammaticOpen { url: Some(url) } => self.open_tab(&resolve(&url), ctx),
            NavigationIntent::ProgrammaticOpen { url: None } => {
                log::debug!("Ignoring window open without a URL");
            }
            NavigationIntent::HistoryChange { kind, url: Some(url) } => {
                // Same-document change: record it without fetching
                let url = resolve(&url);
                if let Some(tab) = self.tabs.get_mut(index) {
                    record_history_change(&mut tab.history, &mut tab.history_idx, kind, &url);
                    tab.url_input = url;
                }
            }
            NavigationIntent::HistoryChange { url: None, .. } => {}
            NavigationIntent::PopState { url } => {
                if let Some(tab) = self.tabs.get_mut(index) {
                    tab.url_input = url;
                }
                self.load_current(index, ctx);
            }
        }
    }

    /// Open `url` in a new foreground tab.
    pub fn open_tab(&mut self, url: &str, ctx: &egui::Context) {
        let index = self.push_tab(url);
        log::info!("Opened {} in a new tab", url);
        self.navigate_to(index, url, ctx);
    }
}

/// Apply a same-document history change. A push drops forward entries and
/// appends; a replace overwrites the current entry in place.
fn record_history_change(history: &mut Vec<String>, idx: &mut usize, kind: HistoryKind, url: &str) {
    if kind == HistoryKind::Replace {
        if let Some(entry) = history.get_mut(*idx) {
            *entry = url.to_string();
            return;
        }
    }
    history.truncate(*idx + 1);
    history.push(url.to_string());
    *idx = history.len() - 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn push_drops_forward_entries() {
        let mut history = entries(&["https://a.test/1", "https://a.test/2", "https://a.test/3"]);
        let mut idx = 1;
        record_history_change(&mut history, &mut idx, HistoryKind::Push, "https://a.test/new");
        assert_eq!(history, entries(&["https://a.test/1", "https://a.test/2", "https://a.test/new"]));
        assert_eq!(idx, 2);
    }

    #[test]
    fn replace_overwrites_current_entry() {
        let mut history = entries(&["https://a.test/1", "https://a.test/2", "https://a.test/3"]);
        let mut idx = 1;
        record_history_change(&mut history, &mut idx, HistoryKind::Replace, "https://a.test/r");
        assert_eq!(history, entries(&["https://a.test/1", "https://a.test/r", "https://a.test/3"]));
        assert_eq!(idx, 1);
    }

    #[test]
    fn replace_on_empty_history_records_entry() {
        let mut history = Vec::new();
        let mut idx = 0;
        record_history_change(&mut history, &mut idx, HistoryKind::Replace, "https://a.test/");
        assert_eq!(history, entries(&["https://a.test/"]));
        assert_eq!(idx, 0);
    }
}
