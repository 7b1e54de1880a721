//! `BrowserApp` — the top-level egui application state.
//!
//! This module declares the `BrowserApp` and `Tab` structs and the per-frame
//! update loop. The remaining methods are split across sibling sub-modules:
//!
//! - `navigation` — page loading, history, host actions
//! - `toolbar`    — tab strip, address bar and controls
//! - `content`    — main viewport rendering and click routing
//! - `overlay`    — the preview window
//! - `control`    — opt-out list side panel

pub mod content;
pub mod control;
pub mod navigation;
pub mod overlay;
pub mod toolbar;

use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use eframe::egui;

use link_peek::config::PreviewConfig;
use link_peek::control::ControlPanel;
use link_peek::engine::pipeline::{PageError, PageResult};
use link_peek::messaging::{HostChannel, TabId};
use link_peek::nav::coordinator::Coordinator;
use link_peek::nav::gesture::Key;
use link_peek::overlay::copy::{Clipboard, SystemClipboard};
use link_peek::overlay::frame::FrameLoader;
use link_peek::overlay::{PreviewOverlay, Theme, BLANK};
use link_peek::settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};

use crate::ui::{modifier_held, to_point};

// ─── Tab state ───────────────────────────────────────────────────────────────

/// One page context: its document, history and preview layer.
pub struct Tab {
    pub id: TabId,
    pub url_input: String,
    pub page: Option<PageResult>,
    pub error: Option<String>,
    pub loading: bool,
    pub fetch_rx: Option<mpsc::Receiver<Result<PageResult, PageError>>>,
    // History (back / forward)
    pub history: Vec<String>,
    pub history_idx: usize,
    // Preview layer
    pub coordinator: Coordinator,
    pub overlay: PreviewOverlay,
    pub frame_loader: FrameLoader,
    /// Coordinator revision at the last repaint request.
    pub seen_revision: u64,
}

impl Tab {
    fn title(&self) -> String {
        match &self.page {
            Some(page) if !page.dom.title.is_empty() => page.dom.title.clone(),
            Some(page) => page.dom.url.clone(),
            None if self.loading => "Loading...".to_string(),
            None => "New tab".to_string(),
        }
    }
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct BrowserApp {
    pub config: PreviewConfig,
    pub tabs: Vec<Tab>,
    pub active: usize,
    next_tab_id: TabId,
    pub channel: HostChannel,
    pub store: Arc<dyn SettingsStore>,
    pub clipboard: Arc<dyn Clipboard>,
    pub control: ControlPanel,
    pub add_url_input: String,
    pub show_control: bool,
    pub dark_mode: bool,
    /// Modifier state seen last frame, to turn egui's modifier snapshot
    /// into key down/up events.
    modifier_down: bool,
    window_focused: bool,
}

impl BrowserApp {
    pub fn new(config: PreviewConfig) -> Self {
        let store: Arc<dyn SettingsStore> = match JsonFileStore::open(config.storage_dir.as_deref()) {
            Some(store) => Arc::new(store),
            None => {
                log::warn!("No config directory available, settings will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        let channel = HostChannel::new();
        let control = ControlPanel::new(Arc::clone(&store), channel.clone(), config.feedback_duration);

        let mut app = Self {
            config,
            tabs: Vec::new(),
            active: 0,
            next_tab_id: 1,
            channel,
            store,
            clipboard: Arc::new(SystemClipboard),
            control,
            add_url_input: String::new(),
            show_control: true,
            dark_mode: false,
            modifier_down: false,
            window_focused: true,
        };
        app.push_tab("https://example.com");
        app
    }

    /// Settings as stored; read failures fall back to the defaults.
    pub fn settings(&self) -> Settings {
        self.store.get().unwrap_or_else(|e| {
            log::warn!("Could not read settings: {}", e);
            Settings::default()
        })
    }

    /// Create a tab with `url` in its address bar and make it active.
    fn push_tab(&mut self, url: &str) -> usize {
        let id = self.next_tab_id;
        self.next_tab_id += 1;

        let mut coordinator = Coordinator::for_page(BLANK, &self.settings(), self.config.clone());
        coordinator.attach(self.channel.connect(id));
        let mut overlay = PreviewOverlay::new(&self.config, Arc::clone(&self.clipboard));
        overlay.set_theme(self.theme());

        self.tabs.push(Tab {
            id,
            url_input: url.to_string(),
            page: None,
            error: None,
            loading: false,
            fetch_rx: None,
            history: Vec::new(),
            history_idx: 0,
            coordinator,
            overlay,
            frame_loader: FrameLoader::new(self.config.fetch_timeout),
            seen_revision: 0,
        });
        self.switch_tab(self.tabs.len() - 1);
        self.active
    }

    pub fn close_tab(&mut self, index: usize) {
        if self.tabs.len() <= 1 || index >= self.tabs.len() {
            return;
        }
        let tab = self.tabs.remove(index);
        self.channel.disconnect(tab.id);
        log::debug!("Closed tab {}", tab.id);
        let active = if self.active > index || self.active >= self.tabs.len() {
            self.active.saturating_sub(1)
        } else {
            self.active
        };
        self.active = active;
        self.switch_tab(active);
    }

    pub fn switch_tab(&mut self, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        // Modifier releases go to the focused tab only
        if let Some(prev) = self.tabs.get_mut(self.active) {
            if self.active != index {
                prev.coordinator.on_blur();
            }
        }
        self.active = index;
        self.modifier_down = false;
        let tab = &self.tabs[index];
        self.control.set_active_tab(tab.id, tab.coordinator.page_url());
    }

    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
        let theme = self.theme();
        for tab in &mut self.tabs {
            tab.overlay.set_theme(theme);
        }
    }

    /// Feed this frame's keyboard, focus and pointer input to the active
    /// tab's coordinator.
    fn route_input(&mut self, ctx: &egui::Context) {
        let modifier = self.config.modifier;
        let (held, escape, focused, pressed_at) = ctx.input(|i| {
            (
                modifier_held(&i.modifiers, modifier),
                i.key_pressed(egui::Key::Escape),
                i.focused,
                if i.pointer.any_pressed() {
                    i.pointer.interact_pos()
                } else {
                    None
                },
            )
        });

        let Some(tab) = self.tabs.get_mut(self.active) else {
            return;
        };

        if focused != self.window_focused {
            self.window_focused = focused;
            if !focused {
                tab.coordinator.on_blur();
                self.modifier_down = false;
            }
        }

        if held != self.modifier_down {
            self.modifier_down = held;
            if held {
                tab.coordinator.on_key_down(modifier);
            } else {
                tab.coordinator.on_key_up(modifier);
            }
        }

        if escape {
            tab.coordinator.on_key_down(Key::Escape);
        }

        if let Some(pos) = pressed_at {
            tab.coordinator
                .on_pointer_down(to_point(pos), tab.overlay.bounds());
        }
    }

    /// Drive every tab's background work: page fetches, host messages,
    /// frame loads and the copy indicator.
    fn poll_tabs(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let mut busy = false;
        let mut changed = false;

        for index in 0..self.tabs.len() {
            self.check_fetch(index);

            let tab = &mut self.tabs[index];
            tab.coordinator.pump_host_messages();

            if let Some(request) = tab.overlay.sync(tab.coordinator.state()) {
                tab.frame_loader.start(request);
            } else if !tab.coordinator.state().is_open() && tab.frame_loader.is_loading() {
                tab.frame_loader.cancel();
            }

            if let Some(report) = tab.frame_loader.poll() {
                if let Some(request) = tab.overlay.on_frame_report(report) {
                    let mut host = link_peek::nav::host::QueuedHost::new();
                    tab.coordinator.apply(request, &mut host);
                }
            }

            tab.overlay.poll(now);
            if let Some(left) = tab.overlay.copy_indicator().revert_in(now) {
                ctx.request_repaint_after(left);
            }

            changed |= revision_changed(&mut tab.seen_revision, tab.coordinator.revision());
            busy |= tab.loading || tab.frame_loader.is_loading() || !tab.overlay.copy_enabled();
        }

        if let Some(left) = self.control.poll(now) {
            ctx.request_repaint_after(left);
        }
        if changed {
            ctx.request_repaint();
        } else if busy {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

/// Record `current` as seen; `true` when it differs from the last value.
fn revision_changed(seen: &mut u64, current: u64) -> bool {
    if *seen == current {
        return false;
    }
    *seen = current;
    true
}

impl eframe::App for BrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_tabs(ctx);
        self.route_input(ctx);

        // Apply dark/light visuals
        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        if let Some(tab) = self.tabs.get(self.active) {
            let id = tab.id;
            let url = tab.coordinator.page_url().to_string();
            self.control.set_active_tab(id, url);
        }

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, ctx);
        });

        // Opt-out list side panel
        if self.show_control {
            egui::SidePanel::right("control")
                .default_width(260.0)
                .show(ctx, |ui| {
                    self.draw_control_panel(ui);
                });
        }

        // Main content area
        let ctx_clone = ctx.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_content(ui, &ctx_clone);
        });

        self.draw_overlay(ctx);
    }
}
