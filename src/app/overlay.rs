//! Preview window for `BrowserApp`.
//!
//! Draws the active tab's preview overlay as an egui window over the
//! content panel. The window can be dragged; its last drawn rect feeds
//! outside-click detection. Nothing is drawn while the coordinator reports the
//! preview closed.

use eframe::egui;

use link_peek::dom::DomTree;
use link_peek::nav::host::QueuedHost;
use link_peek::overlay::copy::CopyState;
use link_peek::overlay::OverlayAction;

use crate::ui::{render_dom, to_rect, truncate_str};

use super::BrowserApp;

impl BrowserApp {
    pub fn draw_overlay(&mut self, ctx: &egui::Context) {
        let index = self.active;
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        let state = tab.coordinator.state();
        let Some(target) = state.visible_target() else {
            return;
        };

        let screen = ctx.screen_rect();
        let rect = egui::Rect::from_center_size(screen.center(), screen.size() * egui::vec2(0.8, 0.8));
        let heading = state
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| target.to_string());
        let loading = state.is_loading();
        let copy_state = tab.overlay.copy_state();
        let copy_enabled = tab.overlay.copy_enabled();

        let mut action = None;
        let mut followed = None;

        let shown = egui::Window::new("link_preview")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .movable(true)
            .default_rect(rect)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if loading {
                        ui.spinner();
                    }
                    ui.label(egui::RichText::new(truncate_str(&heading, 60)).strong())
                        .on_hover_text(target);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("\u{2715}").on_hover_text("Close").clicked() {
                            action = Some(OverlayAction::Close);
                        }
                        let copy_label = match copy_state {
                            CopyState::Idle => "\u{1F517}",
                            CopyState::Loading => "\u{2026}",
                            CopyState::Success => "\u{2714}",
                        };
                        if ui
                            .add_enabled(copy_enabled, egui::Button::new(copy_label))
                            .on_hover_text("Copy link")
                            .clicked()
                        {
                            action = Some(OverlayAction::CopyLink);
                        }
                        if ui.button("\u{2197}").on_hover_text("Open in new tab").clicked() {
                            action = Some(OverlayAction::OpenInNewTab);
                        }
                        if ui.button("\u{2922}").on_hover_text("Open here").clicked() {
                            action = Some(OverlayAction::Expand);
                        }
                    });
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        if let Some(error) = tab.overlay.frame_error() {
                            ui.colored_label(
                                egui::Color32::GRAY,
                                format!("Preview unavailable: {}", error),
                            );
                        } else if let Some(document) = tab.overlay.document() {
                            let mut clicked = None;
                            render_dom(ui, document, DomTree::ROOT, &mut clicked);
                            followed = clicked
                                .and_then(|click| document.closest_anchor(click.node))
                                .map(|anchor| anchor.href);
                        }
                    });
            });

        if let Some(shown) = shown {
            tab.overlay.set_bounds(to_rect(shown.response.rect));
        }

        if let Some(href) = followed {
            if let Some(request) = tab.overlay.follow_link(&href) {
                tab.frame_loader.start(request);
            }
        }

        if let Some(action) = action {
            let request = tab.overlay.act(action, tab.coordinator.state());
            if let Some(request) = request {
                let mut host = QueuedHost::new();
                tab.coordinator.apply(request, &mut host);
                self.apply_host_actions(index, host, ctx);
            }
        }
    }
}
