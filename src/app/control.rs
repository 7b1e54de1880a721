//! Opt-out list side panel for `BrowserApp`.

use std::time::Instant;

use eframe::egui;

use link_peek::control::FeedbackKind;

use crate::ui::truncate_str;

use super::BrowserApp;

impl BrowserApp {
    pub fn draw_control_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Link previews");
        ui.add_space(4.0);

        match self.control.current_key() {
            Some(key) => {
                ui.label(egui::RichText::new(truncate_str(&key, 40)).monospace())
                    .on_hover_text(&key);
                let disabled = self.control.is_current_disabled();
                let label = if disabled {
                    "Enable on this page"
                } else {
                    "Disable on this page"
                };
                if ui.button(label).clicked() {
                    // Errors already surface as panel feedback
                    let _ = self.control.toggle_current();
                }
            }
            None => {
                ui.colored_label(egui::Color32::GRAY, "No page loaded");
            }
        }

        ui.separator();
        ui.label("Disabled on:");
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.add_url_input)
                    .hint_text("https://...")
                    .desired_width(ui.available_width() - 48.0),
            );
            let submit = (response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)))
                | ui.button("Add").clicked();
            if submit && self.control.add_url(&self.add_url_input).is_ok() {
                self.add_url_input.clear();
            }
        });

        let mut remove = None;
        let mut copy = None;
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .show(ui, |ui| {
                let list = self.control.url_list();
                if list.is_empty() {
                    ui.colored_label(egui::Color32::GRAY, "Previews are on everywhere");
                }
                for url in list {
                    ui.horizontal(|ui| {
                        if ui.small_button("\u{2715}").on_hover_text("Remove").clicked() {
                            remove = Some(url.clone());
                        }
                        if ui.small_button("\u{1F4CB}").on_hover_text("Copy").clicked() {
                            copy = Some(url.clone());
                        }
                        ui.label(truncate_str(&url, 32)).on_hover_text(&url);
                    });
                }
            });

        if let Some(url) = remove {
            let _ = self.control.remove_url(&url);
        }
        if let Some(url) = copy {
            let _ = self.control.copy_url(&url, self.clipboard.as_ref());
        }

        if let Some(feedback) = self.control.feedback(Instant::now()) {
            let color = match feedback.kind {
                FeedbackKind::Success => egui::Color32::from_rgb(0, 160, 80),
                FeedbackKind::Error => egui::Color32::from_rgb(200, 60, 60),
            };
            ui.add_space(4.0);
            ui.colored_label(color, &feedback.message);
        }
    }
}
