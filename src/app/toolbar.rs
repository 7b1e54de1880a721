//! Toolbar rendering for `BrowserApp`.
//!
//! Draws the tab strip, back/forward buttons, address bar, dark-mode toggle
//! and the control panel toggle.

use eframe::egui;

use crate::ui::truncate_str;

use super::BrowserApp;

impl BrowserApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        self.draw_tab_strip(ui, ctx);

        ui.horizontal(|ui| {
            ui.add_space(4.0);

            let Some(tab) = self.tabs.get(self.active) else {
                return;
            };

            // Back / Forward
            let can_back = tab.history_idx > 0;
            let can_fwd = tab.history_idx + 1 < tab.history.len();
            if ui
                .add_enabled(
                    can_back,
                    egui::Button::new("\u{25C0}").min_size(egui::vec2(28.0, 24.0)),
                )
                .clicked()
            {
                self.go_back(ctx);
            }
            if ui
                .add_enabled(
                    can_fwd,
                    egui::Button::new("\u{25B6}").min_size(egui::vec2(28.0, 24.0)),
                )
                .clicked()
            {
                self.go_forward(ctx);
            }

            // URL bar
            let Some(tab) = self.tabs.get_mut(self.active) else {
                return;
            };
            let response = ui.add_sized(
                [ui.available_width() - 160.0, 24.0],
                egui::TextEdit::singleline(&mut tab.url_input)
                    .hint_text("Enter URL...")
                    .font(egui::TextStyle::Monospace),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.navigate(ctx);
            }

            if ui.button("Go").clicked() {
                self.navigate(ctx);
            }

            ui.toggle_value(&mut self.show_control, "Sites");

            // Dark mode toggle
            let dark_label = if self.dark_mode { "\u{263E}" } else { "\u{2600}" };
            if ui.button(dark_label).clicked() {
                self.set_dark_mode(!self.dark_mode);
            }
        });
    }

    fn draw_tab_strip(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mut switch_to = None;
        let mut close = None;
        let mut new_tab = false;
        let closable = self.tabs.len() > 1;

        ui.horizontal(|ui| {
            for (index, tab) in self.tabs.iter().enumerate() {
                let mut label = truncate_str(&tab.title(), 24);
                if tab.coordinator.state().is_open() {
                    label.push_str(" \u{25A3}");
                }
                if ui.selectable_label(index == self.active, label).clicked() {
                    switch_to = Some(index);
                }
                if closable && ui.small_button("\u{2715}").clicked() {
                    close = Some(index);
                }
            }
            new_tab = ui.button("+").clicked();
        });

        if new_tab {
            let index = self.push_tab("");
            log::debug!("New empty tab at {}", index);
        } else if let Some(index) = close {
            self.close_tab(index);
        } else if let Some(index) = switch_to {
            self.switch_tab(index);
            ctx.request_repaint();
        }
    }
}
