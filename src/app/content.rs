//! Main viewport rendering for `BrowserApp`.
//!
//! Draws the active tab's document and turns clicks on it into
//! `NavigationIntent`s for the tab's coordinator.

use eframe::egui;

use link_peek::dom::DomTree;
use link_peek::nav::NavigationIntent;

use crate::ui::{render_dom, truncate_str, ClickedNode};

use super::BrowserApp;

impl BrowserApp {
    /// Render the central content panel for the active tab.
    pub fn draw_content(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let index = self.active;
        let Some(tab) = self.tabs.get(index) else {
            return;
        };

        if tab.loading {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return;
        }

        if let Some(error) = &tab.error {
            ui.colored_label(egui::Color32::from_rgb(200, 60, 60), format!("Error: {}", error));
            return;
        }

        let Some(page) = &tab.page else {
            ui.centered_and_justified(|ui| {
                ui.label("Enter a URL and press Go. Hold Shift while clicking a link to preview it.");
            });
            return;
        };

        let state = tab.coordinator.state();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(truncate_str(&page.dom.title, 80)).strong());
            ui.weak(page_summary(&page.dom));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (text, color) = if !state.interception_enabled() {
                    ("Previews off", egui::Color32::GRAY)
                } else if state.gesture_active() {
                    ("Preview armed", egui::Color32::from_rgb(0, 160, 80))
                } else {
                    ("Shift+click to preview", egui::Color32::GRAY)
                };
                ui.colored_label(color, text);
            });
        });
        ui.separator();

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .enable_scrolling(!tab.overlay.scroll_locked(state))
            .show(ui, |ui| {
                render_dom(ui, &page.dom, DomTree::ROOT, &mut clicked);
            });

        if let Some(click) = clicked {
            if let Some(intent) = intent_for_click(&page.dom, click) {
                self.dispatch(index, intent, ctx);
            }
        }
    }
}

/// Link and form counts shown next to the page title.
fn page_summary(tree: &DomTree) -> String {
    let links = tree.links().len();
    let forms = tree.forms().len();
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    format!("{} link{} \u{b7} {} form{}", links, plural(links), forms, plural(forms))
}

/// Walk from the clicked node to the nearest anchor or form and build the
/// matching intent. Middle or Ctrl/Cmd clicks on links become window opens.
fn intent_for_click(tree: &DomTree, click: ClickedNode) -> Option<NavigationIntent> {
    if let Some(anchor) = tree.closest_anchor(click.node) {
        if click.new_tab {
            return Some(NavigationIntent::ProgrammaticOpen {
                url: Some(anchor.href),
            });
        }
        return Some(NavigationIntent::LinkClick {
            href: anchor.href,
            text: Some(anchor.text),
            point: click.point,
        });
    }
    tree.closest_form(click.node).map(|form| NavigationIntent::FormSubmit {
        action: form.action,
        point: click.point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use link_peek::dom::parser::parse_html;
    use link_peek::nav::Point;

    fn find(tree: &DomTree, tag: &str) -> usize {
        (0..tree.node_count())
            .find(|&id| tree.node(id).map_or(false, |n| n.is_element(tag)))
            .unwrap()
    }

    #[test]
    fn click_inside_anchor_becomes_link_click() {
        let tree = parse_html(
            "<p><a href='/x'><span>B Site</span></a></p>",
            "https://a.test/page",
        );
        let click = ClickedNode {
            node: find(&tree, "span"),
            point: Point::new(2.0, 3.0),
            new_tab: false,
        };
        assert_eq!(
            intent_for_click(&tree, click),
            Some(NavigationIntent::LinkClick {
                href: "https://a.test/x".into(),
                text: Some("B Site".into()),
                point: Point::new(2.0, 3.0),
            })
        );
    }

    #[test]
    fn new_tab_click_becomes_window_open() {
        let tree = parse_html("<a href='https://b.test/'>B</a>", "https://a.test/");
        let click = ClickedNode {
            node: find(&tree, "a"),
            point: Point::default(),
            new_tab: true,
        };
        assert_eq!(
            intent_for_click(&tree, click),
            Some(NavigationIntent::ProgrammaticOpen {
                url: Some("https://b.test/".into())
            })
        );
    }

    #[test]
    fn summary_counts_links_and_forms() {
        let tree = parse_html(
            "<a href='/x'>X</a><a>no href</a><form action='/s'></form>",
            "https://a.test/page",
        );
        assert_eq!(page_summary(&tree), "1 link \u{b7} 1 form");
        let no_forms = parse_html("<p>hi</p><a href='/a'>A</a><a href='/b'>B</a>", "https://a.test/");
        assert_eq!(page_summary(&no_forms), "2 links \u{b7} 0 forms");
    }

    #[test]
    fn submit_button_becomes_form_submit() {
        let tree = parse_html(
            "<form action='/search'><button>Go</button></form>",
            "https://a.test/page",
        );
        let click = ClickedNode {
            node: find(&tree, "button"),
            point: Point::default(),
            new_tab: false,
        };
        assert_eq!(
            intent_for_click(&tree, click),
            Some(NavigationIntent::FormSubmit {
                action: "https://a.test/search".into(),
                point: Point::default(),
            })
        );
    }
}
