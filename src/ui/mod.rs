//! Generic egui UI helper functions.
//!
//! Stateless functions that draw a `DomTree` with egui widgets, plus the
//! small conversions between egui geometry/input and the library types.

use eframe::egui;
use link_peek::dom::{DomTree, NodeId, NodeType};
use link_peek::nav::gesture::Key;
use link_peek::nav::{Point, Rect};

/// A click on a rendered node.
#[derive(Debug, Clone, Copy)]
pub struct ClickedNode {
    pub node: NodeId,
    pub point: Point,
    /// Middle click or Ctrl/Cmd click.
    pub new_tab: bool,
}

const LINK_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 100, 200);

// ─── DOM rendering ────────────────────────────────────────────────────────────

/// Recursively render the subtree at `id` using egui widgets.
pub fn render_dom(ui: &mut egui::Ui, tree: &DomTree, id: NodeId, clicked: &mut Option<ClickedNode>) {
    let Some(node) = tree.node(id) else {
        return;
    };

    match node.node_type {
        NodeType::Text => {
            let text = node.text.trim();
            if !text.is_empty() {
                ui.label(text);
            }
            return;
        }
        NodeType::Document => {
            render_children(ui, tree, id, clicked);
            return;
        }
        NodeType::Element => {}
    }

    match node.tag.as_str() {
        "head" | "title" | "meta" | "link" => {}
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let text = tree.collect_text(id);
            if !text.is_empty() {
                let size = match node.tag.as_str() {
                    "h1" => 28.0,
                    "h2" => 22.0,
                    _ => 18.0,
                };
                ui.heading(egui::RichText::new(text).size(size).strong());
                ui.add_space(6.0);
            }
        }
        "p" => {
            ui.horizontal_wrapped(|ui| render_children(ui, tree, id, clicked));
            ui.add_space(8.0);
        }
        "li" => {
            ui.horizontal_wrapped(|ui| {
                ui.label("  \u{2022}");
                render_children(ui, tree, id, clicked);
            });
        }
        "a" => {
            let text = tree.collect_text(id);
            let label = if text.is_empty() {
                node.attr("href").unwrap_or_default().to_string()
            } else {
                text
            };
            let rt = egui::RichText::new(label).color(LINK_COLOR).underline();
            let link = ui.add(egui::Label::new(rt).sense(egui::Sense::click()));
            record_click(ui, &link, id, clicked);
            let link = link.on_hover_cursor(egui::CursorIcon::PointingHand);
            if let Some(href) = node.attr("href") {
                link.on_hover_text(href);
            }
        }
        "button" => {
            let text = tree.collect_text(id);
            let button = ui.button(if text.is_empty() { "Submit".to_string() } else { text });
            record_click(ui, &button, id, clicked);
        }
        "input" => match node.attr("type").unwrap_or("text") {
            "submit" | "image" => {
                let button = ui.button(node.attr("value").unwrap_or("Submit"));
                record_click(ui, &button, id, clicked);
            }
            "hidden" => {}
            _ => {
                let hint = node
                    .attr("placeholder")
                    .or_else(|| node.attr("name"))
                    .unwrap_or("input");
                ui.colored_label(egui::Color32::GRAY, format!("[{}]", hint));
            }
        },
        "hr" => {
            ui.separator();
        }
        "br" => {
            ui.add_space(4.0);
        }
        "img" => {
            let alt = node.attr("alt").filter(|a| !a.trim().is_empty()).unwrap_or("Image");
            ui.colored_label(egui::Color32::GRAY, format!("[{}]", alt));
        }
        _ => render_children(ui, tree, id, clicked),
    }
}

fn render_children(ui: &mut egui::Ui, tree: &DomTree, id: NodeId, clicked: &mut Option<ClickedNode>) {
    if let Some(node) = tree.node(id) {
        for &child in &node.children {
            render_dom(ui, tree, child, clicked);
        }
    }
}

fn record_click(ui: &egui::Ui, response: &egui::Response, id: NodeId, clicked: &mut Option<ClickedNode>) {
    let primary = response.clicked();
    let middle = response.middle_clicked();
    if !primary && !middle {
        return;
    }
    let point = response
        .interact_pointer_pos()
        .map(to_point)
        .unwrap_or_default();
    let command = ui.input(|i| i.modifiers.command);
    *clicked = Some(ClickedNode {
        node: id,
        point,
        new_tab: middle || command,
    });
}

// ─── Conversions ──────────────────────────────────────────────────────────────

pub fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x, pos.y)
}

pub fn to_rect(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

/// Whether the gesture modifier is held according to egui's modifier state.
pub fn modifier_held(modifiers: &egui::Modifiers, key: Key) -> bool {
    match key {
        Key::Shift => modifiers.shift,
        Key::Alt => modifiers.alt,
        Key::Control => modifiers.ctrl,
        Key::Escape | Key::Other => false,
    }
}

// ─── Text utilities ───────────────────────────────────────────────────────────

/// Truncate `s` to at most `max_chars` Unicode scalar values, appending `"..."` if truncated.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let t: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", t)
    }
}
