//! Navigation interception.
//!
//! - `classify`    — pure eligibility predicate
//! - `gesture`     — modifier-key tracking
//! - `coordinator` — preview state machine fed by `NavigationIntent`s
//! - `host`        — the seam through which allowed navigations proceed

pub mod classify;
pub mod coordinator;
pub mod gesture;
pub mod host;

/// Screen position of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Push,
    Replace,
}

/// One attempt by the page or the user to leave the current document.
///
/// Hosts build these from their own events and hand them to the
/// coordinator, which decides between opening a preview and letting the
/// navigation go through.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationIntent {
    /// Click that resolved to the nearest ancestor anchor.
    LinkClick {
        href: String,
        text: Option<String>,
        point: Point,
    },
    /// Form submission; `action` is already resolved to an absolute URL.
    FormSubmit { action: String, point: Point },
    /// Script call to open a window. `url` may be relative or missing.
    ProgrammaticOpen { url: Option<String> },
    /// Client-side router push/replace. `url` may be relative or missing.
    HistoryChange {
        kind: HistoryKind,
        url: Option<String>,
    },
    /// Back/forward traversal to `url`.
    PopState { url: String },
}

impl NavigationIntent {
    /// Raw target as supplied by the host, before resolution.
    pub fn raw_target(&self) -> Option<&str> {
        match self {
            NavigationIntent::LinkClick { href, .. } => Some(href),
            NavigationIntent::FormSubmit { action, .. } => Some(action),
            NavigationIntent::ProgrammaticOpen { url } => url.as_deref(),
            NavigationIntent::HistoryChange { url, .. } => url.as_deref(),
            NavigationIntent::PopState { url } => Some(url),
        }
    }

    /// Best title hint available before the target loads.
    pub fn title_hint(&self) -> Option<String> {
        match self {
            NavigationIntent::LinkClick { text: Some(t), .. } => {
                let t = t.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            _ => None,
        }
    }

    /// Pointer position that triggered the intent, if any.
    pub fn point(&self) -> Option<Point> {
        match self {
            NavigationIntent::LinkClick { point, .. } | NavigationIntent::FormSubmit { point, .. } => {
                Some(*point)
            }
            _ => None,
        }
    }

    pub fn is_history(&self) -> bool {
        matches!(
            self,
            NavigationIntent::HistoryChange { .. } | NavigationIntent::PopState { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            NavigationIntent::LinkClick { .. } => "link",
            NavigationIntent::FormSubmit { .. } => "submit",
            NavigationIntent::ProgrammaticOpen { .. } => "open",
            NavigationIntent::HistoryChange { kind: HistoryKind::Push, .. } => "pushState",
            NavigationIntent::HistoryChange { kind: HistoryKind::Replace, .. } => "replaceState",
            NavigationIntent::PopState { .. } => "popstate",
        }
    }
}
