pub mod parser;

use std::collections::HashMap;

/// Index of a node inside its `DomTree`.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// Arena DOM node. Unlike a plain tree, every node knows its parent so
/// event targets can be walked up to the element that owns the behaviour.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn is_element(&self, tag: &str) -> bool {
        self.node_type == NodeType::Element && self.tag == tag
    }
}

/// A clickable link resolved against the page URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub node: NodeId,
    pub href: String,
    pub text: String,
}

/// A submittable form with its resolved action URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub node: NodeId,
    pub action: String,
}

/// Parsed document with metadata
#[derive(Debug, Clone)]
pub struct DomTree {
    pub url: String,
    pub title: String,
    nodes: Vec<DomNode>,
}

impl DomTree {
    pub(crate) fn from_nodes(url: String, title: String, nodes: Vec<DomNode>) -> Self {
        Self { url, title, nodes }
    }

    pub const ROOT: NodeId = 0;

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `id` followed by each of its ancestors up to the document.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// Nearest element named `tag` at or above `id`.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&n| self.nodes[n].is_element(tag))
    }

    /// Walk up from an event target to the nearest anchor with an href.
    pub fn closest_anchor(&self, target: NodeId) -> Option<Anchor> {
        let id = self
            .ancestors(target)
            .find(|&n| self.nodes[n].is_element("a") && self.nodes[n].attr("href").is_some())?;
        self.anchor(id)
    }

    /// Walk up from an event target to the enclosing form.
    pub fn closest_form(&self, target: NodeId) -> Option<Form> {
        let id = self.closest(target, "form")?;
        self.form(id)
    }

    fn anchor(&self, id: NodeId) -> Option<Anchor> {
        let href = self.nodes[id].attr("href")?;
        Some(Anchor {
            node: id,
            href: resolve_href(&self.url, href),
            text: self.collect_text(id),
        })
    }

    fn form(&self, id: NodeId) -> Option<Form> {
        let node = self.node(id)?;
        // An empty or missing action submits to the document itself
        let action = match node.attr("action").map(str::trim) {
            Some(a) if !a.is_empty() => resolve_href(&self.url, a),
            _ => self.url.clone(),
        };
        Some(Form { node: id, action })
    }

    /// All anchors with an href, in document order.
    pub fn links(&self) -> Vec<Anchor> {
        (0..self.nodes.len())
            .filter(|&n| self.nodes[n].is_element("a"))
            .filter_map(|n| self.anchor(n))
            .collect()
    }

    /// All forms, in document order.
    pub fn forms(&self) -> Vec<Form> {
        (0..self.nodes.len())
            .filter(|&n| self.nodes[n].is_element("form"))
            .filter_map(|n| self.form(n))
            .collect()
    }

    /// Whitespace-normalised text content of a subtree.
    pub fn collect_text(&self, id: NodeId) -> String {
        let mut buf = String::new();
        self.collect_text_inner(id, &mut buf);
        buf
    }

    fn collect_text_inner(&self, id: NodeId, buf: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        let trimmed = node.text.trim();
        if !trimmed.is_empty() {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(trimmed);
        }
        for &child in &node.children {
            self.collect_text_inner(child, buf);
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.nodes.get(current).and_then(|n| n.parent);
        Some(current)
    }
}

/// Resolve an href the way a browser's `anchor.href` does; unresolvable
/// values are returned unchanged so the classifier can reject them.
pub fn resolve_href(base: &str, href: &str) -> String {
    let href = href.trim();
    match url::Url::parse(base).and_then(|b| b.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}
