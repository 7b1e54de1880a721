use crate::dom::{DomNode, DomTree, NodeId, NodeType};
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// Tags whose children should be stripped (invisible/script content)
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript", "svg", "template"];

/// Parse raw HTML into an arena `DomTree`.
pub fn parse_html(html: &str, url: &str) -> DomTree {
    let document = Html::parse_document(html);

    let title = extract_title(&document);

    let mut nodes = vec![DomNode {
        tag: "#document".into(),
        attributes: HashMap::new(),
        text: String::new(),
        parent: None,
        children: Vec::new(),
        node_type: NodeType::Document,
    }];
    let root = convert_element(document.root_element(), DomTree::ROOT, &mut nodes);
    nodes[DomTree::ROOT].children.push(root);

    DomTree::from_nodes(url.to_string(), title, nodes)
}

/// Text of the first `<title>`, trimmed. Empty when the page has none.
pub fn extract_title(document: &Html) -> String {
    scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn push_node(nodes: &mut Vec<DomNode>, node: DomNode) -> NodeId {
    nodes.push(node);
    nodes.len() - 1
}

fn convert_element(el: ElementRef<'_>, parent: NodeId, nodes: &mut Vec<DomNode>) -> NodeId {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: HashMap<String, String> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let skip_children = SKIP_CHILDREN.contains(&tag.as_str());
    let id = push_node(
        nodes,
        DomNode {
            tag,
            attributes,
            text: String::new(),
            parent: Some(parent),
            children: Vec::new(),
            node_type: NodeType::Element,
        },
    );
    if skip_children {
        return id;
    }

    for child_ref in el.children() {
        let child_id = match child_ref.value() {
            Node::Element(_) => match ElementRef::wrap(child_ref) {
                Some(child_el) => convert_element(child_el, id, nodes),
                None => continue,
            },
            Node::Text(t) => {
                let s = t.text.to_string();
                if s.trim().is_empty() {
                    continue;
                }
                push_node(
                    nodes,
                    DomNode {
                        tag: String::new(),
                        attributes: HashMap::new(),
                        text: s,
                        parent: Some(id),
                        children: Vec::new(),
                        node_type: NodeType::Text,
                    },
                )
            }
            _ => continue,
        };
        nodes[id].children.push(child_id);
    }

    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_html() {
        let html = r#"
        <html>
            <head><title>Test
                Page</title></head>
            <body>
                <h1>Hello</h1>
                <p>Content paragraph</p>
            </body>
        </html>
        "#;

        let tree = parse_html(html, "https://example.com");
        assert_eq!(tree.title, "Test Page");
        assert!(tree.node_count() > 4);
        assert!(tree.collect_text(DomTree::ROOT).contains("Content paragraph"));
    }

    #[test]
    fn strips_script_children() {
        let html = r#"
        <html><body>
            <p>Visible</p>
            <script>alert("hidden");</script>
        </body></html>
        "#;

        let tree = parse_html(html, "https://example.com");
        let text = tree.collect_text(DomTree::ROOT);
        assert!(text.contains("Visible"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn parents_are_linked() {
        let tree = parse_html("<p><em>x</em></p>", "https://example.com");
        for id in 1..tree.node_count() {
            let node = tree.node(id).unwrap();
            let parent = tree.node(node.parent.unwrap()).unwrap();
            assert!(parent.children.contains(&id));
        }
        assert_eq!(tree.title, "");
    }
}
