//! DOM tree data structures.
//!
//! Nodes live in a `Vec`-backed arena owned by [`Dom`] and are addressed by
//! [`NodeId`]. Ownership runs top-down through each node's child list; the
//! `parent` link is a plain index and never implies ownership.

use std::collections::BTreeMap;
use std::fmt;

/// ID used to address nodes in the DOM arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload: tag, ordered attributes and interactive state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub is_focused: bool,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `name`, replacing an earlier value in place so attribute order is kept.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }
}

/// The payload that distinguishes element and text nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

/// Computed style map (property name to resolved value).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    props: BTreeMap<String, String>,
}

impl ComputedStyle {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.props.get(property).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, property: &str, fallback: &'a str) -> &'a str {
        self.get(property).unwrap_or(fallback)
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.props.insert(property.into(), value.into());
    }

    pub fn clear(&mut self) {
        self.props.clear();
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// A single node in the DOM tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub style: ComputedStyle,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            style: ComputedStyle::default(),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    pub fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.element().map(|element| element.tag.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }
}

/// Node arena. Nodes are never freed individually; a navigation replaces the whole `Dom`.
#[derive(Debug, Clone, Default)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a detached element; the tag name is lowercased.
    pub fn create_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push(Node::new(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs,
            is_focused: false,
        })))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::new(NodeData::Text(text.into())))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Appends `child` as the last child of `parent` and points its parent link back.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Swaps the children of `parent` for `children`, fixing every parent link.
    ///
    /// The previous children are detached but stay in the arena.
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        let old = std::mem::take(&mut self.nodes[parent.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        for child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children = children;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            dom: self,
            next: self.parent(id),
        }
    }

    /// `id` and everything below it, in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes[id.0].element()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].tag()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    /// Writes an attribute on an element; text nodes are left untouched.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let NodeData::Element(element) = &mut self.nodes[id.0].data {
            element.set_attribute(name, value);
        }
    }

    pub fn is_focused(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|element| element.is_focused)
    }

    pub fn set_focused(&mut self, id: NodeId, focused: bool) {
        if let NodeData::Element(element) = &mut self.nodes[id.0].data {
            element.is_focused = focused;
        }
    }

    /// Concatenated raw text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.nodes[node.0].text())
            .collect()
    }

    pub fn style(&self, id: NodeId) -> &ComputedStyle {
        &self.nodes[id.0].style
    }

    pub fn style_mut(&mut self, id: NodeId) -> &mut ComputedStyle {
        &mut self.nodes[id.0].style
    }
}

/// Iterator over a node's parent chain.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.dom.parent(current);
        Some(current)
    }
}

/// A parsed document: the arena plus its single root element.
#[derive(Debug, Clone)]
pub struct Document {
    pub dom: Dom,
    pub root: NodeId,
}

impl Document {
    pub fn new(dom: Dom, root: NodeId) -> Self {
        Self { dom, root }
    }

    /// Collapsed text of the first `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        let title = self
            .dom
            .descendants(self.root)
            .into_iter()
            .find(|id| self.dom.tag(*id) == Some("title"))?;

        let collapsed = self
            .dom
            .text_content(title)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }

    pub fn node_count(&self) -> usize {
        self.dom.descendants(self.root).len()
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use super::Dom;

    fn sample() -> (Dom, [super::NodeId; 4]) {
        let mut dom = Dom::new();
        let div = dom.create_element("DIV", Vec::new());
        let p = dom.create_element("p", vec![("class".to_owned(), "x".to_owned())]);
        let text = dom.create_text("hello ");
        let more = dom.create_text("world");
        dom.append_child(div, p);
        dom.append_child(p, text);
        dom.append_child(p, more);
        (dom, [div, p, text, more])
    }

    #[test]
    fn lowercases_tags_and_links_parents() {
        let (dom, [div, p, text, _]) = sample();
        assert_eq!(dom.tag(div), Some("div"));
        assert_eq!(dom.parent(p), Some(div));
        assert_eq!(dom.parent(text), Some(p));
        assert_eq!(dom.ancestors(text).collect::<Vec<_>>(), vec![p, div]);
    }

    #[test]
    fn descendants_are_pre_order() {
        let (dom, [div, p, text, more]) = sample();
        assert_eq!(dom.descendants(div), vec![div, p, text, more]);
        assert_eq!(dom.text_content(div), "hello world");
    }

    #[test]
    fn set_attribute_is_last_wins_and_keeps_order() {
        let (mut dom, [_, p, _, _]) = sample();
        dom.set_attribute(p, "id", "first");
        dom.set_attribute(p, "class", "y");
        let attrs = &dom.element(p).map(|el| el.attrs.clone()).unwrap_or_default();
        assert_eq!(
            attrs,
            &vec![
                ("class".to_owned(), "y".to_owned()),
                ("id".to_owned(), "first".to_owned()),
            ]
        );
    }

    #[test]
    fn replace_children_detaches_and_relinks() {
        let (mut dom, [div, p, _, _]) = sample();
        let span = dom.create_element("span", Vec::new());
        dom.replace_children(div, vec![span]);
        assert_eq!(dom.children(div), &[span]);
        assert_eq!(dom.parent(span), Some(div));
        assert_eq!(dom.parent(p), None);
    }

    #[test]
    fn focus_is_element_only() {
        let (mut dom, [_, p, text, _]) = sample();
        dom.set_focused(p, true);
        dom.set_focused(text, true);
        assert!(dom.is_focused(p));
        assert!(!dom.is_focused(text));
    }

    #[test]
    fn document_title_is_collapsed() {
        let mut dom = Dom::new();
        let html = dom.create_element("html", Vec::new());
        let title = dom.create_element("title", Vec::new());
        let text = dom.create_text("  Lantern \n test ");
        dom.append_child(html, title);
        dom.append_child(title, text);
        let doc = Document::new(dom, html);
        assert_eq!(doc.title().as_deref(), Some("Lantern test"));
        assert_eq!(doc.node_count(), 3);
    }
}
