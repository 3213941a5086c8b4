//! HTML tokenization and tree construction.
//!
//! The parser is a character scanner, not a standards tokenizer: text outside
//! `<...>` accumulates into a buffer and each `<...>` span is read as one tag.
//! It never fails. Missing structure (`html`, `head`, `body`) is synthesized
//! and unbalanced tags are repaired, so every input yields a single `html` root.

use ln_dom::Document;
use ln_dom::Dom;
use ln_dom::NodeId;

/// Elements that never take children, whether or not they are written as `<x/>`.
pub const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements that belong in `<head>` when they appear before any body content.
pub const HEAD_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "noscript", "link", "meta", "title", "style", "script",
];

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let mut dom = Dom::new();
        let root = self.parse_into(&mut dom, input);
        let document = Document::new(dom, root);
        log::debug!("parsed document: {} nodes", document.node_count());
        document
    }

    /// Builds the tree for `input` inside an existing arena and returns its root.
    pub fn parse_into(&self, dom: &mut Dom, input: &str) -> NodeId {
        TreeBuilder::new(dom).run(input)
    }

    /// Parses `input` as body content and returns the resulting top-level
    /// nodes, detached and ready to be spliced under another element.
    pub fn parse_fragment(&self, dom: &mut Dom, input: &str) -> Vec<NodeId> {
        let wrapped = format!("<html><body>{input}</body></html>");
        let root = self.parse_into(dom, &wrapped);

        let body = dom
            .children(root)
            .iter()
            .copied()
            .find(|child| dom.tag(*child) == Some("body"));

        match body {
            Some(body) => {
                let nodes = dom.children(body).to_vec();
                dom.replace_children(body, Vec::new());
                nodes
            }
            None => Vec::new(),
        }
    }
}

/// What the implicit-tag pass decided to synthesize next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Implicit {
    Open(&'static str),
    CloseHead,
}

struct TreeBuilder<'a> {
    dom: &'a mut Dom,
    unfinished: Vec<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    fn new(dom: &'a mut Dom) -> Self {
        Self {
            dom,
            unfinished: Vec::new(),
        }
    }

    fn run(mut self, input: &str) -> NodeId {
        let mut buffer = String::new();
        let mut in_tag = false;

        for ch in input.chars() {
            match ch {
                '<' => {
                    // An unterminated tag is abandoned when the next one starts.
                    if !in_tag && !buffer.is_empty() {
                        self.add_text(&buffer);
                    }
                    buffer.clear();
                    in_tag = true;
                }
                '>' if in_tag => {
                    self.add_tag(&buffer);
                    buffer.clear();
                    in_tag = false;
                }
                _ => buffer.push(ch),
            }
        }

        if !in_tag && !buffer.is_empty() {
            self.add_text(&buffer);
        }

        self.finish()
    }

    fn add_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        self.implicit_tags(None);
        let node = self.dom.create_text(text);
        self.attach_to_current(node);
    }

    fn add_tag(&mut self, raw: &str) {
        let Some((tag, attrs)) = parse_tag_text(raw) else {
            return;
        };

        if tag.starts_with('!') {
            return;
        }

        self.implicit_tags(Some(tag.as_str()));

        if tag.starts_with('/') {
            if self.unfinished.len() <= 1 {
                return;
            }
            self.close_current();
        } else if SELF_CLOSING_TAGS.contains(&tag.as_str()) {
            let node = self.dom.create_element(&tag, attrs);
            self.attach_to_current(node);
        } else {
            let node = self.dom.create_element(&tag, attrs);
            self.dom.node_mut(node).parent = self.unfinished.last().copied();
            self.unfinished.push(node);
        }
    }

    fn attach_to_current(&mut self, node: NodeId) {
        if let Some(parent) = self.unfinished.last().copied() {
            self.dom.append_child(parent, node);
        }
    }

    fn close_current(&mut self) {
        if let Some(node) = self.unfinished.pop() {
            self.attach_to_current(node);
        }
    }

    fn finish(mut self) -> NodeId {
        if self.unfinished.is_empty() {
            self.implicit_tags(None);
        }

        while self.unfinished.len() > 1 {
            self.close_current();
        }

        match self.unfinished.pop() {
            Some(root) => root,
            None => self.dom.create_element("html", Vec::new()),
        }
    }

    fn implicit_tags(&mut self, tag: Option<&str>) {
        while let Some(action) = self.next_implicit(tag) {
            match action {
                Implicit::Open(name) => self.add_tag(name),
                Implicit::CloseHead => self.add_tag("/head"),
            }
        }
    }

    fn next_implicit(&self, tag: Option<&str>) -> Option<Implicit> {
        let open: Vec<&str> = self
            .unfinished
            .iter()
            .map(|id| self.dom.tag(*id).unwrap_or_default())
            .collect();
        let is_head_tag = tag.is_some_and(|tag| HEAD_TAGS.contains(&tag));

        match open.as_slice() {
            [] if tag != Some("html") => Some(Implicit::Open("html")),
            ["html"] if !matches!(tag, Some("head" | "body" | "/html")) => {
                if is_head_tag {
                    Some(Implicit::Open("head"))
                } else {
                    Some(Implicit::Open("body"))
                }
            }
            ["html", "head"] if tag != Some("/head") && !is_head_tag => Some(Implicit::CloseHead),
            _ => None,
        }
    }
}

/// Splits tag text into a case-folded name and its attributes.
///
/// Returns `None` for an empty tag (`<>`).
fn parse_tag_text(raw: &str) -> Option<(String, Vec<(String, String)>)> {
    let mut parts = split_outside_quotes(raw.trim());
    // A self-closing `/` is either its own token or glued to a bare word;
    // in an unquoted `key=value` it belongs to the value.
    if let Some(last) = parts.pop() {
        match last.strip_suffix('/') {
            Some("") => {}
            Some(rest) if !last.contains('=') => parts.push(rest),
            _ => parts.push(last),
        }
    }

    let mut parts = parts.into_iter();
    let tag = parts.next()?.to_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    for part in parts {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key.to_lowercase(), strip_quotes(value).to_owned()),
            None => (part.to_lowercase(), String::new()),
        };

        match attrs.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = value,
            None => attrs.push((key, value)),
        }
    }

    Some((tag, attrs))
}

fn split_outside_quotes(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (idx, ch) in input.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }

        if ch.is_whitespace() {
            if let Some(from) = start.take() {
                parts.push(&input[from..idx]);
            }
            continue;
        }

        if start.is_none() {
            start = Some(idx);
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
        }
    }

    if let Some(from) = start {
        parts.push(&input[from..]);
    }

    parts
}

fn strip_quotes(value: &str) -> &str {
    let mut chars = value.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return value;
    };

    if value.chars().count() > 2 && (first == '"' || first == '\'') && first == last {
        &value[first.len_utf8()..value.len() - last.len_utf8()]
    } else {
        value
    }
}
