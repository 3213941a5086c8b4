//! Command protocol through which a scripting host reads and mutates the page.

use crate::Page;
use ln_core::LanternError;
use ln_core::LanternResult;
use ln_dom::NodeId;

/// A request from the scripting host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Every node matching a selector, in document order.
    QuerySelectorAll(String),
    GetAttribute { node: NodeId, name: String },
    /// Replaces the node's children with the parsed fragment and re-renders.
    SetInnerHtml { node: NodeId, html: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    Nodes(Vec<NodeId>),
    /// Attribute value; empty when the attribute is absent.
    Attribute(String),
    Rendered,
}

impl Page {
    pub fn execute(&mut self, command: ScriptCommand) -> LanternResult<ScriptOutcome> {
        match command {
            ScriptCommand::QuerySelectorAll(text) => {
                let selector = ln_css::parse_selector(&text).ok_or_else(|| {
                    LanternError::new(
                        "renderer.selector_invalid",
                        format!("cannot parse selector `{text}`"),
                    )
                })?;
                let dom = &self.document.dom;
                let nodes = dom
                    .descendants(self.document.root)
                    .into_iter()
                    .filter(|node| selector.matches(dom, *node))
                    .collect();
                Ok(ScriptOutcome::Nodes(nodes))
            }
            ScriptCommand::GetAttribute { node, name } => {
                self.check_node(node)?;
                let value = self.document.dom.attribute(node, &name).unwrap_or_default();
                Ok(ScriptOutcome::Attribute(value.to_owned()))
            }
            ScriptCommand::SetInnerHtml { node, html } => {
                self.check_node(node)?;
                if self.document.dom.element(node).is_none() {
                    return Err(LanternError::new(
                        "renderer.node_not_element",
                        format!("node {node} is a text node"),
                    ));
                }

                let children = self.html.parse_fragment(&mut self.document.dom, &html);
                self.document.dom.replace_children(node, children);
                if self.focus.is_some_and(|focus| !self.is_attached(focus)) {
                    self.focus = None;
                }
                self.render();
                Ok(ScriptOutcome::Rendered)
            }
        }
    }

    /// Rejects ids outside the arena and nodes detached by an earlier splice.
    fn check_node(&self, node: NodeId) -> LanternResult<()> {
        if self.document.dom.contains(node) && self.is_attached(node) {
            return Ok(());
        }
        Err(LanternError::new(
            "renderer.node_missing",
            format!("no node {node} in the current document"),
        ))
    }

    /// Whether `node` is still reachable from the document root.
    pub(crate) fn is_attached(&self, node: NodeId) -> bool {
        let root = self.document.root;
        node == root || self.document.dom.ancestors(node).any(|ancestor| ancestor == root)
    }
}
