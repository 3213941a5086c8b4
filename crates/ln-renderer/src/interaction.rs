//! Pointer and keyboard input: hit testing, focus, links and forms.

use crate::Page;
use ln_core::LanternError;
use ln_core::LanternResult;
use ln_dom::NodeId;
use ln_net::Fetch;

/// What a click ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing interactive under the point; focus was cleared.
    Ignored,
    /// An `input` took focus and its value was cleared.
    Focused(NodeId),
    /// A link was followed or a form submitted.
    Navigated,
}

impl Page {
    /// Node of the innermost box containing the page-space point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<NodeId> {
        let layout = self.layout();
        layout
            .boxes_at(x, y)
            .last()
            .map(|id| layout.node(*id).node)
    }

    /// Handles a click at page coordinates (already offset by the scroll position).
    pub fn click(&mut self, fetcher: &dyn Fetch, x: f32, y: f32) -> LanternResult<ClickOutcome> {
        self.blur();

        let Some(target) = self.hit_test(x, y) else {
            self.render();
            return Ok(ClickOutcome::Ignored);
        };

        let chain: Vec<NodeId> = std::iter::once(target)
            .chain(self.document.dom.ancestors(target))
            .collect();
        for node in chain {
            let tag = self.document.dom.tag(node).map(str::to_owned);
            match tag.as_deref() {
                Some("a") => {
                    if let Some(href) = self.document.dom.attribute(node, "href") {
                        let href = href.to_owned();
                        return self.follow(fetcher, &href).map(|()| ClickOutcome::Navigated);
                    }
                }
                Some("input") => {
                    self.document.dom.set_attribute(node, "value", "");
                    self.document.dom.set_focused(node, true);
                    self.focus = Some(node);
                    self.render();
                    return Ok(ClickOutcome::Focused(node));
                }
                Some("button") => {
                    if let Some(form) = self.enclosing_form(node) {
                        return self.submit_form(fetcher, form).map(|()| ClickOutcome::Navigated);
                    }
                }
                _ => {}
            }
        }

        self.render();
        Ok(ClickOutcome::Ignored)
    }

    /// Appends a typed character to the focused input. Returns whether the page changed.
    pub fn keypress(&mut self, ch: char) -> bool {
        let Some(node) = self.focus else {
            return false;
        };
        if ch.is_control() {
            return false;
        }

        let mut value = self
            .document
            .dom
            .attribute(node, "value")
            .unwrap_or_default()
            .to_owned();
        value.push(ch);
        self.document.dom.set_attribute(node, "value", value);
        self.render();
        true
    }

    fn blur(&mut self) {
        if let Some(node) = self.focus.take() {
            self.document.dom.set_focused(node, false);
        }
    }

    fn follow(&mut self, fetcher: &dyn Fetch, href: &str) -> LanternResult<()> {
        let target = self.resolve(href)?;
        self.navigate(fetcher, target, None)
    }

    fn enclosing_form(&self, node: NodeId) -> Option<NodeId> {
        let dom = &self.document.dom;
        dom.ancestors(node)
            .find(|ancestor| dom.tag(*ancestor) == Some("form"))
            .filter(|form| dom.attribute(*form, "action").is_some())
    }

    /// Posts every named `input` under `form` to its `action`.
    fn submit_form(&mut self, fetcher: &dyn Fetch, form: NodeId) -> LanternResult<()> {
        let dom = &self.document.dom;
        let action = dom.attribute(form, "action").unwrap_or_default().to_owned();
        let fields: Vec<(String, String)> = dom
            .descendants(form)
            .into_iter()
            .filter(|node| dom.tag(*node) == Some("input"))
            .filter_map(|node| {
                let name = dom.attribute(node, "name")?;
                let value = dom.attribute(node, "value").unwrap_or_default();
                Some((name.to_owned(), value.to_owned()))
            })
            .collect();

        let body = ln_net::encode_form(
            fields
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        let target = self.resolve(&action)?;
        log::debug!("submitting {} fields to {target}", fields.len());
        self.navigate(fetcher, target, Some(&body))
    }

    fn resolve(&self, href: &str) -> LanternResult<ln_net::ResourceUrl> {
        match &self.url {
            Some(base) => base.resolve(href),
            None => ln_net::ResourceUrl::parse(href).map_err(|error| {
                LanternError::new(
                    "renderer.url_unresolvable",
                    format!("`{href}` has no base document: {error}"),
                )
            }),
        }
    }
}
