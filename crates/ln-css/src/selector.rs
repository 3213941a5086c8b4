//! Selector model and matching.

use ln_dom::Dom;
use ln_dom::NodeId;

/// A tag selector or a descendant combination of selectors.
///
/// `a b c` parses to `Descendant(Descendant(a, b), c)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Descendant {
        ancestor: Box<Selector>,
        descendant: Box<Selector>,
    },
}

impl Selector {
    pub fn tag(name: &str) -> Self {
        Self::Tag(name.to_lowercase())
    }

    pub fn descendant(ancestor: Selector, descendant: Selector) -> Self {
        Self::Descendant {
            ancestor: Box::new(ancestor),
            descendant: Box::new(descendant),
        }
    }

    /// Additive cascade weight: each tag contributes one.
    pub fn priority(&self) -> u32 {
        match self {
            Self::Tag(_) => 1,
            Self::Descendant {
                ancestor,
                descendant,
            } => ancestor.priority() + descendant.priority(),
        }
    }

    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        match self {
            Self::Tag(tag) => dom.tag(node) == Some(tag.as_str()),
            Self::Descendant {
                ancestor,
                descendant,
            } => {
                descendant.matches(dom, node)
                    && dom
                        .ancestors(node)
                        .any(|candidate| ancestor.matches(dom, candidate))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Selector;
    use ln_dom::Dom;

    #[test]
    fn priority_sums_operands() {
        let selector = Selector::descendant(
            Selector::descendant(Selector::tag("div"), Selector::tag("p")),
            Selector::tag("b"),
        );
        assert_eq!(Selector::tag("p").priority(), 1);
        assert_eq!(selector.priority(), 3);
    }

    #[test]
    fn descendant_requires_strict_ancestor() {
        let mut dom = Dom::new();
        let div = dom.create_element("div", Vec::new());
        let p = dom.create_element("p", Vec::new());
        let text = dom.create_text("x");
        dom.append_child(div, p);
        dom.append_child(p, text);

        let div_p = Selector::descendant(Selector::tag("div"), Selector::tag("p"));
        assert!(div_p.matches(&dom, p));
        assert!(!div_p.matches(&dom, div));

        let p_p = Selector::descendant(Selector::tag("p"), Selector::tag("p"));
        assert!(!p_p.matches(&dom, p));
    }

    #[test]
    fn text_nodes_never_match() {
        let mut dom = Dom::new();
        let text = dom.create_text("p");
        assert!(!Selector::tag("p").matches(&dom, text));
    }
}
