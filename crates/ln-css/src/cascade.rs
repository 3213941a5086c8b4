//! Cascade: computes every node's style map from inherited values, matching
//! rules, inline `style` attributes and percentage font sizes.

use crate::parser::StyleRule;
use crate::parser::parse_declarations;
use ln_dom::ComputedStyle;
use ln_dom::Dom;
use ln_dom::NodeId;

/// Properties copied from the parent before rules apply, with their root defaults.
pub const INHERITED_PROPERTIES: &[(&str, &str)] = &[
    ("font-size", "16px"),
    ("font-style", "normal"),
    ("font-weight", "normal"),
    ("color", "black"),
];

pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Orders rules by ascending selector priority. The sort is stable, so equal
/// priorities keep their stylesheet order.
pub fn sort_by_priority(rules: &mut [StyleRule]) {
    rules.sort_by_key(StyleRule::priority);
}

/// Resolves the style map of `root` and every node below it, parents first.
///
/// `rules` must already be sorted with [`sort_by_priority`]; later matches
/// override earlier ones property by property.
pub fn apply(dom: &mut Dom, root: NodeId, rules: &[StyleRule]) {
    let order = dom.descendants(root);
    for node in &order {
        let style = compute(dom, *node, rules);
        *dom.style_mut(*node) = style;
    }
    log::debug!(
        "cascade resolved {} nodes against {} rules",
        order.len(),
        rules.len()
    );
}

fn compute(dom: &Dom, node: NodeId, rules: &[StyleRule]) -> ComputedStyle {
    let parent = dom.parent(node).map(|parent| dom.style(parent));
    let mut style = ComputedStyle::default();

    for (property, default) in INHERITED_PROPERTIES {
        let value = parent
            .and_then(|parent| parent.get(property))
            .unwrap_or(*default);
        style.set(*property, value);
    }

    for rule in rules {
        if !rule.selector.matches(dom, node) {
            continue;
        }
        for (property, value) in rule.declarations.iter() {
            style.set(property, value);
        }
    }

    if let Some(inline) = dom.attribute(node, "style") {
        for (property, value) in parse_declarations(inline).iter() {
            style.set(property, value);
        }
    }

    if let Some(resolved) = resolve_percentage_font_size(&style, parent) {
        style.set("font-size", resolved);
    }

    style
}

fn resolve_percentage_font_size(
    style: &ComputedStyle,
    parent: Option<&ComputedStyle>,
) -> Option<String> {
    let pct = style.get("font-size")?.strip_suffix('%')?;
    let pct = pct.trim().parse::<f32>().ok()?;

    let parent_px = parent
        .and_then(|parent| parent.get("font-size"))
        .and_then(parse_px)
        .unwrap_or(DEFAULT_FONT_SIZE_PX);

    Some(format!("{}px", pct / 100.0 * parent_px))
}

/// Parses `"<n>px"` into pixels.
pub fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse::<f32>().ok()
}
