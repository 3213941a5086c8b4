//! CSS tokenization, stylesheet model and cascade.

pub mod cascade;
pub mod parser;
pub mod selector;

use ln_dom::Dom;
use ln_dom::NodeId;

pub use cascade::DEFAULT_FONT_SIZE_PX;
pub use cascade::INHERITED_PROPERTIES;
pub use cascade::apply;
pub use cascade::parse_px;
pub use cascade::sort_by_priority;
pub use parser::CssParser;
pub use parser::Declarations;
pub use parser::StyleRule;
pub use parser::StyleSheet;
pub use parser::parse_declarations;
pub use parser::parse_selector;
pub use selector::Selector;

/// User-agent stylesheet, merged ahead of every page stylesheet.
pub const DEFAULT_STYLESHEET: &str = "
pre { background-color: gray; }
a { color: blue; }
i { font-style: italic; }
b { font-weight: bold; }
small { font-size: 90%; }
big { font-size: 110%; }
input {
    font-size: 16px; font-weight: normal; font-style: normal;
    background-color: lightblue;
}
button {
    font-size: 16px; font-weight: normal; font-style: normal;
    background-color: orange;
}
";

/// Parses [`DEFAULT_STYLESHEET`].
pub fn default_stylesheet() -> StyleSheet {
    CssParser.parse(DEFAULT_STYLESHEET)
}

/// `href` of every `<link rel=stylesheet>` under `root`, in document order.
pub fn stylesheet_links(dom: &Dom, root: NodeId) -> Vec<String> {
    dom.descendants(root)
        .into_iter()
        .filter(|id| dom.tag(*id) == Some("link"))
        .filter(|id| dom.attribute(*id, "rel") == Some("stylesheet"))
        .filter_map(|id| dom.attribute(id, "href").map(str::to_owned))
        .collect()
}
