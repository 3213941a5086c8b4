//! Pipeline driver: loads documents and runs style, layout and paint over them.

mod interaction;
mod page;
mod script;

use ln_layout::LayoutConfig;

pub use interaction::ClickOutcome;
pub use page::Page;
pub use script::ScriptCommand;
pub use script::ScriptOutcome;

/// Settings for a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub layout: LayoutConfig,
    /// Fetch `<link rel=stylesheet>` resources on load.
    pub load_stylesheets: bool,
    /// Maximum number of history entries kept for `go_back`.
    pub history_limit: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            load_stylesheets: true,
            history_limit: 64,
        }
    }
}
