//! Block layout and the box-tree builder.

use crate::LayoutConfig;
use crate::font::Font;
use crate::font::FontContext;
use crate::font::FontKey;
use crate::geometry::Rect;
use crate::inline::InlineFormatter;
use crate::tree::BoxArena;
use crate::tree::BoxId;
use crate::tree::BoxKind;
use crate::tree::LayoutMode;
use crate::tree::LayoutTree;
use ln_dom::Dom;
use ln_dom::NodeData;
use ln_dom::NodeId;

/// Tags that force their parent into block mode.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "html",
    "body",
    "article",
    "section",
    "nav",
    "aside",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hgroup",
    "header",
    "footer",
    "address",
    "p",
    "hr",
    "pre",
    "blockquote",
    "ol",
    "ul",
    "menu",
    "li",
    "dl",
    "dt",
    "dd",
    "figure",
    "figcaption",
    "main",
    "div",
    "table",
    "form",
    "fieldset",
    "legend",
    "details",
    "summary",
];

/// Block mode iff the node is an element with at least one block-level child.
pub fn layout_mode(dom: &Dom, node: NodeId) -> LayoutMode {
    match &dom.node(node).data {
        NodeData::Text(_) => LayoutMode::Inline,
        NodeData::Element(_) => {
            let has_block_child = dom.children(node).iter().any(|child| {
                dom.tag(*child)
                    .is_some_and(|tag| BLOCK_ELEMENTS.contains(&tag))
            });
            if has_block_child {
                LayoutMode::Block
            } else {
                LayoutMode::Inline
            }
        }
    }
}

/// Builds box trees from styled DOM trees.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out the subtree at `root`. Styles must already be resolved.
    pub fn layout(&self, dom: &Dom, root: NodeId, fonts: &mut FontContext) -> LayoutTree {
        let mut builder = Builder {
            dom,
            fonts,
            config: &self.config,
            arena: BoxArena::default(),
        };
        let document = builder.document(root);
        let tree = builder.arena.finish(document);

        log::debug!(
            "layout produced {} boxes, document height {}",
            tree.len(),
            tree.height()
        );
        tree
    }
}

pub(crate) struct Builder<'a> {
    pub(crate) dom: &'a Dom,
    pub(crate) fonts: &'a mut FontContext,
    pub(crate) config: &'a LayoutConfig,
    pub(crate) arena: BoxArena,
}

impl Builder<'_> {
    pub(crate) fn font_for(&mut self, node: NodeId) -> Font {
        let key = FontKey::from_style(self.dom.style(node), self.config.px_to_pt);
        self.fonts.font(key)
    }

    fn document(&mut self, root: NodeId) -> BoxId {
        let x = self.config.horizontal_margin;
        let y = self.config.vertical_margin;
        let width = self.config.content_width();

        let document = self.arena.push(BoxKind::Document, root, None);
        *self.arena.rect_mut(document) = Rect::new(x, y, width, 0.0);

        let mode = layout_mode(self.dom, root);
        let child = self.arena.push(BoxKind::Block(mode), root, Some(document));
        self.block(child, mode, x, y, width);

        self.arena.rect_mut(document).height = self.arena.get(child).rect.height;
        document
    }

    fn block(&mut self, id: BoxId, mode: LayoutMode, x: f32, y: f32, width: f32) {
        *self.arena.rect_mut(id) = Rect::new(x, y, width, 0.0);
        let node = self.arena.get(id).node;

        let height = match mode {
            LayoutMode::Block => self.block_children(id, node),
            LayoutMode::Inline => {
                let lines = InlineFormatter::new(self, id).run(node);
                if self.dom.tag(node) == Some("p") {
                    lines + self.config.paragraph_gap
                } else {
                    lines
                }
            }
        };
        self.arena.rect_mut(id).height = height;
    }

    fn block_children(&mut self, parent: BoxId, node: NodeId) -> f32 {
        let dom = self.dom;
        let Rect { x, y, width, .. } = self.arena.get(parent).rect;

        let mut previous: Option<BoxId> = None;
        let mut height = 0.0;
        for child in dom.children(node) {
            let mode = layout_mode(dom, *child);
            let id = self.arena.push(BoxKind::Block(mode), *child, Some(parent));
            let child_y = match previous {
                Some(previous) => self.arena.get(previous).rect.bottom(),
                None => y,
            };
            self.block(id, mode, x, child_y, width);
            height += self.arena.get(id).rect.height;
            previous = Some(id);
        }
        height
    }
}
