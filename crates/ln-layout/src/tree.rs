//! Box tree produced by layout.
//!
//! Boxes live in an arena owned by [`LayoutTree`]; each box records the DOM
//! node it was generated for and a parent link for upward queries.

use crate::font::Font;
use crate::geometry::Rect;
use ln_dom::NodeId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(usize);

impl BoxId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box{}", self.0)
    }
}

/// How a block lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Children stack vertically as blocks.
    Block,
    /// Descendant text and controls flow into lines.
    Inline,
}

/// Content placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    /// One whitespace-delimited word.
    Text { word: String, font: Font },
    /// A fixed-width form control (`input` or `button`).
    Control { font: Font },
}

impl InlineContent {
    pub fn font(&self) -> &Font {
        match self {
            Self::Text { font, .. } | Self::Control { font } => font,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    Document,
    Block(LayoutMode),
    Line,
    Inline(InlineContent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub kind: BoxKind,
    /// DOM node this box was generated for. Line boxes share their block's node.
    pub node: NodeId,
    pub parent: Option<BoxId>,
    pub children: Vec<BoxId>,
    pub rect: Rect,
}

/// Completed box tree. Geometry is final once a tree is handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    boxes: Vec<LayoutBox>,
    root: BoxId,
}

impl LayoutTree {
    pub(crate) fn from_boxes(boxes: Vec<LayoutBox>, root: BoxId) -> Self {
        Self { boxes, root }
    }

    pub fn root(&self) -> BoxId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    pub fn node(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }

    pub fn children(&self, id: BoxId) -> &[BoxId] {
        &self.boxes[id.0].children
    }

    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.boxes[id.0].parent
    }

    /// Document height: the root box's height.
    pub fn height(&self) -> f32 {
        self.boxes
            .get(self.root.0)
            .map_or(0.0, |root| root.rect.height)
    }

    /// Every box in pre-order, root first.
    pub fn descendants(&self) -> Vec<BoxId> {
        let mut out = Vec::with_capacity(self.boxes.len());
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            if current.0 >= self.boxes.len() {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Boxes whose rectangle contains the point, outermost first.
    pub fn boxes_at(&self, x: f32, y: f32) -> Vec<BoxId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.boxes[id.0].rect.contains(x, y))
            .collect()
    }
}

/// Arena builder used while layout is in progress.
#[derive(Debug, Default)]
pub(crate) struct BoxArena {
    boxes: Vec<LayoutBox>,
}

impl BoxArena {
    pub(crate) fn push(&mut self, kind: BoxKind, node: NodeId, parent: Option<BoxId>) -> BoxId {
        let id = BoxId(self.boxes.len());
        self.boxes.push(LayoutBox {
            kind,
            node,
            parent,
            children: Vec::new(),
            rect: Rect::default(),
        });
        if let Some(parent) = parent {
            self.boxes[parent.0].children.push(id);
        }
        id
    }

    pub(crate) fn get(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }

    pub(crate) fn rect_mut(&mut self, id: BoxId) -> &mut Rect {
        &mut self.boxes[id.0].rect
    }

    pub(crate) fn finish(self, root: BoxId) -> LayoutTree {
        LayoutTree::from_boxes(self.boxes, root)
    }
}
