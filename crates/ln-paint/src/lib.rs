//! Paint emitter: walks a box tree and produces an ordered display list.

use ln_dom::Dom;
use ln_dom::NodeId;
use ln_layout::BoxKind;
use ln_layout::FontContext;
use ln_layout::FontKey;
use ln_layout::InlineContent;
use ln_layout::LayoutTree;
use ln_layout::Rect;

/// Background value that suppresses the fill.
pub const TRANSPARENT: &str = "transparent";
pub const CARET_COLOR: &str = "black";
pub const CARET_THICKNESS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Drawing primitive. Colors are CSS color strings as resolved by the cascade.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: String,
    },
    Text {
        rect: Rect,
        text: String,
        font: FontKey,
        color: String,
    },
    Line {
        from: Point,
        to: Point,
        color: String,
        thickness: f32,
    },
}

impl DrawCommand {
    /// Bounding rectangle, used to cull against the visible window.
    pub fn rect(&self) -> Rect {
        match self {
            Self::FillRect { rect, .. } | Self::Text { rect, .. } => *rect,
            Self::Line {
                from,
                to,
                thickness,
                ..
            } => {
                let x = from.x.min(to.x);
                let y = from.y.min(to.y);
                Rect::new(
                    x,
                    y,
                    (from.x - to.x).abs().max(*thickness),
                    (from.y - to.y).abs().max(*thickness),
                )
            }
        }
    }
}

/// Ordered draw commands; later commands paint over earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Commands that overlap the vertical window `[top, top + height)`.
    pub fn visible(&self, top: f32, height: f32) -> impl Iterator<Item = &DrawCommand> {
        let bottom = top + height;
        self.commands.iter().filter(move |command| {
            let rect = command.rect();
            rect.bottom() >= top && rect.y < bottom
        })
    }
}

impl IntoIterator for DisplayList {
    type Item = DrawCommand;
    type IntoIter = std::vec::IntoIter<DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// Emits draw commands for every box in pre-order, so ancestors paint below
/// their descendants.
pub fn paint(tree: &LayoutTree, dom: &Dom, fonts: &FontContext) -> DisplayList {
    let mut list = DisplayList::new();

    for id in tree.descendants() {
        let layout_box = tree.node(id);
        match &layout_box.kind {
            BoxKind::Document | BoxKind::Line => {}
            BoxKind::Block(_) => {
                if should_paint_block(dom, layout_box.node) {
                    background(&mut list, dom, layout_box.node, layout_box.rect);
                }
            }
            BoxKind::Inline(InlineContent::Text { word, font }) => {
                list.push(DrawCommand::Text {
                    rect: layout_box.rect,
                    text: word.clone(),
                    font: font.key,
                    color: color_of(dom, layout_box.node),
                });
            }
            BoxKind::Inline(InlineContent::Control { font }) => {
                control(&mut list, dom, fonts, layout_box.node, layout_box.rect, font.key);
            }
        }
    }

    log::debug!("paint emitted {} commands", list.len());
    list
}

/// Controls paint their own background from the inline box, never from a block.
fn should_paint_block(dom: &Dom, node: NodeId) -> bool {
    !matches!(dom.tag(node), Some("input" | "button"))
}

fn background(list: &mut DisplayList, dom: &Dom, node: NodeId, rect: Rect) {
    if dom.element(node).is_none() {
        return;
    }
    let color = dom.style(node).get_or("background-color", TRANSPARENT);
    if color != TRANSPARENT {
        list.push(DrawCommand::FillRect {
            rect,
            color: color.to_owned(),
        });
    }
}

fn control(
    list: &mut DisplayList,
    dom: &Dom,
    fonts: &FontContext,
    node: NodeId,
    rect: Rect,
    font: FontKey,
) {
    background(list, dom, node, rect);

    let text = control_text(dom, node);
    let text_width = fonts.measure(&font, &text);
    if !text.is_empty() {
        list.push(DrawCommand::Text {
            rect: Rect::new(rect.x, rect.y, text_width, rect.height),
            text,
            font,
            color: color_of(dom, node),
        });
    }

    if dom.is_focused(node) {
        let x = rect.x + text_width;
        list.push(DrawCommand::Line {
            from: Point::new(x, rect.y),
            to: Point::new(x, rect.bottom()),
            color: CARET_COLOR.to_owned(),
            thickness: CARET_THICKNESS,
        });
    }
}

/// `input` shows its `value`; `button` shows its label when that is a single text node.
fn control_text(dom: &Dom, node: NodeId) -> String {
    match dom.tag(node) {
        Some("input") => dom.attribute(node, "value").unwrap_or_default().to_owned(),
        Some("button") => match dom.children(node) {
            [only] if dom.node(*only).is_text() => dom.text_content(*only),
            children => {
                if !children.is_empty() {
                    log::debug!("button {node} has non-text content; painting no label");
                }
                String::new()
            }
        },
        _ => String::new(),
    }
}

fn color_of(dom: &Dom, node: NodeId) -> String {
    dom.style(node).get_or("color", "black").to_owned()
}
