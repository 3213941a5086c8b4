//! Inline formatting: flows words and controls into line boxes.

use crate::engine::Builder;
use crate::font::Font;
use crate::geometry::Rect;
use crate::tree::BoxId;
use crate::tree::BoxKind;
use crate::tree::InlineContent;
use ln_dom::NodeData;
use ln_dom::NodeId;

/// Content waiting for its line to close.
struct Pending {
    node: NodeId,
    content: InlineContent,
    width: f32,
}

pub(crate) struct InlineFormatter<'b, 'a> {
    builder: &'b mut Builder<'a>,
    block: BoxId,
    pending: Vec<Pending>,
    cursor_x: f32,
    last_line: Option<BoxId>,
}

impl<'b, 'a> InlineFormatter<'b, 'a> {
    pub(crate) fn new(builder: &'b mut Builder<'a>, block: BoxId) -> Self {
        Self {
            builder,
            block,
            pending: Vec::new(),
            cursor_x: 0.0,
            last_line: None,
        }
    }

    /// Lays out everything under `node` and returns the height of the lines.
    pub(crate) fn run(mut self, node: NodeId) -> f32 {
        self.recurse(node);
        self.flush();

        let top = self.builder.arena.get(self.block).rect.y;
        match self.last_line {
            Some(line) => self.builder.arena.get(line).rect.bottom() - top,
            None => 0.0,
        }
    }

    fn recurse(&mut self, node: NodeId) {
        let dom = self.builder.dom;
        match &dom.node(node).data {
            NodeData::Text(text) => {
                for word in text.split_whitespace() {
                    self.word(node, word);
                }
            }
            NodeData::Element(element) => match element.tag.as_str() {
                "br" => self.flush(),
                "input" | "button" => self.control(node),
                _ => {
                    for child in dom.children(node) {
                        self.recurse(*child);
                    }
                }
            },
        }
    }

    fn word(&mut self, node: NodeId, word: &str) {
        let font = self.builder.font_for(node);
        let width = self.builder.fonts.measure(&font.key, word);
        let content = InlineContent::Text {
            word: word.to_owned(),
            font,
        };
        self.place(node, content, width);
    }

    fn control(&mut self, node: NodeId) {
        let font = self.builder.font_for(node);
        let width = self.builder.config.input_width;
        self.place(node, InlineContent::Control { font }, width);
    }

    fn place(&mut self, node: NodeId, content: InlineContent, width: f32) {
        let space = content.font().space_width;
        let line_width = self.builder.arena.get(self.block).rect.width;

        if self.cursor_x + width > line_width {
            self.flush();
        }

        self.pending.push(Pending {
            node,
            content,
            width,
        });
        self.cursor_x += width + space;
    }

    /// Closes the current line. Nothing is emitted for an empty line.
    fn flush(&mut self) {
        self.cursor_x = 0.0;
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }

        let leading = self.builder.config.leading;
        let arena = &mut self.builder.arena;
        let block = arena.get(self.block);
        let (block_rect, block_node) = (block.rect, block.node);

        let line_y = match self.last_line {
            Some(previous) => arena.get(previous).rect.bottom(),
            None => block_rect.y,
        };
        let line = arena.push(BoxKind::Line, block_node, Some(self.block));

        let max_ascent = pending
            .iter()
            .map(|item| item.content.font().metrics.ascent)
            .fold(0.0, f32::max);
        let max_descent = pending
            .iter()
            .map(|item| item.content.font().metrics.descent)
            .fold(0.0, f32::max);
        let baseline = line_y + leading * max_ascent;

        let mut previous: Option<(Rect, Font)> = None;
        for item in pending {
            let font = *item.content.font();
            let x = match previous {
                Some((rect, prev_font)) => rect.right() + prev_font.space_width,
                None => block_rect.x,
            };
            let rect = Rect::new(
                x,
                baseline - font.metrics.ascent,
                item.width,
                font.metrics.linespace,
            );

            let id = arena.push(BoxKind::Inline(item.content), item.node, Some(line));
            *arena.rect_mut(id) = rect;
            previous = Some((rect, font));
        }

        *arena.rect_mut(line) = Rect::new(
            block_rect.x,
            line_y,
            block_rect.width,
            baseline + leading * max_descent - line_y,
        );
        self.last_line = Some(line);
    }
}
