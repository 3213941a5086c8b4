//! Layout engine: turns a styled DOM tree into a tree of positioned boxes.

pub mod engine;
pub mod font;
pub mod geometry;
mod inline;
pub mod tree;

pub use engine::BLOCK_ELEMENTS;
pub use engine::LayoutEngine;
pub use engine::layout_mode;
pub use font::ApproximateTextMeasurer;
pub use font::Font;
pub use font::FontContext;
pub use font::FontKey;
pub use font::FontMetrics;
pub use font::FontSlant;
pub use font::FontWeight;
pub use font::TextMeasurer;
pub use geometry::Rect;
pub use tree::BoxId;
pub use tree::BoxKind;
pub use tree::InlineContent;
pub use tree::LayoutBox;
pub use tree::LayoutMode;
pub use tree::LayoutTree;

/// Page geometry and typographic constants, in pixels unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub viewport_width: f32,
    pub horizontal_margin: f32,
    pub vertical_margin: f32,
    /// Fixed width of `input` and `button` boxes.
    pub input_width: f32,
    /// Extra space after an inline-formatted paragraph.
    pub paragraph_gap: f32,
    /// Line spacing multiplier applied to the tallest ascent and descent.
    pub leading: f32,
    /// Pixel to point conversion for font sizes.
    pub px_to_pt: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            horizontal_margin: 13.0,
            vertical_margin: 18.0,
            input_width: 200.0,
            paragraph_gap: 18.0,
            leading: 1.25,
            px_to_pt: 0.75,
        }
    }
}

impl LayoutConfig {
    pub fn with_viewport_width(mut self, width: f32) -> Self {
        self.viewport_width = width;
        self
    }

    /// Width available to the document box.
    pub fn content_width(&self) -> f32 {
        (self.viewport_width - 2.0 * self.horizontal_margin).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::BoxKind;
    use super::FontContext;
    use super::InlineContent;
    use super::LayoutConfig;
    use super::LayoutEngine;
    use super::LayoutMode;
    use super::LayoutTree;
    use super::Rect;
    use super::layout_mode;
    use ln_css::CssParser;
    use ln_css::DEFAULT_STYLESHEET;
    use ln_dom::Document;
    use ln_html::HtmlParser;

    fn laid_out(html: &str, viewport_width: f32) -> (Document, LayoutTree) {
        let mut doc = HtmlParser.parse(html);
        let mut rules = CssParser.parse(DEFAULT_STYLESHEET).rules;
        ln_css::sort_by_priority(&mut rules);
        ln_css::apply(&mut doc.dom, doc.root, &rules);

        let config = LayoutConfig::default().with_viewport_width(viewport_width);
        let mut fonts = FontContext::approximate();
        let tree = LayoutEngine::new(config).layout(&doc.dom, doc.root, &mut fonts);
        (doc, tree)
    }

    fn words(tree: &LayoutTree) -> Vec<(String, Rect)> {
        tree.descendants()
            .into_iter()
            .filter_map(|id| match &tree.node(id).kind {
                BoxKind::Inline(InlineContent::Text { word, .. }) => {
                    Some((word.clone(), tree.node(id).rect))
                }
                _ => None,
            })
            .collect()
    }

    fn lines(tree: &LayoutTree) -> Vec<Vec<String>> {
        tree.descendants()
            .into_iter()
            .filter(|id| tree.node(*id).kind == BoxKind::Line)
            .map(|line| {
                tree.children(line)
                    .iter()
                    .filter_map(|item| match &tree.node(*item).kind {
                        BoxKind::Inline(InlineContent::Text { word, .. }) => Some(word.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    fn block_for_tag(doc: &Document, tree: &LayoutTree, tag: &str) -> Vec<Rect> {
        tree.descendants()
            .into_iter()
            .filter(|id| matches!(tree.node(*id).kind, BoxKind::Block(_)))
            .filter(|id| doc.dom.tag(tree.node(*id).node) == Some(tag))
            .map(|id| tree.node(id).rect)
            .collect()
    }

    #[test]
    fn document_box_sits_inside_margins() {
        let (_, tree) = laid_out("<p>hello</p>", 800.0);
        let root = tree.node(tree.root());
        assert_eq!(root.kind, BoxKind::Document);
        assert_eq!(root.rect.x, 13.0);
        assert_eq!(root.rect.y, 18.0);
        assert_eq!(root.rect.width, 774.0);
        assert_eq!(tree.height(), 38.0);
    }

    #[test]
    fn words_sit_on_the_baseline() {
        let (_, tree) = laid_out("<div>hello</div>", 800.0);
        assert_eq!(
            words(&tree),
            vec![("hello".to_owned(), Rect::new(13.0, 21.0, 40.0, 16.0))]
        );
        assert_eq!(tree.height(), 20.0);
    }

    #[test]
    fn words_advance_by_width_plus_space() {
        let (_, tree) = laid_out("<div>ab cd</div>", 800.0);
        let xs: Vec<f32> = words(&tree).iter().map(|(_, rect)| rect.x).collect();
        assert_eq!(xs, vec![13.0, 37.0]);
    }

    #[test]
    fn wraps_when_the_next_word_would_overflow() {
        let (_, tree) = laid_out("<div>aaaa bbbb cccc dddd</div>", 126.0);
        assert_eq!(
            lines(&tree),
            vec![
                vec!["aaaa".to_owned(), "bbbb".to_owned()],
                vec!["cccc".to_owned(), "dddd".to_owned()],
            ]
        );
        let placed = words(&tree);
        assert_eq!(placed[2].1, Rect::new(13.0, 41.0, 32.0, 16.0));
        assert_eq!(tree.height(), 40.0);
    }

    #[test]
    fn overlong_word_takes_its_own_line() {
        let long = "a".repeat(20);
        let (_, tree) = laid_out(&format!("<div>{long} b</div>"), 126.0);
        assert_eq!(lines(&tree), vec![vec![long], vec!["b".to_owned()]]);
        assert_eq!(words(&tree)[0].1.x, 13.0);
    }

    #[test]
    fn line_break_element_closes_the_line() {
        let (_, tree) = laid_out("<div>a<br>b</div>", 800.0);
        assert_eq!(
            lines(&tree),
            vec![vec!["a".to_owned()], vec!["b".to_owned()]]
        );
    }

    #[test]
    fn tallest_font_sets_the_baseline() {
        let (_, tree) = laid_out(
            "<div>a <span style=\"font-size:32px\">b</span></div>",
            800.0,
        );
        let placed = words(&tree);
        assert_eq!(placed[0].1, Rect::new(13.0, 36.0, 8.0, 16.0));
        assert_eq!(placed[1].1, Rect::new(29.0, 24.0, 16.0, 32.0));
        assert_eq!(tree.height(), 40.0);
    }

    #[test]
    fn controls_have_fixed_width() {
        let (doc, tree) = laid_out("<div>name <input value=x> go</div>", 800.0);
        let control = tree
            .descendants()
            .into_iter()
            .find(|id| {
                matches!(
                    tree.node(*id).kind,
                    BoxKind::Inline(InlineContent::Control { .. })
                )
            })
            .map(|id| tree.node(id));
        let Some(control) = control else {
            panic!("expected a control box");
        };
        assert_eq!(doc.dom.tag(control.node), Some("input"));
        assert_eq!(control.rect, Rect::new(53.0, 21.0, 200.0, 16.0));
        assert_eq!(words(&tree)[1].1.x, 261.0);
    }

    #[test]
    fn block_children_stack_vertically() {
        let (doc, tree) = laid_out("<div><p>a</p><p>b</p></div>", 800.0);
        let paragraphs = block_for_tag(&doc, &tree, "p");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].y, 18.0);
        assert_eq!(paragraphs[0].height, 38.0);
        assert_eq!(paragraphs[1].y, 56.0);

        let div = block_for_tag(&doc, &tree, "div");
        assert_eq!(div[0].height, paragraphs[0].height + paragraphs[1].height);
    }

    #[test]
    fn block_heights_sum_their_children_at_every_depth() {
        let (_, tree) = laid_out(
            "<div><section><p>a</p><p>b c</p></section><ul><li>x</li><li></li></ul></div>\
             <div><div><h1>deep</h1></div></div><p>tail</p>",
            800.0,
        );

        let root = tree.root();
        assert_eq!(tree.children(root).len(), 1);
        let block = tree.children(root)[0];
        assert_eq!(tree.node(root).rect.height, tree.node(block).rect.height);
        assert_eq!(tree.height(), tree.node(block).rect.height);

        let block_mode: Vec<_> = tree
            .descendants()
            .into_iter()
            .filter(|id| tree.node(*id).kind == BoxKind::Block(LayoutMode::Block))
            .collect();
        assert!(block_mode.len() > 4);
        for id in block_mode {
            let sum: f32 = tree
                .children(id)
                .iter()
                .map(|child| tree.node(*child).rect.height)
                .sum();
            assert_eq!(tree.node(id).rect.height, sum, "height of {id}");
        }
    }

    #[test]
    fn empty_blocks_have_no_lines() {
        let (_, tree) = laid_out("<div></div>", 800.0);
        assert_eq!(tree.height(), 0.0);
        assert!(lines(&tree).is_empty());

        let (_, tree) = laid_out("<p></p>", 800.0);
        assert_eq!(tree.height(), 18.0);
    }

    #[test]
    fn mode_depends_on_block_children() {
        let (doc, _) = laid_out("<div><span>x</span></div><section><p>y</p></section>", 800.0);
        let find = |tag: &str| {
            doc.dom
                .descendants(doc.root)
                .into_iter()
                .find(|id| doc.dom.tag(*id) == Some(tag))
        };
        let (Some(div), Some(section), Some(span)) = (find("div"), find("section"), find("span"))
        else {
            panic!("expected div, section and span");
        };
        assert_eq!(layout_mode(&doc.dom, div), LayoutMode::Inline);
        assert_eq!(layout_mode(&doc.dom, section), LayoutMode::Block);
        assert_eq!(layout_mode(&doc.dom, doc.dom.children(span)[0]), LayoutMode::Inline);
    }

    #[test]
    fn parent_links_match_child_lists() {
        let (_, tree) = laid_out("<div><p>a b</p><p>c<br>d</p></div>", 800.0);
        for id in tree.descendants() {
            for child in tree.children(id) {
                assert_eq!(tree.parent(*child), Some(id));
            }
        }
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn layout_is_deterministic() {
        let html = "<div>one <b>two</b> <i>three</i></div><p>four</p>";
        let (_, first) = laid_out(html, 300.0);
        let (_, second) = laid_out(html, 300.0);
        assert_eq!(first, second);
    }

    #[test]
    fn content_width_never_goes_negative() {
        let config = LayoutConfig::default().with_viewport_width(10.0);
        assert_eq!(config.content_width(), 0.0);
    }
}
