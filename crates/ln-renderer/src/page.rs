//! Page state and the load → style → layout → paint pipeline.

use crate::RendererConfig;
use ln_core::LanternResult;
use ln_css::CssParser;
use ln_css::StyleRule;
use ln_css::StyleSheet;
use ln_dom::Document;
use ln_dom::NodeId;
use ln_html::HtmlParser;
use ln_layout::FontContext;
use ln_layout::LayoutEngine;
use ln_layout::LayoutTree;
use ln_layout::TextMeasurer;
use ln_net::Fetch;
use ln_net::ResourceUrl;
use ln_paint::DisplayList;

/// One loaded document plus everything derived from it.
///
/// Every mutation of the node tree is followed by [`Page::render`], which
/// rebuilds the layout tree and display list from scratch.
pub struct Page {
    pub(crate) config: RendererConfig,
    pub(crate) html: HtmlParser,
    engine: LayoutEngine,
    fonts: FontContext,
    pub(crate) url: Option<ResourceUrl>,
    pub(crate) document: Document,
    rules: Vec<StyleRule>,
    layout: LayoutTree,
    display_list: DisplayList,
    history: Vec<ResourceUrl>,
    pub(crate) focus: Option<NodeId>,
}

impl Page {
    pub fn new(config: RendererConfig, measurer: impl TextMeasurer + 'static) -> Self {
        let html = HtmlParser;
        let document = html.parse("");
        let engine = LayoutEngine::new(config.layout);
        let mut fonts = FontContext::new(measurer);
        let layout = engine.layout(&document.dom, document.root, &mut fonts);

        let mut page = Self {
            config,
            html,
            engine,
            fonts,
            url: None,
            document,
            rules: Vec::new(),
            layout,
            display_list: DisplayList::new(),
            history: Vec::new(),
            focus: None,
        };
        page.rules = page.collect_rules(None);
        page.render();
        page
    }

    /// Fetches `url` and replaces the current document with it.
    pub fn load(&mut self, fetcher: &dyn Fetch, url: ResourceUrl) -> LanternResult<()> {
        self.navigate(fetcher, url, None)
    }

    pub(crate) fn navigate(
        &mut self,
        fetcher: &dyn Fetch,
        url: ResourceUrl,
        body: Option<&str>,
    ) -> LanternResult<()> {
        log::info!("loading {url}");
        let response = fetcher.fetch(&url, body)?;
        if !response.is_success() {
            log::warn!("{url} answered with status {}", response.status);
        }

        self.history.push(url.clone());
        let overflow = self.history.len().saturating_sub(self.config.history_limit.max(1));
        self.history.drain(..overflow);

        self.load_source(&response.body, url, fetcher);
        Ok(())
    }

    /// Parses already-fetched markup as a document located at `base_url`.
    pub fn load_source(&mut self, html: &str, base_url: ResourceUrl, fetcher: &dyn Fetch) {
        self.document = self.html.parse(html);
        self.url = Some(base_url);
        self.focus = None;
        self.rules = self.collect_rules(Some(fetcher));
        self.render();
    }

    /// User-agent rules plus every linked stylesheet that could be fetched,
    /// stably sorted by selector priority.
    fn collect_rules(&self, fetcher: Option<&dyn Fetch>) -> Vec<StyleRule> {
        let mut sheet = ln_css::default_stylesheet();

        if let (Some(fetcher), Some(base), true) =
            (fetcher, &self.url, self.config.load_stylesheets)
        {
            for href in ln_css::stylesheet_links(&self.document.dom, self.document.root) {
                match fetch_stylesheet(fetcher, base, &href) {
                    Ok(linked) => sheet.extend(linked),
                    Err(error) => log::warn!("skipping stylesheet `{href}`: {error}"),
                }
            }
        }

        let mut rules = sheet.rules;
        ln_css::sort_by_priority(&mut rules);
        rules
    }

    /// Restyles, lays out and repaints the whole document.
    pub fn render(&mut self) {
        let root = self.document.root;
        ln_css::apply(&mut self.document.dom, root, &self.rules);
        self.layout = self
            .engine
            .layout(&self.document.dom, root, &mut self.fonts);
        self.display_list = ln_paint::paint(&self.layout, &self.document.dom, &self.fonts);
    }

    /// Reloads the previous history entry. Returns `false` when there is none.
    pub fn go_back(&mut self, fetcher: &dyn Fetch) -> LanternResult<bool> {
        if self.history.len() < 2 {
            return Ok(false);
        }
        let current = self.history.pop();
        let Some(previous) = self.history.pop() else {
            return Ok(false);
        };
        if let Err(error) = self.load(fetcher, previous.clone()) {
            self.history.push(previous);
            self.history.extend(current);
            return Err(error);
        }
        Ok(true)
    }

    /// Largest useful scroll offset for a viewport of the given height.
    pub fn scroll_limit(&self, viewport_height: f32) -> f32 {
        let margin = self.config.layout.vertical_margin;
        (self.layout.height() + 2.0 * margin - viewport_height).max(0.0)
    }

    pub fn url(&self) -> Option<&ResourceUrl> {
        self.url.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.display_list
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn title(&self) -> Option<String> {
        self.document.title()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

fn fetch_stylesheet(fetcher: &dyn Fetch, base: &ResourceUrl, href: &str) -> LanternResult<StyleSheet> {
    let url = base.resolve(href)?;
    let response = fetcher.fetch(&url, None)?;
    if !response.is_success() {
        log::warn!("{url} answered with status {}", response.status);
    }
    Ok(CssParser.parse(&response.body))
}

#[cfg(test)]
mod tests {
    use crate::RendererConfig;
    use crate::tests::page_at;
    use crate::tests::texts;
    use ln_layout::ApproximateTextMeasurer;
    use ln_net::MemoryFetcher;
    use ln_net::ResourceUrl;

    #[test]
    fn fresh_page_is_blank() {
        let page = super::Page::new(RendererConfig::default(), ApproximateTextMeasurer);
        assert!(page.display_list().is_empty());
        assert_eq!(page.url(), None);
        assert_eq!(page.scroll_limit(600.0), 0.0);
    }

    #[test]
    fn linked_stylesheets_are_applied() {
        let fetcher = MemoryFetcher::new()
            .with(
                "http://site.test/a/index.html",
                "<head><title>Styled</title><link rel=stylesheet href=../s.css></head><p>x</p>",
            )
            .with("http://site.test/s.css", "p { color: red; }");
        let page = page_at(&fetcher, "http://site.test/a/index.html");

        assert_eq!(page.title().as_deref(), Some("Styled"));
        // Head content is laid out like any other inline content.
        assert_eq!(
            texts(&page),
            vec![
                ("Styled".to_owned(), "black".to_owned()),
                ("x".to_owned(), "red".to_owned()),
            ]
        );
        assert_eq!(page.rule_count(), 9);
    }

    #[test]
    fn missing_stylesheet_is_skipped() {
        let fetcher = MemoryFetcher::new().with(
            "http://site.test/",
            "<link rel=stylesheet href=gone.css><p>x</p>",
        );
        let page = page_at(&fetcher, "http://site.test/");
        assert_eq!(texts(&page), vec![("x".to_owned(), "black".to_owned())]);
        assert_eq!(page.rule_count(), 8);
    }

    #[test]
    fn stylesheets_can_be_disabled() {
        let fetcher = MemoryFetcher::new()
            .with("http://site.test/", "<link rel=stylesheet href=s.css><p>x</p>")
            .with("http://site.test/s.css", "p { color: red; }");
        let config = RendererConfig {
            load_stylesheets: false,
            ..RendererConfig::default()
        };
        let mut page = super::Page::new(config, ApproximateTextMeasurer);
        let url = match ResourceUrl::parse("http://site.test/") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        if let Err(error) = page.load(&fetcher, url) {
            panic!("{error}");
        }
        assert_eq!(texts(&page), vec![("x".to_owned(), "black".to_owned())]);
    }

    #[test]
    fn failed_document_fetch_keeps_current_page() {
        let fetcher = MemoryFetcher::new().with("http://site.test/", "<p>kept</p>");
        let mut page = page_at(&fetcher, "http://site.test/");
        let missing = match ResourceUrl::parse("http://site.test/missing") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };

        let result = page.load(&fetcher, missing);
        assert_eq!(result.map_err(|error| error.code), Err("net.memory.not_found"));
        assert_eq!(texts(&page), vec![("kept".to_owned(), "black".to_owned())]);
        assert_eq!(page.history_len(), 1);
    }

    #[test]
    fn history_is_bounded() {
        let fetcher = MemoryFetcher::new()
            .with("http://site.test/1", "<p>1</p>")
            .with("http://site.test/2", "<p>2</p>")
            .with("http://site.test/3", "<p>3</p>");
        let config = RendererConfig {
            history_limit: 2,
            ..RendererConfig::default()
        };
        let mut page = super::Page::new(config, ApproximateTextMeasurer);
        for n in 1..=3 {
            let url = match ResourceUrl::parse(&format!("http://site.test/{n}")) {
                Ok(value) => value,
                Err(error) => panic!("{error}"),
            };
            if let Err(error) = page.load(&fetcher, url) {
                panic!("{error}");
            }
        }
        assert_eq!(page.history_len(), 2);
    }

    #[test]
    fn go_back_reloads_previous_entry() {
        let fetcher = MemoryFetcher::new()
            .with("http://site.test/1", "<p>one</p>")
            .with("http://site.test/2", "<p>two</p>");
        let mut page = page_at(&fetcher, "http://site.test/1");
        let second = match ResourceUrl::parse("http://site.test/2") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        if let Err(error) = page.load(&fetcher, second) {
            panic!("{error}");
        }

        assert_eq!(page.go_back(&fetcher), Ok(true));
        assert_eq!(texts(&page), vec![("one".to_owned(), "black".to_owned())]);
        assert_eq!(page.history_len(), 1);
        assert_eq!(page.go_back(&fetcher), Ok(false));
    }

    #[test]
    fn failed_go_back_keeps_history() {
        let fetcher = MemoryFetcher::new()
            .with("http://site.test/1", "<p>one</p>")
            .with("http://site.test/2", "<p>two</p>");
        let mut page = page_at(&fetcher, "http://site.test/1");
        let second = match ResourceUrl::parse("http://site.test/2") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        if let Err(error) = page.load(&fetcher, second) {
            panic!("{error}");
        }

        let offline = MemoryFetcher::new();
        assert!(page.go_back(&offline).is_err());
        assert_eq!(page.history_len(), 2);
        assert_eq!(texts(&page), vec![("two".to_owned(), "black".to_owned())]);
    }

    #[test]
    fn scroll_limit_accounts_for_margins() {
        let body = "<p>x</p>".repeat(40);
        let fetcher = MemoryFetcher::new().with("http://site.test/", body);
        let page = page_at(&fetcher, "http://site.test/");
        // 40 paragraphs of one 20px line plus an 18px gap.
        assert_eq!(page.layout().height(), 40.0 * 38.0);
        assert_eq!(page.scroll_limit(600.0), 40.0 * 38.0 + 36.0 - 600.0);
        assert_eq!(page.scroll_limit(10_000.0), 0.0);
    }

    #[test]
    fn rendering_twice_is_identical() {
        let fetcher = MemoryFetcher::new().with(
            "http://site.test/",
            "<pre>code</pre><p>a <b>b</b> <i>c</i></p><input value=v>",
        );
        let mut page = page_at(&fetcher, "http://site.test/");
        let before = page.display_list().clone();
        page.render();
        assert_eq!(page.display_list(), &before);
    }
}
