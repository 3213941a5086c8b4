//! Windowed presentation of a [`Page`].

use crate::color::parse_color;
use crate::measure::EguiTextMeasurer;
use crate::measure::font_id;
use eframe::egui;
use ln_net::NetFetcher;
use ln_net::ResourceUrl;
use ln_paint::DrawCommand;
use ln_renderer::ClickOutcome;
use ln_renderer::Page;
use ln_renderer::RendererConfig;

const SCROLL_STEP: f32 = 100.0;

pub struct LanternApp {
    fetcher: NetFetcher,
    config: RendererConfig,
    address: Option<ResourceUrl>,
    page: Option<Page>,
    scroll: f32,
}

impl LanternApp {
    pub fn new(address: ResourceUrl, config: RendererConfig) -> Self {
        Self {
            fetcher: NetFetcher::new(),
            config,
            address: Some(address),
            page: None,
            scroll: 0.0,
        }
    }

    /// Builds the page on the first frame, once egui has fonts to measure with.
    fn ensure_loaded(&mut self, ctx: &egui::Context) {
        let Some(address) = self.address.take() else {
            return;
        };

        let mut page = Page::new(self.config, EguiTextMeasurer::new(ctx.clone()));
        if let Err(error) = page.load(&self.fetcher, address) {
            log::error!("failed to load page: {error}");
        }
        self.page = Some(page);
        self.update_title(ctx);
    }

    fn update_title(&self, ctx: &egui::Context) {
        let title = self
            .page
            .as_ref()
            .and_then(Page::title)
            .unwrap_or_else(|| "Lantern".to_owned());
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
    }

    fn handle_keys(&mut self, ctx: &egui::Context, viewport_height: f32) {
        let Some(page) = self.page.as_mut() else {
            return;
        };

        let (delta, typed, back) = ctx.input(|input| {
            let mut delta = -input.raw_scroll_delta.y;
            if input.key_pressed(egui::Key::ArrowDown) {
                delta += SCROLL_STEP;
            }
            if input.key_pressed(egui::Key::ArrowUp) {
                delta -= SCROLL_STEP;
            }
            let typed = input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => Some(text.clone()),
                    _ => None,
                })
                .collect::<String>();
            let back = input.modifiers.alt && input.key_pressed(egui::Key::ArrowLeft);
            (delta, typed, back)
        });

        for ch in typed.chars() {
            page.keypress(ch);
        }

        if back {
            match page.go_back(&self.fetcher) {
                Ok(true) => {
                    self.scroll = 0.0;
                    self.update_title(ctx);
                    return;
                }
                Ok(false) => {}
                Err(error) => log::warn!("failed to go back: {error}"),
            }
        }

        let limit = page.scroll_limit(viewport_height);
        self.scroll = (self.scroll + delta).clamp(0.0, limit);
    }

    fn click(&mut self, ctx: &egui::Context, offset: egui::Vec2) {
        let Some(page) = self.page.as_mut() else {
            return;
        };

        match page.click(&self.fetcher, offset.x, offset.y + self.scroll) {
            Ok(ClickOutcome::Navigated) => {
                self.scroll = 0.0;
                self.update_title(ctx);
            }
            Ok(ClickOutcome::Focused(_) | ClickOutcome::Ignored) => {}
            Err(error) => log::warn!("click failed: {error}"),
        }
    }

    fn paint(&self, painter: &egui::Painter, viewport: egui::Rect) {
        let Some(page) = self.page.as_ref() else {
            return;
        };

        let origin = viewport.min - egui::vec2(0.0, self.scroll);
        let to_screen = |x: f32, y: f32| origin + egui::vec2(x, y);

        for command in page.display_list().visible(self.scroll, viewport.height()) {
            match command {
                DrawCommand::FillRect { rect, color } => {
                    let Some(fill) = parse_color(color) else {
                        log::debug!("unsupported fill color `{color}`");
                        continue;
                    };
                    let min = to_screen(rect.x, rect.y);
                    let area = egui::Rect::from_min_size(min, egui::vec2(rect.width, rect.height));
                    painter.rect_filled(area, 0.0, fill);
                }
                DrawCommand::Text {
                    rect,
                    text,
                    font,
                    color,
                } => {
                    let color = parse_color(color).unwrap_or(egui::Color32::BLACK);
                    painter.text(
                        to_screen(rect.x, rect.y),
                        egui::Align2::LEFT_TOP,
                        text,
                        font_id(font),
                        color,
                    );
                }
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    thickness,
                } => {
                    let color = parse_color(color).unwrap_or(egui::Color32::BLACK);
                    painter.line_segment(
                        [to_screen(from.x, from.y), to_screen(to.x, to.y)],
                        egui::Stroke::new(*thickness, color),
                    );
                }
            }
        }
    }
}

impl eframe::App for LanternApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_loaded(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::WHITE))
            .show(ctx, |ui| {
                let viewport = ui.max_rect();
                self.handle_keys(ctx, viewport.height());

                let response = ui.allocate_rect(viewport, egui::Sense::click());
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.click(ctx, pos - viewport.min);
                    }
                }

                self.paint(ui.painter(), viewport);
            });
    }
}
