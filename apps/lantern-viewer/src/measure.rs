//! Text measurement through egui's font system.

use eframe::egui;
use ln_layout::FontKey;
use ln_layout::FontMetrics;
use ln_layout::TextMeasurer;

const PX_PER_PT: f32 = 4.0 / 3.0;
const ASCENT_RATIO: f32 = 0.8;

/// egui font used to draw and measure text of `key`.
pub fn font_id(key: &FontKey) -> egui::FontId {
    egui::FontId::proportional(key.size as f32 * PX_PER_PT)
}

/// [`TextMeasurer`] backed by the fonts loaded into an egui context.
///
/// Only usable once the context has run a frame; earlier calls have no fonts.
#[derive(Clone)]
pub struct EguiTextMeasurer {
    ctx: egui::Context,
}

impl EguiTextMeasurer {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl TextMeasurer for EguiTextMeasurer {
    fn measure(&self, font: &FontKey, text: &str) -> f32 {
        let font_id = font_id(font);
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), font_id, egui::Color32::BLACK)
                .size()
                .x
        })
    }

    fn metrics(&self, font: &FontKey) -> FontMetrics {
        let font_id = font_id(font);
        let linespace = self.ctx.fonts(|fonts| fonts.row_height(&font_id));
        FontMetrics {
            ascent: linespace * ASCENT_RATIO,
            descent: linespace * (1.0 - ASCENT_RATIO),
            linespace,
        }
    }
}
