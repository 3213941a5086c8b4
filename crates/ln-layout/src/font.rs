//! Font selection, text measurement and the font handle cache.

use ln_css::DEFAULT_FONT_SIZE_PX;
use ln_css::parse_px;
use ln_dom::ComputedStyle;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontWeight {
    Normal,
    Bold,
}

impl FontWeight {
    pub fn from_css(value: &str) -> Self {
        match value.trim() {
            "bold" | "bolder" => Self::Bold,
            other => match other.parse::<u16>() {
                Ok(numeric) if numeric >= 600 => Self::Bold,
                _ => Self::Normal,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontSlant {
    Roman,
    Italic,
}

impl FontSlant {
    pub fn from_css(value: &str) -> Self {
        match value.trim() {
            "italic" | "oblique" => Self::Italic,
            _ => Self::Roman,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Roman => "roman",
            Self::Italic => "italic",
        }
    }
}

/// Cache key and font description: size in points plus weight and slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontKey {
    pub size: u32,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl FontKey {
    pub fn new(size: u32, weight: FontWeight, slant: FontSlant) -> Self {
        Self {
            size,
            weight,
            slant,
        }
    }

    /// Derives the font for a node from its computed style. Pixel sizes are
    /// scaled by `px_to_pt` and truncated; an unparsable size falls back to
    /// the document default.
    pub fn from_style(style: &ComputedStyle, px_to_pt: f32) -> Self {
        let px = style
            .get("font-size")
            .and_then(parse_px)
            .unwrap_or(DEFAULT_FONT_SIZE_PX);
        let size = (px * px_to_pt).max(0.0) as u32;

        Self {
            size,
            weight: FontWeight::from_css(style.get_or("font-weight", "normal")),
            slant: FontSlant::from_css(style.get_or("font-style", "normal")),
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}pt {} {}",
            self.size,
            self.weight.as_str(),
            self.slant.as_str()
        )
    }
}

/// Vertical metrics of a font, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub linespace: f32,
}

/// Font system seam: whatever turns a [`FontKey`] into pixel measurements.
pub trait TextMeasurer {
    /// Advance width of `text` in pixels.
    fn measure(&self, font: &FontKey, text: &str) -> f32;

    fn metrics(&self, font: &FontKey) -> FontMetrics;
}

/// Deterministic measurer with fixed per-character advances.
///
/// Used headless and in tests, where real glyph data is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTextMeasurer;

impl ApproximateTextMeasurer {
    const PX_PER_PT: f32 = 4.0 / 3.0;
    const ADVANCE_RATIO: f32 = 0.5;
    const BOLD_ADVANCE_RATIO: f32 = 0.55;
    const ASCENT_RATIO: f32 = 0.75;
    const DESCENT_RATIO: f32 = 0.25;

    fn em(font: &FontKey) -> f32 {
        font.size as f32 * Self::PX_PER_PT
    }
}

impl TextMeasurer for ApproximateTextMeasurer {
    fn measure(&self, font: &FontKey, text: &str) -> f32 {
        let ratio = match font.weight {
            FontWeight::Normal => Self::ADVANCE_RATIO,
            FontWeight::Bold => Self::BOLD_ADVANCE_RATIO,
        };
        text.chars().count() as f32 * Self::em(font) * ratio
    }

    fn metrics(&self, font: &FontKey) -> FontMetrics {
        let ascent = Self::em(font) * Self::ASCENT_RATIO;
        let descent = Self::em(font) * Self::DESCENT_RATIO;
        FontMetrics {
            ascent,
            descent,
            linespace: ascent + descent,
        }
    }
}

/// Resolved font handle: key plus the measurements layout needs repeatedly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub key: FontKey,
    pub metrics: FontMetrics,
    pub space_width: f32,
}

/// Owns the font system and memoizes font handles by key.
///
/// Entries are added lazily and never evicted; the key space is bounded by
/// the sizes, weights and slants the stylesheets actually use.
pub struct FontContext {
    measurer: Box<dyn TextMeasurer>,
    cache: HashMap<FontKey, Font>,
}

impl FontContext {
    pub fn new(measurer: impl TextMeasurer + 'static) -> Self {
        Self {
            measurer: Box::new(measurer),
            cache: HashMap::new(),
        }
    }

    pub fn approximate() -> Self {
        Self::new(ApproximateTextMeasurer)
    }

    pub fn font(&mut self, key: FontKey) -> Font {
        if let Some(font) = self.cache.get(&key) {
            return *font;
        }

        let font = Font {
            key,
            metrics: self.measurer.metrics(&key),
            space_width: self.measurer.measure(&key, " "),
        };
        self.cache.insert(key, font);
        font
    }

    pub fn measure(&self, font: &FontKey, text: &str) -> f32 {
        self.measurer.measure(font, text)
    }

    pub fn cached_fonts(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for FontContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontContext")
            .field("cached_fonts", &self.cache.len())
            .finish_non_exhaustive()
    }
}
