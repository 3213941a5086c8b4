//! CSS color strings to egui colors.

use eframe::egui::Color32;

/// Parses a named or `#rgb`/`#rrggbb` color. Unknown names yield `None`.
pub fn parse_color(value: &str) -> Option<Color32> {
    let raw = value.trim().to_ascii_lowercase();

    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex);
    }

    let color = match raw.as_str() {
        "black" => Color32::BLACK,
        "white" => Color32::WHITE,
        "gray" | "grey" => Color32::GRAY,
        "lightgray" | "lightgrey" => Color32::LIGHT_GRAY,
        "red" => Color32::RED,
        "green" => Color32::from_rgb(0, 128, 0),
        "blue" => Color32::BLUE,
        "lightblue" => Color32::from_rgb(173, 216, 230),
        "yellow" => Color32::YELLOW,
        "orange" => Color32::from_rgb(255, 165, 0),
        "purple" => Color32::from_rgb(128, 0, 128),
        "brown" => Color32::BROWN,
        "transparent" => Color32::TRANSPARENT,
        _ => return None,
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let channel = |idx: usize| u8::from_str_radix(&hex[idx..=idx].repeat(2), 16).ok();
            Some(Color32::from_rgb(channel(0)?, channel(1)?, channel(2)?))
        }
        6 => {
            let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
            Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}
