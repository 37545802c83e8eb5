
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("unrecognised color `{0}`")]
    UnknownFormat(String),
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    #[error("invalid color component `{0}`")]
    InvalidComponent(String),
}

/// Linear RGB material color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::from_hex(0xaaaaaa)
    }
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed sRGB `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_srgb8(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_srgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn from_srgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }

    /// Parse a CSS color string (`#rgb`, `#rrggbb`, `rgb()`, `rgba()`,
    /// `hsl()`, `hsla()` or a basic named color).
    pub fn from_css(input: &str) -> Result<Self, ColorParseError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(s.to_owned()));
        }

        let lower = s.to_ascii_lowercase();
        if let Some((func, args)) = split_function(&lower) {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            return match func {
                "rgb" | "rgba" if parts.len() == 3 || parts.len() == 4 => {
                    let r = parse_rgb_component(parts[0])?;
                    let g = parse_rgb_component(parts[1])?;
                    let b = parse_rgb_component(parts[2])?;
                    Ok(Self::from_srgb(r, g, b))
                }
                "hsl" | "hsla" if parts.len() == 3 || parts.len() == 4 => {
                    let h = parse_number(parts[0].trim_end_matches("deg"))?;
                    let s = parse_percent(parts[1])?;
                    let l = parse_percent(parts[2])?;
                    let (r, g, b) = hsl_to_srgb(h / 360.0, s, l);
                    Ok(Self::from_srgb(r, g, b))
                }
                _ => Err(ColorParseError::UnknownFormat(s.to_owned())),
            };
        }

        named_color(&lower)
            .map(Self::from_hex)
            .ok_or_else(|| ColorParseError::UnknownFormat(s.to_owned()))
    }

    /// Component-wise scale; not clamped so highlights can exceed 1.0.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }
}

impl From<[f32; 3]> for Color {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::from_srgb8(r, g, b))
        }
        6 => u32::from_str_radix(hex, 16).ok().map(Color::from_hex),
        _ => None,
    }
}

fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let args = s[open + 1..].strip_suffix(')')?;
    Some((s[..open].trim(), args))
}

fn parse_number(s: &str) -> Result<f32, ColorParseError> {
    s.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ColorParseError::InvalidComponent(s.to_owned()))
}

fn parse_percent(s: &str) -> Result<f32, ColorParseError> {
    let value = s
        .strip_suffix('%')
        .ok_or_else(|| ColorParseError::InvalidComponent(s.to_owned()))?;
    Ok((parse_number(value)? / 100.0).clamp(0.0, 1.0))
}

fn parse_rgb_component(s: &str) -> Result<f32, ColorParseError> {
    if s.ends_with('%') {
        parse_percent(s)
    } else {
        Ok((parse_number(s)? / 255.0).clamp(0.0, 1.0))
    }
}

fn hsl_to_srgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let h = h.rem_euclid(1.0);
    if s == 0.0 {
        return (l, l, l);
    }
    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;
    (
        hue_to_rgb(q, p, h + 1.0 / 3.0),
        hue_to_rgb(q, p, h),
        hue_to_rgb(q, p, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

fn named_color(name: &str) -> Option<u32> {
    let hex = match name {
        "black" => 0x000000,
        "silver" => 0xc0c0c0,
        "gray" | "grey" => 0x808080,
        "white" => 0xffffff,
        "maroon" => 0x800000,
        "red" => 0xff0000,
        "purple" => 0x800080,
        "fuchsia" | "magenta" => 0xff00ff,
        "green" => 0x008000,
        "lime" => 0x00ff00,
        "olive" => 0x808000,
        "yellow" => 0xffff00,
        "navy" => 0x000080,
        "blue" => 0x0000ff,
        "teal" => 0x008080,
        "aqua" | "cyan" => 0x00ffff,
        "orange" => 0xffa500,
        "pink" => 0xffc0cb,
        "brown" => 0xa52a2a,
        "gold" => 0xffd700,
        "lightgray" | "lightgrey" => 0xd3d3d3,
        "darkgray" | "darkgrey" => 0xa9a9a9,
        _ => return None,
    };
    Some(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    #[test]
    fn parses_hex_forms() {
        assert!(close(Color::from_css("#fff").unwrap(), Color::WHITE));
        assert!(close(Color::from_css("#ff0000").unwrap(), Color::new(1.0, 0.0, 0.0)));
        assert!(close(
            Color::from_css(" #00FF00 ").unwrap(),
            Color::new(0.0, 1.0, 0.0)
        ));
    }

    #[test]
    fn converts_srgb_midtones_to_linear() {
        let c = Color::from_css("#808080").unwrap();
        assert!((c.r - 0.2158605).abs() < 1e-4);
    }

    #[test]
    fn parses_functional_and_named_forms() {
        let red = Color::new(1.0, 0.0, 0.0);
        assert!(close(Color::from_css("rgb(255, 0, 0)").unwrap(), red));
        assert!(close(Color::from_css("rgba(100%,0%,0%,0.5)").unwrap(), red));
        assert!(close(Color::from_css("hsl(0, 100%, 50%)").unwrap(), red));
        assert!(close(Color::from_css("Red").unwrap(), red));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Color::from_css("  "), Err(ColorParseError::Empty));
        assert!(matches!(
            Color::from_css("#12"),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            Color::from_css("#gggggg"),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            Color::from_css("rgb(1, two, 3)"),
            Err(ColorParseError::InvalidComponent(_))
        ));
        assert!(matches!(
            Color::from_css("not-a-color"),
            Err(ColorParseError::UnknownFormat(_))
        ));
    }

    #[test]
    fn scaling_is_not_clamped() {
        let c = Color::new(0.9, 0.5, 0.0).scaled(1.25);
        assert!((c.r - 1.125).abs() < 1e-6);
        assert!((c.g - 0.625).abs() < 1e-6);
    }
}
