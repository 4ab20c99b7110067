//! Background theme engine: color math, contrast choice, and the shared
//! override style block.

use std::fmt;

use pivbar_dom::{Dom, Element, Position};
use tracing::{debug, warn};

/// Id of the `<style>` element holding the background override.
pub const BG_STYLE_ID: &str = "piv-bg-color-style";

/// Host selectors whose background is overridden. This list is the
/// integration contract with the host markup.
pub const OVERRIDE_SELECTORS: &[&str] = &[
    "#viewport",
    "#piv-custom-header",
    "#timebar-pane",
    "#shell-splitter-container>.k-pane",
    ".header-pane",
    ".t-header-gradient",
    ".t-header",
    ".k-splitbar",
    "#shell-splitter-container .c-splitter-disabled",
    ".t-display-header",
    ".c-splitter-disabled",
    ".t-pane-header-color",
    ".tool-tabs",
];

/// Translucent text color used over dark backgrounds.
pub const LIGHT_TEXT: &str = "#ffffffcc";
/// Translucent text color used over light backgrounds.
pub const DARK_TEXT: &str = "#000000cc";

/// Luminance below which a background counts as dark.
const DARK_THRESHOLD: f64 = 140.0;

/// An RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceptual luminance `0.299R + 0.587G + 0.114B` on the 0-255 scale.
    ///
    /// Evaluated in f64 in this exact order; values such as `#d75faf` land a
    /// rounding step under the threshold and must stay dark.
    pub fn luminance(self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    /// True when the luminance falls below 140.
    pub fn is_dark(self) -> bool {
        self.luminance() < DARK_THRESHOLD
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color in HSL space: hue in `[0, 360)`, saturation and lightness in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees.
    pub h: f64,
    /// Saturation percentage.
    pub s: f64,
    /// Lightness percentage.
    pub l: f64,
}

impl Hsl {
    /// Construct, normalizing hue into `[0, 360)` and clamping the percentages.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(360.0);
        Self {
            h: if h.is_finite() { h } else { 0.0 },
            s: clamp_pct(s),
            l: clamp_pct(l),
        }
    }
}

/// Clamp to `[0, 100]`, mapping NaN to 0.
fn clamp_pct(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}

/// Parse a 6-digit hex color with an optional leading `#`.
///
/// Returns `None` for any other shape.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Format channels as a lower-case `#rrggbb` string.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_string()
}

/// True when `hex` parses and is perceptually dark. Invalid input is not dark.
pub fn is_color_dark(hex: &str) -> bool {
    hex_to_rgb(hex).is_some_and(Rgb::is_dark)
}

/// Convert RGB to HSL.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d == 0.0 {
        return Hsl::new(0.0, 0.0, l * 100.0);
    }
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    Hsl::new(h * 60.0, s * 100.0, l * 100.0)
}

/// Convert HSL to RGB, rounding and clamping each channel.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let Hsl { h, s, l } = Hsl::new(hsl.h, hsl.s, hsl.l);
    let s = s / 100.0;
    let l = l / 100.0;
    let channel = |n: f64| {
        let k = (n + h / 30.0) % 12.0;
        let a = s * l.min(1.0 - l);
        let v = l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
        // clamped to 0..=255 before the cast
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(channel(0.0), channel(8.0), channel(4.0))
}

/// A background the overlay can apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// A flat color.
    Flat(Rgb),
    /// A CSS gradient literal. Always treated as dark.
    Gradient(String),
}

impl Background {
    /// Classify `value` by literal prefix. Returns `None` for malformed hex and
    /// for gradient literals containing characters that could escape the
    /// declaration.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if config::is_gradient(value) {
            if value.contains(['{', '}', ';', '<', '>']) {
                return None;
            }
            return Some(Self::Gradient(value.to_string()));
        }
        hex_to_rgb(value).map(Self::Flat)
    }

    /// True when light text should be used.
    pub fn is_dark(&self) -> bool {
        match self {
            Self::Flat(rgb) => rgb.is_dark(),
            Self::Gradient(_) => true,
        }
    }

    /// Text color paired with this background.
    pub fn text_color(&self) -> &'static str {
        if self.is_dark() { LIGHT_TEXT } else { DARK_TEXT }
    }

    /// CSS value for the `background` declaration.
    pub fn css(&self) -> String {
        match self {
            Self::Flat(rgb) => rgb_to_hex(*rgb),
            Self::Gradient(g) => g.clone(),
        }
    }
}

/// The override style block for `bg`.
pub fn style_block(bg: &Background) -> String {
    format!(
        "/* PIV Custom Background Override */\n{} {{\n  background: {} !important;\n  color: {} !important;\n}}\n",
        OVERRIDE_SELECTORS.join(",\n"),
        bg.css(),
        bg.text_color()
    )
}

/// Apply `value` as the host background by (re)writing the shared style block
/// in `<head>`. Invalid values are logged and ignored. Returns whether the
/// block was written.
pub fn apply_background(dom: &dyn Dom, value: &str) -> bool {
    let Some(bg) = Background::parse(value) else {
        warn!(value, "ignoring invalid background");
        return false;
    };
    let style = match dom.query(&format!("#{BG_STYLE_ID}")) {
        Ok(Some(node)) => node,
        Ok(None) => {
            let inserted = dom.insert(
                dom.head(),
                Position::Last,
                &Element::new("style").id(BG_STYLE_ID).into(),
            );
            let Some(node) = inserted.first().copied() else {
                return false;
            };
            node
        }
        Err(e) => {
            warn!(error = %e, "background style lookup failed");
            return false;
        }
    };
    dom.set_text(style, &style_block(&bg));
    debug!(background = %bg.css(), dark = bg.is_dark(), "background applied");
    true
}
