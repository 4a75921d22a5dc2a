//! Colors and the linear value-to-color ramp used to shade heatmap cells.

use crate::error::{MrhError, MrhResult};
use std::fmt;
use std::str::FromStr;

/// An RGB triplet (channels nominally 0-255, unclamped until formatted) plus alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub rgb: [f64; 3],
    pub alpha: f64,
}

/// Hue in degrees, saturation/lightness/alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Color {
    pub fn from_channels(rgb: [f64; 3]) -> MrhResult<Self> {
        if rgb.iter().any(|c| !c.is_finite()) {
            return Err(MrhError::invalid_color(format!("{:?}", rgb), "channels must be finite"));
        }
        Ok(Self { rgb, alpha: 1.0 })
    }

    pub fn with_alpha(mut self, alpha: f64) -> MrhResult<Self> {
        if !alpha.is_finite() {
            return Err(MrhError::invalid_color(format!("alpha {}", alpha), "alpha must be finite"));
        }
        self.alpha = alpha.clamp(0.0, 1.0);
        Ok(self)
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }

    /// CSS form: `rgba(r, g, b, a)` when translucent, otherwise `#rrggbb`.
    pub fn to_css(&self) -> String {
        if self.alpha < 1.0 {
            let [r, g, b] = self.rgb.map(channel_u8);
            format!("rgba({}, {}, {}, {})", r, g, b, self.alpha)
        } else {
            let [r, g, b] = self.rgb.map(channel_u8);
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        }
    }

    /// `#aarrggbb` with alpha scaled to 0-255.
    pub fn to_argb(&self) -> String {
        let a = channel_u8(self.alpha * 255.0);
        let [r, g, b] = self.rgb.map(channel_u8);
        format!("#{:02x}{:02x}{:02x}{:02x}", a, r, g, b)
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let [r, g, b] = self.rgb.map(channel_u8);
        [r, g, b, channel_u8(self.alpha * 255.0)]
    }

    pub fn to_hsl(&self) -> Hsl {
        let r = self.rgb[0] / 255.0;
        let g = self.rgb[1] / 255.0;
        let b = self.rgb[2] / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;

        if max == min {
            return Hsl { h: 0.0, s: 0.0, l, a: self.alpha };
        }

        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl { h: h / 6.0 * 360.0, s, l, a: self.alpha }
    }

    /// Alpha-aware mix: `weight` 1.0 yields `self`, 0.0 yields `other`.
    pub fn mix(&self, other: &Color, weight: f64) -> Color {
        let p = weight;
        let w = p * 2.0 - 1.0;
        let a = self.alpha - other.alpha;

        let w1 = (if w * a == -1.0 { w } else { (w + a) / (1.0 + w * a) } + 1.0) / 2.0;
        let w2 = 1.0 - w1;

        let rgb = [
            self.rgb[0] * w1 + other.rgb[0] * w2,
            self.rgb[1] * w1 + other.rgb[1] * w2,
            self.rgb[2] * w1 + other.rgb[2] * w2,
        ];
        let alpha = self.alpha * p + other.alpha * (1.0 - p);

        Color { rgb, alpha }
    }
}

fn channel_u8(c: f64) -> u8 {
    c.round().clamp(0.0, 255.0) as u8
}

impl FromStr for Color {
    type Err = MrhError;

    /// Accepts `rgb`, `rrggbb` and `#rrggbb`.
    fn from_str(input: &str) -> MrhResult<Self> {
        let s = input.trim();
        let hex = match s.len() {
            3 | 6 => s,
            7 if s.starts_with('#') => &s[1..],
            _ => {
                return Err(MrhError::invalid_color(
                    input,
                    "expected 3 or 6 hex digits, optionally prefixed with '#'",
                ))
            }
        };

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MrhError::invalid_color(input, "contains non-hex characters"));
        }

        let digits: Vec<u8> = hex.bytes().collect();
        let rgb = if digits.len() == 3 {
            let mut rgb = [0.0; 3];
            for (i, d) in digits.iter().enumerate() {
                let pair = [*d, *d];
                rgb[i] = parse_hex_pair(&pair) as f64;
            }
            rgb
        } else {
            let mut rgb = [0.0; 3];
            for (i, pair) in digits.chunks(2).enumerate() {
                rgb[i] = parse_hex_pair(pair) as f64;
            }
            rgb
        };

        Ok(Self { rgb, alpha: 1.0 })
    }
}

// Callers have already checked the digits are ASCII hex.
fn parse_hex_pair(pair: &[u8]) -> u8 {
    fn nibble(b: u8) -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => 0,
        }
    }
    nibble(pair[0]) * 16 + nibble(pair[1])
}

impl TryFrom<[f64; 3]> for Color {
    type Error = MrhError;

    fn try_from(rgb: [f64; 3]) -> MrhResult<Self> {
        Color::from_channels(rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Simple linear gradient between two colors over a value range.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    start_color: Color,
    end_color: Color,
    start_value: f64,
    end_value: f64,
    value_range: f64,
}

impl LinearRamp {
    pub fn new(start_color: Color, end_color: Color, start_value: f64, end_value: f64) -> MrhResult<Self> {
        if !start_value.is_finite() || !end_value.is_finite() {
            return Err(MrhError::InvalidRange(format!(
                "ramp bounds must be finite, got {}..{}",
                start_value, end_value
            )));
        }
        Ok(Self {
            start_color,
            end_color,
            start_value,
            end_value,
            value_range: end_value - start_value,
        })
    }

    /// Parse both endpoint colors, failing fast on malformed input.
    pub fn from_css(start_color: &str, end_color: &str, start_value: f64, end_value: f64) -> MrhResult<Self> {
        Self::new(start_color.parse()?, end_color.parse()?, start_value, end_value)
    }

    pub fn start_color(&self) -> &Color {
        &self.start_color
    }

    pub fn end_color(&self) -> &Color {
        &self.end_color
    }

    /// Position of `value` inside the ramp, clamped to [0, 1].
    /// A zero-width range pins everything to the start color.
    pub fn normalize(&self, value: f64) -> f64 {
        let value = value.max(self.start_value).min(self.end_value);
        if self.value_range == 0.0 {
            return 0.0;
        }
        (value - self.start_value) / self.value_range
    }

    pub fn map_color(&self, value: f64) -> Color {
        let t = self.normalize(value);
        self.start_color.mix(&self.end_color, 1.0 - t)
    }

    pub fn map_value(&self, value: f64) -> String {
        self.map_color(value).to_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_forms() {
        let six: Color = "ff8000".parse().unwrap();
        assert_eq!(six.rgb, [255.0, 128.0, 0.0]);

        let seven: Color = "#ff8000".parse().unwrap();
        assert_eq!(seven, six);

        let short: Color = "f80".parse().unwrap();
        assert_eq!(short.rgb, [255.0, 136.0, 0.0]);

        let array = Color::try_from([1.0, 2.0, 3.0]).unwrap();
        assert_eq!(array.rgb, [1.0, 2.0, 3.0]);
        assert!(array.is_opaque());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<Color>().is_err());
        assert!("#abc".parse::<Color>().is_err());
        assert!("gg0000".parse::<Color>().is_err());
        assert!("ff00000".parse::<Color>().is_err());
        assert!("12345".parse::<Color>().is_err());
        assert!(Color::from_channels([0.0, f64::NAN, 0.0]).is_err());
    }

    #[test]
    fn test_to_css_clamps_and_pads() {
        let c = Color { rgb: [-20.0, 300.0, 10.4], alpha: 1.0 };
        assert_eq!(c.to_css(), "#00ff0a");

        let translucent = Color { rgb: [10.0, 20.0, 30.0], alpha: 0.5 };
        assert_eq!(translucent.to_css(), "rgba(10, 20, 30, 0.5)");
    }

    #[test]
    fn test_to_argb() {
        let c: Color = "102030".parse().unwrap();
        assert_eq!(c.to_argb(), "#ff102030");
    }

    #[test]
    fn test_to_hsl() {
        let red: Color = "ff0000".parse().unwrap();
        let hsl = red.to_hsl();
        assert_eq!(hsl.h, 0.0);
        assert_eq!(hsl.s, 1.0);
        assert_eq!(hsl.l, 0.5);

        let gray: Color = "808080".parse().unwrap();
        assert_eq!(gray.to_hsl().s, 0.0);

        let blue: Color = "0000ff".parse().unwrap();
        assert!((blue.to_hsl().h - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_mix_weights() {
        let black: Color = "000000".parse().unwrap();
        let white: Color = "ffffff".parse().unwrap();
        assert_eq!(black.mix(&white, 1.0).to_css(), "#000000");
        assert_eq!(black.mix(&white, 0.0).to_css(), "#ffffff");
        assert_eq!(black.mix(&white, 0.75).to_css(), "#404040");
    }

    #[test]
    fn test_ramp_midpoint_is_gray() {
        let ramp = LinearRamp::from_css("#000000", "#ffffff", 0.0, 10.0).unwrap();
        assert_eq!(ramp.map_value(5.0), "#808080");
        assert_eq!(ramp.map_value(0.0), "#000000");
        assert_eq!(ramp.map_value(10.0), "#ffffff");
    }

    #[test]
    fn test_ramp_clamps_out_of_range_values() {
        let ramp = LinearRamp::from_css("002288", "ffffff", -8.0, 8.0).unwrap();
        assert_eq!(ramp.map_value(-100.0), ramp.map_value(-8.0));
        assert_eq!(ramp.map_value(100.0), ramp.map_value(8.0));
        assert_eq!(ramp.map_value(f64::NAN), ramp.map_value(-8.0));
    }

    #[test]
    fn test_ramp_zero_width_range_uses_start_color() {
        let ramp = LinearRamp::from_css("000000", "ffffff", 3.0, 3.0).unwrap();
        assert_eq!(ramp.map_value(3.0), "#000000");
        assert_eq!(ramp.map_value(-1.0), "#000000");
        assert_eq!(ramp.map_value(9.0), "#000000");
    }

    #[test]
    fn test_ramp_with_alpha_emits_rgba() {
        let start = "000000".parse::<Color>().unwrap().with_alpha(0.5).unwrap();
        let end: Color = "ffffff".parse().unwrap();
        let ramp = LinearRamp::new(start, end, 0.0, 1.0).unwrap();
        assert!(ramp.map_value(0.5).starts_with("rgba("));
        assert_eq!(ramp.map_value(1.0), "#ffffff");
    }

    #[test]
    fn test_ramp_rejects_bad_input() {
        assert!(LinearRamp::from_css("nothex", "ffffff", 0.0, 1.0).is_err());
        assert!(LinearRamp::from_css("000", "fff", f64::INFINITY, 1.0).is_err());
    }
}
