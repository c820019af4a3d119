//! CSS colour and background parsing for the editor surface.
//!
//! Only the forms the editor produces are understood: hex colours,
//! `rgb()/rgba()`, `hsl()/hsla()`, named colours, and
//! `linear-gradient(<angle>, <stops>)`.

use crate::{Error, Result};
use palette::{Hsl, IntoColor, Srgb, Srgba};
use std::str::FromStr;

/// Straight-alpha 8-bit sRGB colour.
pub type Rgba = Srgba<u8>;

/// Tailwind slate-800, the editor's title colour.
pub fn slate_800() -> Rgba {
    Srgba::new(30, 41, 59, 255)
}

/// Tailwind slate-700, the pill text colour.
pub fn slate_700() -> Rgba {
    Srgba::new(51, 65, 85, 255)
}

pub fn transparent() -> Rgba {
    Srgba::new(0, 0, 0, 0)
}

/// Parse a single CSS colour value.
pub fn parse_color(input: &str) -> Result<Rgba> {
    let s = input.trim().to_ascii_lowercase();
    if s == "transparent" || s == "none" {
        return Ok(transparent());
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| bad_color(input));
    }

    if let Some((func, args)) = split_function(&s) {
        let parts: Vec<&str> = args
            .split(|c| c == ',' || c == '/' || c == ' ')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        return match func {
            "rgb" | "rgba" if parts.len() >= 3 => {
                let r = channel(parts[0]).ok_or_else(|| bad_color(input))?;
                let g = channel(parts[1]).ok_or_else(|| bad_color(input))?;
                let b = channel(parts[2]).ok_or_else(|| bad_color(input))?;
                let a = parts.get(3).map(|p| alpha(p)).unwrap_or(Some(255)).ok_or_else(|| bad_color(input))?;
                Ok(Srgba::new(r, g, b, a))
            }
            "hsl" | "hsla" if parts.len() >= 3 => {
                let h: f32 = parts[0].trim_end_matches("deg").parse().map_err(|_| bad_color(input))?;
                let sat = percent(parts[1]).ok_or_else(|| bad_color(input))?;
                let light = percent(parts[2]).ok_or_else(|| bad_color(input))?;
                let a = parts.get(3).map(|p| alpha(p)).unwrap_or(Some(255)).ok_or_else(|| bad_color(input))?;
                let hsl: Hsl = Hsl::new(h, sat, light);
                let rgb: Srgb = hsl.into_color();
                let rgb: Srgb<u8> = rgb.into_format();
                Ok(Srgba::new(rgb.red, rgb.green, rgb.blue, a))
            }
            _ => Err(bad_color(input)),
        };
    }

    palette::named::from_str(&s)
        .map(|c| Srgba::new(c.red, c.green, c.blue, 255))
        .ok_or_else(|| bad_color(input))
}

fn bad_color(input: &str) -> Error {
    Error::Capture(format!("unsupported colour '{}'", input))
}

/// `rgb`, `rgba`, `rrggbb` or `rrggbbaa` without the leading `#`.
fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    let (rgb, a) = match hex.len() {
        3 | 6 => (hex, None),
        4 => (&hex[..3], Some(u8::from_str_radix(&hex[3..], 16).ok()? * 17)),
        8 => (&hex[..6], Some(u8::from_str_radix(&hex[6..], 16).ok()?)),
        _ => return None,
    };
    let c = Srgb::<u8>::from_str(rgb).ok()?;
    Some(Srgba::new(c.red, c.green, c.blue, a.unwrap_or(255)))
}

fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    if close < open {
        return None;
    }
    Some((s[..open].trim(), &s[open + 1..close]))
}

fn channel(p: &str) -> Option<u8> {
    if let Some(pct) = p.strip_suffix('%') {
        let v: f32 = pct.parse().ok()?;
        return Some((v.clamp(0.0, 100.0) * 2.55).round() as u8);
    }
    let v: f32 = p.parse().ok()?;
    Some(v.clamp(0.0, 255.0).round() as u8)
}

fn alpha(p: &str) -> Option<u8> {
    let v = match p.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok()? / 100.0,
        None => p.parse::<f32>().ok()?,
    };
    Some((v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn percent(p: &str) -> Option<f32> {
    let v: f32 = p.trim_end_matches('%').parse().ok()?;
    Some((v / 100.0).clamp(0.0, 1.0))
}

/// A colour stop with its position along the gradient line in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub color: Rgba,
    pub position: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Solid(Rgba),
    LinearGradient { angle_deg: f32, stops: Vec<ColorStop> },
}

/// Parse an editor background value: a colour or a `linear-gradient(...)`.
pub fn parse_background(input: &str) -> Result<Background> {
    let s = input.trim();
    let lower = s.to_ascii_lowercase();
    if !lower.starts_with("linear-gradient") {
        return parse_color(s).map(Background::Solid);
    }

    let (_, args) = split_function(s).ok_or_else(|| bad_color(input))?;
    let mut parts = split_top_level(args);
    if parts.is_empty() {
        return Err(bad_color(input));
    }

    let mut angle_deg = 180.0;
    if let Some(angle) = parse_angle(parts[0]) {
        angle_deg = angle;
        parts.remove(0);
    }
    if parts.len() < 2 {
        return Err(bad_color(input));
    }

    let mut raw: Vec<(Rgba, Option<f32>)> = Vec::with_capacity(parts.len());
    for part in parts {
        let (color, pos) = match part.rfind(|c: char| c.is_whitespace()) {
            Some(idx) if part[idx..].trim().ends_with('%') => {
                let pos = percent(part[idx..].trim());
                (parse_color(&part[..idx])?, pos)
            }
            _ => (parse_color(part)?, None),
        };
        raw.push((color, pos));
    }

    let last = raw.len() - 1;
    let stops = raw
        .iter()
        .enumerate()
        .map(|(i, (color, pos))| ColorStop {
            color: *color,
            position: pos.unwrap_or(i as f32 / last as f32),
        })
        .collect();

    Ok(Background::LinearGradient { angle_deg, stops })
}

fn parse_angle(part: &str) -> Option<f32> {
    let p = part.trim().to_ascii_lowercase();
    if let Some(deg) = p.strip_suffix("deg") {
        return deg.trim().parse().ok();
    }
    let angle = match p.as_str() {
        "to top" => 0.0,
        "to right" => 90.0,
        "to bottom" => 180.0,
        "to left" => 270.0,
        "to top right" | "to right top" => 45.0,
        "to bottom right" | "to right bottom" => 135.0,
        "to bottom left" | "to left bottom" => 225.0,
        "to top left" | "to left top" => 315.0,
        _ => return None,
    };
    Some(angle)
}

fn split_top_level(args: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                out.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = args[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_functions() {
        assert_eq!(parse_color("#f5f5f5").unwrap(), Srgba::new(245, 245, 245, 255));
        assert_eq!(parse_color("#fff").unwrap(), Srgba::new(255, 255, 255, 255));
        assert_eq!(parse_color("#0000ff80").unwrap(), Srgba::new(0, 0, 255, 128));
        assert_eq!(parse_color("#f008").unwrap(), Srgba::new(255, 0, 0, 136));
        assert_eq!(
            parse_color("rgba(224, 242, 254, 0.8)").unwrap(),
            Srgba::new(224, 242, 254, 204)
        );
        assert_eq!(parse_color("hsla(0, 100%, 50%, 1)").unwrap(), Srgba::new(255, 0, 0, 255));
        assert_eq!(parse_color("hsl(240deg 100% 50%)").unwrap(), Srgba::new(0, 0, 255, 255));
        assert!(parse_color("chartreuse-ish").is_err());
        assert!(parse_color("#12345").is_err());
    }

    #[test]
    fn named_colours_come_from_the_css_table() {
        assert_eq!(parse_color("White").unwrap(), Srgba::new(255, 255, 255, 255));
        assert_eq!(parse_color("rebeccapurple").unwrap(), Srgba::new(102, 51, 153, 255));
        assert_eq!(parse_color("transparent").unwrap(), transparent());
    }

    #[test]
    fn parses_editor_gradient_presets() {
        let bg = parse_background("linear-gradient(90deg, #E3E6E3 0%, #CBD5CD 100%)").unwrap();
        match &bg {
            Background::LinearGradient { angle_deg, stops } => {
                assert_eq!(*angle_deg, 90.0);
                assert_eq!(stops.len(), 2);
                assert_eq!(stops[0].color, Srgba::new(0xE3, 0xE6, 0xE3, 255));
                assert_eq!(stops[1].color, Srgba::new(0xCB, 0xD5, 0xCD, 255));
                assert_eq!(stops[1].position, 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }

        let ocean = parse_background(
            "linear-gradient(90deg, hsla(186, 33%, 94%, 1) 0%, hsla(216, 41%, 79%, 1) 100%)",
        )
        .unwrap();
        assert!(matches!(ocean, Background::LinearGradient { .. }));
    }

    #[test]
    fn stops_without_positions_are_spread_evenly() {
        let bg = parse_background("linear-gradient(to right, red, #00ff00, blue)").unwrap();
        if let Background::LinearGradient { angle_deg, stops } = bg {
            assert_eq!(angle_deg, 90.0);
            assert_eq!(stops[0].color, Srgba::new(255, 0, 0, 255));
            assert_eq!(stops[1].position, 0.5);
        } else {
            panic!("expected a gradient");
        }
        assert!(parse_background("linear-gradient(to right, #f00)").is_err());
    }
}
