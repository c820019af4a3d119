//! Embedded typefaces and text measurement.
//!
//! The editor picks web fonts by family name. Each family resolves to one of
//! three embedded DejaVu faces by its generic class (serif, sans, monospace).

use crate::{Error, Result};
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::sync::OnceLock;

static SANS_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static SERIF_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSerif.ttf");
static MONO_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

const SERIF_FAMILIES: &[&str] = &[
    "playfair display",
    "georgia",
    "times",
    "times new roman",
    "merriweather",
    "lora",
    "libre baskerville",
    "garamond",
    "eb garamond",
];

const MONO_FAMILIES: &[&str] = &[
    "courier",
    "courier new",
    "consolas",
    "menlo",
    "monaco",
    "fira code",
    "jetbrains mono",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Sans,
    Serif,
    Mono,
}

impl FontFace {
    /// Resolve a CSS font family (first entry of a family list) to a face.
    pub fn for_family(family: &str) -> FontFace {
        let first = family.split(',').next().unwrap_or_default();
        let name = first
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_ascii_lowercase();

        if MONO_FAMILIES.contains(&name.as_str()) || name.contains("mono") {
            FontFace::Mono
        } else if SERIF_FAMILIES.contains(&name.as_str()) || (name.contains("serif") && !name.contains("sans")) {
            FontFace::Serif
        } else {
            FontFace::Sans
        }
    }
}

pub struct FontBook {
    sans: Font<'static>,
    serif: Font<'static>,
    mono: Font<'static>,
}

impl FontBook {
    /// Parse the embedded faces.
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            sans: load("DejaVuSans", SANS_TTF)?,
            serif: load("DejaVuSerif", SERIF_TTF)?,
            mono: load("DejaVuSansMono", MONO_TTF)?,
        })
    }

    pub fn font(&self, face: FontFace) -> &Font<'static> {
        match face {
            FontFace::Sans => &self.sans,
            FontFace::Serif => &self.serif,
            FontFace::Mono => &self.mono,
        }
    }

    /// rusttype scales by ascent-to-descent height; CSS `font-size` is the em.
    pub fn scale(&self, face: FontFace, font_px: f32) -> Scale {
        let font = self.font(face);
        let vm = font.v_metrics_unscaled();
        let em = font.units_per_em().max(1) as f32;
        Scale::uniform(font_px * (vm.ascent - vm.descent) / em)
    }

    /// Advance width of a single line of `text` at `font_px`.
    pub fn text_width(&self, face: FontFace, font_px: f32, text: &str) -> f32 {
        let font = self.font(face);
        font.layout(text, self.scale(face, font_px), point(0.0, 0.0))
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .fold(0.0, f32::max)
    }

    /// Glyphs of one line with the pen starting at `(x, baseline)`.
    pub fn layout_line(
        &self,
        face: FontFace,
        font_px: f32,
        x: f32,
        baseline: f32,
        text: &str,
    ) -> Vec<PositionedGlyph<'static>> {
        self.font(face)
            .layout(text, self.scale(face, font_px), point(x, baseline))
            .collect()
    }

    /// Ascent and descent (negative) in pixels at `font_px`.
    pub fn line_metrics(&self, face: FontFace, font_px: f32) -> (f32, f32) {
        let vm = self.font(face).v_metrics(self.scale(face, font_px));
        (vm.ascent, vm.descent)
    }

    /// Greedy word wrap so that no line is wider than `max_width` pixels,
    /// unless a single word already is.
    pub fn wrap(&self, face: FontFace, font_px: f32, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut cur = String::new();
        for word in text.split_whitespace() {
            if cur.is_empty() {
                cur.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", cur, word);
            if self.text_width(face, font_px, &candidate) > max_width {
                lines.push(std::mem::replace(&mut cur, word.to_string()));
            } else {
                cur = candidate;
            }
        }
        if !cur.is_empty() {
            lines.push(cur);
        }
        lines
    }
}

fn load(name: &str, bytes: &'static [u8]) -> Result<Font<'static>> {
    Font::try_from_bytes(bytes).ok_or_else(|| Error::Capture(format!("embedded font {} is unreadable", name)))
}

/// Process-wide font book, parsed on first use.
pub fn shared() -> Result<&'static FontBook> {
    static BOOK: OnceLock<std::result::Result<FontBook, String>> = OnceLock::new();
    BOOK.get_or_init(|| FontBook::embedded().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| Error::Capture(e.clone()))
}
