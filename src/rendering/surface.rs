//! The editor surface: everything the capturer needs to draw a job post.

use crate::template::Template;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Title size presets offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TitleSize {
    #[serde(rename = "3xl")]
    Xl3,
    #[default]
    #[serde(rename = "4xl")]
    Xl4,
    #[serde(rename = "5xl")]
    Xl5,
    #[serde(rename = "6xl")]
    Xl6,
}

impl TitleSize {
    /// CSS pixel font size (`1.875rem`, `2.25rem`, `3rem`, `3.75rem`).
    pub fn font_px(self) -> u32 {
        match self {
            TitleSize::Xl3 => 30,
            TitleSize::Xl4 => 36,
            TitleSize::Xl5 => 48,
            TitleSize::Xl6 => 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pill {
    pub id: u32,
    pub text: String,
    #[serde(default = "default_pill_font")]
    pub font: String,
    #[serde(default = "default_pill_background")]
    pub background: String,
}

fn default_pill_font() -> String {
    "Inter".to_string()
}

fn default_pill_background() -> String {
    "#f3f4f6".to_string()
}

/// A positioned company logo.
///
/// `pixels` is filled by whoever mounts the surface (the CLI loads `path`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logo {
    #[serde(skip)]
    pub pixels: Option<image::RgbaImage>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Drag offset from the centred position, in CSS pixels
    #[serde(default)]
    pub offset_x: i32,
    #[serde(default)]
    pub offset_y: i32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Optional tint applied to opaque logo pixels
    #[serde(default)]
    pub color: Option<String>,
}

fn default_scale() -> f32 {
    1.0
}

impl Logo {
    /// Base box edge in CSS pixels (`w-20 h-20`).
    pub const BASE_SIZE: u32 = 80;

    pub fn from_pixels(pixels: image::RgbaImage) -> Self {
        Self {
            pixels: Some(pixels),
            path: None,
            offset_x: 0,
            offset_y: 0,
            scale: 1.0,
            color: None,
        }
    }

    /// Decode the image at `path` (PNG or JPEG), resolving a relative path
    /// against `base_dir`. A logo without a path is left as is.
    pub fn load_pixels(&mut self, base_dir: Option<&Path>) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let path = match base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        let pixels = image::open(&path)
            .map_err(|e| Error::Capture(format!("loading logo {}: {}", path.display(), e)))?
            .to_rgba8();
        log::debug!("loaded {}x{} logo from {}", pixels.width(), pixels.height(), path.display());
        self.pixels = Some(pixels);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSurface {
    /// Canvas size in CSS pixels; normally taken from the template via
    /// [`EditorSurface::resize_to`]
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default = "default_background")]
    pub background: String,
    /// Background gradient is animated; the sole signal for GIF capture.
    #[serde(default)]
    pub gradient_motion: bool,
    #[serde(default = "default_job_title")]
    pub job_title: String,
    #[serde(default = "default_title_font")]
    pub job_title_font: String,
    #[serde(default)]
    pub job_title_size: TitleSize,
    /// Drag offset of the title block from centre, in CSS pixels
    #[serde(default)]
    pub content_offset: (i32, i32),
    #[serde(default)]
    pub pills: Vec<Pill>,
    #[serde(default)]
    pub logo: Option<Logo>,
}

fn default_title_font() -> String {
    "Playfair Display".to_string()
}

fn default_background() -> String {
    "#f5f5f5".to_string()
}

fn default_job_title() -> String {
    "Design Chief of Staff".to_string()
}

impl EditorSurface {
    /// The editor's initial state sized for `template`.
    pub fn for_template(template: &Template) -> Self {
        Self {
            width: template.width,
            height: template.height,
            background: default_background(),
            gradient_motion: false,
            job_title: default_job_title(),
            job_title_font: default_title_font(),
            job_title_size: TitleSize::default(),
            content_offset: (0, 0),
            pills: vec![
                Pill {
                    id: 1,
                    text: "PARIS / REMOTE".to_string(),
                    font: default_pill_font(),
                    background: default_pill_background(),
                },
                Pill {
                    id: 2,
                    text: "UX/UI DESIGN".to_string(),
                    font: default_pill_font(),
                    background: default_pill_background(),
                },
            ],
            logo: None,
        }
    }

    /// Resize the canvas to another template, keeping the content.
    pub fn resize_to(&mut self, template: &Template) {
        self.width = template.width;
        self.height = template.height;
    }

    pub fn has_motion(&self) -> bool {
        self.gradient_motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_editor() {
        let t = crate::template::template("instagram-story").unwrap();
        let s = EditorSurface::for_template(t);
        assert_eq!((s.width, s.height), (1080, 1920));
        assert_eq!(s.pills.len(), 2);
        assert_eq!(s.job_title_size.font_px(), 36);
        assert!(!s.has_motion());
    }

    #[test]
    fn deserializes_editor_json() {
        let json = r##"{
            "width": 1200, "height": 627,
            "background": "linear-gradient(90deg, #F6F4F8 0%, #E2DDE7 100%)",
            "gradientMotion": true,
            "jobTitle": "Staff Engineer",
            "jobTitleSize": "5xl",
            "pills": [{"id": 1, "text": "BERLIN"}]
        }"##;
        let s: EditorSurface = serde_json::from_str(json).unwrap();
        assert!(s.has_motion());
        assert_eq!(s.job_title_size, TitleSize::Xl5);
        assert_eq!(s.pills[0].background, "#f3f4f6");
        assert_eq!(s.job_title_font, "Playfair Display");
    }

    #[test]
    fn sparse_json_is_sized_by_the_template() {
        let mut s: EditorSurface = serde_json::from_str(r#"{"pills": []}"#).unwrap();
        assert_eq!((s.width, s.height), (0, 0));
        assert_eq!(s.background, "#f5f5f5");
        assert_eq!(s.job_title, "Design Chief of Staff");

        s.resize_to(crate::template::template("linkedin-post").unwrap());
        assert_eq!((s.width, s.height), (1200, 627));
        assert!(crate::rendering::render_surface(&s, 1.0, 0.5, 0.0).is_ok());
    }

    #[test]
    fn jpeg_logo_is_loaded_relative_to_the_surface() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = image::RgbImage::from_pixel(16, 8, image::Rgb([200, 30, 30]));
        jpeg.save(dir.path().join("logo.jpg")).unwrap();

        let mut logo: Logo = serde_json::from_str(r#"{"path": "logo.jpg", "scale": 0.5}"#).unwrap();
        assert!(logo.pixels.is_none());
        logo.load_pixels(Some(dir.path())).unwrap();
        let pixels = logo.pixels.as_ref().unwrap();
        assert_eq!(pixels.dimensions(), (16, 8));
        assert_eq!(pixels.get_pixel(8, 4).0[3], 255);
    }

    #[test]
    fn missing_logo_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut logo: Logo = serde_json::from_str(r#"{"path": "nope.png"}"#).unwrap();
        assert!(logo.load_pixels(Some(dir.path())).is_err());

        let mut bare = Logo::from_pixels(image::RgbaImage::new(2, 2));
        bare.load_pixels(None).unwrap();
        assert!(bare.pixels.is_some());
    }
}
