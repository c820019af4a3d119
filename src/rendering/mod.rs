//! Rendering of the editor surface to a bitmap
//!
//! Pipeline: [`layout::layout_surface`] -> [`paint::paint_surface`] ->
//! [`raster::rasterize`] -> [`raster::encode_png`].

pub mod color;
pub mod fonts;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod surface;

pub use surface::{EditorSurface, Logo, Pill, TitleSize};

/// A captured still: PNG bytes plus their pixel dimensions.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Snapshot {
    /// `data:image/png;base64,...`
    pub fn to_data_uri(&self) -> String {
        use base64::Engine as _;
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }

    /// SHA-256 of the PNG bytes, hex encoded. Used for golden comparisons.
    pub fn digest_hex(&self) -> String {
        use sha2::{Digest, Sha256};
        hex::encode(Sha256::digest(&self.png_data))
    }
}

/// Lay out, paint and rasterize `surface` at `pixel_ratio`, returning PNG bytes.
///
/// `phase` positions an animated gradient within its loop (`0..1`).
pub fn render_surface(
    surface: &EditorSurface,
    pixel_ratio: f32,
    quality: f32,
    phase: f32,
) -> crate::Result<Snapshot> {
    let fonts = fonts::shared()?;
    let nodes = layout::layout_surface(surface, fonts);
    let cmds = paint::paint_surface(surface, &nodes, phase)?;
    let canvas = raster::rasterize(surface.width, surface.height, pixel_ratio, &cmds, fonts)?;
    raster::encode_png(&canvas, quality)
}
