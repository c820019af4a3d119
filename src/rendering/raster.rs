/// Rasterizer for paint commands, drawn with tiny-skia

use crate::rendering::color::{Background, Rgba};
use crate::rendering::fonts::{FontBook, FontFace};
use crate::rendering::paint::PaintCommand;
use crate::rendering::Snapshot;
use crate::{Error, Result};
use image::{Rgba as Px, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, GradientStop, IntSize, LinearGradient, Mask, Paint, Path,
    PathBuilder, Pixmap, PixmapPaint, Point, Rect, Shader, SpreadMode, Transform,
};

/// Kappa for approximating a quarter circle with one cubic.
const KAPPA: f32 = 0.552_284_8;

/// Rasterize `cmds` onto a `width x height` CSS-pixel canvas scaled by
/// `pixel_ratio`.
pub fn rasterize(
    width: u32,
    height: u32,
    pixel_ratio: f32,
    cmds: &[PaintCommand],
    fonts: &FontBook,
) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::Capture("surface has zero size".into()));
    }
    if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
        return Err(Error::Capture(format!("invalid pixel ratio {}", pixel_ratio)));
    }
    let pw = ((width as f32) * pixel_ratio).round().max(1.0) as u32;
    let ph = ((height as f32) * pixel_ratio).round().max(1.0) as u32;
    let mut pixmap =
        Pixmap::new(pw, ph).ok_or_else(|| Error::Capture(format!("cannot allocate a {}x{} canvas", pw, ph)))?;
    // Commands are in CSS pixels; the transform maps them to device pixels
    let ts = Transform::from_scale(pixel_ratio, pixel_ratio);
    let (w, h) = (width as f32, height as f32);

    for cmd in cmds {
        match cmd {
            PaintCommand::Background { background, motion } => {
                fill_background(&mut pixmap, ts, w, h, background, *motion)
            }
            PaintCommand::VerticalWash { top, bottom } => {
                let stops = vec![GradientStop::new(0.0, color(*top)), GradientStop::new(1.0, color(*bottom))];
                if let Some(shader) = LinearGradient::new(
                    Point::from_xy(0.0, 0.0),
                    Point::from_xy(0.0, h),
                    stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                ) {
                    fill_canvas(&mut pixmap, ts, w, h, shader);
                }
            }
            PaintCommand::RoundedRect { x, y, width, height, radius, rgba } => {
                let path = rounded_rect(*x as f32, *y as f32, *width as f32, *height as f32, *radius as f32);
                if let Some(path) = path {
                    let mut paint = Paint::default();
                    paint.set_color(color(*rgba));
                    paint.anti_alias = true;
                    pixmap.fill_path(&path, &paint, FillRule::Winding, ts, None);
                }
            }
            PaintCommand::Text { x, y, text, face, font_px, line_height, rgba } => draw_text(
                &mut pixmap,
                fonts,
                *face,
                *x as f32 * pixel_ratio,
                *y as f32 * pixel_ratio,
                text,
                *font_px as f32 * pixel_ratio,
                *line_height as f32 * pixel_ratio,
                *rgba,
            ),
            PaintCommand::Image { x, y, width, height, pixels, tint } => draw_image(
                &mut pixmap,
                ts,
                Rect::from_xywh(*x as f32, *y as f32, *width as f32, *height as f32),
                pixels,
                *tint,
            )?,
        }
    }

    Ok(to_rgba_image(&pixmap))
}

/// Encode an RGBA canvas as PNG. `quality` in `0..=1` picks the
/// compression effort; the output is lossless either way.
pub fn encode_png(img: &RgbaImage, quality: f32) -> Result<Snapshot> {
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};
    use image::ImageEncoder;

    let compression = if quality >= 0.75 {
        CompressionType::Best
    } else if quality >= 0.25 {
        CompressionType::Default
    } else {
        CompressionType::Fast
    };
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(Snapshot {
        width: img.width(),
        height: img.height(),
        png_data: out,
    })
}

fn color(c: Rgba) -> Color {
    Color::from_rgba8(c.red, c.green, c.blue, c.alpha)
}

fn fill_canvas(pixmap: &mut Pixmap, ts: Transform, w: f32, h: f32, shader: Shader) {
    let Some(rect) = Rect::from_xywh(0.0, 0.0, w, h) else { return };
    let paint = Paint {
        shader,
        anti_alias: false,
        ..Paint::default()
    };
    pixmap.fill_rect(rect, &paint, ts, None);
}

fn fill_background(pixmap: &mut Pixmap, ts: Transform, w: f32, h: f32, background: &Background, motion: Option<f32>) {
    match background {
        Background::Solid(c) => pixmap.fill(color(*c)),
        Background::LinearGradient { angle_deg, stops } => {
            // CSS gradient line: 0deg points up, 90deg points right, and the
            // line is long enough for the corners to hit the end stops
            let rad = angle_deg.to_radians();
            let (dx, dy) = (rad.sin(), -rad.cos());
            let len = (w * dx.abs() + h * dy.abs()).max(1.0);
            let (sx, sy) = (w / 2.0 - dx * len / 2.0, h / 2.0 - dy * len / 2.0);
            let (vx, vy) = (dx * len, dy * len);

            // `background-size: 400%` slides a quarter-length window along
            // a line four times as long
            let (from, to) = match motion {
                Some(pos) => (-3.0 * pos, 4.0 - 3.0 * pos),
                None => (0.0, 1.0),
            };
            let stops: Vec<GradientStop> =
                stops.iter().map(|s| GradientStop::new(s.position, color(s.color))).collect();
            let shader = LinearGradient::new(
                Point::from_xy(sx + vx * from, sy + vy * from),
                Point::from_xy(sx + vx * to, sy + vy * to),
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            );
            match shader {
                Some(shader) => fill_canvas(pixmap, ts, w, h, shader),
                None => log::warn!("degenerate gradient at {}deg, background left empty", angle_deg),
            }
        }
    }
}

fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let k = r * KAPPA;
    let (right, bottom) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Draw `text` line by line with each line vertically centred in its
/// `line_height` box. Coordinates are device pixels.
#[allow(clippy::too_many_arguments)]
fn draw_text(
    pixmap: &mut Pixmap,
    fonts: &FontBook,
    face: FontFace,
    x: f32,
    y: f32,
    text: &str,
    font_px: f32,
    line_height: f32,
    rgba: Rgba,
) {
    let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else { return };
    let (mw, mh) = (pixmap.width() as i32, pixmap.height() as i32);
    let (ascent, descent) = fonts.line_metrics(face, font_px);
    let half_leading = (line_height - (ascent - descent)) / 2.0;

    let coverage = mask.data_mut();
    let mut inked = false;
    for (row, line) in text.lines().enumerate() {
        let baseline = y + row as f32 * line_height + half_leading + ascent;
        for glyph in fonts.layout_line(face, font_px, x, baseline, line) {
            let Some(bb) = glyph.pixel_bounding_box() else { continue };
            glyph.draw(|gx, gy, v| {
                let (px, py) = (bb.min.x + gx as i32, bb.min.y + gy as i32);
                if px < 0 || py < 0 || px >= mw || py >= mh {
                    return;
                }
                let idx = (py * mw + px) as usize;
                let v = (v * 255.0).round().clamp(0.0, 255.0) as u8;
                coverage[idx] = coverage[idx].max(v);
            });
            inked = true;
        }
    }
    if !inked {
        return;
    }

    let Some(rect) = Rect::from_xywh(0.0, 0.0, mw as f32, mh as f32) else { return };
    let mut paint = Paint::default();
    paint.set_color(color(rgba));
    pixmap.fill_rect(rect, &paint, Transform::identity(), Some(&mask));
}

/// `object-contain` the logo in `dest`, optionally replacing its colour
/// while keeping its alpha.
fn draw_image(
    pixmap: &mut Pixmap,
    ts: Transform,
    dest: Option<Rect>,
    pixels: &RgbaImage,
    tint: Option<Rgba>,
) -> Result<()> {
    let Some(dest) = dest else { return Ok(()) };
    let Some(size) = IntSize::from_wh(pixels.width(), pixels.height()) else { return Ok(()) };

    let mut data = Vec::with_capacity(pixels.as_raw().len());
    for p in pixels.pixels() {
        let [r, g, b, a] = p.0;
        let (r, g, b) = match tint {
            Some(t) => (t.red, t.green, t.blue),
            None => (r, g, b),
        };
        let c = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let logo = Pixmap::from_vec(data, size).ok_or_else(|| Error::Capture("logo pixels do not fit".into()))?;

    let (lw, lh) = (size.width() as f32, size.height() as f32);
    let fit = (dest.width() / lw).min(dest.height() / lh);
    let ox = dest.x() + (dest.width() - lw * fit) / 2.0;
    let oy = dest.y() + (dest.height() - lh * fit) / 2.0;
    let placement = ts.pre_translate(ox, oy).pre_scale(fit, fit);
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, logo.as_ref(), &paint, placement, None);
    Ok(())
}

/// Demultiply the canvas into straight-alpha RGBA.
fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Px([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}
