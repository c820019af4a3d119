/// Block layout for the editor surface.
///
/// Mirrors the editor's centred flex column: optional logo, then the title
/// block (heading followed by a wrapped row of pills). All units are CSS
/// pixels; the rasterizer applies the device pixel ratio.

use crate::rendering::fonts::{FontBook, FontFace};
use crate::rendering::surface::{EditorSurface, Logo};

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub padding_x: u32,
    pub padding_y: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_origin(&self) -> (i32, i32) {
        (
            self.rect.x + self.box_model.padding_x as i32,
            self.rect.y + self.box_model.padding_y as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Logo,
    Title,
    /// Index into `EditorSurface::pills`
    Pill(usize),
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    /// Wrapped text, one line per `\n`
    pub text: String,
    pub elem_type: ElementType,
    pub face: FontFace,
    pub font_px: u32,
    pub line_height: u32,
}

/// `p-8` around the content column
const CONTENT_PADDING: u32 = 32;
/// `space-y-6` between heading and pills
const TITLE_GAP: u32 = 24;
/// `gap-3` between pills
const PILL_GAP: u32 = 12;
/// `text-sm`
const PILL_FONT: u32 = 14;
const PILL_LINE: u32 = 20;
const PILL_PAD_X: u32 = 16;
const PILL_PAD_Y: u32 = 6;

fn text_width(fonts: &FontBook, face: FontFace, font_px: u32, text: &str) -> u32 {
    text.lines()
        .map(|l| fonts.text_width(face, font_px as f32, l))
        .fold(0.0, f32::max)
        .ceil() as u32
}

/// Lay out the surface. Returns nodes in paint order.
pub fn layout_surface(surface: &EditorSurface, fonts: &FontBook) -> Vec<LayoutNode> {
    let avail = surface.width.saturating_sub(CONTENT_PADDING * 2).max(1);
    let center_x = surface.width as i32 / 2;

    // Title
    let title_face = FontFace::for_family(&surface.job_title_font);
    let font_px = surface.job_title_size.font_px();
    let line_height = (font_px as f32 * 1.25).round() as u32;
    let title_lines = fonts.wrap(title_face, font_px as f32, &surface.job_title, avail as f32);
    let title_text = title_lines.join("\n");
    let title_h = title_lines.len() as u32 * line_height;
    let title_w = text_width(fonts, title_face, font_px, &title_text);

    // Pills, wrapped into centred rows
    let mut rows: Vec<Vec<(usize, FontFace, u32)>> = Vec::new();
    let mut row_w = 0u32;
    for (i, pill) in surface.pills.iter().enumerate() {
        let face = FontFace::for_family(&pill.font);
        let w = (text_width(fonts, face, PILL_FONT, &pill.text) + PILL_PAD_X * 2).min(avail);
        let needed = if row_w == 0 { w } else { row_w + PILL_GAP + w };
        match rows.last_mut() {
            Some(row) if needed <= avail => {
                row.push((i, face, w));
                row_w = needed;
            }
            _ => {
                rows.push(vec![(i, face, w)]);
                row_w = w;
            }
        }
    }
    let pill_h = PILL_LINE + PILL_PAD_Y * 2;
    let pills_h = if rows.is_empty() {
        0
    } else {
        rows.len() as u32 * pill_h + (rows.len() as u32 - 1) * PILL_GAP
    };

    let block_h = title_h + if rows.is_empty() { 0 } else { TITLE_GAP + pills_h };
    let logo_size = surface
        .logo
        .as_ref()
        .map(|l| (Logo::BASE_SIZE as f32 * l.scale.max(0.0)).round() as u32)
        .unwrap_or(0);
    let total_h = logo_size + block_h;
    let top = ((surface.height as i32 - total_h as i32) / 2).max(CONTENT_PADDING as i32);

    let mut nodes = Vec::new();
    let mut y = top;

    if let Some(logo) = &surface.logo {
        nodes.push(LayoutNode {
            lb: LayoutBox {
                rect: Rect {
                    x: center_x - logo_size as i32 / 2 + logo.offset_x,
                    y: y + logo.offset_y,
                    width: logo_size,
                    height: logo_size,
                },
                box_model: BoxModel { padding_x: 0, padding_y: 0 },
            },
            text: String::new(),
            elem_type: ElementType::Logo,
            face: FontFace::Sans,
            font_px: 0,
            line_height: 0,
        });
        y += logo_size as i32;
    }

    let (dx, dy) = surface.content_offset;
    if !title_text.is_empty() {
        nodes.push(LayoutNode {
            lb: LayoutBox {
                rect: Rect {
                    x: center_x - title_w as i32 / 2 + dx,
                    y: y + dy,
                    width: title_w,
                    height: title_h,
                },
                box_model: BoxModel { padding_x: 0, padding_y: 0 },
            },
            text: title_text,
            elem_type: ElementType::Title,
            face: title_face,
            font_px,
            line_height,
        });
        y += title_h as i32 + TITLE_GAP as i32;
    }

    for row in rows {
        let row_w: u32 =
            row.iter().map(|(_, _, w)| *w).sum::<u32>() + PILL_GAP * (row.len() as u32 - 1);
        let mut x = center_x - row_w as i32 / 2;
        for (i, face, w) in row {
            nodes.push(LayoutNode {
                lb: LayoutBox {
                    rect: Rect {
                        x: x + dx,
                        y: y + dy,
                        width: w,
                        height: pill_h,
                    },
                    box_model: BoxModel {
                        padding_x: PILL_PAD_X,
                        padding_y: PILL_PAD_Y,
                    },
                },
                text: surface.pills[i].text.clone(),
                elem_type: ElementType::Pill(i),
                face,
                font_px: PILL_FONT,
                line_height: PILL_LINE,
            });
            x += w as i32 + PILL_GAP as i32;
        }
        y += (pill_h + PILL_GAP) as i32;
    }

    nodes
}
