/// Paint command list produced from a laid-out surface

use crate::rendering::color::{self, parse_background, parse_color, Background, Rgba};
use crate::rendering::fonts::FontFace;
use crate::rendering::layout::{ElementType, LayoutNode};
use crate::rendering::surface::EditorSurface;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Fill the whole canvas. `motion` is the animation position in `0..=1`
    /// when the gradient is animated.
    Background {
        background: Background,
        motion: Option<f32>,
    },
    /// Vertical alpha wash from `top` to `bottom` over the whole canvas
    VerticalWash { top: Rgba, bottom: Rgba },
    RoundedRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        radius: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        face: FontFace,
        font_px: u32,
        line_height: u32,
        rgba: Rgba,
    },
    Image {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        pixels: image::RgbaImage,
        tint: Option<Rgba>,
    },
}

/// Triangle wave over `phase` in `0..1`, matching an `alternate` CSS animation.
pub fn motion_position(phase: f32) -> f32 {
    let p = phase.rem_euclid(1.0);
    if p < 0.5 {
        p * 2.0
    } else {
        2.0 - p * 2.0
    }
}

/// Build paint commands. `phase` is ignored unless the surface is in motion.
pub fn paint_surface(surface: &EditorSurface, nodes: &[LayoutNode], phase: f32) -> Result<Vec<PaintCommand>> {
    let background = parse_background(&surface.background)?;
    let mut cmds = Vec::with_capacity(nodes.len() + 2);

    let is_solid = matches!(background, Background::Solid(_));
    let motion = match background {
        Background::LinearGradient { .. } if surface.gradient_motion => Some(motion_position(phase)),
        _ => None,
    };
    cmds.push(PaintCommand::Background { background, motion });
    if is_solid {
        // The card's `from-white/80 to-transparent` image sits above a solid colour
        cmds.push(PaintCommand::VerticalWash {
            top: Rgba::new(255, 255, 255, 204),
            bottom: color::transparent(),
        });
    }

    for node in nodes {
        let r = &node.lb.rect;
        match node.elem_type {
            ElementType::Logo => {
                let Some(logo) = &surface.logo else { continue };
                let Some(pixels) = &logo.pixels else {
                    log::debug!("logo has no pixels loaded, skipping");
                    continue;
                };
                let tint = match &logo.color {
                    Some(c) => Some(parse_color(c)?),
                    None => None,
                };
                cmds.push(PaintCommand::Image {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                    pixels: pixels.clone(),
                    tint,
                });
            }
            ElementType::Title => cmds.push(PaintCommand::Text {
                x: r.x,
                y: r.y,
                text: node.text.clone(),
                face: node.face,
                font_px: node.font_px,
                line_height: node.line_height,
                rgba: color::slate_800(),
            }),
            ElementType::Pill(i) => {
                let fill = parse_color(&surface.pills[i].background)?;
                cmds.push(PaintCommand::RoundedRect {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                    radius: r.height / 2,
                    rgba: fill,
                });
                let (tx, ty) = node.lb.content_origin();
                cmds.push(PaintCommand::Text {
                    x: tx,
                    y: ty,
                    text: node.text.clone(),
                    face: node.face,
                    font_px: node.font_px,
                    line_height: node.line_height,
                    rgba: color::slate_700(),
                });
            }
        }
    }

    Ok(cmds)
}
