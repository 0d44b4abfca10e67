//! Shape generation for 2D primitives
//!
//! Everything here works in screen pixels (origin top-left, y down). The
//! pipeline maps the result to clip space.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use super::atlas::{Atlas, UvRect};
use super::canvas::{Color, DrawCommand, DrawList};
use super::vertex::Vertex;
use crate::rotate_ccw;
use crate::sim::Rect;

/// Segments per quarter circle on rounded corners
const CORNER_SEGMENTS: u32 = 6;

/// Two triangles over corners given clockwise from top-left
fn quad(corners: [Vec2; 4], uvs: [[f32; 2]; 4], color: [f32; 4]) -> [Vertex; 6] {
    let v = |i: usize| Vertex::new(corners[i].x, corners[i].y, uvs[i], color);
    [v(0), v(1), v(2), v(0), v(2), v(3)]
}

/// Axis-aligned solid rectangle sampling a single texel region
fn solid_rect(rect: Rect, uv: [f32; 2], color: [f32; 4]) -> [Vertex; 6] {
    let corners = [
        Vec2::new(rect.left(), rect.top()),
        Vec2::new(rect.right(), rect.top()),
        Vec2::new(rect.right(), rect.bottom()),
        Vec2::new(rect.left(), rect.bottom()),
    ];
    quad(corners, [uv; 4], color)
}

/// Textured quad of `size` centered on `center`, rotated counter-clockwise
pub fn sprite(center: Vec2, size: Vec2, angle: f32, uv: UvRect, color: [f32; 4]) -> [Vertex; 6] {
    let half = size / 2.0;
    let offsets = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ];
    let corners = offsets.map(|o| center + rotate_ccw(o, angle));
    let uvs = [[uv.u0, uv.v0], [uv.u1, uv.v0], [uv.u1, uv.v1], [uv.u0, uv.v1]];
    quad(corners, uvs, color)
}

/// Quarter ring band around `center` from `start` to `start + PI/2`
fn corner_band(
    center: Vec2,
    inner: f32,
    outer: f32,
    start: f32,
    uv: [f32; 2],
    color: [f32; 4],
    out: &mut Vec<Vertex>,
) {
    for i in 0..CORNER_SEGMENTS {
        let t1 = start + FRAC_PI_2 * i as f32 / CORNER_SEGMENTS as f32;
        let t2 = start + FRAC_PI_2 * (i + 1) as f32 / CORNER_SEGMENTS as f32;
        let dir1 = Vec2::new(t1.cos(), t1.sin());
        let dir2 = Vec2::new(t2.cos(), t2.sin());
        let corners = [
            center + dir1 * inner,
            center + dir1 * outer,
            center + dir2 * outer,
            center + dir2 * inner,
        ];
        out.extend(quad(corners, [uv; 4], color));
    }
}

/// Rounded rectangle outline; the stroke lies inside `rect`
///
/// Radius and stroke are both limited to half the shorter side.
pub fn rounded_rect_outline(
    rect: Rect,
    width: f32,
    radius: f32,
    uv: [f32; 2],
    color: [f32; 4],
) -> Vec<Vertex> {
    let half_side = rect.w.min(rect.h) / 2.0;
    let r = radius.clamp(0.0, half_side);
    let width = width.clamp(0.0, half_side);
    let mut out = Vec::with_capacity(6 * (4 + 4 * CORNER_SEGMENTS as usize));
    if width <= 0.0 {
        return out;
    }

    let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    // Straight edges between the corners
    out.extend(solid_rect(Rect::new(l + r, t, rect.w - 2.0 * r, width), uv, color));
    out.extend(solid_rect(Rect::new(l + r, b - width, rect.w - 2.0 * r, width), uv, color));
    out.extend(solid_rect(Rect::new(l, t + r, width, rect.h - 2.0 * r), uv, color));
    out.extend(solid_rect(Rect::new(rt - width, t + r, width, rect.h - 2.0 * r), uv, color));

    if r > 0.0 {
        let inner = (r - width).max(0.0);
        // Screen y points down, so angles run clockwise on screen
        corner_band(Vec2::new(l + r, t + r), inner, r, PI, uv, color, &mut out);
        corner_band(Vec2::new(rt - r, t + r), inner, r, 1.5 * PI, uv, color, &mut out);
        corner_band(Vec2::new(rt - r, b - r), inner, r, 0.0, uv, color, &mut out);
        corner_band(Vec2::new(l + r, b - r), inner, r, FRAC_PI_2, uv, color, &mut out);
    }
    out
}

/// Seven-segment layout: a, b, c, d, e, f, g
fn segments_for(ch: char) -> Option<[bool; 7]> {
    let bits: u8 = match ch {
        '0' => 0b0111111,
        '1' => 0b0000110,
        '2' => 0b1011011,
        '3' => 0b1001111,
        '4' => 0b1100110,
        '5' => 0b1101101,
        '6' => 0b1111101,
        '7' => 0b0000111,
        '8' => 0b1111111,
        '9' => 0b1101111,
        '-' => 0b1000000,
        _ => return None,
    };
    Some(std::array::from_fn(|i| bits & (1 << i) != 0))
}

/// Text as seven-segment glyphs, one equal-width cell per character
///
/// Only digits and '-' have glyphs; other characters leave a blank cell.
pub fn seven_segment_text(text: &str, rect: Rect, uv: [f32; 2], color: [f32; 4]) -> Vec<Vertex> {
    let count = text.chars().count();
    let mut out = Vec::new();
    if count == 0 {
        return out;
    }
    let cell = rect.w / count as f32;
    let stroke = (rect.h * 0.12).max(1.0);

    for (i, ch) in text.chars().enumerate() {
        let Some(on) = segments_for(ch) else {
            continue;
        };
        let x0 = rect.left() + cell * i as f32 + cell * 0.15;
        let x1 = rect.left() + cell * (i + 1) as f32 - cell * 0.15;
        let (y0, y1) = (rect.top(), rect.bottom());
        let ym = (y0 + y1) / 2.0;
        let w = x1 - x0;

        let bars = [
            Rect::new(x0, y0, w, stroke),
            Rect::new(x1 - stroke, y0, stroke, ym - y0),
            Rect::new(x1 - stroke, ym, stroke, y1 - ym),
            Rect::new(x0, y1 - stroke, w, stroke),
            Rect::new(x0, ym, stroke, y1 - ym),
            Rect::new(x0, y0, stroke, ym - y0),
            Rect::new(x0, ym - stroke / 2.0, w, stroke),
        ];
        for (bar, lit) in bars.into_iter().zip(on) {
            if lit {
                out.extend(solid_rect(bar, uv, color));
            }
        }
    }
    out
}

/// Convert one frame's draw list into screen-space triangles
pub fn tessellate(list: &DrawList, atlas: &Atlas) -> Vec<Vertex> {
    let white = atlas.white().mid();
    let tint = Color::WHITE.to_linear();
    let mut out = Vec::with_capacity(list.commands().len() * 6);

    for command in list.commands() {
        match command {
            DrawCommand::Clear(_) => {}
            DrawCommand::Image {
                id,
                center,
                size,
                angle,
            } => match atlas.get(*id) {
                Some(uv) => out.extend(sprite(*center, *size, *angle, uv, tint)),
                None => log::debug!("Image {id:?} missing from atlas"),
            },
            DrawCommand::Text { text, rect, color } => {
                out.extend(seven_segment_text(text, *rect, white, color.to_linear()));
            }
            DrawCommand::RectOutline {
                rect,
                color,
                width,
                radius,
            } => {
                out.extend(rounded_rect_outline(
                    *rect,
                    *width,
                    *radius,
                    white,
                    color.to_linear(),
                ));
            }
        }
    }
    out
}
