//! Render boundary
//!
//! The simulation draws through [`Canvas`]. [`DrawList`] records the calls so
//! a backend (the WebGPU presenter, or a test) can consume them afterwards.

use glam::Vec2;

use crate::assets::{Font, Image, ImageId};
use crate::consts::{BACKGROUND_RGB, SCORE_RGB};
use crate::sim::Rect;

/// 8-bit sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb([255, 255, 255]);
    pub const BACKGROUND: Color = Color::rgb(BACKGROUND_RGB);
    pub const SCORE: Color = Color::rgb(SCORE_RGB);

    pub const fn rgb(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: 255,
        }
    }

    /// Linear-space RGBA for shaders and clear colors
    pub fn to_linear(self) -> [f32; 4] {
        fn channel(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b), self.a as f32 / 255.0]
    }
}

/// Drawing surface the simulation renders to
pub trait Canvas {
    /// Fill the whole surface; starts a new frame
    fn clear(&mut self, color: Color);

    /// Draw `image` so its bounds fill `rect` (rotated images keep their
    /// enlarged bounding box, centered on `rect`)
    fn draw_image(&mut self, image: &Image, rect: Rect);

    fn draw_text(&mut self, text: &str, font: &Font, rect: Rect, color: Color);

    /// Rounded rectangle outline; `width` grows inward from `rect`
    fn draw_rect_outline(&mut self, rect: Rect, color: Color, width: f32, radius: f32);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    /// Source image placed at `center`, rotated counter-clockwise by `angle` degrees
    Image {
        id: ImageId,
        center: Vec2,
        size: Vec2,
        angle: f32,
    },
    Text {
        text: String,
        rect: Rect,
        color: Color,
    },
    RectOutline {
        rect: Rect,
        color: Color,
        width: f32,
        radius: f32,
    },
}

/// Recording canvas; one frame's worth of commands
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Background color of the current frame
    pub fn clear_color(&self) -> Color {
        match self.commands.first() {
            Some(DrawCommand::Clear(color)) => *color,
            _ => Color::BACKGROUND,
        }
    }

    /// Number of times the image `id` is drawn
    pub fn count_image(&self, id: ImageId) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { id: drawn, .. } if *drawn == id))
            .count()
    }
}

impl Canvas for DrawList {
    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_image(&mut self, image: &Image, rect: Rect) {
        // The backend rotates the source itself; the bounding box only
        // provides the center
        self.commands.push(DrawCommand::Image {
            id: image.id(),
            center: rect.center(),
            size: image.source_size(),
            angle: image.angle(),
        });
    }

    fn draw_text(&mut self, text: &str, _font: &Font, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            rect,
            color,
        });
    }

    fn draw_rect_outline(&mut self, rect: Rect, color: Color, width: f32, radius: f32) {
        self.commands.push(DrawCommand::RectOutline {
            rect,
            color,
            width,
            radius,
        });
    }
}
