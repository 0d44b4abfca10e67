//! Texture atlas
//!
//! Every source image is packed once into a single RGBA texture (shelf
//! packing, 1px transparent gutter). A small opaque white block is reserved
//! at the origin for untextured geometry (text, outlines).

use std::collections::HashMap;

use crate::assets::{Image, ImageId};

/// Gutter between packed images
const PADDING: u32 = 1;
/// Side of the white block
const WHITE_SIZE: u32 = 4;

/// Texture-space rectangle (0..1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// Center of the rectangle
    pub fn mid(&self) -> [f32; 2] {
        [(self.u0 + self.u1) / 2.0, (self.v0 + self.v1) / 2.0]
    }
}

/// Packed RGBA8 pixels and where each image landed
#[derive(Debug, Clone)]
pub struct Atlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    entries: HashMap<ImageId, UvRect>,
    white: UvRect,
}

impl Atlas {
    /// Pack `images` into an atlas at most `max_width` pixels wide
    pub fn build<'a>(images: impl IntoIterator<Item = &'a Image>, max_width: u32) -> Self {
        let images: Vec<&Image> = images.into_iter().collect();
        let max_width = images
            .iter()
            .map(|i| i.width() + 2 * PADDING)
            .chain([max_width, WHITE_SIZE + 2 * PADDING])
            .max()
            .unwrap_or(max_width);

        // First pass: place rects on shelves
        let mut placements = Vec::with_capacity(images.len() + 1);
        let (mut x, mut y, mut shelf) = (0u32, 0u32, 0u32);
        let mut place = |w: u32, h: u32| {
            let (w, h) = (w + 2 * PADDING, h + 2 * PADDING);
            if x + w > max_width {
                x = 0;
                y += shelf;
                shelf = 0;
            }
            let at = (x + PADDING, y + PADDING);
            x += w;
            shelf = shelf.max(h);
            at
        };
        let white_at = place(WHITE_SIZE, WHITE_SIZE);
        for image in &images {
            placements.push(place(image.width(), image.height()));
        }
        let width = max_width;
        let height = (y + shelf).max(1);

        // Second pass: copy pixels
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        let mut blit = |at: (u32, u32), w: u32, src: &[u8]| {
            for (row, line) in src.chunks_exact((w * 4) as usize).enumerate() {
                let start = (((at.1 + row as u32) * width + at.0) * 4) as usize;
                pixels[start..start + line.len()].copy_from_slice(line);
            }
        };
        blit(white_at, WHITE_SIZE, &vec![255u8; (WHITE_SIZE * WHITE_SIZE * 4) as usize]);

        let uv = |at: (u32, u32), w: u32, h: u32| UvRect {
            u0: at.0 as f32 / width as f32,
            v0: at.1 as f32 / height as f32,
            u1: (at.0 + w) as f32 / width as f32,
            v1: (at.1 + h) as f32 / height as f32,
        };

        let mut entries = HashMap::with_capacity(images.len());
        for (image, at) in images.iter().zip(placements) {
            blit(at, image.width(), image.pixels());
            entries.insert(image.id(), uv(at, image.width(), image.height()));
        }
        let white = uv(white_at, WHITE_SIZE, WHITE_SIZE);

        log::debug!("Packed {} images into {width}x{height} atlas", entries.len());

        Self {
            width,
            height,
            pixels,
            entries,
            white,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, id: ImageId) -> Option<UvRect> {
        self.entries.get(&id).copied()
    }

    /// Region of solid white texels
    pub fn white(&self) -> UvRect {
        self.white
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Assets;

    #[test]
    fn test_every_image_packed_without_overlap() {
        let assets = Assets::procedural();
        let atlas = Atlas::build(assets.images(), 512);

        let mut rects: Vec<UvRect> = assets
            .images()
            .map(|i| atlas.get(i.id()).expect("packed"))
            .collect();
        rects.push(atlas.white());

        for (i, a) in rects.iter().enumerate() {
            assert!(a.u0 >= 0.0 && a.u1 <= 1.0 && a.v0 >= 0.0 && a.v1 <= 1.0);
            for b in &rects[i + 1..] {
                let disjoint = a.u1 <= b.u0 || b.u1 <= a.u0 || a.v1 <= b.v0 || b.v1 <= a.v0;
                assert!(disjoint, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_pixels_copied() {
        let assets = Assets::procedural();
        let atlas = Atlas::build(assets.images(), 512);
        let laser = &assets.laser;
        let uv = atlas.get(laser.id()).expect("packed");

        let x0 = (uv.u0 * atlas.width() as f32).round() as u32;
        let y0 = (uv.v0 * atlas.height() as f32).round() as u32;
        for y in 0..laser.height() {
            let src = laser.pixel(0, y as i64);
            let i = (((y0 + y) * atlas.width() + x0) * 4) as usize;
            assert_eq!(&atlas.pixels()[i..i + 4], &src);
        }

        let [u, v] = atlas.white().mid();
        let i = (((v * atlas.height() as f32) as u32 * atlas.width()
            + (u * atlas.width() as f32) as u32)
            * 4) as usize;
        assert_eq!(&atlas.pixels()[i..i + 4], &[255; 4]);
    }

    #[test]
    fn test_narrow_max_width_still_fits_widest_image() {
        let assets = Assets::procedural();
        let atlas = Atlas::build(assets.images(), 16);
        assert!(atlas.width() >= assets.meteor.width() + 2);
        assert!(atlas.get(assets.meteor.id()).is_some());
    }
}
