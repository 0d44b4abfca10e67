//! Per-pixel collision masks
//!
//! A mask marks which pixels of an image are solid. Two masks collide when
//! any solid pixel of one lands on a solid pixel of the other.

use crate::assets::Image;
use crate::consts::MASK_THRESHOLD;

use super::rect::Rect;

/// Solidity bitmap, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Build from image alpha (alpha above the threshold is solid)
    pub fn from_image(image: &Image) -> Self {
        let bits = image
            .pixels()
            .chunks_exact(4)
            .map(|px| px[3] > MASK_THRESHOLD)
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            bits,
        }
    }

    /// Fully solid mask (used for shapes without transparency)
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// True if `other`, placed at `offset` relative to this mask's origin,
    /// shares at least one solid pixel with this mask
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (ox, oy) = offset;
        let x_start = ox.max(0);
        let y_start = oy.max(0);
        let x_end = (self.width as i32).min(ox + other.width as i32);
        let y_end = (self.height as i32).min(oy + other.height as i32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x, y) && other.get(x - ox, y - oy) {
                    return true;
                }
            }
        }
        false
    }
}

/// Mask collision between two placed masks: bounding boxes first, then pixels
pub fn masks_collide(a: &Mask, a_rect: &Rect, b: &Mask, b_rect: &Rect) -> bool {
    if !a_rect.overlaps(b_rect) {
        return false;
    }
    let offset = (
        (b_rect.x - a_rect.x) as i32,
        (b_rect.y - a_rect.y) as i32,
    );
    a.overlaps(b, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mask with a single solid pixel at (px, py)
    fn dot(width: u32, height: u32, px: u32, py: u32) -> Mask {
        let mut bits = vec![false; (width * height) as usize];
        bits[(py * width + px) as usize] = true;
        Mask {
            width,
            height,
            bits,
        }
    }

    #[test]
    fn test_filled_overlap() {
        let a = Mask::filled(10, 10);
        let b = Mask::filled(4, 4);
        assert!(a.overlaps(&b, (8, 8)));
        assert!(!a.overlaps(&b, (10, 0)));
        assert!(!a.overlaps(&b, (-4, 0)));
    }

    #[test]
    fn test_transparent_margins_do_not_collide() {
        // Solid pixels sit in opposite corners, bounding boxes overlap
        let a = dot(10, 10, 0, 0);
        let b = dot(10, 10, 9, 9);
        assert!(!a.overlaps(&b, (5, 5)));
        // Shift b so its solid pixel lands on a's
        assert!(a.overlaps(&b, (-9, -9)));
    }

    #[test]
    fn test_masks_collide_requires_rect_overlap() {
        let a = Mask::filled(10, 10);
        let b = Mask::filled(10, 10);
        let ra = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(masks_collide(&a, &ra, &b, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!masks_collide(&a, &ra, &b, &Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_from_image_threshold() {
        let pixels = vec![
            255, 255, 255, 255, // solid
            255, 255, 255, 127, // at threshold: clear
            0, 0, 0, 128, // just above: solid
            0, 0, 0, 0, // clear
        ];
        let image = Image::from_rgba(crate::assets::ImageId(0), 2, 2, pixels);
        let mask = Mask::from_image(&image);
        assert!(mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(mask.get(0, 1));
        assert!(!mask.get(1, 1));
        assert_eq!(mask.count(), 2);
    }
}
