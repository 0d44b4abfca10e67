//! Floating-point rectangles with sprite-style anchors
//!
//! Screen space: origin top-left, y grows downward.

use glam::Vec2;

/// An axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    /// Rectangle of `size` whose bottom edge midpoint sits on `point`
    pub fn from_midbottom(point: Vec2, size: Vec2) -> Self {
        Self::new(point.x - size.x / 2.0, point.y - size.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn midtop(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y)
    }

    #[inline]
    pub fn midbottom(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.bottom())
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Copy moved by `(dx, dy)`
    pub fn moved(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Copy grown by `dw`/`dh` in total, keeping the same center
    pub fn inflate(&self, dw: f32, dh: f32) -> Self {
        Self::new(self.x - dw / 2.0, self.y - dh / 2.0, self.w + dw, self.h + dh)
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_anchors() {
        let r = Rect::from_midbottom(Vec2::new(100.0, 10.0), Vec2::new(20.0, 40.0));
        assert_eq!(r.left(), 90.0);
        assert_eq!(r.top(), -30.0);
        assert_eq!(r.midbottom(), Vec2::new(100.0, 10.0));

        let r = Rect::from_center(Vec2::new(50.0, 50.0), Vec2::new(10.0, 10.0));
        assert_eq!(r.midtop(), Vec2::new(50.0, 45.0));
        assert_eq!(r.bottom(), 55.0);
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.moved(-0.5, 0.0)));
    }

    #[test]
    fn test_inflate_keeps_center() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        let grown = r.inflate(20.0, 10.0);
        assert_eq!(grown.center(), r.center());
        assert_eq!(grown.size(), Vec2::new(50.0, 50.0));
    }

    proptest! {
        #[test]
        fn prop_center_roundtrip(x in -2000.0f32..2000.0, y in -2000.0f32..2000.0,
                                 w in 1.0f32..300.0, h in 1.0f32..300.0) {
            let r = Rect::from_center(Vec2::new(x, y), Vec2::new(w, h));
            prop_assert!((r.center().x - x).abs() < 1e-2);
            prop_assert!((r.center().y - y).abs() < 1e-2);
        }

        #[test]
        fn prop_overlap_is_symmetric(ax in -100.0f32..100.0, ay in -100.0f32..100.0,
                                     bx in -100.0f32..100.0, by in -100.0f32..100.0) {
            let a = Rect::new(ax, ay, 30.0, 20.0);
            let b = Rect::new(bx, by, 25.0, 35.0);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
