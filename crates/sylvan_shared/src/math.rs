//! Geometry types shared between the simulation and its renderer.
//!
//! World space is screen-like: x grows to the right, y grows DOWNWARD.
//! A smaller y is higher up, so "upward" velocities are negative.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D Vector - positions, velocities
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub top_left: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(top_left: Vec2, size: Vec2) -> Self {
        Self { top_left, size }
    }

    /// Left edge.
    #[inline]
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.top_left.x
    }

    /// Top edge.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top_left.y
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.top_left.x + self.size.x
    }

    /// Bottom edge (largest y).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top_left.y + self.size.y
    }

    /// Horizontal center.
    #[inline]
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.top_left.x + self.size.x * 0.5
    }

    /// Checks if this rectangle overlaps another (touching edges do not count).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Returns the rectangle moved by `delta`.
    #[must_use]
    pub fn translate(&self, delta: Vec2) -> Self {
        Self::new(self.top_left + delta, self.size)
    }
}

/// 8-bit RGB color tag handed to the renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Creates a new color
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 5.0);

        let sum = a + b;
        assert_eq!(sum.x, 5.0);
        assert_eq!(sum.y, 7.0);

        let scaled = (b - a) * 2.0;
        assert_eq!(scaled, Vec2::new(6.0, 6.0));
    }

    #[test]
    fn test_rect_edges_and_center() {
        let rect = Rect::new(Vec2::new(30.0, 600.0), Vec2::new(30.0, 600.0));
        assert_eq!(rect.right(), 60.0);
        assert_eq!(rect.bottom(), 1200.0);
        assert_eq!(rect.center_x(), 45.0);
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(30.0, 30.0));
        let b = Rect::new(Vec2::new(15.0, 15.0), Vec2::new(30.0, 30.0));
        let touching = Rect::new(Vec2::new(30.0, 0.0), Vec2::new(30.0, 30.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn test_rect_bytemuck() {
        let rect = Rect::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        let bytes: &[u8] = bytemuck::bytes_of(&rect);
        assert_eq!(bytes.len(), 16);
    }
}
