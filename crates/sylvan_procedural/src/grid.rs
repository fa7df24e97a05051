//! # Block Grid
//!
//! Rounds requested coordinate ranges onto the block grid. Arithmetic is
//! done in `i64` so that aligning anywhere in the 32-bit world range cannot
//! overflow.

use crate::error::{GenerationError, GenerationResult};

/// Largest accepted block size.
const MAX_BLOCK: f32 = 4096.0;

/// The block grid: a positive whole-number block size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    block: i64,
}

impl Grid {
    /// Creates a grid with blocks of `block_size` world units.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBlockSize` unless `block_size` is a whole number in
    /// `[1, 4096]`.
    pub fn new(block_size: f32) -> GenerationResult<Self> {
        if !(1.0..=MAX_BLOCK).contains(&block_size) || block_size.fract() != 0.0 {
            return Err(GenerationError::InvalidBlockSize(block_size));
        }
        // Whole number in [1, 4096].
        #[allow(clippy::cast_possible_truncation)]
        let block = block_size as i64;
        Ok(Self { block })
    }

    /// Block size in world units.
    #[inline]
    #[must_use]
    pub const fn block(&self) -> i64 {
        self.block
    }

    /// Block size as a float, for geometry.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn block_f32(&self) -> f32 {
        self.block as f32
    }

    /// Largest multiple of the block size that is `<= x`.
    #[inline]
    #[must_use]
    pub const fn snap_down(&self, x: i64) -> i64 {
        x - x.rem_euclid(self.block)
    }

    /// Smallest multiple of the block size that is `>= x`.
    #[inline]
    #[must_use]
    pub const fn snap_up(&self, x: i64) -> i64 {
        let down = self.snap_down(x);
        if down == x {
            x
        } else {
            down + self.block
        }
    }

    /// Aligns `[min_x, max_x]` to the grid.
    ///
    /// `start` is the largest multiple `<= min_x`. `end` is the first value
    /// reached by stepping from `start` one block at a time that is strictly
    /// greater than `max_x`. When `max_x < min_x` the range is degenerate and
    /// yields nothing.
    #[must_use]
    pub const fn align(&self, min_x: i64, max_x: i64) -> AlignedRange {
        let start = self.snap_down(min_x);
        if max_x < min_x {
            return AlignedRange {
                start,
                end: start,
                step: self.block,
                degenerate: true,
            };
        }
        // First multiple strictly above max_x.
        let end = self.snap_down(max_x) + self.block;
        AlignedRange {
            start,
            end,
            step: self.block,
            degenerate: false,
        }
    }
}

/// A block-aligned horizontal range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlignedRange {
    /// First block x (inclusive).
    pub start: i64,
    /// First block x past the request.
    pub end: i64,
    step: i64,
    degenerate: bool,
}

impl AlignedRange {
    /// `true` when the request was empty (`max < min`).
    #[inline]
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Number of blocks in `[start, end)`.
    #[inline]
    #[must_use]
    pub const fn block_count(&self) -> i64 {
        if self.degenerate {
            0
        } else {
            (self.end - self.start) / self.step
        }
    }

    /// Block positions in `[start, end)`.
    pub fn slots(&self) -> impl Iterator<Item = i64> {
        let (start, step, count) = (self.start, self.step, self.block_count());
        (0..count).map(move |i| start + i * step)
    }

    /// Block positions in `[start, end]`, both ends included.
    pub fn columns(&self) -> impl Iterator<Item = i64> {
        let (start, step) = (self.start, self.step);
        let count = if self.degenerate { 0 } else { self.block_count() + 1 };
        (0..count).map(move |i| start + i * step)
    }
}
