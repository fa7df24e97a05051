//! # Height Field
//!
//! Ground height at any x: a base line at three quarters of the viewport
//! height plus terrain noise, with single-block spikes and pits flattened.
//!
//! Heights are y coordinates in a y-down world: a larger value is lower.

use crate::error::{GenerationError, GenerationResult};
use crate::noise::NoiseSource;

/// Viewport dimensions, fixed at world start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width in world units.
    pub width: f32,
    /// Height in world units.
    pub height: f32,
}

impl Viewport {
    /// Creates a validated viewport.
    ///
    /// # Errors
    ///
    /// Returns `InvalidViewport` unless both dimensions are positive and
    /// finite.
    pub fn new(width: f32, height: f32) -> GenerationResult<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(GenerationError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }
}

/// Ground height oracle.
///
/// Pure and cheap: three noise evaluations per query at most.
pub struct HeightField<N> {
    noise: N,
    viewport: Viewport,
    block: f32,
    base: f32,
}

impl<N: NoiseSource> HeightField<N> {
    /// Creates a height field.
    #[must_use]
    pub fn new(noise: N, viewport: Viewport, block: f32) -> Self {
        Self {
            noise,
            viewport,
            block,
            base: viewport.height * sylvan_shared::GROUND_HEIGHT_RATIO,
        }
    }

    /// The viewport this field was built for.
    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Unsmoothed height: base line plus noise.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn raw_height(&self, x: f32) -> f32 {
        self.base + self.noise.noise(f64::from(x)) as f32
    }

    /// Ground height at `x` with spike suppression.
    ///
    /// Smoothing only applies when `x - S > S` and `x + S < width`; outside
    /// that margin the raw height is returned. Inside it the result snaps
    /// to the left neighbour when:
    /// - both neighbours are within one block of the raw height, or
    /// - both neighbours differ from it by more than one block, on the same
    ///   side.
    #[must_use]
    pub fn height_at(&self, x: f32) -> f32 {
        let raw = self.raw_height(x);
        let s = self.block;
        if !(x - s > s && x + s < self.viewport.width) {
            return raw;
        }

        let left = self.raw_height(x - s);
        let right = self.raw_height(x + s);

        let both_close = (left - raw).abs() < s && (right - raw).abs() < s;
        let both_below = left - raw > s && right - raw > s;
        let both_above = raw - left > s && raw - right > s;

        if both_close || both_below || both_above {
            left
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{TerrainNoise, WorldSeed};

    const S: f32 = 30.0;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0).unwrap()
    }

    #[test]
    fn test_base_line_three_quarters() {
        let field = HeightField::new(|_x: f64| 0.0, viewport(), S);
        assert_eq!(field.height_at(-5000.0), 450.0);
        assert_eq!(field.height_at(400.0), 450.0);
    }

    #[test]
    fn test_outside_margin_returns_raw() {
        // Lone spike at x = 30; x - S = 0 is not > S, so no smoothing.
        let spike = |x: f64| if (x - 30.0).abs() < 1e-6 { -100.0 } else { 0.0 };
        let field = HeightField::new(spike, viewport(), S);
        assert_eq!(field.height_at(30.0), 350.0);

        // Same spike past the right edge of the margin.
        let spike = |x: f64| if (x - 780.0).abs() < 1e-6 { -100.0 } else { 0.0 };
        let field = HeightField::new(spike, viewport(), S);
        assert_eq!(field.height_at(780.0), 350.0);
    }

    #[test]
    fn test_single_spike_flattened() {
        // Spike 100 units up at x = 300, neighbours flat.
        let spike = |x: f64| if (x - 300.0).abs() < 1e-6 { -100.0 } else { 0.0 };
        let field = HeightField::new(spike, viewport(), S);
        assert_eq!(field.raw_height(300.0), 350.0);
        assert_eq!(field.height_at(300.0), 450.0);
    }

    #[test]
    fn test_single_pit_flattened() {
        let pit = |x: f64| if (x - 300.0).abs() < 1e-6 { 100.0 } else { 0.0 };
        let field = HeightField::new(pit, viewport(), S);
        assert_eq!(field.height_at(300.0), 450.0);
    }

    #[test]
    fn test_gentle_slope_snaps_left() {
        let slope = |x: f64| x * 0.1;
        let field = HeightField::new(slope, viewport(), S);
        // Neighbours within one block: snapped to the left neighbour.
        assert_eq!(field.height_at(300.0), field.raw_height(270.0));
    }

    #[test]
    fn test_steep_cliff_keeps_raw() {
        // Left far above, right far below: mixed sides, no snap.
        let cliff = |x: f64| x * 2.0;
        let field = HeightField::new(cliff, viewport(), S);
        assert_eq!(field.height_at(300.0), field.raw_height(300.0));
    }

    #[test]
    fn test_deterministic_with_terrain_noise() {
        let a = HeightField::new(TerrainNoise::with_defaults(WorldSeed::new(42)), viewport(), S);
        let b = HeightField::new(TerrainNoise::with_defaults(WorldSeed::new(42)), viewport(), S);
        for i in -500..500 {
            let x = i as f32 * 13.0;
            assert_eq!(a.height_at(x), b.height_at(x));
        }
    }

    #[test]
    fn test_invalid_viewport() {
        assert!(Viewport::new(0.0, 600.0).is_err());
        assert!(Viewport::new(800.0, -1.0).is_err());
        assert!(Viewport::new(f32::INFINITY, 600.0).is_err());
    }
}
