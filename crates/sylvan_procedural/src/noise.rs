//! # Terrain Noise
//!
//! The ground line is a smooth, seeded curve. The height field only needs a
//! black box `noise(x) -> f64` that is continuous in `x`; [`TerrainNoise`]
//! is the bundled one, a lane through 2D simplex noise.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, these functions produce exactly the same
//! values on any platform, any time. No floating point state is carried
//! between calls.

use crate::error::{GenerationError, GenerationResult};

/// World seed for deterministic generation.
///
/// A single 32-bit signed integer fixed at world start. Every procedural
/// decision is a pure function of `(x, seed)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct WorldSeed(i32);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: i32) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Derives an independent 64-bit stream key for one purpose
    /// (terrain noise, tree presence, ...).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn derive(self, purpose: u64) -> u64 {
        // FNV-1a style mixing
        let mut hash = self.0 as i64 as u64;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        hash
    }
}

/// Stream key for the terrain permutation table.
const TERRAIN_STREAM: u64 = 0x7E44_A1E5;

/// A smooth, seeded 1D function consumed by the height field.
///
/// Implementations must be pure and continuous: small changes in `x` give
/// small changes in the result.
pub trait NoiseSource: Send + Sync {
    /// Offset added to the base ground line at world x.
    fn noise(&self, x: f64) -> f64;
}

impl<F> NoiseSource for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn noise(&self, x: f64) -> f64 {
        self(x)
    }
}

/// 12 gradient directions for 2D simplex.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
    [1, 0], [0, 1], [-1, 0], [0, -1],
];

/// 2D Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
/// O(1) per sample, no allocations after construction.
pub struct SimplexNoise {
    /// 256-entry permutation doubled to 512 so lookups never wrap.
    perm: [u8; 512],
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates with xorshift64. A zero state would never advance.
        let mut state = seed.derive(TERRAIN_STREAM) | 1;
        for i in (1..256usize).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        let (low, high) = perm.split_at_mut(256);
        high.copy_from_slice(low);

        Self { perm }
    }

    #[inline]
    fn hash(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }

    /// Samples 2D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    #[allow(clippy::many_single_char_names, clippy::similar_names)]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        // Skew input space to find the containing simplex cell
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i.wrapping_add(j)) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + Self::G2;
        let y1 = y0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        #[allow(clippy::cast_sign_loss)]
        let (ii, jj) = ((i & 255) as usize, (j & 255) as usize);
        let (i1, j1) = (i1 as usize, j1 as usize);

        let g0 = self.hash(ii + self.hash(jj));
        let g1 = self.hash(ii + i1 + self.hash(jj + j1));
        let g2 = self.hash(ii + 1 + self.hash(jj + 1));

        // 70.0 scales the sum of corner contributions to [-1, 1]
        70.0 * (corner(x0, y0, g0) + corner(x1, y1, g1) + corner(x2, y2, g2))
    }

    /// Generates octaved (fractal) noise.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Coordinates
    /// * `octaves` - Number of noise layers
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn octaved(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

/// Contribution from one simplex corner.
#[inline]
fn corner(x: f64, y: f64, hash: usize) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let grad = GRADIENTS[hash % 12];
    let t2 = t * t;
    t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
}

/// Floor to `i32`. Inputs are bounded by the 32-bit world range divided by
/// the noise wavelength, so the cast cannot saturate in practice.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}

/// Picks the lane row for a seed, kept off integer lattice rows where
/// simplex noise flattens out.
#[allow(clippy::cast_precision_loss)]
fn lane_for(seed: WorldSeed) -> f64 {
    (seed.derive(TERRAIN_STREAM ^ 0xFF) % 1024) as f64 + 0.5
}

/// Bundled terrain noise: a horizontal lane through octaved simplex noise.
pub struct TerrainNoise {
    simplex: SimplexNoise,
    /// Peak deviation from the base ground line, in world units.
    amplitude: f64,
    /// Horizontal distance of one base-octave feature, in world units.
    wavelength: f64,
    /// Fixed y coordinate of the lane.
    lane: f64,
    octaves: u32,
}

impl TerrainNoise {
    /// Default amplitude: three blocks of relief either way.
    pub const DEFAULT_AMPLITUDE: f64 = 90.0;
    /// Default wavelength: about twenty blocks per hill.
    pub const DEFAULT_WAVELENGTH: f64 = 600.0;
    /// Octaves layered on top of the base curve.
    pub const DEFAULT_OCTAVES: u32 = 3;

    /// Creates terrain noise for `seed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNoise` if `amplitude` is negative or not finite, or if
    /// `wavelength` is not strictly positive.
    pub fn new(seed: WorldSeed, amplitude: f64, wavelength: f64) -> GenerationResult<Self> {
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(GenerationError::InvalidNoise(format!(
                "amplitude {amplitude} must be finite and non-negative"
            )));
        }
        if !wavelength.is_finite() || wavelength <= 0.0 {
            return Err(GenerationError::InvalidNoise(format!(
                "wavelength {wavelength} must be positive"
            )));
        }

        Ok(Self {
            simplex: SimplexNoise::new(seed),
            amplitude,
            wavelength,
            lane: lane_for(seed),
            octaves: Self::DEFAULT_OCTAVES,
        })
    }

    /// Terrain noise with the default shape.
    #[must_use]
    pub fn with_defaults(seed: WorldSeed) -> Self {
        Self {
            simplex: SimplexNoise::new(seed),
            amplitude: Self::DEFAULT_AMPLITUDE,
            wavelength: Self::DEFAULT_WAVELENGTH,
            lane: lane_for(seed),
            octaves: Self::DEFAULT_OCTAVES,
        }
    }

    /// Peak deviation in world units.
    #[must_use]
    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

impl NoiseSource for TerrainNoise {
    fn noise(&self, x: f64) -> f64 {
        self.simplex
            .octaved(x / self.wavelength, self.lane, self.octaves, 0.5, 2.0)
            * self.amplitude
    }
}
