//! # Forest Placement
//!
//! Trees are anchored on block-aligned x positions. Whether a tree grows,
//! which variant it is, how tall its trunk is and which crown slots carry a
//! leaf are all read from the deterministic field at the anchor x.
//!
//! ```text
//!        c1 c2 c3
//!   r1   [] [] []     <- lifted 3 blocks above the trunk top
//!   r2   [] [] []
//!   r3   [] [] []
//!   r4   [] [] []     <- trunk top
//!   r5   [] || []     bottom rows leave the trunk column open
//!   r6   [] || []
//!           ||
//!   ~~~~~~~~||~~~~~~~~ ground
//! ```

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use sylvan_shared::{Rect, Rgb, Vec2};

use crate::field::DeterministicField;
use crate::grid::{AlignedRange, Grid};
use crate::height::HeightField;
use crate::noise::NoiseSource;

/// Bound for the variant coin.
const VARIANT_BOUND: NonZeroU32 = match NonZeroU32::new(2) {
    Some(bound) => bound,
    None => unreachable!(),
};

/// Blocks from one trunk to the nearest possible next trunk.
const TREE_SPACING_BLOCKS: i64 = 3;

/// How far back a run of candidates is traced before giving up.
const MAX_REWIND_BLOCKS: i64 = 48;

/// Crown columns left of the trunk column, for every variant. Wider crowns
/// grow to the right.
const CROWN_LEFT_BLOCKS: u32 = 1;

/// Trees of one variant share every constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeVariant {
    /// Short, bushy, six-row crown.
    Oak,
    /// Tall, thin, three-row crown.
    Eucalyptus,
}

/// Variant-specific constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeSpec {
    /// Shortest trunk, in world units.
    pub min_height: u32,
    /// Trunk height spread: heights lie in `[min, min + spread)`.
    pub height_spread: NonZeroU32,
    /// Crown rows.
    pub rows: u32,
    /// Crown columns.
    pub cols: u32,
    /// Blocks between the top crown row and the trunk top.
    pub lift: u32,
    /// 1-based row from which the `open_col` slot is left empty.
    pub open_from_row: u32,
    /// 1-based crown column left open in the bottom rows.
    pub open_col: u32,
    /// Trunk color.
    pub trunk_color: Rgb,
    /// Leaf color.
    pub leaf_color: Rgb,
}

const OAK: TreeSpec = TreeSpec {
    min_height: 150,
    height_spread: match NonZeroU32::new(120) {
        Some(v) => v,
        None => unreachable!(),
    },
    rows: 6,
    cols: 3,
    lift: 3,
    open_from_row: 5,
    open_col: 2,
    trunk_color: Rgb::new(81, 52, 27),
    leaf_color: Rgb::new(33, 194, 79),
};

const EUCALYPTUS: TreeSpec = TreeSpec {
    min_height: 240,
    height_spread: match NonZeroU32::new(90) {
        Some(v) => v,
        None => unreachable!(),
    },
    rows: 3,
    cols: 4,
    lift: 2,
    open_from_row: 3,
    open_col: 3,
    trunk_color: Rgb::new(173, 94, 3),
    leaf_color: Rgb::new(43, 90, 30),
};

impl TreeVariant {
    /// Picks the variant from a `[0, 2)` draw.
    #[inline]
    #[must_use]
    pub const fn from_draw(draw: u32) -> Self {
        if draw == 0 {
            Self::Oak
        } else {
            Self::Eucalyptus
        }
    }

    /// The variant's constants.
    #[inline]
    #[must_use]
    pub const fn spec(self) -> &'static TreeSpec {
        match self {
            Self::Oak => &OAK,
            Self::Eucalyptus => &EUCALYPTUS,
        }
    }

    /// Trunk heights this variant can produce, as `[min, max)`.
    #[must_use]
    pub const fn height_range(self) -> (u32, u32) {
        let spec = self.spec();
        (spec.min_height, spec.min_height + spec.height_spread.get())
    }
}

/// One leaf slot in a crown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafSlot {
    /// 1-based row, top to bottom.
    pub row: u32,
    /// 1-based column, left to right.
    pub col: u32,
    /// Leaf geometry (one block).
    pub rect: Rect,
}

/// Geometry of one tree.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeShape {
    /// Block-aligned anchor x.
    pub anchor_x: i64,
    /// The variant.
    pub variant: TreeVariant,
    /// Trunk, with its base on the ground line.
    pub trunk: Rect,
    /// Leaves present in the crown.
    pub leaves: Vec<LeafSlot>,
}

/// Deterministic tree placement over a height field.
pub struct ForestPlacer<'a, N> {
    field: &'a DeterministicField,
    heights: &'a HeightField<N>,
    grid: Grid,
    density: NonZeroU32,
}

impl<'a, N: NoiseSource> ForestPlacer<'a, N> {
    /// Creates a placer.
    ///
    /// `density` is the one-in-N bound shared by tree presence and crown
    /// density.
    #[must_use]
    pub const fn new(
        field: &'a DeterministicField,
        heights: &'a HeightField<N>,
        grid: Grid,
        density: NonZeroU32,
    ) -> Self {
        Self {
            field,
            heights,
            grid,
            density,
        }
    }

    /// Does the field nominate `x` for a tree?
    ///
    /// A nominated x may still stay bare when a tree grows one or two
    /// blocks to its left.
    #[inline]
    #[must_use]
    pub fn is_candidate_at(&self, x: i64) -> bool {
        i32::try_from(x).is_ok_and(|x| self.field.bool_at(x, self.density))
    }

    /// Does a tree actually grow at `x`?
    #[must_use]
    pub fn grows_tree_at(&self, x: i32) -> bool {
        let x = i64::from(x);
        if self.grid.snap_down(x) != x {
            return false;
        }
        self.anchors_in(&self.grid.align(x, x)).first() == Some(&x)
    }

    /// Variant chosen at `x`.
    #[inline]
    #[must_use]
    pub fn variant_at(&self, x: i32) -> TreeVariant {
        TreeVariant::from_draw(self.field.int_at(x, VARIANT_BOUND))
    }

    /// Builds the tree anchored at `x`, whether or not the forest would
    /// place one there.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn place_tree_at(&self, x: i32) -> TreeShape {
        let variant = self.variant_at(x);
        let spec = variant.spec();
        let s = self.grid.block_f32();

        let trunk_height = spec.min_height + self.field.int_at(x, spec.height_spread);
        let trunk_height = trunk_height as f32;
        let left = x as f32;
        let trunk_top = self.heights.height_at(left) - trunk_height;
        let trunk = Rect::new(Vec2::new(left, trunk_top), Vec2::new(s, trunk_height));

        let mut leaves = Vec::new();
        // One draw decides the whole crown.
        if self.field.bool_at(x, self.density) {
            leaves.reserve((spec.rows * spec.cols) as usize);
            for row in 1..=spec.rows {
                for col in 1..=spec.cols {
                    if row >= spec.open_from_row && col == spec.open_col {
                        continue;
                    }
                    let dx = col as f32 - 1.0 - CROWN_LEFT_BLOCKS as f32;
                    let dy = (row - 1) as f32 - spec.lift as f32;
                    let top_left = Vec2::new(left + dx * s, trunk_top + dy * s);
                    leaves.push(LeafSlot {
                        row,
                        col,
                        rect: Rect::new(top_left, Vec2::new(s, s)),
                    });
                }
            }
        }

        TreeShape {
            anchor_x: i64::from(x),
            variant,
            trunk,
            leaves,
        }
    }

    /// Anchors of every tree the forest grows in `range`.
    ///
    /// Walks `[start, end)` one block at a time; after a tree, two more
    /// blocks are skipped so trunks never touch. The walk is resumed from
    /// the start of the run of candidates the range begins in, so the
    /// answer for any x does not depend on where a request starts.
    #[must_use]
    pub fn anchors_in(&self, range: &AlignedRange) -> Vec<i64> {
        let mut anchors = Vec::new();
        if range.is_degenerate() {
            return anchors;
        }

        let block = self.grid.block();
        let mut x = self.run_start(range.start);
        while x < range.end {
            if self.is_candidate_at(x) {
                if x >= range.start {
                    anchors.push(x);
                }
                x += TREE_SPACING_BLOCKS * block;
            } else {
                x += block;
            }
        }
        anchors
    }

    /// First position at or left of `x` whose two left neighbours are not
    /// candidates, so no earlier tree can reach it.
    fn run_start(&self, x: i64) -> i64 {
        let block = self.grid.block();
        let mut start = x;
        for _ in 0..MAX_REWIND_BLOCKS {
            if !self.is_candidate_at(start - block) && !self.is_candidate_at(start - 2 * block) {
                return start;
            }
            start -= block;
        }
        // Saturated forest: every run is endless, use a fixed global phase.
        let period = TREE_SPACING_BLOCKS * block;
        (x - MAX_REWIND_BLOCKS * block).div_euclid(period) * period
    }

    /// Every tree the forest grows in `[min_x, max_x]` after alignment.
    #[must_use]
    pub fn create_in_range(&self, min_x: i64, max_x: i64) -> Vec<TreeShape> {
        let range = self.grid.align(min_x, max_x);
        self.anchors_in(&range)
            .into_iter()
            .filter_map(|x| i32::try_from(x).ok())
            .map(|x| self.place_tree_at(x))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldStrategy;
    use crate::height::Viewport;
    use crate::noise::{TerrainNoise, WorldSeed};

    const DENSITY: NonZeroU32 = match NonZeroU32::new(15) {
        Some(v) => v,
        None => unreachable!(),
    };

    fn fixture(seed: i32) -> (DeterministicField, HeightField<TerrainNoise>, Grid) {
        let field = DeterministicField::new(WorldSeed::new(seed), FieldStrategy::Hashed);
        let heights = HeightField::new(
            TerrainNoise::with_defaults(WorldSeed::new(seed)),
            Viewport::new(800.0, 600.0).unwrap(),
            30.0,
        );
        (field, heights, Grid::new(30.0).unwrap())
    }

    #[test]
    fn test_trunk_height_ranges() {
        let (field, heights, grid) = fixture(42);
        let placer = ForestPlacer::new(&field, &heights, grid, DENSITY);

        let mut seen = [false; 2];
        for x in (-3000..3000).step_by(30) {
            let tree = placer.place_tree_at(x);
            let height = tree.trunk.size.y;
            match tree.variant {
                TreeVariant::Oak => {
                    seen[0] = true;
                    assert!((150.0..270.0).contains(&height), "oak {height}");
                }
                TreeVariant::Eucalyptus => {
                    seen[1] = true;
                    assert!((240.0..330.0).contains(&height), "eucalyptus {height}");
                }
            }
        }
        assert!(seen[0] && seen[1], "both variants should appear");
    }

    #[test]
    fn test_trunk_base_on_ground() {
        let (field, heights, grid) = fixture(7);
        let placer = ForestPlacer::new(&field, &heights, grid, DENSITY);

        for x in (0..3000).step_by(30) {
            let tree = placer.place_tree_at(x);
            let ground = heights.height_at(x as f32);
            assert!((tree.trunk.bottom() - ground).abs() < 1e-3);
            assert_eq!(tree.trunk.size.x, 30.0);
            assert_eq!(tree.trunk.left(), x as f32);
        }
    }

    #[test]
    fn test_placement_is_deterministic() {
        let (field, heights, grid) = fixture(42);
        let placer = ForestPlacer::new(&field, &heights, grid, DENSITY);

        let first = placer.create_in_range(-2000, 2000);
        // Interleave unrelated queries, then ask again.
        let _ = placer.create_in_range(9000, 12000);
        let second = placer.create_in_range(-2000, 2000);
        assert_eq!(first, second);
    }

    #[test]
    fn test_saturated_forest_spacing() {
        let (field, heights, grid) = fixture(1);
        let placer = ForestPlacer::new(&field, &heights, grid, NonZeroU32::MIN);

        // Density bound 1: every x is a candidate, so spacing is exactly 3.
        let anchors = placer.anchors_in(&grid.align(0, 900));
        assert_eq!(anchors, (0..=900).step_by(90).collect::<Vec<_>>());

        // Same phase no matter where the request starts.
        let shifted = placer.anchors_in(&grid.align(30, 900));
        assert_eq!(shifted, (90..=900).step_by(90).collect::<Vec<_>>());
    }

    #[test]
    fn test_anchors_never_closer_than_three_blocks() {
        for seed in [1, 42, -9, 2024] {
            let (field, heights, grid) = fixture(seed);
            let placer = ForestPlacer::new(&field, &heights, grid, DENSITY);
            let anchors = placer.anchors_in(&grid.align(-30_000, 30_000));
            assert!(!anchors.is_empty());
            for pair in anchors.windows(2) {
                assert!(pair[1] - pair[0] >= 90, "{pair:?}");
            }
        }
    }

    #[test]
    fn test_anchors_independent_of_request_start() {
        for seed in [3, 42, 77] {
            let (field, heights, grid) = fixture(seed);
            let placer = ForestPlacer::new(&field, &heights, grid, DENSITY);

            let whole = placer.anchors_in(&grid.align(-6000, 6000));
            for start in (-6000..6000).step_by(390) {
                let part = placer.anchors_in(&grid.align(start, 6000));
                let expected: Vec<i64> = whole.iter().copied().filter(|&x| x >= grid.snap_down(start)).collect();
                assert_eq!(part, expected, "seed {seed} start {start}");
            }

            for &x in &whole {
                assert!(placer.grows_tree_at(i32::try_from(x).unwrap()));
                assert!(placer.is_candidate_at(x));
            }
        }
    }

    #[test]
    fn test_anchors_exclusive_of_end() {
        let (field, heights, grid) = fixture(1);
        let placer = ForestPlacer::new(&field, &heights, grid, NonZeroU32::MIN);
        // Aligned to [0, 30): only x = 0 is a candidate.
        assert_eq!(placer.anchors_in(&grid.align(0, 0)), vec![0]);
    }

    #[test]
    fn test_crown_layout() {
        let (field, heights, grid) = fixture(1);
        // Bound 1: the crown draw always passes.
        let placer = ForestPlacer::new(&field, &heights, grid, NonZeroU32::MIN);

        for x in (0..600).step_by(30) {
            let tree = placer.place_tree_at(x);
            let spec = tree.variant.spec();
            let open = (spec.open_from_row..=spec.rows).count();
            assert_eq!(tree.leaves.len() as u32, spec.rows * spec.cols - open as u32);

            for leaf in &tree.leaves {
                // Block-sized, block-offset from the anchor.
                assert_eq!(leaf.rect.size, Vec2::new(30.0, 30.0));
                let dx = leaf.rect.left() - x as f32;
                assert_eq!(dx % 30.0, 0.0);
                assert!(!(leaf.row >= spec.open_from_row && leaf.col == spec.open_col));
            }

            // Top row sits `lift` blocks above the trunk top.
            let top = tree.leaves.iter().map(|l| l.rect.top()).fold(f32::MAX, f32::min);
            let expected = tree.trunk.top() - spec.lift as f32 * 30.0;
            assert!((top - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_crown_starts_one_block_left_of_trunk() {
        let (field, heights, grid) = fixture(1);
        let placer = ForestPlacer::new(&field, &heights, grid, NonZeroU32::MIN);
        let tree = placer.place_tree_at(300);
        let spec = tree.variant.spec();

        let leftmost = tree.leaves.iter().map(|l| l.rect.left()).fold(f32::MAX, f32::min);
        let rightmost = tree.leaves.iter().map(|l| l.rect.right()).fold(f32::MIN, f32::max);
        assert_eq!(leftmost, 270.0);
        assert_eq!(rightmost, 270.0 + spec.cols as f32 * 30.0);
    }

    #[test]
    fn test_crown_open_slot_per_variant() {
        let (field, heights, grid) = fixture(1);
        let placer = ForestPlacer::new(&field, &heights, grid, NonZeroU32::MIN);

        let mut seen = Vec::new();
        for x in (0..3000).step_by(30) {
            let tree = placer.place_tree_at(x);
            let spec = tree.variant.spec();
            let bottom = tree.leaves.iter().filter(|l| l.row == spec.rows);
            let lefts: Vec<f32> = bottom.map(|l| l.rect.left() - x as f32).collect();
            match tree.variant {
                // Oak leaves the trunk column open; Eucalyptus the column right of it.
                TreeVariant::Oak => assert_eq!(lefts, vec![-30.0, 30.0]),
                TreeVariant::Eucalyptus => assert_eq!(lefts, vec![-30.0, 0.0, 60.0]),
            }
            if !seen.contains(&tree.variant) {
                seen.push(tree.variant);
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_variant_table() {
        assert_eq!(TreeVariant::Oak.height_range(), (150, 270));
        assert_eq!(TreeVariant::Eucalyptus.height_range(), (240, 330));
        assert_eq!(TreeVariant::from_draw(0), TreeVariant::Oak);
        assert_eq!(TreeVariant::from_draw(1), TreeVariant::Eucalyptus);
    }
}
