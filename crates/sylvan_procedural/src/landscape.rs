//! # Streamed Landscape
//!
//! Owns the live terrain: ground columns, trunks and leaves near the avatar.
//! Generation is driven by the [`ChunkStreamer`]; every entity is keyed by
//! the coordinates that produced it, so regenerating an overlapping range
//! never creates a second copy.
//!
//! ## Lifecycle
//!
//! ```text
//!   request [min, max] ──> align ──> ground columns [start, end]
//!                                └─> forest anchors [start, end)
//!   every tick: entities whose center leaves the retention window are evicted
//! ```

use std::collections::HashMap;
use std::num::NonZeroU32;

use sylvan_core::{EntityId, World};
use sylvan_shared::{Rect, Rgb, Vec2, TERRAIN_DEPTH};

use crate::error::GenerationResult;
use crate::field::{DeterministicField, FieldStrategy};
use crate::grid::Grid;
use crate::height::{HeightField, Viewport};
use crate::noise::{NoiseSource, TerrainNoise, WorldSeed};
use crate::streamer::{ChunkRequest, ChunkStreamer, StepPolicy};
use crate::tree::{ForestPlacer, TreeShape, TreeVariant};

/// Ground column color.
pub const GROUND_COLOR: Rgb = Rgb::new(140, 76, 9);

// ============================================================================
// ENTITIES
// ============================================================================

/// What a streamed entity is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A ground column, `S` wide and `S * 20` deep.
    Ground,
    /// A tree trunk.
    Trunk,
    /// One crown block.
    Leaf,
}

/// Identity of a streamed entity, derived from the coordinates that
/// generated it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// Ground column at block x.
    Ground(i64),
    /// Trunk anchored at block x.
    Trunk(i64),
    /// Crown slot of the tree anchored at `anchor`.
    Leaf {
        /// Trunk anchor x.
        anchor: i64,
        /// 1-based crown row.
        row: u32,
        /// 1-based crown column.
        col: u32,
    },
}

impl EntityKey {
    /// The kind this key identifies.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Ground(_) => EntityKind::Ground,
            Self::Trunk(_) => EntityKind::Trunk,
            Self::Leaf { .. } => EntityKind::Leaf,
        }
    }
}

/// A live landscape entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamedEntity {
    /// Placement key.
    pub key: EntityKey,
    /// World-space rectangle, top-left origin, y down.
    pub rect: Rect,
    /// Color tag for the renderer.
    pub color: Rgb,
    /// Tree variant, for trunks and leaves.
    pub variant: Option<TreeVariant>,
}

impl StreamedEntity {
    /// Entity kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.key.kind()
    }
}

// ============================================================================
// CONFIGURATION & STATS
// ============================================================================

/// Everything needed to build a landscape.
#[derive(Clone, Copy, Debug)]
pub struct LandscapeConfig {
    /// World seed.
    pub seed: WorldSeed,
    /// Viewport dimensions.
    pub viewport: Viewport,
    /// Block size in world units.
    pub block_size: f32,
    /// One-in-N bound for tree presence and crown density.
    pub density: NonZeroU32,
    /// Field draw strategy.
    pub field_strategy: FieldStrategy,
    /// Chunk step policy.
    pub step_policy: StepPolicy,
}

/// Result of one [`StreamedWorld::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceReport {
    /// Chunk steps taken this tick.
    pub steps: usize,
    /// Serviced chunk after the update.
    pub serviced_chunk: i64,
    /// Entities created this tick.
    pub spawned: usize,
    /// Entities evicted this tick.
    pub evicted: usize,
}

/// Running landscape counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LandscapeStats {
    /// Live ground columns.
    pub ground: usize,
    /// Live trunks.
    pub trunks: usize,
    /// Live leaves.
    pub leaves: usize,
    /// Entities created since world start.
    pub spawned_total: u64,
    /// Entities evicted since world start.
    pub evicted_total: u64,
    /// Creations skipped because the key was already live.
    pub duplicates_skipped: u64,
}

impl LandscapeStats {
    /// Live entities of every kind.
    #[inline]
    #[must_use]
    pub const fn live(&self) -> usize {
        self.ground + self.trunks + self.leaves
    }

    fn adjust(&mut self, kind: EntityKind, spawned: bool) {
        let counter = match kind {
            EntityKind::Ground => &mut self.ground,
            EntityKind::Trunk => &mut self.trunks,
            EntityKind::Leaf => &mut self.leaves,
        };
        if spawned {
            *counter += 1;
            self.spawned_total += 1;
        } else {
            *counter = counter.saturating_sub(1);
            self.evicted_total += 1;
        }
    }
}

// ============================================================================
// STREAMED WORLD
// ============================================================================

/// The live landscape and the generators behind it.
pub struct StreamedWorld<N = TerrainNoise> {
    field: DeterministicField,
    heights: HeightField<N>,
    grid: Grid,
    density: NonZeroU32,
    streamer: ChunkStreamer,
    entities: World<StreamedEntity>,
    index: HashMap<EntityKey, EntityId>,
    stats: LandscapeStats,
}

impl StreamedWorld<TerrainNoise> {
    /// Builds a landscape on the bundled terrain noise.
    ///
    /// # Errors
    ///
    /// Returns an error if the block size or viewport is invalid.
    pub fn new(config: LandscapeConfig) -> GenerationResult<Self> {
        Self::with_noise(config, TerrainNoise::with_defaults(config.seed))
    }
}

impl<N: NoiseSource> StreamedWorld<N> {
    /// Builds a landscape on a caller-supplied noise source.
    ///
    /// # Errors
    ///
    /// Returns an error if the block size or viewport is invalid.
    pub fn with_noise(config: LandscapeConfig, noise: N) -> GenerationResult<Self> {
        let grid = Grid::new(config.block_size)?;
        let viewport = Viewport::new(config.viewport.width, config.viewport.height)?;
        let streamer = ChunkStreamer::new(viewport.width, config.step_policy)?;

        tracing::info!(
            seed = config.seed.value(),
            chunk_width = streamer.chunk_width(),
            strategy = ?config.field_strategy,
            policy = ?config.step_policy,
            "landscape created"
        );

        Ok(Self {
            field: DeterministicField::new(config.seed, config.field_strategy),
            heights: HeightField::new(noise, viewport, grid.block_f32()),
            grid,
            density: config.density,
            streamer,
            entities: World::with_capacity(1024),
            index: HashMap::with_capacity(1024),
            stats: LandscapeStats::default(),
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Ground height at `x`.
    #[inline]
    #[must_use]
    pub fn height_at(&self, x: f32) -> f32 {
        self.heights.height_at(x)
    }

    /// The height field.
    #[must_use]
    pub const fn heights(&self) -> &HeightField<N> {
        &self.heights
    }

    /// The deterministic field.
    #[must_use]
    pub const fn field(&self) -> &DeterministicField {
        &self.field
    }

    /// The block grid.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// The chunk streamer.
    #[must_use]
    pub const fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    /// A tree placer over this landscape's generators.
    #[must_use]
    pub const fn placer(&self) -> ForestPlacer<'_, N> {
        ForestPlacer::new(&self.field, &self.heights, self.grid, self.density)
    }

    /// Running counters.
    #[must_use]
    pub const fn stats(&self) -> &LandscapeStats {
        &self.stats
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&StreamedEntity> {
        self.entities.get(id)
    }

    /// Handle of the live entity with `key`, if any.
    #[must_use]
    pub fn find(&self, key: &EntityKey) -> Option<EntityId> {
        self.index.get(key).copied()
    }

    /// Every live entity.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &StreamedEntity)> {
        self.entities.iter_alive()
    }

    /// Live entities whose rectangle intersects `area`.
    pub fn overlapping<'a>(
        &'a self,
        area: &'a Rect,
    ) -> impl Iterator<Item = (EntityId, &'a StreamedEntity)> + 'a {
        self.entities
            .iter_alive()
            .filter(move |(_, entity)| entity.rect.intersects(area))
    }

    // ------------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------------

    /// Creates ground columns for every block x in the aligned
    /// `[min_x, max_x]`, both ends included. Returns how many were new.
    #[allow(clippy::cast_precision_loss)]
    pub fn create_ground(&mut self, min_x: i64, max_x: i64) -> usize {
        let range = self.grid.align(min_x, max_x);
        let s = self.grid.block_f32();
        let size = Vec2::new(s, s * TERRAIN_DEPTH as f32);

        let mut spawned = 0;
        for x in range.columns() {
            let left = x as f32;
            let entity = StreamedEntity {
                key: EntityKey::Ground(x),
                rect: Rect::new(Vec2::new(left, self.heights.height_at(left)), size),
                color: GROUND_COLOR,
                variant: None,
            };
            if self.spawn(entity) {
                spawned += 1;
            }
        }
        spawned
    }

    /// Creates every tree the forest grows in the aligned `[min_x, max_x)`.
    /// Returns how many entities (trunks and leaves) were new.
    pub fn create_forest(&mut self, min_x: i64, max_x: i64) -> usize {
        let trees = self.placer().create_in_range(min_x, max_x);
        trees.into_iter().map(|tree| self.spawn_tree(tree)).sum()
    }

    /// Ground and forest over the same range.
    pub fn generate(&mut self, min_x: i64, max_x: i64) -> usize {
        self.create_ground(min_x, max_x) + self.create_forest(min_x, max_x)
    }

    fn spawn_tree(&mut self, tree: TreeShape) -> usize {
        let spec = tree.variant.spec();
        let mut spawned = usize::from(self.spawn(StreamedEntity {
            key: EntityKey::Trunk(tree.anchor_x),
            rect: tree.trunk,
            color: spec.trunk_color,
            variant: Some(tree.variant),
        }));
        for leaf in tree.leaves {
            let entity = StreamedEntity {
                key: EntityKey::Leaf {
                    anchor: tree.anchor_x,
                    row: leaf.row,
                    col: leaf.col,
                },
                rect: leaf.rect,
                color: spec.leaf_color,
                variant: Some(tree.variant),
            };
            spawned += usize::from(self.spawn(entity));
        }
        spawned
    }

    /// Inserts `entity` unless its key is already live.
    fn spawn(&mut self, entity: StreamedEntity) -> bool {
        if self.index.contains_key(&entity.key) {
            self.stats.duplicates_skipped += 1;
            return false;
        }
        let id = self.entities.spawn(entity);
        if id.is_null() {
            tracing::warn!(key = ?entity.key, "entity store exhausted; entity dropped");
            return false;
        }
        tracing::trace!(%id, key = ?entity.key, "spawned");
        self.index.insert(entity.key, id);
        self.stats.adjust(entity.kind(), true);
        true
    }

    // ------------------------------------------------------------------------
    // Streaming
    // ------------------------------------------------------------------------

    /// Services chunk crossings for an avatar whose center is at `avatar_x`,
    /// then evicts everything outside the retention window.
    pub fn update(&mut self, avatar_x: i64) -> ServiceReport {
        let requests = self.streamer.service(avatar_x);
        let mut spawned = 0;
        for ChunkRequest {
            chunk,
            min_x,
            max_x,
            ..
        } in &requests
        {
            let created = self.generate(*min_x, *max_x);
            tracing::debug!(chunk, created, "chunk generated");
            spawned += created;
        }

        let (lo, hi) = self.streamer.retention_window(avatar_x);
        let evicted = self.evict_outside(lo, hi);

        ServiceReport {
            steps: requests.len(),
            serviced_chunk: self.streamer.serviced_chunk(),
            spawned,
            evicted,
        }
    }

    /// Removes every entity whose horizontal center lies outside
    /// `[min_x, max_x]`. Returns how many were removed.
    #[allow(clippy::cast_precision_loss)]
    pub fn evict_outside(&mut self, min_x: i64, max_x: i64) -> usize {
        let (lo, hi) = (min_x as f32, max_x as f32);
        let index = &mut self.index;
        let stats = &mut self.stats;
        self.entities.retain(
            |_, entity| {
                let center = entity.rect.center_x();
                (lo..=hi).contains(&center)
            },
            |id, entity| {
                tracing::trace!(%id, key = ?entity.key, "evicted");
                index.remove(&entity.key);
                stats.adjust(entity.kind(), false);
            },
        )
    }

    /// Populates the surroundings of an avatar standing at `avatar_x`:
    /// ground over `[ax - w/2, ax + w]`, trees over `[ax - w, ax + w]`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn populate_initial(&mut self, avatar_x: i64) -> usize {
        // Viewport width was validated finite and positive.
        let w = self.heights.viewport().width.floor() as i64;
        let ground = self.create_ground(avatar_x - w / 2, avatar_x + w);
        let forest = self.create_forest(avatar_x - w, avatar_x + w);
        tracing::debug!(avatar_x, ground, forest, "initial population");
        ground + forest
    }

    /// Re-centres the landscape on `avatar_x` after a discontinuous move:
    /// evicts everything outside the new retention window, marks the
    /// avatar's chunk as serviced and repopulates around it.
    pub fn reset_around(&mut self, avatar_x: i64) -> ServiceReport {
        let (lo, hi) = self.streamer.retention_window(avatar_x);
        let evicted = self.evict_outside(lo, hi);
        let chunk = self.streamer.chunk_of(avatar_x);
        self.streamer.reset(chunk);
        let spawned = self.populate_initial(avatar_x);
        tracing::info!(avatar_x, chunk, evicted, spawned, "landscape re-centred");
        ServiceReport {
            steps: 0,
            serviced_chunk: chunk,
            spawned,
            evicted,
        }
    }

    /// Drops every live entity. Generators and the serviced chunk are kept.
    #[allow(clippy::cast_possible_truncation)]
    pub fn clear(&mut self) {
        let evicted = self.entities.alive_count() as u64;
        self.entities.clear();
        self.index.clear();
        self.stats.ground = 0;
        self.stats.trunks = 0;
        self.stats.leaves = 0;
        self.stats.evicted_total += evicted;
    }
}
