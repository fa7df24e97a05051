//! # Chunk Streamer
//!
//! Decides, once per tick, whether the avatar has crossed into a chunk that
//! has not been serviced yet, and which world range to generate for it.
//!
//! ```text
//!   chunk:   ...  |  k-1  |   k   |  k+1  |  k+2  | ...
//!                          ^avatar
//!   moving right into k:           [ax+cw, ax+2cw] generated
//!   retention:      [center-2cw ........ center+2cw] kept, rest evicted
//! ```
//!
//! The streamer only does the bookkeeping. The landscape owns the entities
//! and acts on the requests.

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

/// How many chunk boundaries one tick may service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// One step per tick. A jump across several chunks is caught up over
    /// the following ticks, one step each.
    #[default]
    Single,
    /// Step until the serviced chunk matches the avatar's chunk.
    CatchUp,
}

/// Direction of a chunk step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Avatar moved right: generate ahead.
    Ahead,
    /// Avatar moved left: generate behind.
    Behind,
}

/// A world range to generate, produced by one chunk step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRequest {
    /// Serviced chunk after this step.
    pub chunk: i64,
    /// Which way the step went.
    pub direction: Direction,
    /// Left end of the range (before grid alignment).
    pub min_x: i64,
    /// Right end of the range (before grid alignment).
    pub max_x: i64,
}

/// Serviced-chunk bookkeeping.
#[derive(Clone, Debug)]
pub struct ChunkStreamer {
    chunk_width: i64,
    serviced: i64,
    policy: StepPolicy,
}

impl ChunkStreamer {
    /// The serviced chunk a new world starts with.
    pub const INITIAL_CHUNK: i64 = 1;

    /// Chunk steps beyond this distance from the avatar would be evicted in
    /// the same tick, so catch-up skips generating them.
    const CATCH_UP_REACH: i64 = 2;

    /// Creates a streamer for a viewport `viewport_width` wide.
    ///
    /// # Errors
    ///
    /// Returns `ViewportTooNarrow` if half the width is under one world unit.
    pub fn new(viewport_width: f32, policy: StepPolicy) -> GenerationResult<Self> {
        let half = (viewport_width / 2.0).floor();
        if !half.is_finite() || half < 1.0 {
            return Err(GenerationError::ViewportTooNarrow(viewport_width));
        }
        // Finite and at least 1, well inside i64.
        #[allow(clippy::cast_possible_truncation)]
        let chunk_width = half as i64;
        Ok(Self {
            chunk_width,
            serviced: Self::INITIAL_CHUNK,
            policy,
        })
    }

    /// Chunk width (half the viewport, floored).
    #[inline]
    #[must_use]
    pub const fn chunk_width(&self) -> i64 {
        self.chunk_width
    }

    /// The last chunk index that was serviced.
    #[inline]
    #[must_use]
    pub const fn serviced_chunk(&self) -> i64 {
        self.serviced
    }

    /// The active step policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> StepPolicy {
        self.policy
    }

    /// `floor(x / chunk_width)`.
    #[inline]
    #[must_use]
    pub const fn chunk_of(&self, x: i64) -> i64 {
        x.div_euclid(self.chunk_width)
    }

    /// Forces the serviced chunk, e.g. after a teleport repopulated the
    /// surroundings.
    pub fn reset(&mut self, serviced: i64) {
        self.serviced = serviced;
    }

    /// Services the chunk boundary crossings for an avatar at `avatar_x`.
    ///
    /// Returns the ranges to generate, in the order they were stepped.
    /// Under [`StepPolicy::Single`] this is at most one request.
    pub fn service(&mut self, avatar_x: i64) -> Vec<ChunkRequest> {
        let current = self.chunk_of(avatar_x);
        let mut requests = Vec::new();

        match self.policy {
            StepPolicy::Single => {
                let lag = (current - self.serviced).abs();
                if lag > 1 {
                    tracing::warn!(
                        current,
                        serviced = self.serviced,
                        "avatar crossed {lag} chunk boundaries in one tick; servicing one"
                    );
                }
                if let Some(request) = self.step(avatar_x, current) {
                    requests.push(request);
                }
            }
            StepPolicy::CatchUp => {
                while self.serviced != current {
                    let Some(mut request) = self.step(avatar_x, current) else {
                        break;
                    };
                    let distance = (current - request.chunk).abs();
                    if distance > Self::CATCH_UP_REACH {
                        continue;
                    }
                    // Shift to where the avatar would have stood when
                    // crossing into this chunk.
                    let shift = match request.direction {
                        Direction::Ahead => -distance,
                        Direction::Behind => distance,
                    } * self.chunk_width;
                    request.min_x += shift;
                    request.max_x += shift;
                    requests.push(request);
                }
            }
        }

        requests
    }

    /// One step toward `current`, with the range relative to `avatar_x`.
    fn step(&mut self, avatar_x: i64, current: i64) -> Option<ChunkRequest> {
        let cw = self.chunk_width;
        let request = if current > self.serviced {
            self.serviced += 1;
            ChunkRequest {
                chunk: self.serviced,
                direction: Direction::Ahead,
                min_x: avatar_x + cw,
                max_x: avatar_x + 2 * cw,
            }
        } else if current < self.serviced {
            self.serviced -= 1;
            ChunkRequest {
                chunk: self.serviced,
                direction: Direction::Behind,
                min_x: avatar_x - 2 * cw,
                max_x: avatar_x - cw,
            }
        } else {
            return None;
        };

        tracing::debug!(
            chunk = request.chunk,
            min_x = request.min_x,
            max_x = request.max_x,
            "chunk serviced"
        );
        Some(request)
    }

    /// `[center - 2cw, center + 2cw]` around `center = floor(x / cw) * cw`.
    #[must_use]
    pub const fn retention_window(&self, avatar_x: i64) -> (i64, i64) {
        let center = self.chunk_of(avatar_x) * self.chunk_width;
        (center - 2 * self.chunk_width, center + 2 * self.chunk_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn streamer() -> ChunkStreamer {
        ChunkStreamer::new(800.0, StepPolicy::Single).unwrap()
    }

    #[test]
    fn test_chunk_width_is_half_viewport() {
        assert_eq!(streamer().chunk_width(), 400);
        assert_eq!(ChunkStreamer::new(801.0, StepPolicy::Single).unwrap().chunk_width(), 400);
        assert!(ChunkStreamer::new(1.0, StepPolicy::Single).is_err());
    }

    #[test]
    fn test_scenario_walk_right() {
        let mut s = streamer();
        assert_eq!(s.serviced_chunk(), 1);
        assert!(s.service(401).is_empty());
        assert_eq!(s.serviced_chunk(), 1);

        let requests = s.service(801);
        assert_eq!(
            requests,
            vec![ChunkRequest {
                chunk: 2,
                direction: Direction::Ahead,
                min_x: 1201,
                max_x: 1601,
            }]
        );
        // Same blocks as [1200, 1600] once aligned.
        let grid = Grid::new(30.0).unwrap();
        let aligned = grid.align(requests[0].min_x, requests[0].max_x);
        assert_eq!(aligned, grid.align(1200, 1600));
        assert_eq!((aligned.start, aligned.end), (1200, 1620));
        assert_eq!(s.serviced_chunk(), 2);

        s.reset(1);
        assert!(s.service(401).is_empty());
    }

    #[test]
    fn test_generation_at_boundary() {
        let mut s = streamer();
        let requests = s.service(800);
        assert_eq!(requests[0].min_x, 1200);
        assert_eq!(requests[0].max_x, 1600);
    }

    #[test]
    fn test_one_step_per_boundary() {
        let mut s = streamer();
        let mut last_max = i64::MIN;
        for x in 400..20_000 {
            let before = s.serviced_chunk();
            let requests = s.service(x);
            let after = s.serviced_chunk();
            if s.chunk_of(x) != before {
                assert_eq!(after, before + 1);
                assert_eq!(requests.len(), 1);
                // Consecutive requests at most share an endpoint.
                assert!(requests[0].min_x >= last_max);
                last_max = requests[0].max_x;
            } else {
                assert!(requests.is_empty());
            }
        }
    }

    #[test]
    fn test_walk_left() {
        let mut s = streamer();
        let requests = s.service(-1);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].direction, Direction::Behind);
        assert_eq!((requests[0].min_x, requests[0].max_x), (-801, -401));
        assert_eq!(s.serviced_chunk(), 0);

        // Still behind: chunk of -1 is -1.
        s.service(-1);
        assert_eq!(s.serviced_chunk(), -1);
        assert!(s.service(-1).is_empty());
    }

    #[test]
    fn test_single_policy_lags_after_jump() {
        let mut s = streamer();
        let requests = s.service(4000);
        assert_eq!(requests.len(), 1);
        assert_eq!(s.serviced_chunk(), 2);

        // Catches up one step per tick.
        for expected in 3..=10 {
            s.service(4000);
            assert_eq!(s.serviced_chunk(), expected);
        }
        assert!(s.service(4000).is_empty());
    }

    #[test]
    fn test_catch_up_policy() {
        let mut s = ChunkStreamer::new(800.0, StepPolicy::CatchUp).unwrap();
        let requests = s.service(4000);
        assert_eq!(s.serviced_chunk(), 10);

        // Only chunks near the avatar are generated, adjacent to each other.
        let chunks: Vec<i64> = requests.iter().map(|r| r.chunk).collect();
        assert_eq!(chunks, vec![8, 9, 10]);
        for pair in requests.windows(2) {
            assert_eq!(pair[1].min_x - pair[0].min_x, 400);
        }
        // The final step matches what a single step would request.
        assert_eq!(requests[2].min_x, 4400);
        assert_eq!(requests[2].max_x, 4800);
    }

    #[test]
    fn test_retention_window() {
        let s = streamer();
        assert_eq!(s.retention_window(801), (0, 1600));
        assert_eq!(s.retention_window(-1), (-1200, 400));
    }
}
