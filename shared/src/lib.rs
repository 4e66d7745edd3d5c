//! Types and rules shared between the arena server and its clients.
//!
//! Anything a client needs to reproduce exactly (the wire protocol, the
//! class table, the level curve) lives here so both sides compile the same
//! code.

pub mod catalog;
pub mod constants;
pub mod math;
pub mod progression;
pub mod protocol;

pub use catalog::{ClassStats, LeafKind, PlayerClass, DEFAULT_STATS};
pub use constants::*;
pub use progression::{level_bounds, level_for_xp, level_progress, LevelBounds};
pub use protocol::{
    Command, EntityId, InputState, LeafSnapshot, PlayerSnapshot, ProtocolError, ServerMessage,
    Snapshot, SpiderSnapshot,
};

use serde::{Deserialize, Serialize};

/// Rectangular play area with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub w: f32,
    pub h: f32,
}

impl World {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    /// Clamps a circle's centre so the whole circle stays inside the world.
    pub fn clamp_circle(&self, x: f32, y: f32, r: f32) -> (f32, f32) {
        (
            math::clamp(x, r, self.w - r),
            math::clamp(y, r, self.h - r),
        )
    }

    pub fn contains_circle(&self, x: f32, y: f32, r: f32) -> bool {
        x >= r && x <= self.w - r && y >= r && y <= self.h - r
    }

    /// Whether a point keeps at least `margin` from every edge.
    pub fn within_margin(&self, x: f32, y: f32, margin: f32) -> bool {
        x >= margin && x <= self.w - margin && y >= margin && y <= self.h - margin
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WORLD_WIDTH, WORLD_HEIGHT)
    }
}
