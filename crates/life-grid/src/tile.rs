//! Tile state and lifetime tracking.
//!
//! A [`Tile`] is a single cell of the grid. Its [`TileState`] distinguishes a
//! cell that has never been alive ([`TileState::Empty`]) from one that died
//! ([`TileState::Dead`]); both count as "not alive" for the transition rule.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TileState
// ---------------------------------------------------------------------------

/// The state of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileState {
    /// Never been alive since the last reset.
    #[default]
    Empty,
    /// Currently living.
    Alive,
    /// Was alive and has since died.
    Dead,
}

impl TileState {
    /// Whether this state counts as a live neighbor.
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, TileState::Alive)
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// A single cell with a stable row-major id and a lifetime counter.
///
/// `life_time` counts the consecutive generations the tile has been alive.
/// It is zero whenever the tile is not alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: usize,
    state: TileState,
    life_time: u64,
}

impl Tile {
    /// Create an empty tile with the given id.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: TileState::Empty,
            life_time: 0,
        }
    }

    /// Rebuild a tile from raw parts. Used by snapshot restore, which
    /// validates the lifetime invariant before calling this.
    pub(crate) fn from_parts(id: usize, state: TileState, life_time: u64) -> Self {
        Self {
            id,
            state,
            life_time,
        }
    }

    /// Row-major index of this tile.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn state(&self) -> TileState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Consecutive generations spent alive.
    #[inline]
    pub fn life_time(&self) -> u64 {
        self.life_time
    }

    /// Bring the tile to life with a lifetime of one generation.
    pub fn born(&mut self) {
        self.state = TileState::Alive;
        self.life_time = 1;
    }

    /// Kill the tile. It keeps the [`TileState::Dead`] marker until it is
    /// born again or reset.
    pub fn die(&mut self) {
        self.state = TileState::Dead;
        self.life_time = 0;
    }

    /// Record one more generation alive. No-op for tiles that are not alive.
    pub fn survive(&mut self) {
        if self.is_alive() {
            self.life_time += 1;
        }
    }

    /// Return the tile to its initial empty state.
    pub fn reset(&mut self) {
        self.state = TileState::Empty;
        self.life_time = 0;
    }

    /// Zero the lifetime counter without touching the state.
    pub fn reset_life_time(&mut self) {
        self.life_time = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
