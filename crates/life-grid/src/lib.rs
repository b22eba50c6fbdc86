//! Life Grid -- Game of Life state model with incrementally maintained
//! neighbor counts.
//!
//! This crate holds the pure simulation state: a square [`Grid`](grid::Grid)
//! of [`Tile`](tile::Tile)s in row-major order, plus a per-tile count of live
//! Moore neighbors. Counts are never recomputed during normal operation; every
//! change of liveness pushes `+1`/`-1` deltas to the affected neighbors. A
//! generation step classifies all tiles first and applies all deltas last.
//!
//! # Quick Start
//!
//! ```
//! use life_grid::prelude::*;
//!
//! let mut grid = Grid::new(4).unwrap();
//! grid.set_alive(&[5, 6, 9, 10]).unwrap(); // 2x2 block
//!
//! let classification = grid.step();
//! assert!(classification.dies().is_empty());
//! assert!(classification.born().is_empty());
//! assert_eq!(grid.neighbor_count(0).unwrap(), 1);
//! ```

#![deny(unsafe_code)]

pub mod grid;
pub mod neighbors;
pub mod snapshot;
pub mod tile;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The requested side length is below the allowed minimum.
    #[error("invalid grid dimension {dimension}: must be at least {minimum}")]
    InvalidDimension { dimension: usize, minimum: usize },

    /// The requested side length is above the allowed maximum, or its tile
    /// count does not fit in `usize`.
    #[error("invalid grid dimension {dimension}: must be at most {maximum}")]
    DimensionTooLarge { dimension: usize, maximum: usize },

    /// A tile id outside `[0, dimension²)` was referenced.
    #[error("tile id {id} is out of range (grid has {tile_count} tiles)")]
    InvalidTileId { id: usize, tile_count: usize },

    /// A `(row, col)` pair outside the grid was referenced.
    #[error("position ({row}, {col}) is outside a {dimension}x{dimension} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        dimension: usize,
    },

    /// A fill density outside `[0.0, 1.0]`.
    #[error("density {density} must be between 0.0 and 1.0")]
    InvalidDensity { density: f64 },

    /// A stored neighbor count disagrees with the live tiles around it.
    #[error("neighbor count drift at tile {id}: stored {stored}, actual {actual}")]
    NeighborCountDrift { id: usize, stored: u8, actual: u8 },

    /// A snapshot is structurally inconsistent.
    #[error("snapshot mismatch: {details}")]
    SnapshotMismatch { details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::grid::{tile_count_for, Classification, Grid, MAX_DIMENSION, MIN_DIMENSION};
    pub use crate::neighbors::{NeighborCountTable, Neighbors};
    pub use crate::snapshot::{GridSnapshot, TileSnapshot};
    pub use crate::tile::{Tile, TileState};
    pub use crate::GridError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
