//! Grid snapshot and restore support.
//!
//! Provides [`GridSnapshot`] -- a serializable representation of the tile
//! states and lifetimes. Neighbor counts are derived data and are not stored;
//! restoring rebuilds them with a full recount.

use serde::{Deserialize, Serialize};

use crate::grid::{tile_count_for, Grid};
use crate::tile::{Tile, TileState};
use crate::GridError;

/// Serializable state of a single tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub state: TileState,
    pub life_time: u64,
}

/// A complete, serializable snapshot of a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Side length of the grid.
    pub dimension: usize,
    /// Every tile in row-major order.
    pub tiles: Vec<TileSnapshot>,
}

impl Grid {
    /// Capture the tile states and lifetimes.
    pub fn capture_snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            dimension: self.dimension(),
            tiles: self
                .tiles()
                .iter()
                .map(|t| TileSnapshot {
                    state: t.state(),
                    life_time: t.life_time(),
                })
                .collect(),
        }
    }

    /// Build a grid from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] for a zero dimension,
    /// [`GridError::DimensionTooLarge`] above
    /// [`MAX_DIMENSION`](crate::grid::MAX_DIMENSION), and
    /// [`GridError::SnapshotMismatch`] if the tile list has the wrong length
    /// or a non-alive tile carries a lifetime.
    pub fn from_snapshot(snapshot: &GridSnapshot) -> Result<Self, GridError> {
        let expected = tile_count_for(snapshot.dimension)?;
        if snapshot.tiles.len() != expected {
            return Err(GridError::SnapshotMismatch {
                details: format!(
                    "dimension {} needs {expected} tiles, snapshot has {}",
                    snapshot.dimension,
                    snapshot.tiles.len()
                ),
            });
        }
        if let Some((id, tile)) = snapshot
            .tiles
            .iter()
            .enumerate()
            .find(|(_, t)| t.life_time > 0 && !t.state.is_alive())
        {
            return Err(GridError::SnapshotMismatch {
                details: format!(
                    "tile {id} is {:?} but has lifetime {}",
                    tile.state, tile.life_time
                ),
            });
        }

        let tiles = snapshot
            .tiles
            .iter()
            .enumerate()
            .map(|(id, t)| Tile::from_parts(id, t.state, t.life_time))
            .collect();
        Ok(Grid::from_tiles(snapshot.dimension, tiles))
    }

    /// Replace this grid's contents with a snapshot. On error the grid is
    /// unchanged.
    pub fn restore_from_snapshot(&mut self, snapshot: &GridSnapshot) -> Result<(), GridError> {
        *self = Grid::from_snapshot(snapshot)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_rebuilds_neighbor_counts() {
        let mut grid = Grid::new(5).unwrap();
        grid.set_alive(&[11, 12, 13]).unwrap();
        grid.step();

        let snapshot = grid.capture_snapshot();
        let restored = Grid::from_snapshot(&snapshot).unwrap();

        assert_eq!(restored, grid);
        restored.verify_neighbor_counts().unwrap();
    }

    #[test]
    fn snapshot_survives_json() {
        let mut grid = Grid::new(4).unwrap();
        grid.set_alive(&[0, 5]).unwrap();
        grid.toggle(0).unwrap();

        let json = serde_json::to_string(&grid.capture_snapshot()).unwrap();
        let parsed: GridSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Grid::from_snapshot(&parsed).unwrap();

        assert_eq!(restored.tile(0).unwrap().state(), TileState::Dead);
        assert_eq!(restored.alive_ids(), vec![5]);
    }

    #[test]
    fn wrong_tile_count_is_rejected() {
        let mut snapshot = Grid::new(3).unwrap().capture_snapshot();
        snapshot.tiles.pop();
        assert!(matches!(
            Grid::from_snapshot(&snapshot),
            Err(GridError::SnapshotMismatch { .. })
        ));
    }

    #[test]
    fn lifetime_on_dead_tile_is_rejected() {
        let mut snapshot = Grid::new(2).unwrap().capture_snapshot();
        snapshot.tiles[1] = TileSnapshot {
            state: TileState::Dead,
            life_time: 4,
        };
        assert!(Grid::from_snapshot(&snapshot).is_err());
    }

    #[test]
    fn failed_restore_leaves_grid_unchanged() {
        let mut grid = Grid::new(3).unwrap();
        grid.set_alive(&[4]).unwrap();
        let before = grid.clone();

        let bad = GridSnapshot {
            dimension: 0,
            tiles: Vec::new(),
        };
        assert!(grid.restore_from_snapshot(&bad).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn oversized_dimension_is_rejected_without_multiplying() {
        // 2^32 squared wraps to zero in 64-bit arithmetic, matching an empty
        // tile list.
        for dimension in [(u32::MAX as usize).saturating_add(1), usize::MAX] {
            let snapshot = GridSnapshot {
                dimension,
                tiles: Vec::new(),
            };
            assert!(matches!(
                Grid::from_snapshot(&snapshot),
                Err(GridError::DimensionTooLarge { .. })
            ));
        }
    }
}
