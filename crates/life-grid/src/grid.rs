//! The fixed-size square grid and the generation step.
//!
//! [`Grid`] owns the tiles and the [`NeighborCountTable`]. The central
//! invariant is that `neighbor_counts()[id]` always equals the number of live
//! tiles in `id`'s Moore neighborhood. Every public mutation keeps it.
//!
//! A generation step runs in two phases:
//!
//! 1. **Classify.** Every tile is sorted into *dies*, *survives* or *born*
//!    using only the current counts. Nothing is mutated.
//! 2. **Apply.** Dying tiles are killed and their neighbors collect a `-1`
//!    delta; newborn tiles are born and their neighbors collect a `+1` delta;
//!    survivors age by one generation. The accumulated deltas are written to
//!    the count table only after both passes, so no count is ever read in an
//!    intermediate state.
//!
//! # Example
//!
//! ```
//! use life_grid::prelude::*;
//!
//! // Horizontal blinker on a 5x5 grid.
//! let mut grid = Grid::new(5).unwrap();
//! grid.set_alive(&[11, 12, 13]).unwrap();
//!
//! let classification = grid.step();
//! assert_eq!(classification.born().len(), 2);
//! assert_eq!(grid.alive_ids(), vec![7, 12, 17]);
//! ```

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, trace};

use crate::neighbors::{neighbors_of, DeltaBuffer, NeighborCountTable, Neighbors};
use crate::tile::{Tile, TileState};
use crate::GridError;

/// Smallest grid the model can represent.
pub const MIN_DIMENSION: usize = 1;

/// Largest side length accepted by any constructor or resize.
pub const MAX_DIMENSION: usize = 1 << 14;

/// Number of tiles in a `dimension x dimension` grid.
///
/// # Errors
///
/// Returns [`GridError::InvalidDimension`] below [`MIN_DIMENSION`] and
/// [`GridError::DimensionTooLarge`] above [`MAX_DIMENSION`].
pub fn tile_count_for(dimension: usize) -> Result<usize, GridError> {
    if dimension < MIN_DIMENSION {
        return Err(GridError::InvalidDimension {
            dimension,
            minimum: MIN_DIMENSION,
        });
    }
    if dimension > MAX_DIMENSION {
        return Err(GridError::DimensionTooLarge {
            dimension,
            maximum: MAX_DIMENSION,
        });
    }
    dimension
        .checked_mul(dimension)
        .ok_or(GridError::DimensionTooLarge {
            dimension,
            maximum: MAX_DIMENSION,
        })
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The outcome of classifying every tile against the current neighbor counts.
///
/// Produced before any mutation. Each list holds tile ids in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    dies: Vec<usize>,
    survives: Vec<usize>,
    born: Vec<usize>,
}

impl Classification {
    /// Alive tiles with `<= 1` or `>= 4` live neighbors.
    pub fn dies(&self) -> &[usize] {
        &self.dies
    }

    /// Alive tiles with exactly 2 or 3 live neighbors.
    pub fn survives(&self) -> &[usize] {
        &self.survives
    }

    /// Non-alive tiles with exactly 3 live neighbors.
    pub fn born(&self) -> &[usize] {
        &self.born
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A `dimension x dimension` grid of tiles addressed by row-major id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dimension: usize,
    tiles: Vec<Tile>,
    counts: NeighborCountTable,
}

impl Grid {
    /// Create a grid of empty tiles.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if `dimension` is zero and
    /// [`GridError::DimensionTooLarge`] above [`MAX_DIMENSION`].
    pub fn new(dimension: usize) -> Result<Self, GridError> {
        let tile_count = tile_count_for(dimension)?;
        Ok(Self {
            dimension,
            tiles: (0..tile_count).map(Tile::new).collect(),
            counts: NeighborCountTable::new(tile_count),
        })
    }

    /// Rebuild a grid from restored tiles, recomputing every neighbor count.
    pub(crate) fn from_tiles(dimension: usize, tiles: Vec<Tile>) -> Self {
        let mut grid = Self {
            dimension,
            counts: NeighborCountTable::new(tiles.len()),
            tiles,
        };
        grid.recount_neighbors();
        grid
    }

    // -- accessors ----------------------------------------------------------

    /// Side length of the grid.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Total number of tiles (`dimension²`).
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// All tiles in row-major order.
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Live-neighbor counts, indexed like [`tiles`](Self::tiles).
    #[inline]
    pub fn neighbor_counts(&self) -> &[u8] {
        self.counts.as_slice()
    }

    pub fn tile(&self, id: usize) -> Result<&Tile, GridError> {
        self.check_id(id)?;
        Ok(&self.tiles[id])
    }

    pub fn neighbor_count(&self, id: usize) -> Result<u8, GridError> {
        self.check_id(id)?;
        Ok(self.counts.get(id))
    }

    /// The in-bounds Moore neighborhood of `id`.
    pub fn neighbors_of(&self, id: usize) -> Result<Neighbors, GridError> {
        self.check_id(id)?;
        Ok(neighbors_of(self.dimension, id))
    }

    /// `(row, col)` of a tile id.
    pub fn row_col(&self, id: usize) -> Result<(usize, usize), GridError> {
        self.check_id(id)?;
        Ok((id / self.dimension, id % self.dimension))
    }

    /// Tile id at `(row, col)`.
    pub fn id_at(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row >= self.dimension || col >= self.dimension {
            return Err(GridError::OutOfBounds {
                row,
                col,
                dimension: self.dimension,
            });
        }
        Ok(row * self.dimension + col)
    }

    /// Ids of every live tile, ascending.
    pub fn alive_ids(&self) -> Vec<usize> {
        self.tiles
            .iter()
            .filter(|t| t.is_alive())
            .map(Tile::id)
            .collect()
    }

    /// Number of live tiles.
    pub fn population(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_alive()).count()
    }

    fn check_id(&self, id: usize) -> Result<(), GridError> {
        if id >= self.tiles.len() {
            return Err(GridError::InvalidTileId {
                id,
                tile_count: self.tiles.len(),
            });
        }
        Ok(())
    }

    // -- generation step ----------------------------------------------------

    /// Classify every tile against the current counts without mutating.
    pub fn classify(&self) -> Classification {
        let mut classification = Classification::default();
        for tile in &self.tiles {
            let count = self.counts.get(tile.id());
            match tile.state() {
                TileState::Alive => match count {
                    2 | 3 => classification.survives.push(tile.id()),
                    _ => classification.dies.push(tile.id()),
                },
                TileState::Empty | TileState::Dead => {
                    if count == 3 {
                        classification.born.push(tile.id());
                    }
                }
            }
        }
        classification
    }

    /// Advance one generation. Returns the pre-mutation classification.
    pub fn step(&mut self) -> Classification {
        self.step_with(|_| {})
    }

    /// Advance one generation, handing the classification to `inspect`
    /// before any tile or count is mutated.
    pub fn step_with<F>(&mut self, inspect: F) -> Classification
    where
        F: FnOnce(&Classification),
    {
        let classification = self.classify();
        inspect(&classification);

        let mut deltas = DeltaBuffer::new(self.tiles.len());

        for &id in &classification.dies {
            self.tiles[id].die();
            deltas.lose(&neighbors_of(self.dimension, id));
        }
        for &id in &classification.survives {
            self.tiles[id].survive();
        }
        for &id in &classification.born {
            self.tiles[id].born();
            deltas.gain(&neighbors_of(self.dimension, id));
        }

        self.counts.apply(&deltas);

        debug!(
            died = classification.dies.len(),
            survived = classification.survives.len(),
            born = classification.born.len(),
            "grid step applied"
        );
        debug_assert!(self.verify_neighbor_counts().is_ok());

        classification
    }

    // -- edits ----------------------------------------------------------------

    /// Flip a tile between alive and not alive, updating its neighbors'
    /// counts immediately. Returns the tile's new state.
    ///
    /// A non-alive tile is born (lifetime 1). A live tile dies and keeps the
    /// [`TileState::Dead`] marker.
    pub fn toggle(&mut self, id: usize) -> Result<TileState, GridError> {
        self.check_id(id)?;
        let neighbors = neighbors_of(self.dimension, id);
        let tile = &mut self.tiles[id];
        if tile.is_alive() {
            tile.die();
            self.counts.decrement(&neighbors);
        } else {
            tile.born();
            self.counts.increment(&neighbors);
        }
        let state = tile.state();
        trace!(id, ?state, "tile toggled");
        Ok(state)
    }

    /// Bring every listed tile to life. Already-alive tiles are left alone.
    ///
    /// All ids are validated before anything changes.
    pub fn set_alive(&mut self, ids: &[usize]) -> Result<(), GridError> {
        for &id in ids {
            self.check_id(id)?;
        }
        for &id in ids {
            if !self.tiles[id].is_alive() {
                self.tiles[id].born();
                self.counts.increment(&neighbors_of(self.dimension, id));
            }
        }
        Ok(())
    }

    /// Zero the lifetime of every tile. States and counts are unchanged.
    pub fn reset_life_times(&mut self) {
        for tile in &mut self.tiles {
            tile.reset_life_time();
        }
    }

    /// Return every tile to [`TileState::Empty`] and every count to zero.
    pub fn reset(&mut self) {
        for tile in &mut self.tiles {
            tile.reset();
        }
        self.counts.clear();
    }

    /// Replace the grid with an empty one of a new side length.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if `dimension` is zero and
    /// [`GridError::DimensionTooLarge`] above [`MAX_DIMENSION`]; the grid is
    /// left unchanged.
    pub fn resize(&mut self, dimension: usize) -> Result<(), GridError> {
        *self = Self::new(dimension)?;
        Ok(())
    }

    /// Fill the grid from a seeded RNG. Each tile is alive with probability
    /// `density`; all lifetimes start at 1 for live tiles.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDensity`] unless `0.0 <= density <= 1.0`.
    pub fn randomize(&mut self, seed: u64, density: f64) -> Result<(), GridError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(GridError::InvalidDensity { density });
        }
        let mut rng = Pcg64::seed_from_u64(seed);
        for tile in &mut self.tiles {
            tile.reset();
            if rng.gen_bool(density) {
                tile.born();
            }
        }
        self.recount_neighbors();
        Ok(())
    }

    // -- full recomputation -------------------------------------------------

    /// Count live neighbors of `id` directly from tile states.
    fn live_neighbors(&self, id: usize) -> u8 {
        neighbors_of(self.dimension, id)
            .iter()
            .filter(|&n| self.tiles[n].is_alive())
            .count() as u8
    }

    /// Rebuild every count from tile states.
    pub fn recount_neighbors(&mut self) {
        for id in 0..self.tiles.len() {
            let count = self.live_neighbors(id);
            self.counts.set(id, count);
        }
    }

    /// Check the incremental counts against a full recount.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NeighborCountDrift`] for the first id whose stored
    /// count disagrees with its live neighbors.
    pub fn verify_neighbor_counts(&self) -> Result<(), GridError> {
        for id in 0..self.tiles.len() {
            let actual = self.live_neighbors(id);
            let stored = self.counts.get(id);
            if stored != actual {
                return Err(GridError::NeighborCountDrift { id, stored, actual });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(dimension: usize, alive: &[usize]) -> Grid {
        let mut grid = Grid::new(dimension).unwrap();
        grid.set_alive(alive).unwrap();
        grid
    }

    // -- construction -------------------------------------------------------

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(4).unwrap();
        assert_eq!(grid.dimension(), 4);
        assert_eq!(grid.tile_count(), 16);
        assert!(grid.tiles().iter().all(|t| t.state() == TileState::Empty));
        assert!(grid.neighbor_counts().iter().all(|&c| c == 0));
        for (index, tile) in grid.tiles().iter().enumerate() {
            assert_eq!(tile.id(), index);
        }
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let err = Grid::new(0).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidDimension {
                dimension: 0,
                minimum: 1
            }
        ));
    }

    #[test]
    fn oversized_dimension_is_rejected() {
        for dimension in [MAX_DIMENSION + 1, usize::MAX] {
            assert!(matches!(
                Grid::new(dimension),
                Err(GridError::DimensionTooLarge { maximum: MAX_DIMENSION, .. })
            ));
        }
        assert_eq!(tile_count_for(MAX_DIMENSION).unwrap(), MAX_DIMENSION * MAX_DIMENSION);

        let mut grid = Grid::new(3).unwrap();
        grid.set_alive(&[4]).unwrap();
        let before = grid.clone();
        assert!(grid.resize(usize::MAX).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        let mut grid = Grid::new(3).unwrap();
        assert!(matches!(
            grid.tile(9),
            Err(GridError::InvalidTileId {
                id: 9,
                tile_count: 9
            })
        ));
        assert!(grid.toggle(9).is_err());
        assert!(grid.neighbors_of(100).is_err());
        assert!(grid.set_alive(&[0, 9]).is_err());
        // Validation happens before mutation.
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn row_col_and_id_at_agree() {
        let grid = Grid::new(5).unwrap();
        assert_eq!(grid.row_col(13).unwrap(), (2, 3));
        assert_eq!(grid.id_at(2, 3).unwrap(), 13);
        assert!(matches!(
            grid.id_at(5, 0),
            Err(GridError::OutOfBounds { row: 5, .. })
        ));
    }

    // -- toggle ---------------------------------------------------------------

    #[test]
    fn toggle_updates_neighbor_counts() {
        let mut grid = Grid::new(3).unwrap();
        assert_eq!(grid.toggle(4).unwrap(), TileState::Alive);
        for id in [0, 1, 2, 3, 5, 6, 7, 8] {
            assert_eq!(grid.neighbor_count(id).unwrap(), 1);
        }
        assert_eq!(grid.neighbor_count(4).unwrap(), 0);
        assert_eq!(grid.tile(4).unwrap().life_time(), 1);
    }

    #[test]
    fn toggle_twice_restores_counts_and_leaves_dead_marker() {
        let mut grid = grid_with(4, &[5, 6]);
        let before = grid.neighbor_counts().to_vec();

        grid.toggle(10).unwrap();
        assert_eq!(grid.toggle(10).unwrap(), TileState::Dead);

        assert_eq!(grid.neighbor_counts(), before.as_slice());
        assert_eq!(grid.tile(10).unwrap().life_time(), 0);
        grid.verify_neighbor_counts().unwrap();
    }

    // -- classification -------------------------------------------------------

    #[test]
    fn classify_does_not_mutate() {
        let grid = grid_with(5, &[11, 12, 13]);
        let before = grid.clone();
        let classification = grid.classify();
        assert_eq!(grid, before);
        assert_eq!(classification.dies(), &[11, 13]);
        assert_eq!(classification.survives(), &[12]);
        assert_eq!(classification.born(), &[7, 17]);
    }

    #[test]
    fn dead_tiles_can_be_born_again() {
        // 3 live tiles in an L around tile 4, which was previously killed.
        let mut grid = grid_with(3, &[4]);
        grid.toggle(4).unwrap();
        grid.set_alive(&[0, 1, 3]).unwrap();
        assert_eq!(grid.tile(4).unwrap().state(), TileState::Dead);

        let classification = grid.classify();
        assert!(classification.born().contains(&4));
    }

    // -- step -----------------------------------------------------------------

    #[test]
    fn blinker_oscillates() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        grid.step();
        assert_eq!(grid.alive_ids(), vec![7, 12, 17]);
        grid.step();
        assert_eq!(grid.alive_ids(), vec![11, 12, 13]);
        grid.verify_neighbor_counts().unwrap();
    }

    #[test]
    fn step_marks_dying_tiles_dead() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        grid.step();
        assert_eq!(grid.tile(11).unwrap().state(), TileState::Dead);
        assert_eq!(grid.tile(13).unwrap().state(), TileState::Dead);
        assert_eq!(grid.tile(0).unwrap().state(), TileState::Empty);
    }

    #[test]
    fn survivors_age_and_newborns_start_at_one() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        grid.step();
        assert_eq!(grid.tile(12).unwrap().life_time(), 2);
        assert_eq!(grid.tile(7).unwrap().life_time(), 1);
        assert_eq!(grid.tile(17).unwrap().life_time(), 1);
    }

    #[test]
    fn block_is_a_fixed_point() {
        let mut grid = grid_with(4, &[5, 6, 9, 10]);
        let classification = grid.step();
        assert!(classification.dies().is_empty());
        assert!(classification.born().is_empty());
        assert_eq!(classification.survives(), &[5, 6, 9, 10]);
        assert_eq!(grid.alive_ids(), vec![5, 6, 9, 10]);
    }

    #[test]
    fn step_with_sees_pre_mutation_state() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        let mut seen = Vec::new();
        grid.step_with(|c| seen.extend_from_slice(c.born()));
        assert_eq!(seen, vec![7, 17]);
    }

    #[test]
    fn overcrowded_tile_dies() {
        // Centre of a plus shape has 4 neighbors.
        let mut grid = grid_with(3, &[1, 3, 4, 5, 7]);
        let classification = grid.step();
        assert!(classification.dies().contains(&4));
        assert!(!grid.tile(4).unwrap().is_alive());
    }

    #[test]
    fn lonely_tile_dies_on_single_tile_grid() {
        let mut grid = grid_with(1, &[0]);
        let classification = grid.step();
        assert_eq!(classification.dies(), &[0]);
        assert_eq!(grid.population(), 0);
    }

    // -- reset / resize / randomize -------------------------------------------

    #[test]
    fn reset_clears_everything() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        grid.step();
        grid.reset();
        assert!(grid.tiles().iter().all(|t| t.state() == TileState::Empty));
        assert!(grid.tiles().iter().all(|t| t.life_time() == 0));
        assert!(grid.neighbor_counts().iter().all(|&c| c == 0));
    }

    #[test]
    fn reset_life_times_keeps_states() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        grid.step();
        grid.reset_life_times();
        assert_eq!(grid.alive_ids(), vec![7, 12, 17]);
        assert!(grid.tiles().iter().all(|t| t.life_time() == 0));
    }

    #[test]
    fn resize_replaces_with_empty_grid() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        grid.resize(10).unwrap();
        assert_eq!(grid.tile_count(), 100);
        assert_eq!(grid.population(), 0);
        assert!(grid.neighbor_counts().iter().all(|&c| c == 0));
    }

    #[test]
    fn failed_resize_leaves_grid_unchanged() {
        let mut grid = grid_with(5, &[11, 12, 13]);
        let before = grid.clone();
        assert!(grid.resize(0).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn randomize_is_deterministic_per_seed() {
        let mut a = Grid::new(20).unwrap();
        let mut b = Grid::new(20).unwrap();
        a.randomize(42, 0.4).unwrap();
        b.randomize(42, 0.4).unwrap();
        assert_eq!(a, b);
        a.verify_neighbor_counts().unwrap();
        assert!(a.population() > 0);
    }

    #[test]
    fn randomize_rejects_bad_density() {
        let mut grid = Grid::new(5).unwrap();
        assert!(matches!(
            grid.randomize(1, 1.5),
            Err(GridError::InvalidDensity { .. })
        ));
        assert!(grid.randomize(1, f64::NAN).is_err());
    }

    #[test]
    fn randomize_extremes() {
        let mut grid = Grid::new(6).unwrap();
        grid.randomize(7, 1.0).unwrap();
        assert_eq!(grid.population(), 36);
        grid.randomize(7, 0.0).unwrap();
        assert_eq!(grid.population(), 0);
        grid.verify_neighbor_counts().unwrap();
    }

    #[test]
    fn verify_detects_drift() {
        let mut grid = grid_with(3, &[4]);
        grid.counts.set(0, 0);
        assert!(matches!(
            grid.verify_neighbor_counts(),
            Err(GridError::NeighborCountDrift {
                id: 0,
                stored: 0,
                actual: 1
            })
        ));
        grid.recount_neighbors();
        grid.verify_neighbor_counts().unwrap();
    }
}
