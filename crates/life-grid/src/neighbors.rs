//! Moore-neighborhood indexing and the incrementally maintained neighbor
//! count table.
//!
//! Tiles are addressed by a row-major id. Numerically adjacent ids can sit on
//! different rows (the last column of row `r` is followed by the first column
//! of row `r + 1`), so `neighbors_of` filters those column-wrap candidates
//! out explicitly. The grid is not toroidal: edge and corner tiles simply have
//! fewer neighbors.
//!
//! ```text
//! | id - d - 1 | id - d | id - d + 1 |
//! |   id - 1   |   id   |   id + 1   |
//! | id + d - 1 | id + d | id + d + 1 |
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// Neighbors
// ---------------------------------------------------------------------------

/// Maximum size of a Moore neighborhood.
pub const MAX_NEIGHBORS: usize = 8;

/// The in-bounds Moore neighborhood of one tile.
///
/// Holds at most [`MAX_NEIGHBORS`] distinct ids without allocating. The ids
/// form a set: order carries no meaning.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    ids: [usize; MAX_NEIGHBORS],
    len: usize,
}

impl Neighbors {
    fn empty() -> Self {
        Self {
            ids: [0; MAX_NEIGHBORS],
            len: 0,
        }
    }

    fn push(&mut self, id: usize) {
        self.ids[self.len] = id;
        self.len += 1;
    }

    /// Number of neighbors (3 for corners, 5 for edges, 8 for interior tiles
    /// on grids with `dimension >= 3`).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.ids[..self.len]
    }

    pub fn contains(&self, id: usize) -> bool {
        self.as_slice().contains(&id)
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.as_slice().iter().copied()
    }
}

impl fmt::Debug for Neighbors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.as_slice()).finish()
    }
}

impl<'a> IntoIterator for &'a Neighbors {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Compute the Moore neighborhood of `id` on a `dimension x dimension` grid.
///
/// Candidates outside `[0, dimension²)` are dropped, then the three
/// candidates on the wrong side of a left or right edge are dropped. The
/// caller must pass an in-range `id`; the public entry point is
/// [`Grid::neighbors_of`](crate::grid::Grid::neighbors_of), which checks it.
pub(crate) fn neighbors_of(dimension: usize, id: usize) -> Neighbors {
    debug_assert!(dimension >= 1);
    debug_assert!(id < dimension * dimension);

    let d = dimension as isize;
    let tile_count = d * d;
    let i = id as isize;
    let col = id % dimension;
    let first_column = col == 0;
    let last_column = col == dimension - 1;

    // (candidate, leans_left, leans_right)
    let candidates = [
        (i - d - 1, true, false),
        (i - d, false, false),
        (i - d + 1, false, true),
        (i - 1, true, false),
        (i + 1, false, true),
        (i + d - 1, true, false),
        (i + d, false, false),
        (i + d + 1, false, true),
    ];

    let mut neighbors = Neighbors::empty();
    for (candidate, leans_left, leans_right) in candidates {
        if candidate < 0 || candidate >= tile_count {
            continue;
        }
        if (first_column && leans_left) || (last_column && leans_right) {
            continue;
        }
        neighbors.push(candidate as usize);
    }
    neighbors
}

// ---------------------------------------------------------------------------
// NeighborCountTable
// ---------------------------------------------------------------------------

/// Per-tile count of live Moore neighbors.
///
/// The table never computes counts itself. The owning grid keeps it in sync
/// by applying `+1`/`-1` deltas to the neighbors of every tile whose liveness
/// changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborCountTable {
    counts: Vec<u8>,
}

impl NeighborCountTable {
    /// A table of `len` zero counts.
    pub fn new(len: usize) -> Self {
        Self {
            counts: vec![0; len],
        }
    }

    #[inline]
    pub fn get(&self, id: usize) -> u8 {
        self.counts[id]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.counts
    }

    /// Add one to every id in `neighbors`.
    pub fn increment(&mut self, neighbors: &Neighbors) {
        for id in neighbors {
            debug_assert!(self.counts[id] < MAX_NEIGHBORS as u8);
            self.counts[id] += 1;
        }
    }

    /// Subtract one from every id in `neighbors`.
    pub fn decrement(&mut self, neighbors: &Neighbors) {
        for id in neighbors {
            debug_assert!(self.counts[id] > 0, "neighbor count underflow at {id}");
            self.counts[id] -= 1;
        }
    }

    /// Apply a batch of accumulated deltas in one pass.
    pub fn apply(&mut self, deltas: &DeltaBuffer) {
        debug_assert_eq!(deltas.len(), self.counts.len());
        for (count, &delta) in self.counts.iter_mut().zip(deltas.as_slice()) {
            let next = *count as i16 + delta as i16;
            debug_assert!(
                (0..=MAX_NEIGHBORS as i16).contains(&next),
                "neighbor count out of range: {count} + {delta}"
            );
            *count = next as u8;
        }
    }

    /// Zero every count.
    pub fn clear(&mut self) {
        self.counts.fill(0);
    }

    /// Overwrite one count. Only used by full recomputation.
    pub(crate) fn set(&mut self, id: usize, count: u8) {
        self.counts[id] = count;
    }
}

// ---------------------------------------------------------------------------
// DeltaBuffer
// ---------------------------------------------------------------------------

/// Signed per-tile deltas accumulated during a generation step and applied
/// to the [`NeighborCountTable`] only once classification is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaBuffer {
    deltas: Vec<i8>,
}

impl DeltaBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            deltas: vec![0; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[i8] {
        &self.deltas
    }

    /// Record a neighbor lost to death.
    pub fn lose(&mut self, neighbors: &Neighbors) {
        for id in neighbors {
            self.deltas[id] -= 1;
        }
    }

    /// Record a neighbor gained by birth.
    pub fn gain(&mut self, neighbors: &Neighbors) {
        for id in neighbors {
            self.deltas[id] += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(neighbors: Neighbors) -> Vec<usize> {
        let mut ids = neighbors.as_slice().to_vec();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn interior_tile_has_eight_neighbors() {
        assert_eq!(sorted(neighbors_of(3, 4)), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn corners_have_three_neighbors() {
        assert_eq!(sorted(neighbors_of(3, 0)), vec![1, 3, 4]);
        assert_eq!(sorted(neighbors_of(3, 2)), vec![1, 4, 5]);
        assert_eq!(sorted(neighbors_of(3, 6)), vec![3, 4, 7]);
        assert_eq!(sorted(neighbors_of(3, 8)), vec![4, 5, 7]);
    }

    #[test]
    fn left_edge_does_not_wrap_to_previous_row() {
        // id 3 is row 1, col 0; id 2 (row 0, col 2) and id 5 (row 1, col 2)
        // are numerically close but not adjacent.
        let n = neighbors_of(3, 3);
        assert_eq!(sorted(n), vec![0, 1, 4, 6, 7]);
        assert!(!n.contains(2));
        assert!(!n.contains(5));
    }

    #[test]
    fn right_edge_does_not_wrap_to_next_row() {
        let n = neighbors_of(3, 5);
        assert_eq!(sorted(n), vec![1, 2, 4, 7, 8]);
        assert!(!n.contains(3));
        assert!(!n.contains(6));
    }

    #[test]
    fn single_tile_grid_has_no_neighbors() {
        assert!(neighbors_of(1, 0).is_empty());
    }

    #[test]
    fn two_by_two_grid_every_tile_sees_the_other_three() {
        for id in 0..4 {
            let n = neighbors_of(2, id);
            assert_eq!(n.len(), 3);
            assert!(!n.contains(id));
        }
    }

    #[test]
    fn increment_then_decrement_nets_zero() {
        let mut table = NeighborCountTable::new(9);
        let n = neighbors_of(3, 4);
        table.increment(&n);
        assert_eq!(table.get(0), 1);
        assert_eq!(table.get(4), 0);
        table.decrement(&n);
        assert_eq!(table, NeighborCountTable::new(9));
    }

    #[test]
    fn delta_buffer_applies_net_change() {
        let mut table = NeighborCountTable::new(9);
        table.increment(&neighbors_of(3, 0));

        let mut deltas = DeltaBuffer::new(9);
        deltas.lose(&neighbors_of(3, 0));
        deltas.gain(&neighbors_of(3, 2));
        table.apply(&deltas);

        // Tile 1 and 4 neighbor both 0 and 2: lose one, gain one.
        assert_eq!(table.get(1), 1);
        assert_eq!(table.get(4), 1);
        assert_eq!(table.get(3), 0);
        assert_eq!(table.get(5), 1);
    }

    #[test]
    fn neighbors_debug_prints_as_set() {
        let n = neighbors_of(2, 0);
        assert_eq!(format!("{n:?}"), "{1, 2, 3}");
    }
}
