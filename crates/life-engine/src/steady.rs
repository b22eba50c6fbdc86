//! Steady-state detection.
//!
//! A generation is steady when no tile dies and no tile is born: applying the
//! rule would leave every state as it is. The check runs on the
//! classification, before the grid is mutated.

use life_grid::grid::Classification;
use serde::{Deserialize, Serialize};

/// Emitted once for each generation found to be steady.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteadyStateReached {
    /// The generation that was found to change nothing.
    pub generation: u64,
    /// Whether periodic playback was active when it was detected.
    pub was_running: bool,
}

/// Pure fixed-point predicate over a tick's classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteadyStateDetector;

impl SteadyStateDetector {
    /// `true` when both the dies and born sets are empty.
    pub fn is_steady(dies: &[usize], born: &[usize]) -> bool {
        dies.is_empty() && born.is_empty()
    }

    pub fn is_fixed_point(classification: &Classification) -> bool {
        Self::is_steady(classification.dies(), classification.born())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_grid::grid::Grid;

    #[test]
    fn empty_sets_are_steady() {
        assert!(SteadyStateDetector::is_steady(&[], &[]));
        assert!(!SteadyStateDetector::is_steady(&[1], &[]));
        assert!(!SteadyStateDetector::is_steady(&[], &[4]));
    }

    #[test]
    fn survivors_do_not_break_steadiness() {
        let mut grid = Grid::new(4).unwrap();
        grid.set_alive(&[5, 6, 9, 10]).unwrap();
        let classification = grid.classify();
        assert_eq!(classification.survives().len(), 4);
        assert!(SteadyStateDetector::is_fixed_point(&classification));
    }

    #[test]
    fn oscillator_is_not_steady() {
        let mut grid = Grid::new(5).unwrap();
        grid.set_alive(&[11, 12, 13]).unwrap();
        assert!(!SteadyStateDetector::is_fixed_point(&grid.classify()));
    }
}
