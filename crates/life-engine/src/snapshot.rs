//! Simulation snapshot and restore with BLAKE3 hashing.
//!
//! Provides [`EngineSnapshot`] -- a serializable representation of the
//! simulation state (tile states and lifetimes, generation, speed) with a
//! BLAKE3 content hash for integrity checks and determinism tests.
//!
//! ```
//! use life_engine::prelude::*;
//!
//! let config = SimulationConfig { dimension: 5, ..Default::default() };
//! let mut sim = Simulation::new(config, ManualTimer::new()).unwrap();
//! sim.seed(&[11, 12, 13]).unwrap();
//! sim.run_steps(3);
//!
//! let snapshot = sim.capture_snapshot();
//! assert_eq!(snapshot.generation, 3);
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! sim.run_steps(5);
//! sim.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(sim.generation(), 3);
//! assert_eq!(sim.state_hash(), snapshot.hash);
//! ```
//!
//! Not captured: playback state (restore always leaves the simulation
//! stopped), configuration, and the host collaborators.

use serde::{Deserialize, Serialize};
use tracing::info;

use life_grid::grid::Grid;
use life_grid::snapshot::GridSnapshot;

use crate::config::validate_speed;
use crate::simulation::Simulation;
use crate::timer::TimerDriver;

// ---------------------------------------------------------------------------
// EngineSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of a [`Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Tile states and lifetimes.
    pub grid: GridSnapshot,
    /// Generation counter at capture time.
    pub generation: u64,
    /// Target generations per second.
    pub speed: f64,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the fields above.
    pub hash: String,
}

/// BLAKE3 hex digest of the hashable state. The hash field itself is not
/// included.
fn compute_hash(grid: &GridSnapshot, generation: u64, speed: f64) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        grid: &'a GridSnapshot,
        generation: u64,
        speed: f64,
    }

    let json_bytes = serde_json::to_vec(&HashableState {
        grid,
        generation,
        speed,
    })
    .expect("simulation state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// Simulation snapshot/restore methods
// ---------------------------------------------------------------------------

impl<T: TimerDriver> Simulation<T> {
    /// Capture the grid, generation counter and speed.
    pub fn capture_snapshot(&self) -> EngineSnapshot {
        let grid = self.grid().capture_snapshot();
        let generation = self.generation();
        let speed = self.speed();
        let hash = compute_hash(&grid, generation, speed);
        EngineSnapshot {
            grid,
            generation,
            speed,
            hash,
        }
    }

    /// Restore a previously captured snapshot.
    ///
    /// The speed, hash and grid are all checked before anything changes,
    /// including the configured `min_dimension` floor that
    /// [`resize`](Simulation::resize) enforces. On success playback is
    /// stopped and the renderer receives the restored state.
    ///
    /// # Errors
    ///
    /// Returns an error if the speed is invalid, the hash does not match the
    /// contents, the dimension is outside the allowed range, or the grid
    /// snapshot is inconsistent. The simulation is untouched on error.
    pub fn restore_from_snapshot(&mut self, snapshot: &EngineSnapshot) -> Result<(), anyhow::Error> {
        validate_speed(snapshot.speed)
            .map_err(|e| anyhow::anyhow!("snapshot has invalid speed: {e}"))?;

        let expected_hash = compute_hash(&snapshot.grid, snapshot.generation, snapshot.speed);
        if expected_hash != snapshot.hash {
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}",
                snapshot.hash,
                expected_hash
            ));
        }

        self.check_floor(snapshot.grid.dimension)
            .map_err(|e| anyhow::anyhow!("snapshot grid is below the configured floor: {e}"))?;
        let grid = Grid::from_snapshot(&snapshot.grid)
            .map_err(|e| anyhow::anyhow!("failed to restore grid from snapshot: {e}"))?;

        self.replace_state(grid, snapshot.generation, snapshot.speed)?;
        info!(
            generation = snapshot.generation,
            dimension = snapshot.grid.dimension,
            "snapshot restored"
        );
        Ok(())
    }

    /// Hash of the current state, equal to the `hash` a snapshot taken now
    /// would carry.
    pub fn state_hash(&self) -> String {
        compute_hash(
            &self.grid().capture_snapshot(),
            self.generation(),
            self.speed(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
