//! Life Engine -- playback driver for the Game of Life grid.
//!
//! This crate builds on [`life_grid`] to provide the simulation driver: a
//! generation clock that steps the grid on host timer firings, pause and
//! speed control, steady-state detection with auto-pause, manual editing
//! rules, resizing, and hashed snapshots.
//!
//! The engine has no event loop and draws nothing. Hosts plug in a
//! [`TimerDriver`](timer::TimerDriver), a [`Renderer`](host::Renderer) and a
//! [`Notifier`](host::Notifier).
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use life_engine::prelude::*;
//!
//! let config = SimulationConfig { dimension: 4, ..Default::default() };
//! let mut sim = Simulation::new(config, ManualTimer::new()).unwrap();
//!
//! // 2x2 block: a still life.
//! sim.seed(&[5, 6, 9, 10]).unwrap();
//! sim.play();
//!
//! let reports = sim.advance(Duration::from_secs(10));
//! assert_eq!(reports.len(), 1);
//! assert!(reports[0].steady);
//! assert!(!sim.is_running());
//! ```

#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod host;
pub mod simulation;
pub mod snapshot;
pub mod steady;
pub mod timer;

/// Re-export the grid crate for convenience.
pub use life_grid;

use life_grid::GridError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by simulation operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A grid-level failure: bad id, bad dimension, bad density.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Manual edits are only accepted while stopped.
    #[error("tile {id} cannot be edited while the simulation is running")]
    EditWhileRunning { id: usize },

    #[error("speed {speed} must be positive and finite")]
    InvalidSpeed { speed: f64 },

    /// A configuration field outside its allowed range.
    #[error("invalid configuration: {details}")]
    InvalidConfig { details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use life_grid::prelude::*;

    pub use crate::clock::{PlaybackState, SimulationClock};
    pub use crate::config::{
        tick_interval, LifetimeResetPolicy, SimulationConfig, SpeedChangePolicy,
    };
    pub use crate::host::{Frame, Notifier, Renderer};
    pub use crate::simulation::{Simulation, StepReport};
    pub use crate::snapshot::EngineSnapshot;
    pub use crate::steady::{SteadyStateDetector, SteadyStateReached};
    pub use crate::timer::{ManualTimer, TimerDriver, TimerHandle, TimerId};
    pub use crate::EngineError;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
