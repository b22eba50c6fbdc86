//! The simulation driver: grid, clock and host collaborators.
//!
//! [`Simulation`] owns a [`Grid`] and a [`SimulationClock`] and exposes the
//! operations a host UI drives:
//!
//! - [`step`](Simulation::step) -- advance one generation (from a timer firing
//!   or directly).
//! - [`play`](Simulation::play) / [`pause`](Simulation::pause) /
//!   [`set_speed`](Simulation::set_speed) -- playback.
//! - [`on_tile_click`](Simulation::on_tile_click) -- manual editing, only
//!   while stopped.
//! - [`increase_dimension`](Simulation::increase_dimension) /
//!   [`decrease_dimension`](Simulation::decrease_dimension) /
//!   [`reset`](Simulation::reset) -- structural changes, which always stop
//!   playback first.
//!
//! Each step:
//!
//! 1. Counts the new generation on the clock.
//! 2. Classifies every tile. If nothing dies and nothing is born, the
//!    notifier hears about it and (by default) the clock is stopped, all
//!    before any tile changes.
//! 3. Applies the classification to the grid.
//! 4. Hands the new state to the renderer.
//!
//! Edits and steps never interleave: edits are rejected while running and
//! stopping drops the timer registration, so a firing that arrives after
//! [`pause`](Simulation::pause) returns is ignored.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use life_engine::prelude::*;
//!
//! let timer = ManualTimer::new();
//! let config = SimulationConfig { dimension: 5, ..Default::default() };
//! let mut sim = Simulation::new(config, timer).unwrap();
//!
//! for id in [11, 12, 13] {
//!     sim.on_tile_click(id).unwrap();
//! }
//!
//! sim.play();
//! let reports = sim.advance(Duration::from_secs(2));
//! assert_eq!(reports.len(), 2);
//! assert_eq!(sim.generation(), 2);
//! assert_eq!(sim.grid().alive_ids(), vec![11, 12, 13]);
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use life_grid::grid::{Classification, Grid, MAX_DIMENSION};
use life_grid::tile::TileState;
use life_grid::GridError;

use crate::clock::{PlaybackState, SimulationClock};
use crate::config::{LifetimeResetPolicy, SimulationConfig, SpeedChangePolicy};
use crate::host::{Frame, Notifier, Renderer};
use crate::steady::{SteadyStateDetector, SteadyStateReached};
use crate::timer::{ManualTimer, TimerDriver, TimerId};
use crate::EngineError;

// ---------------------------------------------------------------------------
// StepReport
// ---------------------------------------------------------------------------

/// What happened during one generation step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// The generation this step produced.
    pub generation: u64,
    /// Pre-mutation classification of every tile.
    pub classification: Classification,
    /// No tile died and none was born.
    pub steady: bool,
    /// The step stopped a running clock because it was steady.
    pub auto_paused: bool,
    /// Wall-clock time spent in the step.
    pub duration: Duration,
}

impl StepReport {
    pub fn died(&self) -> usize {
        self.classification.dies().len()
    }

    pub fn survived(&self) -> usize {
        self.classification.survives().len()
    }

    pub fn born(&self) -> usize {
        self.classification.born().len()
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// A steppable, pausable Game of Life simulation.
///
/// Generic over the host's [`TimerDriver`]. Single-threaded by design: the
/// host must deliver timer firings one at a time.
pub struct Simulation<T: TimerDriver> {
    grid: Grid,
    clock: SimulationClock,
    timer: T,
    config: SimulationConfig,
    renderer: Option<Box<dyn Renderer>>,
    notifier: Option<Box<dyn Notifier>>,
    last_report: Option<StepReport>,
}

impl<T: TimerDriver> Simulation<T> {
    /// Create a stopped simulation with an empty grid.
    ///
    /// # Errors
    ///
    /// Returns the first problem found by [`SimulationConfig::validate`].
    pub fn new(config: SimulationConfig, timer: T) -> Result<Self, EngineError> {
        config.validate()?;
        let grid = Grid::new(config.dimension)?;
        let clock = SimulationClock::new(config.speed)?;
        info!(
            dimension = config.dimension,
            speed = config.speed,
            "simulation created"
        );
        Ok(Self {
            grid,
            clock,
            timer,
            config,
            renderer: None,
            notifier: None,
            last_report: None,
        })
    }

    // -- collaborators ------------------------------------------------------

    /// Install the renderer. It immediately receives the current state.
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
        self.render();
    }

    pub fn set_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifier = Some(notifier);
    }

    fn render(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&Frame {
                grid: &self.grid,
                generation: self.clock.generation(),
                running: self.clock.is_running(),
            });
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The host's timer driver.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn generation(&self) -> u64 {
        self.clock.generation()
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn state(&self) -> PlaybackState {
        self.clock.state()
    }

    /// Report from the most recent step.
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            grid: &self.grid,
            generation: self.clock.generation(),
            running: self.clock.is_running(),
        }
    }

    // -- stepping -----------------------------------------------------------

    /// Advance one generation.
    ///
    /// Works whether or not playback is running. A steady generation is
    /// reported to the notifier before the grid changes and, when
    /// `pause_on_steady_state` is set, stops the clock.
    pub fn step(&mut self) -> StepReport {
        let start = Instant::now();
        let was_running = self.clock.is_running();
        let generation = self.clock.advance_generation();
        let pause_on_steady = self.config.pause_on_steady_state;

        let clock = &mut self.clock;
        let notifier = &mut self.notifier;
        let mut steady = false;
        let mut auto_paused = false;

        let classification = self.grid.step_with(|classification| {
            if !SteadyStateDetector::is_fixed_point(classification) {
                return;
            }
            steady = true;
            info!(generation, was_running, "steady state reached");
            if let Some(notifier) = notifier.as_mut() {
                notifier.steady_state_reached(SteadyStateReached {
                    generation,
                    was_running,
                });
            }
            if pause_on_steady {
                auto_paused = clock.stop();
            }
        });

        let report = StepReport {
            generation,
            classification,
            steady,
            auto_paused,
            duration: start.elapsed(),
        };
        debug!(
            generation,
            died = report.died(),
            survived = report.survived(),
            born = report.born(),
            steady,
            "generation computed"
        );

        self.last_report = Some(report.clone());
        self.render();
        report
    }

    /// Run `count` steps back to back. Stops early if a steady generation
    /// pauses the clock while playing.
    pub fn run_steps(&mut self, count: u64) -> Vec<StepReport> {
        let mut reports = Vec::new();
        for _ in 0..count {
            let report = self.step();
            let stop = report.auto_paused;
            reports.push(report);
            if stop {
                break;
            }
        }
        reports
    }

    /// Handle a firing from the host's timer.
    ///
    /// Only the clock's active registration advances the grid. Anything else
    /// is a firing that raced a stop and is dropped.
    pub fn on_timer_fired(&mut self, id: TimerId) -> Option<StepReport> {
        if !self.clock.is_current(id) {
            warn!(timer = %id, active = ?self.clock.active_timer(), "ignoring stale timer firing");
            return None;
        }
        Some(self.step())
    }

    // -- playback -------------------------------------------------------------

    /// Start periodic ticking at the current speed. No-op if running.
    pub fn play(&mut self) -> bool {
        let started = self.clock.start(&mut self.timer);
        if started {
            self.render();
        }
        started
    }

    /// Stop periodic ticking. No-op if stopped.
    pub fn pause(&mut self) -> bool {
        let stopped = self.clock.stop();
        if stopped {
            self.render();
        }
        stopped
    }

    /// Change the target speed.
    ///
    /// Under [`SpeedChangePolicy::ApplyOnNextPlay`] a running timer keeps its
    /// interval; under [`SpeedChangePolicy::Reschedule`] it is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSpeed`] unless `speed` is positive and
    /// finite.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), EngineError> {
        self.clock.set_speed(speed)?;
        match self.config.speed_change {
            SpeedChangePolicy::ApplyOnNextPlay => {
                debug!(speed, running = self.clock.is_running(), "speed updated");
            }
            SpeedChangePolicy::Reschedule => self.clock.reschedule(&mut self.timer),
        }
        Ok(())
    }

    // -- editing --------------------------------------------------------------

    /// Toggle a tile between alive and not alive. Returns its new state.
    ///
    /// Restarts the generation counter. Under
    /// [`LifetimeResetPolicy::WholeGrid`] every lifetime is cleared first, so
    /// only the edited tile (if it became alive) has a nonzero lifetime.
    ///
    /// # Errors
    ///
    /// - [`EngineError::EditWhileRunning`] while playback is active.
    /// - [`EngineError::Grid`] with [`GridError::InvalidTileId`] for an id
    ///   outside the grid.
    ///
    /// The grid is unchanged on error.
    pub fn on_tile_click(&mut self, id: usize) -> Result<TileState, EngineError> {
        if self.clock.is_running() {
            warn!(id, "edit rejected while running");
            return Err(EngineError::EditWhileRunning { id });
        }
        self.grid.tile(id)?;

        if self.config.edit_lifetime_reset == LifetimeResetPolicy::WholeGrid {
            self.grid.reset_life_times();
        }
        self.clock.reset_generation();
        let state = self.grid.toggle(id)?;

        self.render();
        Ok(state)
    }

    /// Bring a set of tiles to life, e.g. to load a pattern. Stops playback
    /// and restarts the generation counter.
    pub fn seed(&mut self, ids: &[usize]) -> Result<(), EngineError> {
        self.grid.set_alive(ids)?;
        self.clock.stop();
        self.clock.reset_generation();
        info!(tiles = ids.len(), "grid seeded");
        self.render();
        Ok(())
    }

    /// Refill the grid randomly. Stops playback and restarts the generation
    /// counter.
    pub fn randomize(&mut self, seed: u64, density: f64) -> Result<(), EngineError> {
        self.grid.randomize(seed, density)?;
        self.clock.stop();
        self.clock.reset_generation();
        info!(seed, density, population = self.grid.population(), "grid randomized");
        self.render();
        Ok(())
    }

    // -- structural changes -------------------------------------------------

    /// Empty every tile, stop playback and restart the generation counter.
    pub fn reset(&mut self) {
        self.clock.stop();
        self.grid.reset();
        self.clock.reset_generation();
        info!(dimension = self.grid.dimension(), "simulation reset");
        self.render();
    }

    /// Grow the grid by one step. Returns the new side length.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionTooLarge`] past
    /// [`MAX_DIMENSION`]; nothing changes and playback continues.
    pub fn increase_dimension(&mut self) -> Result<usize, EngineError> {
        let dimension = self
            .grid
            .dimension()
            .checked_add(self.config.dimension_step)
            .ok_or(GridError::DimensionTooLarge {
                dimension: usize::MAX,
                maximum: MAX_DIMENSION,
            })?;
        self.resize(dimension)?;
        Ok(dimension)
    }

    /// Shrink the grid by one step. Returns the new side length.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if the result would fall below
    /// `min_dimension`; nothing changes and playback continues.
    pub fn decrease_dimension(&mut self) -> Result<usize, EngineError> {
        let dimension = self
            .grid
            .dimension()
            .saturating_sub(self.config.dimension_step);
        self.resize(dimension)?;
        Ok(dimension)
    }

    /// Replace the grid with an empty one of the given side length. Stops
    /// playback and restarts the generation counter.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] below `min_dimension` and
    /// [`GridError::DimensionTooLarge`] above [`MAX_DIMENSION`]; nothing
    /// changes.
    pub fn resize(&mut self, dimension: usize) -> Result<(), EngineError> {
        self.check_floor(dimension)?;
        let grid = Grid::new(dimension)?;
        self.clock.stop();
        self.grid = grid;
        self.clock.reset_generation();
        info!(dimension, "grid resized");
        self.render();
        Ok(())
    }

    /// Reject side lengths below the configured `min_dimension`.
    pub(crate) fn check_floor(&self, dimension: usize) -> Result<(), GridError> {
        if dimension < self.config.min_dimension {
            return Err(GridError::InvalidDimension {
                dimension,
                minimum: self.config.min_dimension,
            });
        }
        Ok(())
    }

    // -- internal access for snapshot restore -------------------------------

    pub(crate) fn replace_state(
        &mut self,
        grid: Grid,
        generation: u64,
        speed: f64,
    ) -> Result<(), EngineError> {
        self.clock.set_speed(speed)?;
        self.clock.stop();
        self.grid = grid;
        self.clock.set_generation(generation);
        self.last_report = None;
        self.render();
        Ok(())
    }
}

impl Simulation<ManualTimer> {
    /// Advance the virtual clock by `elapsed`, stepping once per firing of
    /// the active registration. Returns the reports in order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<StepReport> {
        let timer = self.timer.clone();
        let mut reports = Vec::new();
        timer.advance_with(elapsed, |id| {
            if let Some(report) = self.on_timer_fired(id) {
                reports.push(report);
            }
        });
        reports
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
