//! Playback state: generation counter, speed, and the active timer.
//!
//! The clock is `Running` exactly when it holds a [`TimerHandle`]. Starting
//! acquires a registration from the host's [`TimerDriver`]; stopping drops
//! it, which cancels the registration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{tick_interval, validate_speed};
use crate::timer::{TimerDriver, TimerHandle, TimerId};
use crate::EngineError;

/// Whether periodic ticking is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Running,
}

/// Generation counter, target speed and the periodic registration driving
/// ticks.
#[derive(Debug)]
pub struct SimulationClock {
    generation: u64,
    speed: f64,
    timer: Option<TimerHandle>,
}

impl SimulationClock {
    /// A stopped clock at generation 0.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSpeed`] unless `speed` is positive and
    /// finite.
    pub fn new(speed: f64) -> Result<Self, EngineError> {
        validate_speed(speed)?;
        Ok(Self {
            generation: 0,
            speed,
            timer: None,
        })
    }

    // -- accessors ----------------------------------------------------------

    /// Generations elapsed since the last reset.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Target generations per second.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn state(&self) -> PlaybackState {
        if self.is_running() {
            PlaybackState::Running
        } else {
            PlaybackState::Stopped
        }
    }

    /// Id of the active registration, if running.
    pub fn active_timer(&self) -> Option<TimerId> {
        self.timer.as_ref().map(TimerHandle::id)
    }

    /// Interval the active registration was scheduled with. This can differ
    /// from [`tick_interval`](Self::tick_interval) after a speed change that
    /// did not reschedule.
    pub fn scheduled_interval(&self) -> Option<Duration> {
        self.timer.as_ref().map(TimerHandle::interval)
    }

    /// Interval a registration made now would use.
    pub fn tick_interval(&self) -> Duration {
        tick_interval(self.speed)
    }

    /// Whether `id` is the active registration.
    pub fn is_current(&self, id: TimerId) -> bool {
        self.active_timer() == Some(id)
    }

    // -- transitions --------------------------------------------------------

    /// `Stopped -> Running`. Returns `false` (and does nothing) if already
    /// running.
    pub fn start<T: TimerDriver>(&mut self, driver: &mut T) -> bool {
        if self.is_running() {
            return false;
        }
        let handle = driver.schedule(self.tick_interval());
        info!(
            timer = %handle.id(),
            interval_ms = handle.interval().as_secs_f64() * 1000.0,
            generation = self.generation,
            "playback started"
        );
        self.timer = Some(handle);
        true
    }

    /// `Running -> Stopped`. Returns `false` (and does nothing) if already
    /// stopped.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(handle) => {
                info!(timer = %handle.id(), generation = self.generation, "playback stopped");
                true
            }
            None => false,
        }
    }

    /// Replace the active registration with one at the current speed.
    /// Does nothing while stopped.
    pub fn reschedule<T: TimerDriver>(&mut self, driver: &mut T) {
        if self.timer.take().is_some() {
            let handle = driver.schedule(self.tick_interval());
            info!(timer = %handle.id(), speed = self.speed, "playback rescheduled");
            self.timer = Some(handle);
        }
    }

    /// Store a new speed. The active registration is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSpeed`] unless `speed` is positive and
    /// finite; the clock is unchanged.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), EngineError> {
        validate_speed(speed)?;
        self.speed = speed;
        Ok(())
    }

    /// Count one more generation and return the new value.
    pub fn advance_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn reset_generation(&mut self) {
        self.generation = 0;
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
