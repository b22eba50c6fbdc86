//! Simulation configuration.
//!
//! [`SimulationConfig`] carries the construction-time settings of a
//! [`Simulation`](crate::simulation::Simulation): the initial side length,
//! how far resize steps go, the playback speed, and the two behavioral
//! policies where more than one reasonable behavior exists.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EngineError;
use life_grid::grid::MIN_DIMENSION;
use life_grid::GridError;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What [`Simulation::set_speed`](crate::simulation::Simulation::set_speed)
/// does while the simulation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedChangePolicy {
    /// Store the new speed; the running timer keeps its interval until the
    /// next `play()`.
    #[default]
    ApplyOnNextPlay,
    /// Replace the running timer with one at the new interval immediately.
    Reschedule,
}

/// Which lifetimes a manual tile edit clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifetimeResetPolicy {
    /// Every tile's lifetime restarts from zero.
    #[default]
    WholeGrid,
    /// Only the edited tile's lifetime changes.
    EditedTileOnly,
}

// ---------------------------------------------------------------------------
// SimulationConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Initial side length. Must be at least 1.
    pub dimension: usize,
    /// Amount added or removed by one resize step.
    pub dimension_step: usize,
    /// Smallest side length a decrease may reach.
    pub min_dimension: usize,
    /// Target generations per second. Must be positive and finite.
    pub speed: f64,
    pub speed_change: SpeedChangePolicy,
    pub edit_lifetime_reset: LifetimeResetPolicy,
    /// Stop the clock when a generation changes nothing.
    pub pause_on_steady_state: bool,
}

impl Default for SimulationConfig {
    /// A 10x10 grid at one generation per second, resized in steps of 5
    /// down to a floor of 5.
    fn default() -> Self {
        Self {
            dimension: 10,
            dimension_step: 5,
            min_dimension: 5,
            speed: 1.0,
            speed_change: SpeedChangePolicy::default(),
            edit_lifetime_reset: LifetimeResetPolicy::default(),
            pause_on_steady_state: true,
        }
    }
}

impl SimulationConfig {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Grid`] with [`GridError::InvalidDimension`] if
    ///   `dimension` is zero.
    /// - [`EngineError::InvalidSpeed`] if `speed` is not positive and finite.
    /// - [`EngineError::InvalidConfig`] for a zero `dimension_step` or
    ///   `min_dimension`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.dimension < MIN_DIMENSION {
            return Err(GridError::InvalidDimension {
                dimension: self.dimension,
                minimum: MIN_DIMENSION,
            }
            .into());
        }
        validate_speed(self.speed)?;
        if self.dimension_step == 0 {
            return Err(EngineError::InvalidConfig {
                details: "dimension_step must be at least 1".to_owned(),
            });
        }
        if self.min_dimension < MIN_DIMENSION {
            return Err(EngineError::InvalidConfig {
                details: format!("min_dimension must be at least {MIN_DIMENSION}"),
            });
        }
        Ok(())
    }
}

/// Reject speeds that are zero, negative, NaN or infinite.
pub(crate) fn validate_speed(speed: f64) -> Result<(), EngineError> {
    if speed > 0.0 && speed.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidSpeed { speed })
    }
}

/// Timer interval for a speed in generations per second (`1000 / speed` ms).
///
/// Never shorter than one nanosecond, so extreme speeds cannot produce a
/// zero-length period.
pub fn tick_interval(speed: f64) -> Duration {
    Duration::from_secs_f64(1.0 / speed).max(Duration::from_nanos(1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_host() {
        let config = SimulationConfig::default();
        assert_eq!(config.dimension, 10);
        assert_eq!(config.dimension_step, 5);
        assert_eq!(config.min_dimension, 5);
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.speed_change, SpeedChangePolicy::ApplyOnNextPlay);
        assert_eq!(config.edit_lifetime_reset, LifetimeResetPolicy::WholeGrid);
        assert!(config.pause_on_steady_state);
        config.validate().unwrap();
    }

    #[test]
    fn zero_dimension_is_invalid() {
        let config = SimulationConfig {
            dimension: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::Grid(GridError::InvalidDimension { .. }))
        ));
    }

    #[test]
    fn bad_speeds_are_invalid() {
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SimulationConfig {
                speed,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(EngineError::InvalidSpeed { .. })),
                "speed {speed} should be rejected"
            );
        }
    }

    #[test]
    fn zero_step_is_invalid() {
        let config = SimulationConfig {
            dimension_step: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn interval_is_inverse_of_speed() {
        assert_eq!(tick_interval(1.0), Duration::from_secs(1));
        assert_eq!(tick_interval(4.0), Duration::from_millis(250));
        assert_eq!(tick_interval(1e15), Duration::from_nanos(1));
    }

    #[test]
    fn config_survives_json() {
        let config = SimulationConfig {
            speed_change: SpeedChangePolicy::Reschedule,
            edit_lifetime_reset: LifetimeResetPolicy::EditedTileOnly,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
