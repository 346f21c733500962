//! Simulation configuration
//!
//! Defaults reproduce the interactive solar-system setup: 0.4 s steps,
//! 10 000 steps per presentation frame, physical G.

use gravity_physics::{GravityLaw, G, SINGULARITY_EPSILON};

use crate::error::SimulationError;

pub const DEFAULT_TIME_STEP: f64 = 0.4;
pub const DEFAULT_STEPS_PER_FRAME: u32 = 10_000;
/// Spawn velocity per pixel of drag (m/s)
pub const DEFAULT_VELOCITY_GAIN: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Seconds of simulated time per integration step
    pub dt: f64,
    /// Integration steps per presentation frame
    pub steps_per_frame: u32,
    pub gravitational_constant: f64,
    /// Pairs closer than this are skipped
    pub epsilon: f64,
    /// Drag-to-velocity factor for spawned bodies
    pub velocity_gain: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_TIME_STEP,
            steps_per_frame: DEFAULT_STEPS_PER_FRAME,
            gravitational_constant: G,
            epsilon: SINGULARITY_EPSILON,
            velocity_gain: DEFAULT_VELOCITY_GAIN,
        }
    }
}

impl SimulationConfig {
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_steps_per_frame(mut self, steps: u32) -> Self {
        self.steps_per_frame = steps;
        self
    }

    pub fn with_gravitational_constant(mut self, g: f64) -> Self {
        self.gravitational_constant = g;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_velocity_gain(mut self, gain: f64) -> Self {
        self.velocity_gain = gain;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        validate_time_step(self.dt)?;
        validate_gravitational_constant(self.gravitational_constant)?;
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(SimulationError::InvalidEpsilon(self.epsilon));
        }
        if !self.velocity_gain.is_finite() {
            return Err(SimulationError::InvalidVelocityGain(self.velocity_gain));
        }
        Ok(())
    }

    pub fn law(&self) -> GravityLaw {
        GravityLaw::new(self.gravitational_constant, self.epsilon)
    }
}

pub(crate) fn validate_time_step(dt: f64) -> Result<(), SimulationError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidTimeStep(dt))
    }
}

pub(crate) fn validate_gravitational_constant(g: f64) -> Result<(), SimulationError> {
    if g.is_finite() && g > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidGravitationalConstant(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dt, 0.4);
        assert_eq!(config.steps_per_frame, 10_000);
        assert_eq!(config.gravitational_constant, 6.67430e-11);
    }

    #[test]
    fn test_rejects_bad_time_step() {
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = SimulationConfig::default().with_dt(dt).validate();
            assert!(matches!(err, Err(SimulationError::InvalidTimeStep(_))));
        }
    }

    #[test]
    fn test_rejects_bad_constants() {
        let g = SimulationConfig::default()
            .with_gravitational_constant(0.0)
            .validate();
        assert_eq!(g, Err(SimulationError::InvalidGravitationalConstant(0.0)));

        let eps = SimulationConfig::default().with_epsilon(-1.0).validate();
        assert_eq!(eps, Err(SimulationError::InvalidEpsilon(-1.0)));

        let gain = SimulationConfig::default()
            .with_velocity_gain(f64::NAN)
            .validate();
        assert!(matches!(gain, Err(SimulationError::InvalidVelocityGain(_))));
    }

    #[test]
    fn test_zero_steps_per_frame_is_allowed() {
        let config = SimulationConfig::default().with_steps_per_frame(0);
        assert!(config.validate().is_ok());
    }
}
