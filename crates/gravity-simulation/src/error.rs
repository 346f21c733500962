use gravity_physics::BodyError;
use thiserror::Error;

use crate::simulation::IntegratorKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f64),

    #[error("gravitational constant must be finite and positive, got {0}")]
    InvalidGravitationalConstant(f64),

    #[error("singularity epsilon must be finite and non-negative, got {0}")]
    InvalidEpsilon(f64),

    #[error("spawn velocity gain must be finite, got {0}")]
    InvalidVelocityGain(f64),

    #[error("view scale must be finite and positive, got {0}")]
    InvalidViewScale(f64),

    #[error("spawn gesture has a non-finite {0}")]
    NonFiniteGesture(&'static str),

    #[error("{0} integrator is not available: no GPU device attached")]
    GpuUnavailable(IntegratorKind),

    #[error("GPU initialization failed: {0}")]
    GpuInit(String),

    #[error("GPU batch failed: {0}")]
    GpuBatch(String),

    #[error("GPU readback failed: {0}")]
    GpuReadback(String),

    #[error("unknown {kind} `{value}`")]
    UnknownName { kind: &'static str, value: String },
}
