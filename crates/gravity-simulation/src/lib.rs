//! # Gravity Simulation Engine
//!
//! Frame-driven N-body simulation: the driver that runs a fixed batch of
//! integration steps per presentation frame, the CPU worker-pool and GPU
//! compute integrators, and runtime spawning of new bodies.

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod gpu;
pub mod parallel;
pub mod params;
pub mod scenario;
pub mod simulation;
pub mod spawn;

pub use clock::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use gpu::*;
pub use parallel::*;
pub use params::*;
pub use scenario::*;
pub use simulation::*;
pub use spawn::*;
