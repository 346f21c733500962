//! # Gravity Physics Engine
//!
//! Core Newtonian N-body physics: point-mass bodies, the pairwise
//! inverse-square force law, the reference sequential integrator and the
//! reduced-precision projection consumed by the accelerated integrators.

pub mod body;
pub mod constants;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod reduced;

pub use body::*;
pub use constants::*;
pub use error::*;
pub use forces::*;
pub use integrator::*;
pub use reduced::*;
