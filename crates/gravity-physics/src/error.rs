use thiserror::Error;

/// Reasons a body is refused entry into a simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BodyError {
    #[error("body `{label}` has invalid mass {mass}: mass must be finite and positive")]
    InvalidMass { label: String, mass: f64 },

    #[error("body `{label}` has invalid radius {radius}: radius must be finite and positive")]
    InvalidRadius { label: String, radius: f64 },

    #[error("body `{label}` has a non-finite {field}")]
    NonFinite { label: String, field: &'static str },
}
