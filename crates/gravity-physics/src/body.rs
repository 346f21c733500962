//! Body types and properties for point-mass gravity simulation

use glam::DVec3;

use crate::error::BodyError;

/// Display category of a body
///
/// Dynamics never look at this; renderers dispatch on it to pick a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Projectile,
    #[default]
    Custom,
}

impl BodyKind {
    pub const ALL: [BodyKind; 5] = [
        BodyKind::Star,
        BodyKind::Planet,
        BodyKind::Moon,
        BodyKind::Projectile,
        BodyKind::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BodyKind::Star => "Star",
            BodyKind::Planet => "Planet",
            BodyKind::Moon => "Moon",
            BodyKind::Projectile => "Projectile",
            BodyKind::Custom => "Custom",
        }
    }
}

impl std::fmt::Display for BodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A massive point particle
///
/// Mass and radius are fixed at construction and always finite and positive.
/// Position and velocity are advanced in place by the integrators.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Position in metres
    pub position: DVec3,
    /// Velocity in metres per second
    pub velocity: DVec3,
    mass: f64,
    radius: f64,
    /// Free-form name, informational only
    pub label: String,
    pub kind: BodyKind,
}

impl Body {
    /// Create a validated body.
    ///
    /// Rejects non-positive or non-finite mass and radius, and non-finite
    /// position or velocity components.
    pub fn new(
        label: impl Into<String>,
        kind: BodyKind,
        position: DVec3,
        velocity: DVec3,
        mass: f64,
        radius: f64,
    ) -> Result<Self, BodyError> {
        let label = label.into();

        if !mass.is_finite() || mass <= 0.0 {
            return Err(BodyError::InvalidMass { label, mass });
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BodyError::InvalidRadius { label, radius });
        }
        if !position.is_finite() {
            return Err(BodyError::NonFinite {
                label,
                field: "position",
            });
        }
        if !velocity.is_finite() {
            return Err(BodyError::NonFinite {
                label,
                field: "velocity",
            });
        }

        Ok(Self {
            position,
            velocity,
            mass,
            radius,
            label,
            kind,
        })
    }

    /// Create a validated body in the z = 0 plane
    pub fn planar(
        label: impl Into<String>,
        kind: BodyKind,
        position: [f64; 2],
        velocity: [f64; 2],
        mass: f64,
        radius: f64,
    ) -> Result<Self, BodyError> {
        Self::new(
            label,
            kind,
            DVec3::new(position[0], position[1], 0.0),
            DVec3::new(velocity[0], velocity[1], 0.0),
            mass,
            radius,
        )
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Display radius in metres; never affects dynamics
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_mass() {
        let zero = Body::new("z", BodyKind::Custom, DVec3::ZERO, DVec3::ZERO, 0.0, 1.0);
        assert!(matches!(zero, Err(BodyError::InvalidMass { .. })));

        let negative = Body::new("n", BodyKind::Custom, DVec3::ZERO, DVec3::ZERO, -5.0, 1.0);
        assert!(matches!(negative, Err(BodyError::InvalidMass { .. })));

        let nan = Body::new("nan", BodyKind::Custom, DVec3::ZERO, DVec3::ZERO, f64::NAN, 1.0);
        assert!(matches!(nan, Err(BodyError::InvalidMass { .. })));
    }

    #[test]
    fn test_rejects_bad_radius_and_state() {
        let radius = Body::new("r", BodyKind::Star, DVec3::ZERO, DVec3::ZERO, 1.0, 0.0);
        assert!(matches!(radius, Err(BodyError::InvalidRadius { .. })));

        let position = Body::new(
            "p",
            BodyKind::Star,
            DVec3::new(f64::INFINITY, 0.0, 0.0),
            DVec3::ZERO,
            1.0,
            1.0,
        );
        assert_eq!(
            position,
            Err(BodyError::NonFinite {
                label: "p".to_string(),
                field: "position"
            })
        );
    }

    #[test]
    fn test_planar_body() {
        let body = Body::planar("Earth", BodyKind::Planet, [1.0, 2.0], [3.0, 4.0], 10.0, 1.0)
            .unwrap();
        assert_eq!(body.position, DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(body.velocity, DVec3::new(3.0, 4.0, 0.0));
        assert_eq!(body.momentum(), DVec3::new(30.0, 40.0, 0.0));
        assert_eq!(body.kinetic_energy(), 0.5 * 10.0 * 25.0);
    }
}
