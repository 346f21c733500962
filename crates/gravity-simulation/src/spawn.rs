//! Turning a screen-space drag gesture into a new body

use glam::{DVec2, DVec3};
use gravity_physics::{Body, BodyKind, EARTH_MASS, EARTH_RADIUS};

use crate::error::SimulationError;

/// Mapping between display pixels and simulation metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// World position shown at the screen centre
    pub camera_offset: DVec2,
    /// Metres per pixel
    pub scale: f64,
    /// Pixel coordinates of the screen centre
    pub screen_center: DVec2,
}

impl ViewTransform {
    pub fn new(camera_offset: DVec2, scale: f64, screen_center: DVec2) -> Self {
        Self {
            camera_offset,
            scale,
            screen_center,
        }
    }

    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        (screen - self.screen_center) * self.scale + self.camera_offset
    }

    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        (world - self.camera_offset) / self.scale + self.screen_center
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SimulationError::InvalidViewScale(self.scale));
        }
        if !self.camera_offset.is_finite() {
            return Err(SimulationError::NonFiniteGesture("camera offset"));
        }
        if !self.screen_center.is_finite() {
            return Err(SimulationError::NonFiniteGesture("screen center"));
        }
        Ok(())
    }
}

/// A completed drag gesture plus the properties of the body it creates
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Drag start in pixels; becomes the body's position
    pub start: DVec2,
    /// Drag end in pixels; `end - start` sets the velocity
    pub end: DVec2,
    pub view: ViewTransform,
    pub mass: f64,
    pub radius: f64,
    pub label: String,
    pub kind: BodyKind,
}

impl SpawnRequest {
    /// Earth-like projectile labelled "Shot"
    pub fn new(start: DVec2, end: DVec2, view: ViewTransform) -> Self {
        Self {
            start,
            end,
            view,
            mass: EARTH_MASS,
            radius: EARTH_RADIUS,
            label: "Shot".to_string(),
            kind: BodyKind::Projectile,
        }
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Build the body this gesture describes.
    ///
    /// Position is the drag start in world space; velocity is the drag
    /// vector times `velocity_gain`. Both lie in the z = 0 plane.
    pub fn build_body(&self, velocity_gain: f64) -> Result<Body, SimulationError> {
        self.view.validate()?;
        if !self.start.is_finite() {
            return Err(SimulationError::NonFiniteGesture("start point"));
        }
        if !self.end.is_finite() {
            return Err(SimulationError::NonFiniteGesture("end point"));
        }
        if !velocity_gain.is_finite() {
            return Err(SimulationError::InvalidVelocityGain(velocity_gain));
        }

        let position = self.view.screen_to_world(self.start);
        let velocity = (self.end - self.start) * velocity_gain;

        let body = Body::new(
            self.label.clone(),
            self.kind,
            DVec3::new(position.x, position.y, 0.0),
            DVec3::new(velocity.x, velocity.y, 0.0),
            self.mass,
            self.radius,
        )?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_world_round_trip() {
        let view = ViewTransform::new(DVec2::new(1.0e9, -2.0e9), 1.5e6, DVec2::new(400.0, 300.0));
        let world = view.screen_to_world(DVec2::new(400.0, 300.0));
        assert_eq!(world, DVec2::new(1.0e9, -2.0e9));

        let screen = view.world_to_screen(DVec2::new(1.0e9 + 1.5e8, -2.0e9));
        assert_eq!(screen, DVec2::new(500.0, 300.0));
    }

    #[test]
    fn test_build_body_defaults() {
        let view = ViewTransform::new(DVec2::ZERO, 1.0, DVec2::ZERO);
        let body = SpawnRequest::new(DVec2::new(3.0, 4.0), DVec2::new(4.0, 2.0), view)
            .build_body(10.0)
            .unwrap();
        assert_eq!(body.position, DVec3::new(3.0, 4.0, 0.0));
        assert_eq!(body.velocity, DVec3::new(10.0, -20.0, 0.0));
        assert_eq!(body.mass(), EARTH_MASS);
        assert_eq!(body.label, "Shot");
        assert_eq!(body.kind, BodyKind::Projectile);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let view = ViewTransform::new(DVec2::ZERO, 0.0, DVec2::ZERO);
        let err = SpawnRequest::new(DVec2::ZERO, DVec2::ONE, view).build_body(1.0);
        assert_eq!(err, Err(SimulationError::InvalidViewScale(0.0)));

        let view = ViewTransform::new(DVec2::ZERO, 1.0, DVec2::ZERO);
        let err = SpawnRequest::new(DVec2::ZERO, DVec2::ONE, view)
            .with_mass(0.0)
            .build_body(1.0);
        assert!(matches!(err, Err(SimulationError::Body(_))));

        let err = SpawnRequest::new(DVec2::new(f64::NAN, 0.0), DVec2::ONE, view).build_body(1.0);
        assert_eq!(err, Err(SimulationError::NonFiniteGesture("start point")));
    }
}
