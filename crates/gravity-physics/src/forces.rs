//! Pairwise Newtonian gravity
//!
//! F = G * m1 * m2 / r², applied as equal and opposite velocity kicks.

use crate::body::Body;
use crate::constants::{G, SINGULARITY_EPSILON};

/// The inverse-square law with its tunable constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityLaw {
    /// Gravitational constant
    pub g: f64,
    /// Minimum separation below which a pair is skipped
    pub epsilon: f64,
}

impl Default for GravityLaw {
    fn default() -> Self {
        Self {
            g: G,
            epsilon: SINGULARITY_EPSILON,
        }
    }
}

impl GravityLaw {
    pub fn new(g: f64, epsilon: f64) -> Self {
        Self { g, epsilon }
    }

    /// Apply one mutual gravitational kick of duration `dt` to `a` and `b`.
    ///
    /// Only velocities change. Returns `false` when the pair is closer than
    /// `epsilon` and was skipped.
    pub fn apply(&self, a: &mut Body, b: &mut Body, dt: f64) -> bool {
        let d = b.position - a.position;
        let dist_sq = d.length_squared();
        let dist = dist_sq.sqrt();

        if dist <= self.epsilon {
            return false;
        }

        let force = self.g * a.mass() * b.mass() / dist_sq;
        let direction = d / dist;

        let accel_a = direction * (force / a.mass());
        let accel_b = -direction * (force / b.mass());

        a.velocity += accel_a * dt;
        b.velocity += accel_b * dt;
        true
    }

    /// Gravitational potential energy of a pair, zero inside `epsilon`
    pub fn potential_energy(&self, a: &Body, b: &Body) -> f64 {
        let dist = a.position.distance(b.position);
        if dist <= self.epsilon {
            return 0.0;
        }
        -self.g * a.mass() * b.mass() / dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use glam::DVec3;

    fn body(position: DVec3, velocity: DVec3, mass: f64) -> Body {
        Body::new("b", BodyKind::Custom, position, velocity, mass, 1.0).unwrap()
    }

    #[test]
    fn test_equal_and_opposite_momentum() {
        let law = GravityLaw::default();
        let mut a = body(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0), 5.97e24);
        let mut b = body(DVec3::new(3.0e8, 4.0e8, 1.0e7), DVec3::ZERO, 7.35e22);
        let (va, vb) = (a.velocity, b.velocity);

        assert!(law.apply(&mut a, &mut b, 10.0));

        let pa = (a.velocity - va) * a.mass();
        let pb = (b.velocity - vb) * b.mass();
        let sum = pa + pb;
        assert!(sum.length() <= 1e-12 * pa.length(), "net impulse {sum:?}");
        assert!(pa.length() > 0.0);
    }

    #[test]
    fn test_attracts_along_separation() {
        let law = GravityLaw::default();
        let mut a = body(DVec3::ZERO, DVec3::ZERO, 1.0e20);
        let mut b = body(DVec3::new(1000.0, 0.0, 0.0), DVec3::ZERO, 1.0e20);

        law.apply(&mut a, &mut b, 1.0);

        assert!(a.velocity.x > 0.0);
        assert!(b.velocity.x < 0.0);
        assert_eq!(a.velocity.y, 0.0);
        assert_eq!(a.velocity.z, 0.0);
        // Positions untouched
        assert_eq!(a.position, DVec3::ZERO);
        assert_eq!(b.position, DVec3::new(1000.0, 0.0, 0.0));

        let expected = G * 1.0e20 / 1.0e6;
        assert!((a.velocity.x - expected).abs() <= 1e-12 * expected);
    }

    #[test]
    fn test_coincident_bodies_are_skipped() {
        let law = GravityLaw::default();
        let mut a = body(DVec3::new(5.0, 5.0, 0.0), DVec3::new(1.0, 2.0, 0.0), 1.0e30);
        let mut b = body(DVec3::new(5.0, 5.0, 0.0), DVec3::new(-1.0, 0.0, 0.0), 1.0e30);

        assert!(!law.apply(&mut a, &mut b, 1.0));
        assert_eq!(a.velocity, DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(b.velocity, DVec3::new(-1.0, 0.0, 0.0));
        assert!(a.velocity.is_finite() && b.velocity.is_finite());
    }

    #[test]
    fn test_guard_is_inclusive() {
        let law = GravityLaw::new(G, 1.0);
        let mut a = body(DVec3::ZERO, DVec3::ZERO, 1.0);
        let mut b = body(DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO, 1.0);
        assert!(!law.apply(&mut a, &mut b, 1.0));

        b.position.x = 1.0 + 1e-9;
        assert!(law.apply(&mut a, &mut b, 1.0));
    }

    #[test]
    fn test_planar_pair_stays_planar() {
        let law = GravityLaw::default();
        let mut a = body(DVec3::new(1.0, 2.0, 0.0), DVec3::ZERO, 1.0e25);
        let mut b = body(DVec3::new(-4.0e6, 7.0e6, 0.0), DVec3::ZERO, 3.0e24);
        law.apply(&mut a, &mut b, 60.0);
        assert_eq!(a.velocity.z, 0.0);
        assert_eq!(b.velocity.z, 0.0);
    }

    #[test]
    fn test_order_independent() {
        let law = GravityLaw::default();
        let a0 = body(DVec3::new(1.0e6, -2.0e6, 3.0e5), DVec3::new(5.0, 0.0, 1.0), 4.0e23);
        let b0 = body(DVec3::new(-7.0e6, 1.0e6, 0.0), DVec3::new(0.0, -3.0, 0.0), 9.0e24);

        let (mut a1, mut b1) = (a0.clone(), b0.clone());
        law.apply(&mut a1, &mut b1, 2.0);

        let (mut a2, mut b2) = (a0.clone(), b0.clone());
        law.apply(&mut b2, &mut a2, 2.0);

        assert!((a1.velocity - a2.velocity).length() <= 1e-12 * a1.velocity.length());
        assert!((b1.velocity - b2.velocity).length() <= 1e-12 * b1.velocity.length());
    }

    #[test]
    fn test_potential_energy() {
        let law = GravityLaw::new(1.0, 1e-5);
        let a = body(DVec3::ZERO, DVec3::ZERO, 2.0);
        let b = body(DVec3::new(0.0, 4.0, 0.0), DVec3::ZERO, 3.0);
        assert_eq!(law.potential_energy(&a, &b), -1.5);
        assert_eq!(law.potential_energy(&a, &a), 0.0);
    }
}
