//! Single-precision projection of body state for the accelerated integrators
//!
//! The projection is never the source of truth. It is built from the
//! authoritative [`Body`] collection, stepped by a parallel integrator, then
//! committed back.
//!
//! Position and velocity are each stored as an unevaluated sum `hi + lo` of
//! two f32 values. At orbital distances one f32 ulp is several kilometres, so
//! a single f32 would round away every per-step displacement smaller than
//! that. Increments are folded in with error-free transformations
//! ([`two_sum`], [`two_prod`]) and the remainder carries what `hi` cannot
//! hold. Narrowing keeps about 48 significant bits; widening on commit is
//! exact. Forces are still evaluated in plain f32 from the pair differences.

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Vec3};

use crate::body::Body;

/// GPU-compatible reduced body
/// Aligned for WGSL struct compatibility (64 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ReducedBody {
    pub position: [f32; 3],
    pub mass: f32,
    /// Rounding remainder of `position`
    pub position_lo: [f32; 3],
    pub _pad0: f32,
    pub velocity: [f32; 3],
    pub _pad1: f32,
    /// Rounding remainder of `velocity`
    pub velocity_lo: [f32; 3],
    pub _pad2: f32,
}

impl ReducedBody {
    /// A body whose state is exactly representable in f32
    pub fn new(position: Vec3, velocity: Vec3, mass: f32) -> Self {
        Self {
            position: position.to_array(),
            mass,
            velocity: velocity.to_array(),
            ..Self::zeroed()
        }
    }

    pub fn from_body(body: &Body) -> Self {
        let (position, position_lo) = split(body.position);
        let (velocity, velocity_lo) = split(body.velocity);
        Self {
            position: position.to_array(),
            mass: body.mass() as f32,
            position_lo: position_lo.to_array(),
            velocity: velocity.to_array(),
            velocity_lo: velocity_lo.to_array(),
            ..Self::zeroed()
        }
    }

    /// Nearest f32 position
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Nearest f32 velocity
    pub fn velocity(&self) -> Vec3 {
        Vec3::from_array(self.velocity)
    }

    pub fn position_wide(&self) -> DVec3 {
        join(self.position, self.position_lo)
    }

    pub fn velocity_wide(&self) -> DVec3 {
        join(self.velocity, self.velocity_lo)
    }

    /// `velocity += acceleration·dt`
    pub fn kick(&mut self, acceleration: Vec3, dt: f32) {
        let (hi, lo) = add_compensated(
            self.velocity(),
            Vec3::from_array(self.velocity_lo),
            acceleration * dt,
            Vec3::ZERO,
        );
        self.velocity = hi.to_array();
        self.velocity_lo = lo.to_array();
    }

    /// `position += velocity·dt`, using the full two-part velocity
    pub fn drift(&mut self, dt: f32) {
        let (delta, delta_err) = two_prod(self.velocity(), dt);
        let delta_lo = delta_err + Vec3::from_array(self.velocity_lo) * dt;
        let (hi, lo) = add_compensated(
            self.position(),
            Vec3::from_array(self.position_lo),
            delta,
            delta_lo,
        );
        self.position = hi.to_array();
        self.position_lo = lo.to_array();
    }

    /// Widen position and velocity into `body`; mass and metadata are untouched
    pub fn write_back(&self, body: &mut Body) {
        body.position = self.position_wide();
        body.velocity = self.velocity_wide();
    }
}

fn split(value: DVec3) -> (Vec3, Vec3) {
    let hi = value.as_vec3();
    let lo = (value - hi.as_dvec3()).as_vec3();
    (hi, lo)
}

fn join(hi: [f32; 3], lo: [f32; 3]) -> DVec3 {
    Vec3::from_array(hi).as_dvec3() + Vec3::from_array(lo).as_dvec3()
}

/// Error-free sum: `s + e == a + b` exactly, with `s = fl(a + b)`
pub fn two_sum(a: Vec3, b: Vec3) -> (Vec3, Vec3) {
    let s = a + b;
    let bb = s - a;
    (s, (a - (s - bb)) + (b - bb))
}

/// Error-free product: `p + e == a·b` exactly, with `p = fl(a·b)`
pub fn two_prod(a: Vec3, b: f32) -> (Vec3, Vec3) {
    let p = a * b;
    let e = Vec3::new(
        a.x.mul_add(b, -p.x),
        a.y.mul_add(b, -p.y),
        a.z.mul_add(b, -p.z),
    );
    (p, e)
}

/// Add the increment `inc_hi + inc_lo` to the pair `hi + lo` and renormalize
fn add_compensated(hi: Vec3, lo: Vec3, inc_hi: Vec3, inc_lo: Vec3) -> (Vec3, Vec3) {
    let (s, e) = two_sum(hi, inc_hi);
    two_sum(s, e + (lo + inc_lo))
}

/// Sum of accelerations on body `i` from every other body in `snapshot`.
///
/// This is the per-body unit of work shared by every parallel backend: it
/// reads the whole snapshot and produces a value for `i` alone. Uses
/// `(g·m_j / r²)·(d / r)` so that no mass product is formed in f32.
pub fn accumulate_acceleration(i: usize, snapshot: &[ReducedBody], g: f32, epsilon: f32) -> Vec3 {
    let origin = snapshot[i].position();
    let origin_lo = Vec3::from_array(snapshot[i].position_lo);
    let mut acceleration = Vec3::ZERO;

    for (j, other) in snapshot.iter().enumerate() {
        if j == i {
            continue;
        }
        let d = (other.position() - origin) + (Vec3::from_array(other.position_lo) - origin_lo);
        let r_sq = d.dot(d);
        let r = r_sq.sqrt();
        if r <= epsilon {
            continue;
        }
        acceleration += (d / r) * (g * other.mass / r_sq);
    }

    acceleration
}

/// Packed reduced-precision copy of a body collection, tagged with the
/// version of the authoritative state it was built from.
#[derive(Debug, Clone, Default)]
pub struct ReducedState {
    bodies: Vec<ReducedBody>,
    source_version: u64,
}

impl ReducedState {
    pub fn build(bodies: &[Body], version: u64) -> Self {
        Self {
            bodies: bodies.iter().map(ReducedBody::from_body).collect(),
            source_version: version,
        }
    }

    pub fn is_current(&self, body_count: usize, version: u64) -> bool {
        self.bodies.len() == body_count && self.source_version == version
    }

    /// Rebuild from `bodies` if stale. Returns `true` when a rebuild happened.
    pub fn sync(&mut self, bodies: &[Body], version: u64) -> bool {
        if self.is_current(bodies.len(), version) {
            return false;
        }
        log::debug!(
            "Rebuilding reduced projection: {} -> {} bodies, version {} -> {}",
            self.bodies.len(),
            bodies.len(),
            self.source_version,
            version
        );
        *self = Self::build(bodies, version);
        true
    }

    /// Write the projected state back into the authoritative bodies.
    ///
    /// The bodies must be the collection this projection was built from.
    pub fn commit(&self, bodies: &mut [Body]) {
        debug_assert_eq!(self.bodies.len(), bodies.len());
        for (reduced, body) in self.bodies.iter().zip(bodies.iter_mut()) {
            reduced.write_back(body);
        }
    }

    pub fn version(&self) -> u64 {
        self.source_version
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> &[ReducedBody] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [ReducedBody] {
        &mut self.bodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use glam::DVec3;

    fn sample() -> Vec<Body> {
        vec![
            Body::new(
                "Sun",
                BodyKind::Star,
                DVec3::ZERO,
                DVec3::ZERO,
                1.99e30,
                6.96e8,
            )
            .unwrap(),
            Body::new(
                "Earth",
                BodyKind::Planet,
                DVec3::new(1.5e11, 0.0, 0.0),
                DVec3::new(0.0, 29_780.0, 0.0),
                5.97e24,
                6.37e6,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<ReducedBody>(), 64);
        assert_eq!(std::mem::align_of::<ReducedBody>(), 4);
    }

    #[test]
    fn test_narrowing_precision_contract() {
        let bodies = sample();
        let state = ReducedState::build(&bodies, 0);
        let eps_sq = (f32::EPSILON as f64).powi(2);
        for (reduced, body) in state.bodies().iter().zip(&bodies) {
            let err = (reduced.position_wide() - body.position).length();
            assert!(err <= body.position.length() * eps_sq);
            let err = (reduced.velocity_wide() - body.velocity).length();
            assert!(err <= body.velocity.length() * eps_sq);
            let mass_err = (reduced.mass as f64 - body.mass()).abs();
            assert!(mass_err <= body.mass() * f32::EPSILON as f64);
        }
    }

    #[test]
    fn test_sub_ulp_drift_accumulates() {
        // One f32 ulp at 1.5e11 m is 16384 m; each step moves 0.5 m
        let start = DVec3::new(1.5e11, 0.0, 0.0);
        let body = Body::new("far", BodyKind::Custom, start, DVec3::new(1.0, 0.0, 0.0), 1.0, 1.0)
            .unwrap();
        let mut reduced = ReducedBody::from_body(&body);
        for _ in 0..10_000 {
            reduced.drift(0.5);
        }
        assert_eq!(reduced.position_wide().x - start.x, 5000.0);
    }

    #[test]
    fn test_small_kicks_accumulate_on_fast_body() {
        // One f32 ulp at 29780 m/s is 2^-9; each kick adds a quarter of that
        let body = Body::new(
            "fast",
            BodyKind::Custom,
            DVec3::ZERO,
            DVec3::new(0.0, 29_780.0, 0.0),
            1.0,
            1.0,
        )
        .unwrap();
        let mut reduced = ReducedBody::from_body(&body);
        let acceleration = Vec3::new(0.0, 1.0 / 1024.0, 0.0);
        for _ in 0..1000 {
            reduced.kick(acceleration, 0.5);
        }
        assert_eq!(reduced.velocity_wide().y, 29_780.0 + 1000.0 / 2048.0);
    }

    #[test]
    fn test_two_sum_and_two_prod_are_exact() {
        let a = Vec3::new(1.5e11, -3.0, 16_384.0);
        let b = Vec3::new(0.4, 1.0e-9, 0.1);
        let (s, e) = two_sum(a, b);
        for k in 0..3 {
            assert_eq!(s[k] as f64 + e[k] as f64, a[k] as f64 + b[k] as f64);
        }

        let v = Vec3::new(29_780.0, 1.0e-3, 7.0);
        let (p, e) = two_prod(v, 0.4);
        for k in 0..3 {
            assert_eq!(p[k] as f64 + e[k] as f64, v[k] as f64 * 0.4f32 as f64);
        }
    }

    #[test]
    fn test_commit_preserves_metadata() {
        let mut bodies = sample();
        let mut state = ReducedState::build(&bodies, 3);
        state.bodies_mut()[1].velocity = [1.0, 2.0, 3.0];
        state.bodies_mut()[1].velocity_lo = [0.0; 3];
        state.commit(&mut bodies);

        assert_eq!(bodies[1].velocity, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(bodies[1].label, "Earth");
        assert_eq!(bodies[1].mass(), 5.97e24);
        assert_eq!(bodies[1].radius(), 6.37e6);
    }

    #[test]
    fn test_commit_then_rebuild_is_stable() {
        let mut bodies = sample();
        let state = ReducedState::build(&bodies, 0);
        state.commit(&mut bodies);
        let again = ReducedState::build(&bodies, 0);
        assert_eq!(state.bodies(), again.bodies());
    }

    #[test]
    fn test_sync_rebuilds_on_count_or_version_change() {
        let mut bodies = sample();
        let mut state = ReducedState::build(&bodies, 1);
        assert!(!state.sync(&bodies, 1));
        assert!(state.sync(&bodies, 2));
        assert_eq!(state.version(), 2);

        bodies.push(bodies[1].clone());
        assert!(state.sync(&bodies, 2));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_accumulate_skips_self_and_singularity() {
        let snapshot = [
            ReducedBody::new(Vec3::ZERO, Vec3::ZERO, 1.0),
            ReducedBody::new(Vec3::ZERO, Vec3::ZERO, 1.0e9),
            ReducedBody::new(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 4.0),
        ];
        let a = accumulate_acceleration(0, &snapshot, 1.0, 1e-5);
        assert_eq!(a, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_accumulate_resolves_close_pair_far_from_origin() {
        // Earth and Moon 3.844e8 m apart at 1.5e11 m from the origin
        let earth = DVec3::new(1.496e11, 0.0, 0.0);
        let moon = earth + DVec3::new(3.844e8 + 1234.5, 0.0, 0.0);
        let body = |p| Body::new("b", BodyKind::Custom, p, DVec3::ZERO, 7.35e22, 1.0).unwrap();
        let snapshot = [
            ReducedBody::from_body(&body(earth)),
            ReducedBody::from_body(&body(moon)),
        ];
        let a = accumulate_acceleration(0, &snapshot, 6.6743e-11, 1e-5).x as f64;
        let r = moon.x - earth.x;
        let expected = 6.6743e-11 * 7.35e22 / (r * r);
        assert!(((a - expected) / expected).abs() < 1e-6);
    }
}
