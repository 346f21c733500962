//! Reference sequential integrator
//!
//! Semi-implicit Euler over every unique pair. Pairs are visited in ascending
//! (i, j) order, so identical initial state always yields bit-identical
//! trajectories. The force pass is O(N²) with no spatial acceleration
//! structure; body counts are expected to stay in the low hundreds.

use crate::body::Body;
use crate::forces::GravityLaw;

#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIntegrator {
    pub law: GravityLaw,
}

impl SequentialIntegrator {
    pub fn new(law: GravityLaw) -> Self {
        Self { law }
    }

    /// Advance every body by exactly one `dt`.
    pub fn step(&self, bodies: &mut [Body], dt: f64) {
        // Force pass: velocities only, positions frozen
        for i in 0..bodies.len() {
            let (head, tail) = bodies.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                self.law.apply(a, b, dt);
            }
        }

        // Drift pass
        for body in bodies.iter_mut() {
            body.position += body.velocity * dt;
        }
    }

    pub fn step_n(&self, bodies: &mut [Body], dt: f64, steps: u32) {
        for _ in 0..steps {
            self.step(bodies, dt);
        }
    }
}
