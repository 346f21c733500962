//! CPU worker-pool integrator
//!
//! Synchronous (Jacobi-style) semi-implicit Euler on the reduced projection.
//! Every body is an independent unit of work that reads the step's snapshot
//! and writes only its own slot, so no locking is needed. Collecting the
//! acceleration pass is the barrier before any body is kicked or moved.

use glam::Vec3;
use gravity_physics::{accumulate_acceleration, ReducedBody};
use rayon::prelude::*;

use crate::params::GravityParams;

#[derive(Debug, Default)]
pub struct ParallelIntegrator {
    accelerations: Vec<Vec3>,
}

impl ParallelIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, bodies: &mut [ReducedBody], params: &GravityParams) {
        let dt = params.dt;
        let g = params.gravitational_constant;
        let epsilon = params.epsilon;

        {
            let snapshot: &[ReducedBody] = bodies;
            self.accelerations.clear();
            (0..snapshot.len())
                .into_par_iter()
                .map(|i| accumulate_acceleration(i, snapshot, g, epsilon))
                .collect_into_vec(&mut self.accelerations);
        }

        bodies
            .par_iter_mut()
            .zip(self.accelerations.par_iter())
            .for_each(|(body, acceleration)| {
                body.kick(*acceleration, dt);
                body.drift(dt);
            });
    }

    pub fn step_n(&mut self, bodies: &mut [ReducedBody], params: &GravityParams, steps: u32) {
        for _ in 0..steps {
            self.step(bodies, params);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduced(position: [f32; 3], velocity: [f32; 3], mass: f32) -> ReducedBody {
        ReducedBody::new(Vec3::from_array(position), Vec3::from_array(velocity), mass)
    }

    fn params(count: usize) -> GravityParams {
        GravityParams {
            body_count: count as u32,
            dt: 1.0,
            gravitational_constant: 1.0,
            epsilon: 1e-5,
        }
    }

    #[test]
    fn test_single_step_two_bodies() {
        let mut bodies = vec![
            reduced([0.0, 0.0, 0.0], [0.0; 3], 4.0),
            reduced([2.0, 0.0, 0.0], [0.0; 3], 4.0),
        ];
        let mut integrator = ParallelIntegrator::new();
        integrator.step(&mut bodies, &params(2));

        // a = G m / r² = 1
        assert_eq!(bodies[0].velocity, [1.0, 0.0, 0.0]);
        assert_eq!(bodies[1].velocity, [-1.0, 0.0, 0.0]);
        assert_eq!(bodies[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(bodies[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reads_snapshot_not_partial_state() {
        // Three collinear bodies: the middle one feels equal and opposite pulls
        let mut bodies = vec![
            reduced([-1.0, 0.0, 0.0], [0.0; 3], 1.0),
            reduced([0.0, 0.0, 0.0], [0.0; 3], 1.0),
            reduced([1.0, 0.0, 0.0], [0.0; 3], 1.0),
        ];
        let mut integrator = ParallelIntegrator::new();
        integrator.step(&mut bodies, &params(3));
        assert_eq!(bodies[1].velocity, [0.0, 0.0, 0.0]);
        assert_eq!(bodies[1].position, [0.0, 0.0, 0.0]);
        assert_eq!(bodies[0].velocity[0], -bodies[2].velocity[0]);
    }

    #[test]
    fn test_empty_is_noop() {
        let mut bodies: Vec<ReducedBody> = Vec::new();
        ParallelIntegrator::new().step_n(&mut bodies, &params(0), 5);
        assert!(bodies.is_empty());
    }
}
