//! Frame-driven simulation driver
//!
//! Owns the authoritative body collection. Each presentation frame runs a
//! fixed batch of integration steps through the selected integrator,
//! decoupled from the display refresh rate. Spawns and other commands are
//! applied only between batches; `&mut self` on every mutating entry point
//! makes it impossible to append while a step is running.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use gravity_physics::{Body, ReducedState, SequentialIntegrator};

use crate::clock::SimulationClock;
use crate::command::SimCommand;
use crate::config::{validate_gravitational_constant, validate_time_step, SimulationConfig};
use crate::error::SimulationError;
use crate::gpu::GpuIntegrator;
use crate::parallel::ParallelIntegrator;
use crate::params::GravityParams;
use crate::spawn::SpawnRequest;

/// Which integrator processes the next step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntegratorKind {
    /// f64 pairwise reference integrator
    #[default]
    Sequential,
    /// f32 synchronous integrator on the CPU worker pool
    Parallel,
    /// f32 synchronous integrator on a GPU compute device
    Gpu,
}

impl IntegratorKind {
    pub const ALL: [IntegratorKind; 3] = [
        IntegratorKind::Sequential,
        IntegratorKind::Parallel,
        IntegratorKind::Gpu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntegratorKind::Sequential => "sequential",
            IntegratorKind::Parallel => "parallel",
            IntegratorKind::Gpu => "gpu",
        }
    }

    /// The next kind in `ALL`, wrapping around
    pub fn next(self) -> Self {
        match self {
            IntegratorKind::Sequential => IntegratorKind::Parallel,
            IntegratorKind::Parallel => IntegratorKind::Gpu,
            IntegratorKind::Gpu => IntegratorKind::Sequential,
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntegratorKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimulationError::UnknownName {
                kind: "integrator",
                value: s.to_string(),
            })
    }
}

pub struct Simulation {
    bodies: Vec<Body>,
    config: SimulationConfig,
    clock: SimulationClock,
    integrator: IntegratorKind,

    /// Bumped whenever `bodies` change other than by a projection commit
    state_version: u64,
    reduced: ReducedState,

    parallel: ParallelIntegrator,
    gpu: Option<GpuIntegrator>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, bodies: Vec<Body>) -> Result<Self, SimulationError> {
        config.validate()?;
        let bodies = bodies
            .into_iter()
            .map(revalidate)
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Simulation created: {} bodies, dt = {} s, {} steps per frame",
            bodies.len(),
            config.dt,
            config.steps_per_frame
        );

        Ok(Self {
            bodies,
            clock: SimulationClock::new(0.0, config.dt),
            config,
            integrator: IntegratorKind::default(),
            state_version: 0,
            reduced: ReducedState::default(),
            parallel: ParallelIntegrator::new(),
            gpu: None,
        })
    }

    /// Make the GPU integrator available for selection
    pub fn attach_gpu(&mut self, gpu: GpuIntegrator) {
        log::info!("GPU integrator attached");
        self.gpu = Some(gpu);
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    /// Run one frame's batch of `steps_per_frame` steps. Does nothing while paused.
    pub fn step(&mut self) {
        if self.clock.is_paused() {
            return;
        }
        self.run_steps(self.config.steps_per_frame);
    }

    /// Run exactly one step, regardless of pause state
    pub fn step_once(&mut self) {
        self.run_steps(1);
    }

    fn run_steps(&mut self, steps: u32) {
        if steps == 0 {
            return;
        }

        match self.integrator {
            IntegratorKind::Sequential => {
                let integrator = SequentialIntegrator::new(self.config.law());
                integrator.step_n(&mut self.bodies, self.config.dt, steps);
                self.state_version += 1;
                self.clock.advance(steps as u64);
            }
            IntegratorKind::Parallel => {
                let params = self.sync_projection();
                self.parallel
                    .step_n(self.reduced.bodies_mut(), &params, steps);
                self.reduced.commit(&mut self.bodies);
                self.clock.advance(steps as u64);
            }
            IntegratorKind::Gpu => {
                let params = self.sync_projection();
                let result = match self.gpu.as_mut() {
                    Some(gpu) => gpu.run(self.reduced.bodies_mut(), &params, steps),
                    None => Err(SimulationError::GpuUnavailable(IntegratorKind::Gpu)),
                };
                match result {
                    Ok(()) => {
                        self.reduced.commit(&mut self.bodies);
                        self.clock.advance(steps as u64);
                    }
                    Err(e) => self.fall_back_to_parallel(e, steps),
                }
            }
        }
    }

    /// Switch to the CPU worker pool after a failed GPU batch and run the
    /// batch there. The failed batch committed nothing, so bodies and clock
    /// still agree.
    fn fall_back_to_parallel(&mut self, error: SimulationError, steps: u32) {
        log::warn!("GPU batch failed ({error}); falling back to parallel integrator");
        self.state_version += 1;
        self.integrator = IntegratorKind::Parallel;
        self.run_steps(steps);
    }

    fn sync_projection(&mut self) -> GravityParams {
        self.reduced.sync(&self.bodies, self.state_version);
        GravityParams::new(&self.config, self.bodies.len())
    }

    /// Bodies in insertion order; indices are stable for the whole run
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Append a validated body. Returns its index.
    pub fn add_body(&mut self, body: Body) -> Result<usize, SimulationError> {
        self.bodies.push(revalidate(body)?);
        self.state_version += 1;
        Ok(self.bodies.len() - 1)
    }

    /// Create a body from a drag gesture and append it. Returns its index.
    pub fn spawn(&mut self, request: &SpawnRequest) -> Result<usize, SimulationError> {
        let body = request.build_body(self.config.velocity_gain)?;
        log::debug!(
            "Spawning `{}` ({}) at {:?} with velocity {:?}",
            body.label,
            body.kind,
            body.position,
            body.velocity
        );
        self.add_body(body)
    }

    pub fn integrator(&self) -> IntegratorKind {
        self.integrator
    }

    /// Takes effect on the next step
    pub fn set_integrator(&mut self, kind: IntegratorKind) -> Result<(), SimulationError> {
        if kind == IntegratorKind::Gpu && self.gpu.is_none() {
            return Err(SimulationError::GpuUnavailable(kind));
        }
        if kind != self.integrator {
            log::debug!("Integrator switched: {} -> {}", self.integrator, kind);
        }
        self.integrator = kind;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.is_paused());
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_time_step(&mut self, dt: f64) -> Result<(), SimulationError> {
        validate_time_step(dt)?;
        self.config.dt = dt;
        self.clock.set_dt(dt);
        Ok(())
    }

    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.config.steps_per_frame = steps;
    }

    pub fn set_gravitational_constant(&mut self, g: f64) -> Result<(), SimulationError> {
        validate_gravitational_constant(g)?;
        self.config.gravitational_constant = g;
        Ok(())
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Simulated seconds elapsed
    pub fn sim_time(&self) -> f64 {
        self.clock.time()
    }

    pub fn steps_run(&self) -> u64 {
        self.clock.total_steps()
    }

    pub fn apply(&mut self, command: SimCommand) -> Result<(), SimulationError> {
        match command {
            SimCommand::SetPaused(paused) => self.set_paused(paused),
            SimCommand::TogglePause => self.toggle_pause(),
            SimCommand::SetIntegrator(kind) => self.set_integrator(kind)?,
            SimCommand::SetTimeStep(dt) => self.set_time_step(dt)?,
            SimCommand::SetStepsPerFrame(steps) => self.set_steps_per_frame(steps),
            SimCommand::SetGravitationalConstant(g) => self.set_gravitational_constant(g)?,
            SimCommand::Spawn(request) => {
                self.spawn(&request)?;
            }
            SimCommand::StepOnce => self.step_once(),
        }
        Ok(())
    }

    /// Apply commands in order. Rejected commands are logged and returned;
    /// later commands still run.
    pub fn apply_all(
        &mut self,
        commands: impl IntoIterator<Item = SimCommand>,
    ) -> Vec<SimulationError> {
        let mut errors = Vec::new();
        for command in commands {
            if let Err(e) = self.apply(command) {
                log::warn!("Command rejected: {e}");
                errors.push(e);
            }
        }
        errors
    }

    /// Σ m·v
    pub fn total_momentum(&self) -> DVec3 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    /// Kinetic plus pairwise potential energy
    pub fn total_energy(&self) -> f64 {
        let law = self.config.law();
        let kinetic: f64 = self.bodies.iter().map(Body::kinetic_energy).sum();
        let mut potential = 0.0;
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                potential += law.potential_energy(a, b);
            }
        }
        kinetic + potential
    }

    pub fn center_of_mass(&self) -> Option<DVec3> {
        if self.bodies.is_empty() {
            return None;
        }
        let total_mass: f64 = self.bodies.iter().map(Body::mass).sum();
        let weighted: DVec3 = self.bodies.iter().map(|b| b.position * b.mass()).sum();
        Some(weighted / total_mass)
    }
}

/// Position and velocity are public and may have been edited after construction
fn revalidate(body: Body) -> Result<Body, SimulationError> {
    let (mass, radius) = (body.mass(), body.radius());
    Ok(Body::new(
        body.label,
        body.kind,
        body.position,
        body.velocity,
        mass,
        radius,
    )?)
}
