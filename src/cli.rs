use clap::Parser;
use gravity_simulation::{
    IntegratorKind, Scenario, SimulationConfig, SimulationError, DEFAULT_STEPS_PER_FRAME,
    DEFAULT_TIME_STEP,
};

/// Interactive N-body gravity simulation
#[derive(Debug, Parser)]
#[command(name = "gravsim", version, about)]
pub struct Cli {
    /// Initial body set
    #[arg(long, default_value_t = Scenario::SolarSystem)]
    pub scenario: Scenario,

    /// Simulated seconds per integration step
    #[arg(long, default_value_t = DEFAULT_TIME_STEP)]
    pub dt: f64,

    /// Integration steps per rendered frame
    #[arg(long, default_value_t = DEFAULT_STEPS_PER_FRAME)]
    pub steps: u32,

    /// Integrator used for the first frame: sequential, parallel or gpu
    #[arg(long, default_value_t = IntegratorKind::Sequential)]
    pub integrator: IntegratorKind,

    /// Override the gravitational constant (m³ kg⁻¹ s⁻²)
    #[arg(long)]
    pub gravity: Option<f64>,
}

impl Cli {
    pub fn config(&self) -> Result<SimulationConfig, SimulationError> {
        let mut config = SimulationConfig::default()
            .with_dt(self.dt)
            .with_steps_per_frame(self.steps);
        if let Some(g) = self.gravity {
            config = config.with_gravitational_constant(g);
        }
        config.validate()?;
        Ok(config)
    }
}
