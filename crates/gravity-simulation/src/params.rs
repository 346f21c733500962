//! Reduced-precision parameters shared by the parallel integrators

use bytemuck::{Pod, Zeroable};

use crate::config::SimulationConfig;

/// Uniform block for the gravity compute shader (matches WGSL `Params`)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GravityParams {
    pub body_count: u32,
    pub dt: f32,
    pub gravitational_constant: f32,
    pub epsilon: f32,
}

impl GravityParams {
    pub fn new(config: &SimulationConfig, body_count: usize) -> Self {
        Self {
            body_count: body_count as u32,
            dt: config.dt as f32,
            gravitational_constant: config.gravitational_constant as f32,
            epsilon: config.epsilon as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_16_bytes() {
        assert_eq!(std::mem::size_of::<GravityParams>(), 16);
    }

    #[test]
    fn test_from_config() {
        let params = GravityParams::new(&SimulationConfig::default(), 3);
        assert_eq!(params.body_count, 3);
        assert_eq!(params.dt, 0.4);
        assert!(params.gravitational_constant > 6.67e-11);
    }
}
