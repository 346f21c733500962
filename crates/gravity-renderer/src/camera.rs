//! Camera system for the 2-D view

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use gravity_physics::Body;
use gravity_simulation::ViewTransform;

/// Metres per pixel at startup
pub const DEFAULT_SCALE: f64 = 1.5e6;
/// World units moved per frame while a pan key is held
pub const PAN_SPEED: f64 = 5.0e6;
/// Pan speed multiplier while Shift is held
pub const FAST_PAN_MULTIPLIER: f64 = 10.0;
/// Scale factor applied per frame while a zoom key is held
pub const ZOOM_FACTOR: f64 = 1.005;

const MIN_SCALE: f64 = 1.0;
const MAX_SCALE: f64 = 1.0e13;

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

/// Top-down camera over the z = 0 plane
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2d {
    /// World position at the screen centre
    pub offset: DVec2,
    /// Metres per pixel
    pub scale: f64,
    pub width: u32,
    pub height: u32,
    /// Index of the body the camera follows
    pub tracking: Option<usize>,
}

impl Camera2d {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            offset: DVec2::ZERO,
            scale: DEFAULT_SCALE,
            width,
            height,
            tracking: None,
        }
    }

    pub fn screen_center(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64) * 0.5
    }

    pub fn view(&self) -> ViewTransform {
        ViewTransform::new(self.offset, self.scale, self.screen_center())
    }

    /// Move by `direction` (screen axes, y down) at the pan speed.
    /// Manual panning stops tracking.
    pub fn pan(&mut self, direction: DVec2, fast: bool) {
        if direction == DVec2::ZERO {
            return;
        }
        let speed = if fast {
            PAN_SPEED * FAST_PAN_MULTIPLIER
        } else {
            PAN_SPEED
        };
        self.offset += direction * speed;
        self.tracking = None;
    }

    /// Positive steps zoom in, negative steps zoom out
    pub fn zoom(&mut self, steps: f64) {
        self.scale = (self.scale * ZOOM_FACTOR.powf(-steps)).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn track(&mut self, index: Option<usize>) {
        self.tracking = index;
    }

    /// Centre on the tracked body, if it exists
    pub fn follow(&mut self, bodies: &[Body]) {
        if let Some(body) = self.tracking.and_then(|i| bodies.get(i)) {
            self.offset = body.position.truncate();
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            viewport: [self.width as f32, self.height as f32],
            _padding: [0.0; 2],
        }
    }
}
