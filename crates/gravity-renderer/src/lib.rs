//! # Gravity Renderer
//!
//! 2-D view of the body collection: a panning and zooming camera, the body
//! color palette, and an instanced circle pipeline.

pub mod camera;
pub mod palette;
pub mod renderer;

pub use camera::*;
pub use palette::*;
pub use renderer::*;
