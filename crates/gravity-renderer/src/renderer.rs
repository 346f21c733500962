//! Body rendering system

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use gravity_physics::Body;

use crate::camera::{Camera2d, CameraUniform};
use crate::palette;

/// Smallest on-screen radius in pixels
pub const MIN_RADIUS_PX: f64 = 1.0;
const INITIAL_CAPACITY: usize = 64;

/// Per-body instance data (matches WGSL `Circle`)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub _padding: f32,
    pub color: [f32; 4],
}

/// Project bodies into screen space.
///
/// Done in f64 so that large world coordinates keep their precision; only
/// the pixel-space result is narrowed.
pub fn circle_instances(bodies: &[Body], camera: &Camera2d) -> Vec<CircleInstance> {
    let view = camera.view();
    bodies
        .iter()
        .map(|body| {
            let center = view.world_to_screen(DVec2::new(body.position.x, body.position.y));
            let radius = (body.radius() / camera.scale).max(MIN_RADIUS_PX);
            CircleInstance {
                center: center.as_vec2().to_array(),
                radius: radius as f32,
                _padding: 0.0,
                color: palette::body_color(body.kind),
            }
        })
        .collect()
}

pub struct CircleRenderer {
    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    bind_group: wgpu::BindGroup,
    instance_count: u32,
}

impl CircleRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Circle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/circle.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Circle Bind Group Layout"),
            entries: &[
                // Camera (Uniform) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Circles (Storage) - Binding 1
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Circle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Circle Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = Self::create_instance_buffer(device, INITIAL_CAPACITY);
        let bind_group =
            Self::create_bind_group(device, &bind_group_layout, &camera_buffer, &instance_buffer);

        Self {
            render_pipeline,
            bind_group_layout,
            camera_buffer,
            instance_buffer,
            instance_capacity: INITIAL_CAPACITY,
            bind_group,
            instance_count: 0,
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Circle Instance Buffer"),
            size: (capacity * std::mem::size_of::<CircleInstance>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        instance_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Circle Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: instance_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Upload this frame's camera and body instances
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bodies: &[Body],
        camera: &Camera2d,
    ) {
        let instances = circle_instances(bodies, camera);

        if instances.len() > self.instance_capacity {
            let capacity = instances.len().next_power_of_two();
            log::debug!("Growing circle instance buffer to {} instances", capacity);
            self.instance_buffer = Self::create_instance_buffer(device, capacity);
            self.instance_capacity = capacity;
            self.bind_group = Self::create_bind_group(
                device,
                &self.bind_group_layout,
                &self.camera_buffer,
                &self.instance_buffer,
            );
        }

        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.to_uniform()]),
        );
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.instance_count = instances.len() as u32;
    }

    /// Clear to the background and draw the prepared bodies
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Circle Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(palette::background()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if self.instance_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravity_physics::BodyKind;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<CircleInstance>(), 32);
    }

    #[test]
    fn test_instances_in_screen_space() {
        let bodies = vec![
            Body::planar("Sun", BodyKind::Star, [0.0, 0.0], [0.0, 0.0], 1.0, 6.96e8).unwrap(),
            Body::planar("Far", BodyKind::Planet, [1.5e9, -3.0e8], [0.0, 0.0], 1.0, 10.0).unwrap(),
        ];
        let camera = Camera2d::new(800, 600);
        let instances = circle_instances(&bodies, &camera);

        assert_eq!(instances[0].center, [400.0, 300.0]);
        assert_eq!(instances[0].radius, (6.96e8 / 1.5e6) as f32);
        assert_eq!(instances[1].center, [1400.0, 100.0]);
        assert_eq!(instances[1].radius, MIN_RADIUS_PX as f32);
        assert_eq!(instances[0].color, palette::body_color(BodyKind::Star));
    }

    #[test]
    fn test_large_offsets_keep_precision() {
        let bodies = vec![Body::planar(
            "Earth",
            BodyKind::Planet,
            [1.5e11 + 3.0e6, 0.0],
            [0.0, 0.0],
            1.0,
            6.37e6,
        )
        .unwrap()];
        let mut camera = Camera2d::new(800, 600);
        camera.offset = DVec2::new(1.5e11, 0.0);
        camera.scale = 1.0e4;

        let instances = circle_instances(&bodies, &camera);
        assert_eq!(instances[0].center, [700.0, 300.0]);
    }
}
