//! GPU compute integrator
//!
//! Runs the synchronous reduced-precision step as two compute passes per
//! step (velocity accumulation, then position advance). wgpu orders storage
//! writes between passes, which gives the per-step barrier. A whole frame's
//! batch is encoded before the body buffer is read back once.

use gravity_physics::ReducedBody;

use crate::error::SimulationError;
use crate::params::GravityParams;
use crate::simulation::IntegratorKind;

const WORKGROUP_SIZE: u32 = 64;
/// Steps encoded per command buffer before submitting
const STEPS_PER_SUBMIT: u32 = 1024;

/// Body storage sized for a fixed body count
struct BodyBuffers {
    body_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    body_count: usize,
}

/// GPU-based gravity integrator
pub struct GpuIntegrator {
    device: wgpu::Device,
    queue: wgpu::Queue,

    accumulate_pipeline: wgpu::ComputePipeline,
    advance_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,

    buffers: Option<BodyBuffers>,
}

impl GpuIntegrator {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        log::info!("Initializing GpuIntegrator...");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Gravity Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gravity.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gravity Bind Group Layout"),
            entries: &[
                // Bodies (Storage) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Params (Uniform) - Binding 1
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Gravity Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let accumulate_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Accumulate Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("accumulate"),
            compilation_options: Default::default(),
            cache: None,
        });

        let advance_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Advance Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("advance"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Gravity Params Buffer"),
            size: std::mem::size_of::<GravityParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!("Gravity pipelines created");

        Self {
            device,
            queue,
            accumulate_pipeline,
            advance_pipeline,
            bind_group_layout,
            params_buffer,
            buffers: None,
        }
    }

    /// Create an integrator on a fresh device with no surface attached
    pub fn headless() -> Result<Self, SimulationError> {
        let (device, queue) = pollster::block_on(Self::create_device())?;
        Ok(Self::new(device, queue))
    }

    async fn create_device() -> Result<(wgpu::Device, wgpu::Queue), SimulationError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SimulationError::GpuInit(e.to_string()))?;

        log::info!("Using GPU: {}", adapter.get_info().name);

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Gravity Compute Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| SimulationError::GpuInit(e.to_string()))
    }

    /// Advance `bodies` by `steps` steps on the GPU and read the result back
    /// into the same slice.
    ///
    /// Validation and out-of-memory errors raised while the batch is encoded
    /// are returned as [`SimulationError::GpuBatch`]. `bodies` is only
    /// written when the whole batch succeeded.
    pub fn run(
        &mut self,
        bodies: &mut [ReducedBody],
        params: &GravityParams,
        steps: u32,
    ) -> Result<(), SimulationError> {
        if bodies.is_empty() || steps == 0 {
            return Ok(());
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let batch = self.run_batch(bodies, params, steps);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if let Some(error) = validation.or(out_of_memory) {
            return Err(SimulationError::GpuBatch(error.to_string()));
        }
        bodies.copy_from_slice(&batch?);
        Ok(())
    }

    fn run_batch(
        &mut self,
        bodies: &[ReducedBody],
        params: &GravityParams,
        steps: u32,
    ) -> Result<Vec<ReducedBody>, SimulationError> {
        self.ensure_capacity(bodies.len());
        let Some(buffers) = &self.buffers else {
            return Err(SimulationError::GpuUnavailable(IntegratorKind::Gpu));
        };

        self.queue
            .write_buffer(&buffers.body_buffer, 0, bytemuck::cast_slice(bodies));
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));

        let workgroup_count = (bodies.len() as u32).div_ceil(WORKGROUP_SIZE);
        let mut remaining = steps;

        while remaining > 0 {
            let chunk = remaining.min(STEPS_PER_SUBMIT);
            remaining -= chunk;

            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Gravity Step Encoder"),
                });

            for _ in 0..chunk {
                {
                    let mut compute_pass =
                        encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                            label: Some("Accumulate Pass"),
                            timestamp_writes: None,
                        });
                    compute_pass.set_pipeline(&self.accumulate_pipeline);
                    compute_pass.set_bind_group(0, &buffers.bind_group, &[]);
                    compute_pass.dispatch_workgroups(workgroup_count, 1, 1);
                }
                {
                    let mut compute_pass =
                        encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                            label: Some("Advance Pass"),
                            timestamp_writes: None,
                        });
                    compute_pass.set_pipeline(&self.advance_pipeline);
                    compute_pass.set_bind_group(0, &buffers.bind_group, &[]);
                    compute_pass.dispatch_workgroups(workgroup_count, 1, 1);
                }
            }

            if remaining == 0 {
                encoder.copy_buffer_to_buffer(
                    &buffers.body_buffer,
                    0,
                    &buffers.staging_buffer,
                    0,
                    (bodies.len() * std::mem::size_of::<ReducedBody>()) as u64,
                );
            }

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        let slice = buffers.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| SimulationError::GpuReadback(e.to_string()))?;
        rx.recv()
            .map_err(|e| SimulationError::GpuReadback(e.to_string()))?
            .map_err(|e| SimulationError::GpuReadback(e.to_string()))?;

        let result = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, ReducedBody>(&data).to_vec()
        };
        buffers.staging_buffer.unmap();

        Ok(result)
    }

    /// Recreate body buffers when the body count changes
    fn ensure_capacity(&mut self, body_count: usize) {
        if matches!(&self.buffers, Some(b) if b.body_count == body_count) {
            return;
        }

        log::debug!("Allocating GPU body buffers for {} bodies", body_count);
        let size = (body_count * std::mem::size_of::<ReducedBody>()) as u64;

        let body_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Body Buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Body Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gravity Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: body_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.params_buffer.as_entire_binding(),
                },
            ],
        });

        self.buffers = Some(BodyBuffers {
            body_buffer,
            staging_buffer,
            bind_group,
            body_count,
        });
    }
}
