//! Interactive N-body Gravity Simulation
//!
//! Bodies attract each other under Newtonian gravity. Drag with the left
//! mouse button to launch new bodies into the system.

mod cli;
mod gui;

use anyhow::Context as _;
use clap::Parser;
use cli::Cli;
use glam::DVec2;
use gravity_renderer::{Camera2d, CircleRenderer};
use gravity_simulation::{
    CommandQueue, GpuIntegrator, IntegratorKind, SimCommand, Simulation, SimulationConfig,
    SpawnRequest,
};
use gui::{Gui, UiState};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

/// Zoom steps per wheel line
const WHEEL_ZOOM_STEPS: f64 = 10.0;

/// Everything needed to build the first frame
struct Setup {
    cli: Cli,
    config: SimulationConfig,
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    simulation: Simulation,
    commands: CommandQueue,
    renderer: CircleRenderer,
    camera: Camera2d,

    gui: Gui,
    ui_state: UiState,

    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>, setup: &Setup) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

        log::info!("Using GPU: {}", adapter.get_info().name);

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create device")?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Create simulation
        let bodies = setup.cli.scenario.bodies()?;
        let mut simulation = Simulation::new(setup.config, bodies)?;
        simulation.attach_gpu(GpuIntegrator::new(device.clone(), queue.clone()));
        simulation.set_integrator(setup.cli.integrator)?;
        log::info!(
            "Scenario `{}` loaded with the {} integrator",
            setup.cli.scenario,
            simulation.integrator()
        );

        let renderer = CircleRenderer::new(&device, config.format);
        let camera = Camera2d::new(config.width, config.height);
        let gui = Gui::new(&device, config.format, &window);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            simulation,
            commands: CommandQueue::new(),
            renderer,
            camera,
            gui,
            ui_state: UiState::default(),
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    /// Apply held keys to the camera
    fn update_camera(&mut self, held: &HashSet<KeyCode>) {
        let mut direction = DVec2::ZERO;
        if held.contains(&KeyCode::KeyW) {
            direction.y -= 1.0;
        }
        if held.contains(&KeyCode::KeyS) {
            direction.y += 1.0;
        }
        if held.contains(&KeyCode::KeyA) {
            direction.x -= 1.0;
        }
        if held.contains(&KeyCode::KeyD) {
            direction.x += 1.0;
        }
        let fast = held.contains(&KeyCode::ShiftLeft) || held.contains(&KeyCode::ShiftRight);
        self.camera.pan(direction, fast);
        self.camera.zoom(zoom_steps(held));
    }

    fn render(&mut self, window: &Window) -> Result<f32, wgpu::SurfaceError> {
        // Track frame time
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        if self.frame_times.len() == 100 {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = 1000.0 / avg_frame_time.max(f32::EPSILON);
        self.ui_state.fps = fps;
        self.ui_state.frame_time = avg_frame_time;

        // Commands queued since the last frame, then this frame's batch
        self.simulation.apply_all(self.commands.drain());
        self.simulation.step();
        self.camera.follow(self.simulation.bodies());

        self.renderer.prepare(
            &self.device,
            &self.queue,
            self.simulation.bodies(),
            &self.camera,
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view);
        self.gui.render(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            &mut self.ui_state,
            &self.simulation,
            &mut self.camera,
            &mut self.commands,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(fps)
    }

    fn cycle_integrator(&mut self) {
        let mut next = self.simulation.integrator().next();
        if next == IntegratorKind::Gpu && !self.simulation.has_gpu() {
            next = next.next();
        }
        self.commands.push(SimCommand::SetIntegrator(next));
    }

    fn finish_drag(&mut self, start: DVec2, end: DVec2) {
        let spawn = &self.ui_state.spawn;
        let request = SpawnRequest::new(start, end, self.camera.view())
            .with_mass(spawn.mass)
            .with_radius(spawn.radius)
            .with_label(spawn.label.clone())
            .with_kind(spawn.kind);
        self.commands.push(SimCommand::Spawn(request));
    }
}

struct App {
    setup: Setup,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    held_keys: HashSet<KeyCode>,
    cursor: DVec2,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(setup: Setup) -> Self {
        Self {
            setup,
            window: None,
            gpu_state: None,
            held_keys: HashSet::new(),
            cursor: DVec2::ZERO,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Gravity Simulation")
            .with_inner_size(winit::dpi::LogicalSize::new(1600, 900));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        self.window = Some(window.clone());
        self.gpu_state = Some(pollster::block_on(GpuState::new(window, &self.setup))?);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) else {
            return;
        };

        match key {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => gpu_state.commands.push(SimCommand::TogglePause),
            KeyCode::KeyN => gpu_state.commands.push(SimCommand::StepOnce),
            KeyCode::Tab => gpu_state.cycle_integrator(),
            KeyCode::F11 => {
                let fullscreen = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(fullscreen);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("Startup failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Handle GUI events
        if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
            if gpu_state.gui.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    self.held_keys.insert(key_code);
                    if !repeat {
                        self.handle_key(event_loop, key_code);
                    }
                }
                ElementState::Released => {
                    self.held_keys.remove(&key_code);
                }
            },

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    match state {
                        ElementState::Pressed if !gpu_state.gui.wants_pointer() => {
                            gpu_state.ui_state.drag = Some((self.cursor, self.cursor));
                        }
                        ElementState::Released => {
                            if let Some((start, _)) = gpu_state.ui_state.drag.take() {
                                gpu_state.finish_drag(start, self.cursor);
                            }
                        }
                        _ => {}
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = DVec2::new(position.x, position.y);
                if let Some(gpu_state) = &mut self.gpu_state {
                    if let Some((_, current)) = &mut gpu_state.ui_state.drag {
                        *current = self.cursor;
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y / 40.0,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(lines * WHEEL_ZOOM_STEPS);
                }
            }

            WindowEvent::Focused(false) => self.held_keys.clear(),

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    gpu_state.update_camera(&self.held_keys);
                    match gpu_state.render(window) {
                        Ok(fps) => {
                            window.set_title(&format!(
                                "Gravity Simulation - {:.0} FPS - {} bodies - {}{}",
                                fps,
                                gpu_state.simulation.body_count(),
                                gpu_state.simulation.integrator(),
                                if gpu_state.simulation.is_paused() {
                                    " (paused)"
                                } else {
                                    ""
                                }
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("Render error: {e:?}"),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Up widens the view (scale grows), Down narrows it
fn zoom_steps(held: &HashSet<KeyCode>) -> f64 {
    let mut steps = 0.0;
    if held.contains(&KeyCode::ArrowUp) {
        steps -= 1.0;
    }
    if held.contains(&KeyCode::ArrowDown) {
        steps += 1.0;
    }
    steps
}

fn main() -> anyhow::Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config()?;

    log::info!("Starting gravity simulation...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(Setup { cli, config });
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys_scale_view() {
        let mut camera = Camera2d::new(800, 600);
        let start = camera.scale;

        camera.zoom(zoom_steps(&HashSet::from([KeyCode::ArrowUp])));
        assert!(camera.scale > start);

        camera.zoom(zoom_steps(&HashSet::from([KeyCode::ArrowDown])));
        camera.zoom(zoom_steps(&HashSet::from([KeyCode::ArrowDown])));
        assert!(camera.scale < start);

        assert_eq!(
            zoom_steps(&HashSet::from([KeyCode::ArrowUp, KeyCode::ArrowDown])),
            0.0
        );
    }
}
