use egui::{Color32, Context, FontId, Stroke};
use egui_wgpu::Renderer;
use egui_winit::State;
use glam::DVec2;
use gravity_physics::{BodyKind, EARTH_MASS, EARTH_RADIUS};
use gravity_renderer::{palette, Camera2d};
use gravity_simulation::{CommandQueue, IntegratorKind, SimCommand, Simulation};
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Properties applied to the next drag-spawned body
pub struct SpawnSettings {
    pub mass: f64,
    pub radius: f64,
    pub label: String,
    pub kind: BodyKind,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            mass: EARTH_MASS,
            radius: EARTH_RADIUS,
            label: "Shot".to_string(),
            kind: BodyKind::Projectile,
        }
    }
}

#[derive(Default)]
pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    pub spawn: SpawnSettings,
    /// Drag in progress: start and current cursor, physical pixels
    pub drag: Option<(DVec2, DVec2)>,
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
}

impl Gui {
    pub fn new(device: &Device, output_color_format: TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            context,
            state,
            renderer,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    pub fn wants_pointer(&self) -> bool {
        self.context.wants_pointer_input()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
        simulation: &Simulation,
        camera: &mut Camera2d,
        commands: &mut CommandQueue,
    ) {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            Self::ui(ctx, ui_state, simulation, camera, commands);
            Self::overlay(ctx, ui_state, simulation, window.scale_factor() as f32);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.renderer
                .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    fn ui(
        ctx: &Context,
        state: &mut UiState,
        simulation: &Simulation,
        camera: &mut Camera2d,
        commands: &mut CommandQueue,
    ) {
        // Status Panel (Top Left)
        egui::Window::new("Simulation")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1} ({:.2} ms)", state.fps, state.frame_time));
                ui.separator();

                let time = simulation.sim_time();
                ui.label(format!(
                    "Time: {:.0} s ({:.2} days)",
                    time,
                    time / SECONDS_PER_DAY
                ));
                ui.label(format!("Steps: {}", simulation.steps_run()));
                ui.label(format!("Bodies: {}", simulation.body_count()));
                ui.label(format!("|p|: {:.4e} kg·m/s", simulation.total_momentum().length()));
                ui.label(format!("E: {:.4e} J", simulation.total_energy()));
                if let Some(com) = simulation.center_of_mass() {
                    ui.label(format!("COM: ({:.3e}, {:.3e}) m", com.x, com.y));
                }

                ui.separator();
                ui.horizontal(|ui| {
                    let label = if simulation.is_paused() { "Resume" } else { "Pause" };
                    if ui.button(label).clicked() {
                        commands.push(SimCommand::TogglePause);
                    }
                    if ui.button("Step").clicked() {
                        commands.push(SimCommand::StepOnce);
                    }
                });

                ui.heading("Integrator");
                for kind in IntegratorKind::ALL {
                    let available = kind != IntegratorKind::Gpu || simulation.has_gpu();
                    ui.add_enabled_ui(available, |ui| {
                        let selected = simulation.integrator() == kind;
                        if ui.selectable_label(selected, kind.name()).clicked() && !selected {
                            commands.push(SimCommand::SetIntegrator(kind));
                        }
                    });
                }

                ui.heading("Time");
                let mut dt = simulation.config().dt;
                if ui
                    .add(
                        egui::Slider::new(&mut dt, 0.01..=3600.0)
                            .text("dt (s)")
                            .logarithmic(true),
                    )
                    .changed()
                {
                    commands.push(SimCommand::SetTimeStep(dt));
                }
                let mut steps = simulation.config().steps_per_frame;
                if ui
                    .add(
                        egui::Slider::new(&mut steps, 0..=100_000)
                            .text("Steps / frame")
                            .logarithmic(true),
                    )
                    .changed()
                {
                    commands.push(SimCommand::SetStepsPerFrame(steps));
                }
            });

        // Spawn Controls (Bottom Left)
        egui::Window::new("Spawn")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label("Drag with the left mouse button to launch");
                ui.add(
                    egui::Slider::new(&mut state.spawn.mass, 1.0e18..=1.0e31)
                        .text("Mass (kg)")
                        .logarithmic(true),
                );
                ui.add(
                    egui::Slider::new(&mut state.spawn.radius, 1.0e4..=1.0e9)
                        .text("Radius (m)")
                        .logarithmic(true),
                );
                ui.horizontal(|ui| {
                    ui.label("Label");
                    ui.text_edit_singleline(&mut state.spawn.label);
                });
                egui::ComboBox::from_label("Kind")
                    .selected_text(state.spawn.kind.name())
                    .show_ui(ui, |ui| {
                        for kind in BodyKind::ALL {
                            ui.selectable_value(&mut state.spawn.kind, kind, kind.name());
                        }
                    });
            });

        // Body List (Top Right)
        egui::Window::new("Bodies")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                if ui
                    .add_enabled(camera.tracking.is_some(), egui::Button::new("Stop tracking"))
                    .clicked()
                {
                    camera.track(None);
                }
                ui.separator();

                egui::ScrollArea::vertical()
                    .max_height(300.0)
                    .show(ui, |ui| {
                        for (i, body) in simulation.bodies().iter().enumerate() {
                            let tracked = camera.tracking == Some(i);
                            let text = format!("{i}: {} ({})", body.label, body.kind);
                            if ui.selectable_label(tracked, text).clicked() {
                                camera.track(if tracked { None } else { Some(i) });
                            }
                        }
                    });
            });
    }

    /// Drag line and pause banner, drawn over everything
    fn overlay(ctx: &Context, state: &UiState, simulation: &Simulation, pixels_per_point: f32) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("overlay"),
        ));
        let to_points =
            |p: DVec2| egui::pos2(p.x as f32 / pixels_per_point, p.y as f32 / pixels_per_point);

        if let Some((start, current)) = state.drag {
            let [r, g, b] = palette::body_color_srgb(state.spawn.kind);
            painter.line_segment(
                [to_points(start), to_points(current)],
                Stroke::new(2.0, Color32::from_rgb(r, g, b)),
            );
        }

        if simulation.is_paused() {
            let [r, g, b] = palette::warning_srgb();
            let rect = ctx.screen_rect();
            painter.text(
                egui::pos2(rect.center().x, rect.top() + 40.0),
                egui::Align2::CENTER_CENTER,
                "PAUSED",
                FontId::proportional(32.0),
                Color32::from_rgb(r, g, b),
            );
        }
    }
}
