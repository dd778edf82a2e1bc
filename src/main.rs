use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use terrain3d::renderer::GpuState;
use terrain3d::ui::{
    StageAction, UiActions, UiState, apply_theme, draw_axis_labels, draw_help_overlay,
    draw_side_panel,
};
use terrain3d::{Cli, TerrainPlot, load_payload};

#[derive(Default)]
struct InputState {
    orbiting: bool,
    mouse_delta: Vec2,
    cursor: Vec2,
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    plot: TerrainPlot,
    ui_state: UiState,
    input: InputState,

    data_path: PathBuf,
    start_stage: Option<i64>,

    needs_frame: bool,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(plot: TerrainPlot, data_path: PathBuf, start_stage: Option<i64>) -> Self {
        let ui_state = UiState {
            data_name: data_path.display().to_string(),
            ..Default::default()
        };

        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            plot,
            ui_state,
            input: InputState::default(),

            data_path,
            start_stage,

            needs_frame: true,
            fatal: None,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let gpu = pollster::block_on(GpuState::new(window.clone()))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        let size = window.inner_size();
        self.plot.resize(size.width, size.height);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn update(&mut self) {
        match self.plot.poll() {
            Some(Ok(())) => {
                self.ui_state.last_error = None;
                if let Some(stage) = self.start_stage.take() {
                    if !self.plot.goto(stage) {
                        log::warn!(
                            "stage {} is out of range ({} stages)",
                            stage,
                            self.plot.number_of_stages()
                        );
                    }
                }
            }
            Some(Err(e)) => {
                log::error!("plot failed: {}", e);
                self.ui_state.last_error = Some(e.to_string());
            }
            None => {}
        }

        while let Some(event) = self.plot.poll_event() {
            self.ui_state.apply_event(event);
            self.needs_frame = true;
        }

        if self.input.orbiting && self.input.mouse_delta != Vec2::ZERO {
            self.plot
                .camera_mut()
                .process_mouse_movement(self.input.mouse_delta);
        }
        self.input.mouse_delta = Vec2::ZERO;
    }

    fn reload(&mut self) {
        let submitted = load_payload(&self.data_path).and_then(|dataset| self.plot.submit(dataset));
        if let Err(e) = submitted {
            log::error!("reload of {} failed: {}", self.data_path.display(), e);
            self.ui_state.last_error = Some(e.to_string());
        }
    }

    fn render(&mut self) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let mut ui_actions = UiActions::default();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &self.plot);
            if self.ui_state.show_labels {
                draw_axis_labels(ctx, &self.plot);
            }
            if self.ui_state.show_help {
                draw_help_overlay(ctx, self.plot.config().allow_selection);
            }
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                self.needs_frame = true;
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fatal = Some(anyhow!("out of GPU memory"));
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                self.needs_frame = true;
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.sync(&self.plot);
        gpu.update_camera(self.plot.camera());
        gpu.update_lights(&self.plot.scene().lights);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_scene(&view, &mut encoder, &self.plot);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if let Some(action) = actions.stage {
            self.stage_action(action);
        }

        if actions.clear_selection {
            self.plot.clear_selection();
        }

        if actions.reload {
            self.reload();
        }
    }

    fn stage_action(&mut self, action: StageAction) {
        let moved = match action {
            StageAction::First => self.plot.first_stage(),
            StageAction::Previous => self.plot.previous_stage(),
            StageAction::Next => self.plot.next_stage(),
            StageAction::Last => self.plot.last_stage(),
        };
        if !moved {
            log::debug!("{:?} has no effect at {:?}", action, self.plot.stage_label());
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::ArrowLeft => self.stage_action(StageAction::Previous),
            KeyCode::ArrowRight => self.stage_action(StageAction::Next),
            KeyCode::Home => self.stage_action(StageAction::First),
            KeyCode::End => self.stage_action(StageAction::Last),
            KeyCode::Escape => self.plot.clear_selection(),
            KeyCode::F5 => self.reload(),
            _ => {
                if let Some(n) = digit(key) {
                    self.plot.goto(n - 1);
                }
            }
        }
    }
}

fn digit(key: KeyCode) -> Option<i64> {
    let n = match key {
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        _ => return None,
    };
    Some(n)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Terrain 3D")
            .with_inner_size(PhysicalSize::new(1400, 860));

        let started = event_loop
            .create_window(window_attrs)
            .context("failed to create window")
            .and_then(|window| self.init_gpu(Arc::new(window)));

        if let Err(e) = started {
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if !matches!(event, WindowEvent::RedrawRequested) {
            self.needs_frame = true;
        }

        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                self.plot.resize(size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.handle_key(key);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor = Vec2::new(position.x as f32, position.y as f32);
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => self.plot.pointer_down(self.input.cursor),
                ElementState::Released => self.plot.pointer_up(self.input.cursor),
            },

            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.input.orbiting = state == ElementState::Pressed;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.plot.camera_mut().process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.orbiting {
                self.input.mouse_delta.x += delta.0 as f32;
                self.input.mouse_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.fatal.is_some() {
            event_loop.exit();
            return;
        }

        self.update();

        let redraw = self.plot.take_redraw() | std::mem::take(&mut self.needs_frame);
        if redraw {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        event_loop.set_control_flow(if self.plot.is_busy() || self.input.orbiting {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        });
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.plot_config().context("failed to load plot configuration")?;
    let dataset = load_payload(&cli.data)
        .with_context(|| format!("failed to read dataset {}", cli.data.display()))?;

    let mut plot = TerrainPlot::new(config);
    plot.submit(dataset).context("failed to start terrain build")?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(plot, cli.data, cli.stage);
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
