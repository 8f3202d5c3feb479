use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use winit::event::{Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::Window;

use escher_world::{
    config::{EditorConfig, RejectedOverride},
    controller::{input::native, EditorAction, EditorSession, InputEvent, InputState},
    logging, ui,
    view::{GpuContext, GpuInitError, RenderState},
};

struct App {
    gpu: GpuContext,
    size: winit::dpi::PhysicalSize<u32>,
    window: Arc<Window>,

    // Rendering state
    render_state: RenderState,

    // egui
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Editor state
    session: EditorSession,
    input_state: InputState,

    // Frame timing
    last_frame_time: Instant,
    last_dt: f32,
}

impl App {
    async fn new(window: Arc<Window>, config: EditorConfig) -> Result<Self, GpuInitError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new(&instance, surface, size.width, size.height).await?;

        let render_state = RenderState::new(&gpu.device, gpu.config.format, size.width, size.height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let session = EditorSession::new(config, size.width, size.height);

        Ok(Self {
            gpu,
            size,
            window,
            render_state,
            egui_renderer,
            egui_state,
            egui_ctx,
            session,
            input_state: InputState::new(),
            last_frame_time: Instant::now(),
            last_dt: 0.0,
        })
    }

    /// Feeds a window event to egui and then to the editor input state.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;

        let input_event = match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                native::keyboard_event_to_input(*physical_key, *state)
            }
            WindowEvent::MouseInput { state, button, .. } => native::mouse_button_to_input(*button, *state),
            WindowEvent::CursorMoved { position, .. } => {
                Some(InputEvent::CursorMoved { x: position.x as f32, y: position.y as f32 })
            }
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            _ => None,
        };

        let Some(input_event) = input_event else {
            return egui_captured;
        };
        // releases and cursor motion always go through so no button stays stuck
        let always = matches!(
            input_event,
            InputEvent::KeyUp(_) | InputEvent::CursorMoved { .. } | InputEvent::FocusLost
                | InputEvent::MouseButton { is_down: false, .. }
        );
        if always || !egui_captured {
            self.input_state.process_event(&input_event);
        }
        true
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.gpu.resize(new_size.width, new_size.height);
            self.render_state.resize(&self.gpu.device, new_size.width, new_size.height);
            self.session.resize(new_size.width, new_size.height);
        }
    }

    fn update(&mut self, dt: Duration) -> EditorAction {
        self.last_dt = dt.as_secs_f32();
        let action = self.session.update(&self.input_state, dt);
        self.input_state.end_frame();

        self.render_state.sync(&self.gpu.device, &self.session.world);
        self.render_state.update_camera(&self.gpu.queue, &self.session.camera);
        action
    }

    /// Advances the session by the time since the last frame and draws it.
    fn redraw(&mut self) -> EditorAction {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;

        if self.update(dt) == EditorAction::Exit {
            return EditorAction::Exit;
        }
        match self.render() {
            Ok(()) => EditorAction::Continue,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.resize(self.size);
                EditorAction::Continue
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory");
                EditorAction::Exit
            }
            Err(e) => {
                warn!("surface error: {e:?}");
                EditorAction::Continue
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let pixels_per_point = self.window.scale_factor() as f32;
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = ui::build_ui(&self.egui_ctx, raw_input, &self.session, pixels_per_point, self.last_dt);
        self.egui_state.handle_platform_output(&self.window, full_output.platform_output.clone());
        let primitives = self.egui_ctx.tessellate(full_output.shapes.clone(), full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point,
        };

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        self.render_state.draw_world(&mut encoder, &view);
        self.render_state.draw_ui(
            &mut encoder,
            &view,
            &mut self.egui_renderer,
            &self.gpu.device,
            &self.gpu.queue,
            &full_output,
            &primitives,
            &screen_descriptor,
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn main() {
    let (config, rejected) = EditorConfig::from_env();
    logging::init(&config.log);
    RejectedOverride::warn_all(&rejected);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("failed to create event loop: {e}");
            return;
        }
    };
    let window_attributes = Window::default_attributes()
        .with_title("Escher's World")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = match event_loop.create_window(window_attributes) {
        Ok(window) => Arc::new(window),
        Err(e) => {
            error!("failed to create window: {e}");
            return;
        }
    };

    let mut app = match pollster::block_on(App::new(window.clone(), config)) {
        Ok(app) => app,
        Err(e) => {
            error!("GPU initialisation failed: {e}");
            return;
        }
    };
    info!("editor ready");

    let result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if app.input(event) {
                return;
            }
            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(new_size) => app.resize(*new_size),
                WindowEvent::RedrawRequested => {
                    if app.redraw() == EditorAction::Exit {
                        elwt.exit();
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => app.window.request_redraw(),
        _ => {}
    });

    if let Err(e) = result {
        error!("event loop terminated: {e}");
    }
}
