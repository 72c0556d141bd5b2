use std::{sync::Arc, time::Instant};

use nalgebra::{Point3, Vector2};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    camera::Camera,
    cli::Cli,
    input::{Command, InputState},
    render::{RenderError, Renderer},
    scene::{self, SceneError, SceneOptions},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("couldn't create window")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Everything the viewer knows between frames, apart from GPU resources.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub size: PhysicalSize<u32>,
    pub quit: bool,
    pub wireframe: bool,
    pub input: InputState,
    pub camera: Camera,
    last_frame: Option<Instant>,
}

impl AppState {
    pub fn new(cli: &Cli) -> Self {
        let mut camera = Camera::new(Point3::from(cli.camera));
        camera.fov = cli.fov;
        camera.near = cli.near;
        camera.far = cli.far;
        Self {
            size: PhysicalSize::new(cli.size.0, cli.size.1),
            quit: false,
            wireframe: cli.wireframe,
            input: InputState::default(),
            camera,
            last_frame: None,
        }
    }

    /// Seconds since the previous call; 0 on the first.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last_frame = Some(now);
        dt
    }

    /// Move & turn the camera according to the input gathered since the last step.
    pub fn step(&mut self, dt: f32) {
        for movement in self.input.movements() {
            self.camera.process_keyboard(movement, dt);
        }
        let delta = self.input.take_mouse_delta();
        if delta != Vector2::zeros() {
            // window coordinates grow downwards
            self.camera
                .process_mouse_movement(delta.x as f32, -delta.y as f32);
        }
    }

    pub fn command(&mut self, command: Command) {
        match command {
            Command::ToggleWireframe => self.wireframe = !self.wireframe,
            Command::Quit => self.quit = true,
        }
    }
}

struct App {
    options: SceneOptions,
    state: AppState,
    renderer: Option<Renderer>,
    error: Option<AppError>,
}

impl App {
    fn new(cli: &Cli) -> Self {
        Self {
            options: SceneOptions::from(cli),
            state: AppState::new(cli),
            renderer: None,
            error: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Renderer, AppError> {
        let objects = scene::build(self.options)?;
        let window = event_loop.create_window(
            Window::default_attributes()
                .with_title(env!("CARGO_PKG_NAME"))
                .with_inner_size(self.state.size),
        )?;
        Ok(pollster::block_on(Renderer::new(Arc::new(window), &objects))?)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let dt = self.state.tick(Instant::now());
        self.state.step(dt);
        match renderer.render(&self.state.camera, self.state.wireframe) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(self.state.size)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("out of memory");
                event_loop.exit();
            }
            Err(e) => tracing::warn!(?e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(renderer) => {
                for draw in renderer.draws() {
                    tracing::debug!(name = draw.name, count = draw.mesh.count, "draw call");
                }
                self.state.size = renderer.window().inner_size();
                self.renderer = Some(renderer);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.state.quit = true,
            WindowEvent::Resized(size) => {
                self.state.size = size;
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(command) = self.state.input.key(code, state) {
                    if command == Command::ToggleWireframe
                        && !self.state.wireframe
                        && self.renderer.as_ref().is_some_and(|r| !r.wireframe_supported())
                    {
                        tracing::warn!("wireframe mode is unavailable on this adapter");
                    }
                    self.state.command(command);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.state.input.mouse_button(button, state)
            }
            WindowEvent::Focused(false) => self.state.input.release_all(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
        if self.state.quit {
            event_loop.exit();
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.state.input.mouse_motion(dx, dy);
        }
    }

    fn about_to_wait(&mut self, _: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

/// Open the window and render until it's closed.
pub fn run(cli: &Cli) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
