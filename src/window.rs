//! Windowed runner.
//!
//! Drives a [`Simulation`] from winit redraw requests: each redraw asks the
//! [`FrameClock`] how many ticks are due, runs them, batches the scene for
//! the GPU and presents it. A resize resets the simulation to the new size.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::SceneConfig;
use crate::error::RunError;
use crate::gpu::{GpuState, SceneBatch};
use crate::simulation::Simulation;
use crate::surface::Surface;
use crate::time::FrameClock;

const TITLE: &str = "Starfall";

/// Open a window and run the effect until it is closed.
///
/// Window or GPU setup failures end the loop before the first frame and are
/// returned.
pub fn run(config: SceneConfig) -> Result<(), RunError> {
    let simulation = Simulation::new(config, Surface::new(1280.0, 720.0))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(simulation);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    simulation: Simulation,
    batch: SceneBatch,
    clock: FrameClock,
    error: Option<RunError>,
}

impl App {
    fn new(simulation: Simulation) -> Self {
        Self {
            window: None,
            gpu_state: None,
            batch: SceneBatch::new(),
            simulation,
            clock: FrameClock::default(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu_state = pollster::block_on(GpuState::new(window.clone()))?;

        let size = window.inner_size();
        self.resize(size);
        log::info!("Window ready at {}x{}", size.width, size.height);

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        self.clock.reset();
        Ok(())
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        let surface = Surface::from(size);
        self.simulation.resize(surface.width, surface.height);
        if let Some(gpu_state) = &mut self.gpu_state {
            gpu_state.resize(size);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        for _ in 0..self.clock.update() {
            self.simulation.tick();
        }
        self.simulation.render(&mut self.batch);

        if let Some(gpu_state) = &mut self.gpu_state {
            match gpu_state.render(&self.batch) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu_state.resize(winit::dpi::PhysicalSize {
                        width: gpu_state.config.width,
                        height: gpu_state.config.height,
                    })
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory, exiting");
                    event_loop.exit();
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        if let Some(window) = &self.window {
            if self.clock.frame() % 120 == 0 {
                window.set_title(&format!(
                    "{} - {:.0} fps, {} stars, {} fragments",
                    TITLE,
                    self.clock.fps(),
                    self.simulation.particles().len(),
                    self.simulation.fragments().len()
                ));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if physical_size.width > 0 && physical_size.height > 0 {
                    self.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
