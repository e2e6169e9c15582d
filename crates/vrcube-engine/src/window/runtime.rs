use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::Sender;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::camera::WallLayout;
use crate::core::{App, AppControl, ContextEvent, ContextId, FrameInput};
use crate::device::{Gpu, GpuInit};
use crate::input::InputState;
use crate::input::platform::winit::translate_window_event;
use crate::time::SimulationClock;

use super::fence::{FrameFence, WorkerReport};
use super::worker::{RenderWorker, WorkerCommand};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Size of every window, in logical pixels.
    pub window_size: LogicalSize<f64>,
    /// Number of windows (and contexts). Windows are laid out left to right.
    pub windows: u32,
    /// Physical screen layout used to derive each window's camera.
    pub wall: WallLayout,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vrcube".to_string(),
            window_size: LogicalSize::new(960.0, 540.0),
            windows: 1,
            wall: WallLayout::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` until it asks to exit, the last window closes, or a context
    /// fails.
    ///
    /// Returns the first error reported by the application or by any context.
    pub fn run<A: App>(config: RuntimeConfig, gpu_init: GpuInit, mut app: A) -> Result<()> {
        anyhow::ensure!(config.windows > 0, "at least one window is required");

        app.initialize().context("application initialization failed")?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        let loop_result = event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error");

        state.shutdown();
        loop_result?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct WindowEntry {
    context: ContextId,
    window: Arc<Window>,
    input: InputState,
    worker: RenderWorker,
}

struct AppState<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: Arc<RwLock<A>>,

    clock: SimulationClock,
    windows: HashMap<WindowId, WindowEntry>,
    events: Vec<ContextEvent>,

    fence: FrameFence,
    /// Dropped once all workers are spawned so the fence can see disconnects.
    reports: Option<Sender<WorkerReport>>,

    fatal: Option<anyhow::Error>,
    started: bool,
    exit_requested: bool,
    released: bool,
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        let (fence, reports) = FrameFence::new();
        Self {
            config,
            gpu_init,
            app: Arc::new(RwLock::new(app)),
            clock: SimulationClock::new(),
            windows: HashMap::new(),
            events: Vec::new(),
            fence,
            reports: Some(reports),
            fatal: None,
            started: false,
            exit_requested: false,
            released: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.request_exit();
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.started = true;
        for column in 0..self.config.windows {
            self.create_window_entry(event_loop, column)?;
        }
        self.reports = None;
        self.clock.reset();
        log::info!("started {} context(s)", self.windows.len());
        Ok(())
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop, column: u32) -> Result<()> {
        let count = self.config.windows;
        let reports = self
            .reports
            .clone()
            .context("render threads were already started")?;

        let title = if count > 1 {
            format!("{} [{}/{}]", self.config.title, column + 1, count)
        } else {
            self.config.title.clone()
        };

        let size = self.config.window_size;
        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(size)
            .with_position(LogicalPosition::new(size.width * column as f64, 0.0));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let id = ContextId(column);
        let gpu = pollster::block_on(Gpu::new(window.clone(), self.gpu_init.clone()))
            .with_context(|| format!("GPU initialization failed for {id}"))?;

        let mut camera = self.config.wall.with_columns(count).rig(column);
        let drawable = gpu.size();
        camera.resize(drawable.width, drawable.height);

        let worker = RenderWorker::spawn(id, gpu, camera, self.app.clone(), reports)?;

        self.windows.insert(
            window.id(),
            WindowEntry {
                context: id,
                window,
                input: InputState::default(),
                worker,
            },
        );
        Ok(())
    }

    fn close_window(&mut self, window_id: WindowId) {
        if let Some(mut entry) = self.windows.remove(&window_id) {
            log::info!("closing {}", entry.context);
            entry.worker.stop();
        }
        if self.windows.is_empty() {
            self.request_exit();
        }
    }

    /// Runs one frame: update on this thread, then draw on every context.
    fn drive_frame(&mut self) -> Result<()> {
        if self.windows.is_empty() {
            return Ok(());
        }

        // Surface init failures that happened before the first frame.
        self.fence.poll_failure()?;

        let time = self.clock.tick();
        let events = std::mem::take(&mut self.events);

        let control = {
            let mut app = self
                .app
                .write()
                .map_err(|_| anyhow!("application state lock poisoned"))?;
            app.update(&FrameInput {
                time,
                events: &events,
            })
            .context("update failed")?
        };

        if control == AppControl::Exit {
            self.request_exit();
            return Ok(());
        }

        for entry in self.windows.values() {
            entry.worker.send(WorkerCommand::Frame(time))?;
        }

        self.fence.wait(
            self.windows.values().map(|e| e.worker.id()),
            time.frame_index,
        )
    }

    /// Stops every render thread, then releases all application resources.
    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for (_, mut entry) in self.windows.drain() {
            entry.worker.stop();
        }

        let mut app = self.app.write().unwrap_or_else(PoisonError::into_inner);
        app.release_all();
        log::info!("resources released");
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e.context("failed to create contexts"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Frames are paced by presentation on the render threads.
        event_loop.set_control_flow(ControlFlow::Poll);

        if let Err(e) = self.drive_frame() {
            self.fail(event_loop, e);
            return;
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.windows.get_mut(&window_id) else {
            return;
        };

        if let Some(ev) = translate_window_event(&entry.window, &entry.input, &event) {
            entry.input.apply_event(&ev);
            self.events.push(ContextEvent {
                context: entry.context,
                event: ev,
            });
        }

        let result = match &event {
            WindowEvent::CloseRequested => {
                self.close_window(window_id);
                Ok(())
            }
            WindowEvent::Resized(new_size) => entry.worker.send(WorkerCommand::Resize(*new_size)),
            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.window.inner_size();
                entry.worker.send(WorkerCommand::Resize(new_size))
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
            return;
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
