use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::{Receiver, Sender};
use winit::dpi::PhysicalSize;

use crate::camera::CameraRig;
use crate::core::{App, ContextCtx, ContextId, DrawCtx, RenderTarget};
use crate::device::Gpu;
use crate::time::SimTime;

use super::fence::WorkerReport;

/// Command sent from the coordinating thread to one render thread.
#[derive(Debug)]
pub(crate) enum WorkerCommand {
    /// Draw the frame whose shared state was just updated.
    Frame(SimTime),
    Resize(PhysicalSize<u32>),
    Shutdown,
}

/// Handle to the render thread of one context.
///
/// The thread owns the context's `Gpu`. It initializes the application's
/// resources for its context first, then processes commands in order until
/// `Shutdown`.
pub(crate) struct RenderWorker {
    id: ContextId,
    commands: Sender<WorkerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    pub(crate) fn spawn<A: App>(
        id: ContextId,
        gpu: Gpu,
        camera: CameraRig,
        app: Arc<RwLock<A>>,
        reports: Sender<WorkerReport>,
    ) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name(format!("vrcube-render-{}", id.0))
            .spawn(move || {
                let _exit = ExitNotice {
                    id,
                    reports: reports.clone(),
                };
                if let Err(error) = run(id, gpu, camera, &app, &rx, &reports) {
                    log::error!("{id}: {error:#}");
                    let _ = reports.send(WorkerReport::Failed { id, error });
                }
            })
            .with_context(|| format!("failed to spawn render thread for {id}"))?;

        Ok(Self {
            id,
            commands: tx,
            handle: Some(handle),
        })
    }

    pub(crate) fn id(&self) -> ContextId {
        self.id
    }

    pub(crate) fn send(&self, cmd: WorkerCommand) -> Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| anyhow!("render thread of {} is not running", self.id))
    }

    /// Asks the thread to finish and joins it. Idempotent.
    pub(crate) fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        // The thread may already be gone after a failure; joining still applies.
        let _ = self.commands.send(WorkerCommand::Shutdown);
        if handle.join().is_err() {
            log::error!("render thread of {} panicked", self.id);
        } else {
            log::debug!("render thread of {} stopped", self.id);
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reports thread exit to the fence, including exit by panic.
struct ExitNotice {
    id: ContextId,
    reports: Sender<WorkerReport>,
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        let _ = self.reports.send(WorkerReport::Exited { id: self.id });
    }
}

fn read_app<A>(app: &RwLock<A>) -> Result<RwLockReadGuard<'_, A>> {
    app.read().map_err(|_| anyhow!("application state lock poisoned"))
}

fn run<A: App>(
    id: ContextId,
    mut gpu: Gpu,
    mut camera: CameraRig,
    app: &RwLock<A>,
    commands: &Receiver<WorkerCommand>,
    reports: &Sender<WorkerReport>,
) -> Result<()> {
    log::info!("{id}: rendering on {}", gpu.adapter_summary());

    read_app(app)?
        .initialize_context(&mut ContextCtx { id, gpu: &gpu })
        .with_context(|| format!("failed to initialize {id}"))?;

    log::debug!("{id}: context initialized");

    for cmd in commands.iter() {
        match cmd {
            WorkerCommand::Frame(time) => {
                render_frame(id, &mut gpu, &camera, app, time)?;
                if reports
                    .send(WorkerReport::FrameDone {
                        id,
                        frame_index: time.frame_index,
                    })
                    .is_err()
                {
                    break;
                }
            }
            WorkerCommand::Resize(size) => {
                gpu.resize(size);
                camera.resize(size.width, size.height);
            }
            WorkerCommand::Shutdown => break,
        }
    }

    Ok(())
}

fn render_frame<A: App>(
    id: ContextId,
    gpu: &mut Gpu,
    camera: &CameraRig,
    app: &RwLock<A>,
    time: SimTime,
) -> Result<()> {
    let size = gpu.size();
    if size.width == 0 || size.height == 0 {
        // Minimized; nothing to present.
        return Ok(());
    }

    let mut frame = match gpu.begin_frame() {
        Ok(f) => f,
        Err(err) => {
            let action = gpu.handle_surface_error(err.clone());
            if action.is_fatal() {
                bail!("{id}: unrecoverable surface error: {err}");
            }
            log::debug!("{id}: frame {} skipped ({action:?})", time.frame_index);
            return Ok(());
        }
    };

    {
        let app = read_app(app)?;
        let mut ctx = DrawCtx {
            id,
            gpu: &*gpu,
            target: RenderTarget::new(&mut frame.encoder, &frame.view, gpu.depth_view()),
            camera,
            time,
        };
        app.draw_context(&mut ctx)
            .with_context(|| format!("{id}: draw failed on frame {}", time.frame_index))?;
    }

    gpu.submit(frame);
    Ok(())
}
