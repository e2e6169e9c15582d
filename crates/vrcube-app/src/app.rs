use anyhow::{Context, Result};

use vrcube_engine::core::{App, AppControl, ContextCtx, DrawCtx, FrameInput};
use vrcube_engine::device::GpuInit;
use vrcube_engine::input::Key;
use vrcube_engine::window::{Runtime, RuntimeConfig};

use crate::config::AppConfig;
use crate::error::RenderError;
use crate::gpu::WgpuBackend;
use crate::registry::ContextResourceRegistry;
use crate::scene::{CubeGeometry, GeometrySource, SceneState};

// ── CubeApp ───────────────────────────────────────────────────────────────

/// The lit, animated cube as an engine application.
///
/// The host calls, in order:
/// - `initialize` once, building the [`SceneState`]
/// - `initialize_context` once per context, on that context's thread
/// - `update` once per frame, before any draw of that frame
/// - `draw_context` on every context thread
/// - `release_all` once, after every render thread has stopped
pub struct CubeApp {
    config: AppConfig,
    geometry: Box<dyn GeometrySource>,
    scene: Option<SceneState>,
    registry: ContextResourceRegistry<WgpuBackend>,
}

impl CubeApp {
    /// Cube geometry colored by `config.scene.color_scheme`.
    pub fn new(config: AppConfig) -> Self {
        let geometry = CubeGeometry::new(config.scene.color_scheme);
        Self::with_geometry(config, geometry)
    }

    /// Replaces the built-in cube with another geometry source.
    pub fn with_geometry(config: AppConfig, geometry: impl GeometrySource + 'static) -> Self {
        Self {
            config,
            geometry: Box::new(geometry),
            scene: None,
            registry: ContextResourceRegistry::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// `None` until `initialize` ran.
    pub fn scene(&self) -> Option<&SceneState> {
        self.scene.as_ref()
    }

    pub fn registry(&self) -> &ContextResourceRegistry<WgpuBackend> {
        &self.registry
    }

    /// Opens the windows described by `runtime` and renders until exit.
    pub fn run(self, runtime: RuntimeConfig, gpu_init: GpuInit) -> Result<()> {
        Runtime::run(runtime, gpu_init, self)
    }

    fn scene_ref(&self) -> Result<&SceneState, RenderError> {
        self.scene.as_ref().ok_or(RenderError::SceneNotInitialized)
    }
}

impl App for CubeApp {
    fn initialize(&mut self) -> Result<()> {
        let scene = SceneState::initialize(&self.config.scene, &*self.geometry)
            .with_context(|| format!("failed to build scene from {}", self.geometry.name()))?;
        self.scene = Some(scene);
        Ok(())
    }

    fn initialize_context(&self, ctx: &mut ContextCtx<'_>) -> Result<()> {
        let scene = self.scene_ref()?;
        let backend = WgpuBackend::for_gpu(ctx.gpu, self.config.clear_color);

        if let Err(err) = self.registry.initialize_context(ctx.id, backend, scene) {
            if err.is_fatal() {
                log::error!("{}: cannot render without a shader program", ctx.id);
            }
            return Err(err.into());
        }
        Ok(())
    }

    fn update(&mut self, frame: &FrameInput<'_>) -> Result<AppControl> {
        let scene = self.scene.as_mut().ok_or(RenderError::SceneNotInitialized)?;
        scene.update(frame.time.seconds)?;

        let quit = frame
            .events
            .iter()
            .any(|e| e.event.is_key_press(Key::Escape));
        if quit {
            log::info!("escape pressed; exiting");
            return Ok(AppControl::Exit);
        }
        Ok(AppControl::Continue)
    }

    fn draw_context(&self, ctx: &mut DrawCtx<'_>) -> Result<()> {
        let scene = self.scene_ref()?;
        let view = ctx.camera.view_matrix();
        let proj = ctx.camera.projection_matrix();

        self.registry
            .draw_context(ctx.id, &mut ctx.target, view, proj, scene)?;
        Ok(())
    }

    fn release_all(&mut self) {
        let released = self.registry.release_all();
        log::info!("released GPU resources of {released} context(s)");
    }
}
