use anyhow::Result;

use super::ctx::{ContextCtx, DrawCtx, FrameInput};

/// Control directive returned by the update step.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the plugin.
///
/// The runtime shares one instance between the coordinating thread and all
/// render threads behind a reader/writer lock: `update` and the lifecycle
/// methods taking `&mut self` run exclusively, the per-context methods taking
/// `&self` run concurrently on every render thread.
///
/// Errors returned from any method end the session; the runtime logs them and
/// `Runtime::run` returns the first one.
pub trait App: Send + Sync + 'static {
    /// Builds application state. Called once, before any context exists.
    fn initialize(&mut self) -> Result<()>;

    /// Creates the GPU resources of one context.
    ///
    /// Runs on the context's render thread; other contexts may be
    /// initializing at the same time.
    fn initialize_context(&self, ctx: &mut ContextCtx<'_>) -> Result<()>;

    /// Advances shared state for the frame described by `frame`.
    ///
    /// Completes before any `draw_context` call of the same frame starts.
    fn update(&mut self, frame: &FrameInput<'_>) -> Result<AppControl>;

    /// Records the draw commands of one context for the current frame.
    fn draw_context(&self, ctx: &mut DrawCtx<'_>) -> Result<()>;

    /// Releases the GPU resources of every context. Called once at shutdown.
    fn release_all(&mut self);
}
