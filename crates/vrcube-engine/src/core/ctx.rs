use std::fmt;

use crate::camera::CameraView;
use crate::device::Gpu;
use crate::input::InputEvent;
use crate::time::SimTime;

/// Identifier of one rendering context (one window, one device, one thread).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ContextId(pub u32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Input event tagged with the context whose window received it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEvent {
    pub context: ContextId,
    pub event: InputEvent,
}

/// Input to the per-frame update step.
pub struct FrameInput<'a> {
    pub time: SimTime,
    /// Events received since the previous update, in arrival order.
    pub events: &'a [ContextEvent],
}

/// Context passed to `App::initialize_context`.
pub struct ContextCtx<'a> {
    pub id: ContextId,
    pub gpu: &'a Gpu,
}

/// Target for drawing (encoder + color and depth views).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        depth_view: &'a wgpu::TextureView,
    ) -> Self {
        Self {
            encoder,
            color_view,
            depth_view,
        }
    }
}

/// Per-frame context passed to `App::draw_context`.
///
/// Lifetimes: `'a` is the duration of the callback invocation.
pub struct DrawCtx<'a> {
    pub id: ContextId,
    pub gpu: &'a Gpu,
    pub target: RenderTarget<'a>,
    pub camera: &'a dyn CameraView,
    pub time: SimTime,
}
