/// Represents a single acquired frame.
///
/// This object is short-lived and must be finalized promptly with
/// [`Gpu::submit`](super::Gpu::submit). Dropping it without submitting discards
/// the frame.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
