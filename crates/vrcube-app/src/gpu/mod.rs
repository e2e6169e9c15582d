//! GPU side of the cube: shaders, uniform layout and the backend seam.
//!
//! [`ContextResourceRegistry`](crate::registry::ContextResourceRegistry) talks
//! to the GPU only through [`GpuBackend`], so the lifecycle logic is the same
//! for the wgpu implementation and for test doubles.

mod backend;
mod shader;
mod uniforms;
mod wgpu_backend;

pub use backend::{AttributeBinding, BufferKind, DrawCall, GpuBackend, ResourceBundle, VertexLayout};
pub use shader::{CompiledStage, ShaderSource, ShaderStage, compile, link};
pub use uniforms::FrameUniforms;
pub use wgpu_backend::{WgpuBackend, WgpuProgram, WgpuVertexArray};
