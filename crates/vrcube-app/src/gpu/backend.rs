use crate::error::RenderError;

use super::shader::ShaderSource;
use super::uniforms::FrameUniforms;

/// Purpose of a GPU buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    /// Per-vertex attributes.
    Vertex,
    Index,
    /// Per-instance transforms.
    Instance,
}

/// One vertex attribute sourced from a range of the vertex buffer.
///
/// Attributes are tightly packed `vec3<f32>` values, not interleaved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeBinding {
    pub location: u32,
    pub offset: u64,
    pub size: u64,
}

/// Inputs bound by a vertex array.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    pub attributes: Vec<AttributeBinding>,
    /// First shader location of the four per-instance matrix columns.
    pub instance_location: u32,
}

impl VertexLayout {
    pub const POSITION: u32 = 0;
    pub const NORMAL: u32 = 1;
    pub const COLOR: u32 = 2;
    pub const INSTANCE: u32 = 3;

    /// Position, normal and color blocks laid out back to back.
    pub fn packed(vertex_count: usize) -> Self {
        let block = (vertex_count * std::mem::size_of::<glam::Vec3>()) as u64;
        Self {
            attributes: vec![
                AttributeBinding {
                    location: Self::POSITION,
                    offset: 0,
                    size: block,
                },
                AttributeBinding {
                    location: Self::NORMAL,
                    offset: block,
                    size: block,
                },
                AttributeBinding {
                    location: Self::COLOR,
                    offset: 2 * block,
                    size: block,
                },
            ],
            instance_location: Self::INSTANCE,
        }
    }
}

/// Indexed draw over a whole index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub index_count: u32,
    pub instance_count: u32,
}

/// Every GPU object one context needs to draw the scene.
pub struct ResourceBundle<B: GpuBackend> {
    pub program: B::Program,
    pub vertex_buffer: B::Buffer,
    pub index_buffer: B::Buffer,
    pub instance_buffer: B::Buffer,
    pub vertex_array: B::VertexArray,
    pub draw: DrawCall,
}

/// GPU operations of one rendering context.
///
/// A backend is bound to a single device. Handles it returns are only valid
/// with that backend and must not cross to another context. The registry
/// keeps each backend next to the resources it created, so release can run on
/// any thread once drawing has stopped.
pub trait GpuBackend: Send + 'static {
    type Program: Send + 'static;
    type Buffer: Send + 'static;
    type VertexArray: Send + 'static;

    /// Where a frame is drawn.
    type Target<'t>;

    /// Compiles both stages and links them into a program.
    ///
    /// Compile failures return [`RenderError::ShaderCompile`] and link
    /// failures [`RenderError::ProgramLink`], with the full diagnostic log.
    fn create_program(
        &self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<Self::Program, RenderError>;

    fn create_buffer(&self, kind: BufferKind, size: u64, label: &str) -> Result<Self::Buffer, RenderError>;

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, bytes: &[u8]) -> Result<(), RenderError>;

    /// Binds the attributes of `layout` for use with `program`.
    fn create_vertex_array(
        &self,
        program: &Self::Program,
        layout: &VertexLayout,
    ) -> Result<Self::VertexArray, RenderError>;

    /// Uploads `uniforms`, clears color and depth, and issues `resources.draw`.
    ///
    /// May run several times per frame on one target; each call draws with
    /// its own `uniforms`.
    fn draw(
        &self,
        target: &mut Self::Target<'_>,
        resources: &ResourceBundle<Self>,
        uniforms: &FrameUniforms,
    ) -> Result<(), RenderError>
    where
        Self: Sized;

    /// Errors the driver reported since the last call.
    fn take_driver_errors(&self) -> Vec<String>;

    /// Destroys every object in `resources`.
    fn release(&self, resources: ResourceBundle<Self>)
    where
        Self: Sized;
}
