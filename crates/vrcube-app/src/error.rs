use thiserror::Error;
use vrcube_engine::core::ContextId;

use crate::gpu::ShaderStage;

/// Violations of scene data invariants.
///
/// Scene data is built from fixed tables or caller-supplied meshes; any of
/// these indicates a construction bug rather than a runtime condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("geometry has no vertices")]
    EmptyGeometry,

    #[error("attribute lengths differ: {vertices} vertices, {normals} normals, {colors} colors")]
    AttributeLengthMismatch {
        vertices: usize,
        normals: usize,
        colors: usize,
    },

    #[error("index {value} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        value: u32,
        vertex_count: usize,
    },

    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    #[error("light index {index} is out of range for {count} lights")]
    LightIndexOutOfRange { index: usize, count: usize },

    #[error("cannot add light: at most {max} lights are supported")]
    TooManyLights { max: usize },

    #[error("render mode produced no instances")]
    NoInstances,
}

/// Errors raised by the per-context render lifecycle.
#[derive(Debug, Error)]
pub enum RenderError {
    // ── fatal initialization errors ──────────────────────────────────────

    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link:\n{log}")]
    ProgramLink { log: String },

    #[error("required GPU capability unavailable: {0}")]
    MissingFeature(String),

    #[error("failed to allocate {label} ({size} bytes):\n{log}")]
    BufferAllocation { label: String, size: u64, log: String },

    // ── lifecycle state machine ──────────────────────────────────────────

    #[error("{0} has no resources yet; initialize_context must run first")]
    NotInitialized(ContextId),

    #[error("{0} is already initialized")]
    AlreadyInitialized(ContextId),

    #[error("{0} failed to initialize and cannot be initialized again")]
    InitializationFailed(ContextId),

    #[error("{0} is being initialized by another caller")]
    InitializationPending(ContextId),

    #[error("{0} was released")]
    Released(ContextId),

    #[error("scene state is not initialized")]
    SceneNotInitialized,

    // ── invariants ───────────────────────────────────────────────────────

    #[error("invariant violated: {0}")]
    InvariantViolation(#[from] SceneError),

    #[error("write of {len} bytes at offset {offset} overflows {label} ({size} bytes)")]
    BufferOverflow {
        label: String,
        offset: u64,
        len: u64,
        size: u64,
    },
}

impl RenderError {
    /// Errors after which the process cannot render and must terminate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RenderError::ShaderCompile { .. }
                | RenderError::ProgramLink { .. }
                | RenderError::MissingFeature(_)
                | RenderError::BufferAllocation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pipeline_errors_are_fatal() {
        let compile = RenderError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "error: expected ';'".into(),
        };
        assert!(compile.is_fatal());
        assert!(RenderError::MissingFeature("vertex buffers".into()).is_fatal());
        let oom = RenderError::BufferAllocation {
            label: "vrcube vertices".into(),
            size: 864,
            log: "exceeds max_buffer_size".into(),
        };
        assert!(oom.is_fatal());
        assert!(!RenderError::InitializationFailed(ContextId(1)).is_fatal());
        assert!(!RenderError::NotInitialized(ContextId(3)).is_fatal());
        assert!(!RenderError::from(SceneError::EmptyGeometry).is_fatal());
    }

    #[test]
    fn compile_error_keeps_driver_log() {
        let err = RenderError::ShaderCompile {
            stage: ShaderStage::Vertex,
            log: "line 4: unknown identifier `pos`".into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("vertex shader failed to compile"));
        assert!(text.contains("unknown identifier `pos`"));
    }
}
