//! GPU device + surface management.
//!
//! Every window owns an independent `Gpu`: its own Instance/Adapter/Device/Queue,
//! surface and depth buffer. Resources created from one `Gpu` are never used
//! with another.
//!
//! This module is responsible for:
//! - creating the wgpu objects for one window
//! - configuring the surface and the matching depth target
//! - acquiring, submitting and presenting frames
//! - collecting driver errors that wgpu reports outside of error scopes

mod context;
mod depth;
mod diagnostics;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use depth::DepthTarget;
pub use diagnostics::DriverErrorLog;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
