//! vrcube application: a lit, animated cube for clustered displays.
//!
//! The crate is split along the two halves of the render lifecycle:
//!
//! - [`scene`]: the single authoritative [`SceneState`], advanced once per
//!   frame on the coordinating thread as a pure function of simulation time.
//! - [`registry`]: the [`ContextResourceRegistry`], which lazily creates one
//!   independent set of GPU resources per rendering context and releases them
//!   all at shutdown.
//!
//! [`CubeApp`] wires both into the `vrcube-engine` runtime.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use vrcube_app::prelude::*;
//!
//! let app = CubeApp::new(AppConfig::default());
//! Runtime::run(RuntimeConfig::default(), GpuInit::default(), app)?;
//! ```
//!
//! GPU access goes through the [`GpuBackend`] trait; [`WgpuBackend`] is the
//! production implementation.

pub mod app;
pub mod config;
pub mod error;
pub mod gpu;
pub mod registry;
pub mod scene;

pub use app::CubeApp;
pub use config::{AppConfig, ColorScheme, LightOrbit, RenderMode, SceneConfig};
pub use error::{RenderError, SceneError};
pub use gpu::{GpuBackend, WgpuBackend};
pub use registry::{ContextResourceRegistry, SlotState};
pub use scene::{CubeGeometry, Geometry, GeometrySource, MeshGeometry, SceneState};

/// Everything a host binary needs to run the cube.
pub mod prelude {
    pub use crate::app::CubeApp;
    pub use crate::config::{AppConfig, ColorScheme, LightOrbit, RenderMode, SceneConfig};

    pub use vrcube_engine::device::GpuInit;
    pub use vrcube_engine::logging::{init_logging, LoggingConfig};
    pub use vrcube_engine::window::{Runtime, RuntimeConfig};
}
