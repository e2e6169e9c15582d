//! vrcube engine crate.
//!
//! This crate owns the host side of a clustered display: windows, one GPU
//! context per window, per-context render threads, the frame fence that orders
//! the shared update before every draw, and the camera rigs that feed view and
//! projection matrices to the application.

pub mod camera;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod time;
pub mod window;
