//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the windows, runs the shared update step on
//! the event loop thread and drives one render thread per window through a
//! frame fence.

mod fence;
mod runtime;
mod worker;

pub use runtime::{Runtime, RuntimeConfig};
