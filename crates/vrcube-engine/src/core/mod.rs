//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (event loop
//! plus render threads) and the application plugged into it. The runtime calls
//! the application in a fixed order:
//!
//! 1. [`App::initialize`] once, before any window exists
//! 2. [`App::initialize_context`] once per context, on that context's thread
//! 3. per frame: [`App::update`] on the coordinating thread, then
//!    [`App::draw_context`] on every context thread
//! 4. [`App::release_all`] once, after every render thread has stopped

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{ContextCtx, ContextEvent, ContextId, DrawCtx, FrameInput, RenderTarget};
