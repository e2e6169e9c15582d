//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s, tags them with
//! the context they arrived on and hands them to the application's update step.

pub(crate) mod platform;
mod state;
mod types;

pub use state::InputState;
pub use types::{
    ButtonState,
    InputEvent,
    Key,
    Modifiers,
    MouseButton,
    MouseWheelDelta,
};
