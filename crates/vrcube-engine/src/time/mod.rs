//! Time subsystem.
//!
//! The runtime owns one `SimulationClock` for the whole session. Its output is
//! the single time source handed to the application's update step, so every
//! window animates from the same value.

mod simulation_clock;

pub use simulation_clock::{SimTime, SimulationClock};
