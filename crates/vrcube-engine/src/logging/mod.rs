//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code logs through
//! the `log` facade only; binaries pick the `env_logger` backend through
//! [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig};
