//! hwmx CLI library.
//!
//! Command implementations for the `hwmx` binary: standalone matrix
//! generation and the driver verification suite.

pub mod commands;
