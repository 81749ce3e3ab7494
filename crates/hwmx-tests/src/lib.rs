//! hwmx End-to-End Test Infrastructure
//!
//! This crate provides stub drivers and fixtures for exercising the harness
//! against real subprocesses:
//!
//! - `stub_reference_driver` answers with the correct determinant
//! - `stub_zero_driver` always answers `0`
//! - `stub_silent_driver` reads the request and never answers
//! - `stub_sleepy_driver` never finishes
//! - `stub_failing_driver` answers correctly, then exits with status 3
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hwmx-tests
//! ```

pub mod fixtures;
pub mod stub;

pub use fixtures::StubInstall;
