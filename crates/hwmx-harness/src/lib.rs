//! hwmx verification harness
//!
//! Checks external determinant drivers against an independent reference.
//!
//! # Overview
//!
//! For each numeric kind (`int`, `float`, `double`) the harness:
//!
//! 1. Generates random square matrices of sizes `1, 2, 4, ...` from a seeded RNG
//! 2. Computes a reference determinant for each one
//! 3. Sends the matrix to the kind's driver executable and reads its reply
//! 4. Compares the two values, exactly for integers and within tolerance otherwise
//!
//! The first failing case stops the run and carries the full matrix, the
//! expected value and the driver's reply.
//!
//! # Driver protocol
//!
//! ```text
//! -> n
//! -> a[0][0]
//! -> a[0][1]
//!    ...
//! -> a[n-1][n-1]
//! <- det
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hwmx_harness::{InstallLayout, RunOptions, TestRunner};
//!
//! let layout = InstallLayout::discover(None);
//! let runner = TestRunner::new(RunOptions::new(42).max_exponent(4)?);
//! let report = runner.run_all(&layout.driver_paths())?;
//! assert!(report.passed());
//! ```
//!
//! # Crate Structure
//!
//! - [`generator`] - Random matrix generation
//! - [`oracle`] - Reference determinants
//! - [`exact`] - Unbounded integers for exact determinants
//! - [`protocol`] - Request/reply framing
//! - [`driver`] - Driver subprocess management
//! - [`compare`] - Kind-aware comparison and tolerances
//! - [`verifier`] - Per-kind verification loop
//! - [`runner`] - Multi-kind runner
//! - [`layout`] - Install tree and driver discovery
//! - [`error`] - Error types

pub mod compare;
pub mod driver;
pub mod error;
pub mod exact;
pub mod generator;
pub mod kind;
pub mod layout;
pub mod matrix;
pub mod oracle;
pub mod protocol;
pub mod rng;
pub mod runner;
pub mod verifier;

// Re-export main types at crate root
pub use compare::{compare, Comparison, Tolerance, Tolerances};
pub use driver::{
    exchange, DeterminantDriver, DriverConfig, DriverError, DriverReply, ProcessDiagnostic,
    ProcessDriver,
};
pub use error::{HarnessError, HarnessResult};
pub use exact::{ExactInt, ParseExactIntError};
pub use generator::{generate, GeneratorConfig};
pub use kind::NumericKind;
pub use layout::{DriverPaths, InstallLayout};
pub use matrix::{Matrix, TestCase};
pub use oracle::Determinant;
pub use protocol::ProtocolError;
pub use runner::{RunOptions, RunReport, TestRunner};
pub use verifier::{Failure, FailureReason, KindReport, Outcome, VerificationResult, Verifier};
