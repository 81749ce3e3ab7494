//! CLI command implementations

pub mod run;
pub mod testgen;

mod reporting;
