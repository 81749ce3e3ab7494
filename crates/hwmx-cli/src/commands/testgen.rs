//! Testgen command implementation
//!
//! Prints generated matrices with their reference determinants, for feeding
//! a driver by hand.

use anyhow::{Context, Result};
use hwmx_harness::generator::{generate, GeneratorConfig};
use hwmx_harness::oracle;
use hwmx_harness::rng::{create_kind_rng, seed_from_clock};
use hwmx_harness::{NumericKind, TestCase};
use std::io::{self, Write};
use std::process::ExitCode;

/// Run the testgen command
///
/// For each matrix prints the column count, the rows with space separated
/// elements, then the reference determinant.
pub fn run(max: Option<i64>, kind: NumericKind, only_max: bool, seed: Option<u64>) -> Result<ExitCode> {
    let mut config = GeneratorConfig::new(kind).only_max(only_max);
    if let Some(max) = max {
        config = config.with_max(max).context("Bad usage")?;
    }
    let seed = seed.unwrap_or_else(seed_from_clock);
    let cases = generate(&config, &mut create_kind_rng(seed, kind));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_cases(&mut out, &cases)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

/// Writes each case followed by its reference determinant.
pub fn write_cases<W: Write>(out: &mut W, cases: &[TestCase]) -> Result<()> {
    for case in cases {
        let det = oracle::determinant(case);
        writeln!(out, "{}", case.dimension())?;
        write!(out, "{case}")?;
        writeln!(out, "{det}")?;
    }
    Ok(())
}
