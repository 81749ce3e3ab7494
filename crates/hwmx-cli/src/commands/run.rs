//! Run command implementation
//!
//! Verifies the installed drivers for each numeric kind and exits non-zero
//! on the first failing case.

use anyhow::{Context, Result};
use colored::Colorize;
use hwmx_harness::rng::seed_from_clock;
use hwmx_harness::{DriverConfig, InstallLayout, NumericKind, RunOptions, TestRunner, Tolerances};
use std::path::Path;
use std::process::ExitCode;

use super::reporting::{print_case, print_failure};

/// Arguments for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunArgs<'a> {
    pub install_root: Option<&'a Path>,
    pub max: Option<i64>,
    pub only_max: bool,
    pub kinds: Vec<NumericKind>,
    pub seed: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub tolerances: Option<&'a Path>,
    pub verbose: bool,
}

/// Run the verification suite
///
/// # Returns
/// Exit code: 0 if every kind passes, 1 on the first failure
pub fn run(args: RunArgs<'_>) -> Result<ExitCode> {
    let seed = args.seed.unwrap_or_else(seed_from_clock);
    let mut options = RunOptions::new(seed).only_max(args.only_max);
    if let Some(max) = args.max {
        options = options.max_exponent(max).context("Bad usage")?;
    }
    if !args.kinds.is_empty() {
        options = options.kinds(args.kinds.iter().copied());
    }
    if let Some(secs) = args.timeout_secs {
        options = options.driver(DriverConfig::default().timeout_secs(secs));
    }
    if let Some(path) = args.tolerances {
        let tolerances = Tolerances::from_file(path)
            .with_context(|| format!("Failed to load tolerances from {}", path.display()))?;
        options = options.tolerances(tolerances);
    }

    let layout = InstallLayout::discover(args.install_root);

    println!("{}", "hwmx driver tests".cyan().bold());
    println!("{}", "=================".cyan());
    println!("  {} {}", "install root:".dimmed(), layout.root().display());
    println!("  {} {}", "seed:".dimmed(), seed);
    println!();

    let runner = TestRunner::new(options);
    let report = runner
        .run_all_with_progress(&layout.driver_paths(), |result| {
            print_case(result, args.verbose)
        })
        .context("Driver run aborted")?;

    for kind_report in &report.kinds {
        if kind_report.passed() {
            println!(
                "{} {} ({} sizes)",
                "ok".green(),
                kind_report.kind,
                kind_report.results.len()
            );
        }
    }

    match report.failure() {
        None => {
            println!();
            println!("{} All drivers passed!", "SUCCESS".green().bold());
            Ok(ExitCode::SUCCESS)
        }
        Some((kind, failure)) => {
            print_failure(kind, failure, report.seed);
            Ok(ExitCode::from(1))
        }
    }
}
