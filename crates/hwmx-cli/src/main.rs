//! hwmx CLI - matrix generation and determinant driver verification
//!
//! This binary generates random test matrices and checks the installed
//! determinant drivers against reference values.

use clap::{Parser, Subcommand};
use hwmx_harness::NumericKind;
use std::path::PathBuf;
use std::process::ExitCode;

use hwmx_cli::commands;

/// hwmx - determinant driver test harness
#[derive(Parser)]
#[command(name = "hwmx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print random matrices with their reference determinants
    Testgen {
        /// Generate sizes 2**0 up to 2**(MAX-1) (default: 8)
        #[arg(short, long, allow_negative_numbers = true)]
        max: Option<i64>,

        /// Element type (int, float, double)
        #[arg(short = 't', long = "type", default_value = "int")]
        kind: NumericKind,

        /// Emit a single matrix of size 2**MAX
        #[arg(long)]
        only_max: bool,

        /// RNG seed (default: current time in seconds)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Verify the installed drivers against reference determinants
    Run {
        /// Install root containing bin/<kind>_driver (default: $HWMX_INSTALL_ROOT or <git root>/install)
        #[arg(short, long)]
        install_root: Option<PathBuf>,

        /// Test sizes 2**0 up to 2**(MAX-1) (default: 8)
        #[arg(short, long, allow_negative_numbers = true)]
        max: Option<i64>,

        /// Test a single matrix of size 2**MAX
        #[arg(long)]
        only_max: bool,

        /// Restrict to these element types (repeatable; default: all)
        #[arg(short = 't', long = "type")]
        kinds: Vec<NumericKind>,

        /// RNG seed (default: current time in seconds)
        #[arg(long)]
        seed: Option<u64>,

        /// Per-exchange driver timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Path to tolerances config file (JSON)
        #[arg(long)]
        tolerances: Option<PathBuf>,

        /// Print every passing size
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Testgen {
            max,
            kind,
            only_max,
            seed,
        } => commands::testgen::run(max, kind, only_max, seed),
        Commands::Run {
            install_root,
            max,
            only_max,
            kinds,
            seed,
            timeout_secs,
            tolerances,
            verbose,
        } => commands::run::run(commands::run::RunArgs {
            install_root: install_root.as_deref(),
            max,
            only_max,
            kinds,
            seed,
            timeout_secs,
            tolerances: tolerances.as_deref(),
            verbose,
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
