use colored::Colorize;
use hwmx_harness::{Failure, FailureReason, NumericKind, VerificationResult};

/// Print one completed case. Passing cases are only shown when verbose.
pub(crate) fn print_case(result: &VerificationResult, verbose: bool) {
    if verbose && result.passed() {
        println!(
            "  {} Success for size {} {}",
            "ok".green(),
            result.dimension,
            result.kind
        );
    }
    if let Some(diagnostic) = &result.diagnostic {
        println!(
            "  {} {} driver, size {}: {}",
            "!!".yellow(),
            result.kind,
            result.dimension,
            diagnostic
        );
    }
}

/// Render a failure with the full matrix so it can be reproduced by hand.
pub(crate) fn format_failure(kind: NumericKind, failure: &Failure) -> String {
    let mut text = format!(
        "Test failed: for {} matrix with size {}\n",
        kind,
        failure.case.dimension()
    );
    text.push_str(&failure.case.to_string());
    let actual = failure.actual.as_deref().unwrap_or("<no reply>");
    text.push_str(&format!(
        "Expected det == {}, got det == {}",
        failure.expected, actual
    ));
    if failure.reason != FailureReason::Mismatch {
        text.push_str(&format!(" ({})", failure.reason));
    }
    text
}

pub(crate) fn print_failure(kind: NumericKind, failure: &Failure, seed: u64) {
    println!();
    println!("{}", format_failure(kind, failure).red());
    println!(
        "{}",
        format!("Reproduce with: hwmx run --seed {seed} --type {kind}").dimmed()
    );
}
