//! Per-kind verification loop.
//!
//! Matrices are checked smallest first and the loop stops at the first
//! failing case, so the reported failure is the smallest reproducible one and
//! no further driver processes are spawned for that kind.

use std::fmt;
use std::time::Duration;

use rand::Rng;

use crate::compare::{compare, Comparison, Tolerances};
use crate::driver::{DeterminantDriver, DriverError, ProcessDiagnostic};
use crate::error::{HarnessError, HarnessResult};
use crate::generator::{generate, GeneratorConfig};
use crate::kind::NumericKind;
use crate::matrix::TestCase;
use crate::oracle::{self, Determinant};

/// Why a case failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The reply parsed but disagrees with the reference.
    Mismatch,
    /// The reply is not a number of the expected shape.
    Unparseable,
    /// The driver broke the reply framing.
    Protocol(String),
    /// The driver was killed after the timeout.
    Timeout(Duration),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Mismatch => f.write_str("determinant mismatch"),
            FailureReason::Unparseable => f.write_str("unparseable determinant"),
            FailureReason::Protocol(message) => write!(f, "protocol error: {message}"),
            FailureReason::Timeout(timeout) => write!(f, "driver timed out after {timeout:?}"),
        }
    }
}

/// A failing case, with everything needed to reproduce it.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// The full input matrix.
    pub case: TestCase,
    /// Reference determinant.
    pub expected: Determinant,
    /// Reply line, if the driver produced one.
    pub actual: Option<String>,
    /// Failure classification.
    pub reason: FailureReason,
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The driver agreed with the reference.
    Pass {
        expected: Determinant,
        actual: String,
    },
    /// The driver disagreed or misbehaved.
    Fail(Box<Failure>),
}

/// Result of verifying one generated matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Element kind.
    pub kind: NumericKind,
    /// Matrix dimension.
    pub dimension: usize,
    /// Pass or fail.
    pub outcome: Outcome,
    /// Non-zero driver exit observed after a reply.
    pub diagnostic: Option<ProcessDiagnostic>,
}

impl VerificationResult {
    /// True when the case passed.
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Pass { .. })
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match &self.outcome {
            Outcome::Pass { .. } => None,
            Outcome::Fail(failure) => Some(failure),
        }
    }
}

/// Results of one kind's run, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct KindReport {
    /// Element kind.
    pub kind: NumericKind,
    /// One result per exchanged matrix; a failure is always last.
    pub results: Vec<VerificationResult>,
}

impl KindReport {
    /// True when every generated case passed.
    pub fn passed(&self) -> bool {
        self.results.iter().all(VerificationResult::passed)
    }

    /// The first (and only) failure.
    pub fn failure(&self) -> Option<&Failure> {
        self.results.iter().find_map(VerificationResult::failure)
    }
}

/// Checks driver replies against the reference oracle.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    tolerances: Tolerances,
}

impl Verifier {
    /// Creates a verifier with the given floating tolerances.
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    /// Tolerances in use.
    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Verifies a single case.
    ///
    /// Launch failures are returned as errors; every other driver problem
    /// becomes a failing result.
    pub fn verify_case<D: DeterminantDriver + ?Sized>(
        &self,
        case: TestCase,
        driver: &mut D,
    ) -> HarnessResult<VerificationResult> {
        let kind = case.kind();
        let dimension = case.dimension();
        let expected = oracle::determinant(&case);

        let (reply, reason) = match driver.exchange(&case) {
            Ok(reply) => {
                let reason = match compare(kind, &expected, &reply.determinant, &self.tolerances) {
                    Comparison::Match => None,
                    Comparison::Mismatch => Some(FailureReason::Mismatch),
                    Comparison::Unparseable => Some(FailureReason::Unparseable),
                };
                (Some(reply), reason)
            }
            Err(e) => match HarnessError::try_from(e) {
                Ok(fatal) => return Err(fatal),
                Err(DriverError::Timeout { timeout, .. }) => {
                    (None, Some(FailureReason::Timeout(timeout)))
                }
                Err(e) => {
                    let message = match &e {
                        DriverError::Protocol { stderr, .. } if !stderr.trim().is_empty() => {
                            format!("{e} (stderr: {})", stderr.trim())
                        }
                        _ => e.to_string(),
                    };
                    (None, Some(FailureReason::Protocol(message)))
                }
            },
        };

        let diagnostic = reply.as_ref().and_then(|r| r.diagnostic.clone());
        let outcome = match reason {
            None => Outcome::Pass {
                expected,
                actual: reply.map(|r| r.determinant).unwrap_or_default(),
            },
            Some(reason) => Outcome::Fail(Box::new(Failure {
                case,
                expected,
                actual: reply.map(|r| r.determinant),
                reason,
            })),
        };

        Ok(VerificationResult {
            kind,
            dimension,
            outcome,
            diagnostic,
        })
    }

    /// Generates the matrices for `config` and verifies them in ascending size,
    /// stopping at the first failure.
    pub fn run_for_kind<D, R>(
        &self,
        config: &GeneratorConfig,
        driver: &mut D,
        rng: &mut R,
        mut on_case: impl FnMut(&VerificationResult),
    ) -> HarnessResult<KindReport>
    where
        D: DeterminantDriver + ?Sized,
        R: Rng + ?Sized,
    {
        let mut results = Vec::new();
        for case in generate(config, rng) {
            let result = self.verify_case(case, driver)?;
            on_case(&result);
            let passed = result.passed();
            results.push(result);
            if !passed {
                break;
            }
        }
        Ok(KindReport {
            kind: config.kind,
            results,
        })
    }
}
