//! Suite runner across numeric kinds.
//!
//! Kinds run in the fixed order int, float, double. The run stops after the
//! first kind that fails; later kinds are not attempted.

use crate::compare::Tolerances;
use crate::driver::{DriverConfig, ProcessDriver};
use crate::error::{HarnessError, HarnessResult};
use crate::generator::{GeneratorConfig, DEFAULT_MAX_EXPONENT};
use crate::kind::NumericKind;
use crate::layout::DriverPaths;
use crate::rng::create_kind_rng;
use crate::verifier::{Failure, KindReport, VerificationResult, Verifier};

/// Options for a full run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Exponent bound passed to the generator.
    pub max_exponent: u32,
    /// Test only the `2^max_exponent` matrix.
    pub only_max: bool,
    /// Base seed; each kind derives its own stream from it.
    pub seed: u64,
    /// Kinds to test. Always run in int, float, double order.
    pub kinds: Vec<NumericKind>,
    /// Driver exchange settings.
    pub driver: DriverConfig,
    /// Floating comparison tolerances.
    pub tolerances: Tolerances,
}

impl RunOptions {
    /// Default options with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            max_exponent: DEFAULT_MAX_EXPONENT,
            only_max: false,
            seed,
            kinds: NumericKind::ALL.to_vec(),
            driver: DriverConfig::default(),
            tolerances: Tolerances::default(),
        }
    }

    /// Sets the exponent bound, rejecting negative or oversized values.
    pub fn max_exponent(mut self, max_exponent: i64) -> HarnessResult<Self> {
        self.max_exponent = GeneratorConfig::new(NumericKind::Int)
            .with_max(max_exponent)?
            .max_exponent;
        Ok(self)
    }

    /// Sets only-max mode.
    pub fn only_max(mut self, only_max: bool) -> Self {
        self.only_max = only_max;
        self
    }

    /// Restricts the kinds under test.
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = NumericKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Sets the driver exchange settings.
    pub fn driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Sets the floating tolerances.
    pub fn tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    fn generator(&self, kind: NumericKind) -> GeneratorConfig {
        GeneratorConfig {
            kind,
            max_exponent: self.max_exponent,
            only_max: self.only_max,
        }
    }

    fn ordered_kinds(&self) -> Vec<NumericKind> {
        let mut kinds = self.kinds.clone();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}

/// Aggregate result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Base seed, for reproduction.
    pub seed: u64,
    /// One report per attempted kind, in run order.
    pub kinds: Vec<KindReport>,
}

impl RunReport {
    /// True when every attempted kind passed every case.
    pub fn passed(&self) -> bool {
        self.kinds.iter().all(KindReport::passed)
    }

    /// The failing kind and its failure.
    pub fn failure(&self) -> Option<(NumericKind, &Failure)> {
        self.kinds
            .iter()
            .find_map(|report| report.failure().map(|f| (report.kind, f)))
    }
}

/// Runs the verifier for each kind against its driver.
#[derive(Debug, Clone)]
pub struct TestRunner {
    options: RunOptions,
    verifier: Verifier,
}

impl TestRunner {
    /// Creates a runner.
    pub fn new(options: RunOptions) -> Self {
        let verifier = Verifier::new(options.tolerances);
        Self { options, verifier }
    }

    /// Options in use.
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs every configured kind.
    pub fn run_all(&self, drivers: &DriverPaths) -> HarnessResult<RunReport> {
        self.run_all_with_progress(drivers, |_| {})
    }

    /// Runs every configured kind, reporting each case as it completes.
    ///
    /// Missing or unlaunchable drivers abort the run with an error.
    pub fn run_all_with_progress(
        &self,
        drivers: &DriverPaths,
        mut on_case: impl FnMut(&VerificationResult),
    ) -> HarnessResult<RunReport> {
        let mut kinds = Vec::new();
        for kind in self.options.ordered_kinds() {
            let path = drivers
                .get(kind)
                .ok_or_else(|| HarnessError::DriverNotFound {
                    path: kind.driver_name().into(),
                })?;
            let mut driver = ProcessDriver::resolve(path, self.options.driver.clone())?;
            let mut rng = create_kind_rng(self.options.seed, kind);

            let report = self.verifier.run_for_kind(
                &self.options.generator(kind),
                &mut driver,
                &mut rng,
                &mut on_case,
            )?;
            let passed = report.passed();
            kinds.push(report);
            if !passed {
                break;
            }
        }
        Ok(RunReport {
            seed: self.options.seed,
            kinds,
        })
    }
}
