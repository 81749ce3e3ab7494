//! Random test matrix generation.
//!
//! Sizes double from `2^0` up to `2^(max_exponent - 1)` so the first failing
//! case is also the smallest one. Only-max mode emits a single `2^max_exponent`
//! matrix instead.

use std::ops::Range;

use rand::Rng;

use crate::error::{HarnessError, HarnessResult};
use crate::kind::NumericKind;
use crate::matrix::{Matrix, TestCase};

/// Default exponent bound: sizes 1 through 128.
pub const DEFAULT_MAX_EXPONENT: u32 = 8;

/// Largest accepted exponent: sizes up to 512.
///
/// Beyond 128 the exact integer oracle grows roughly with the fourth power
/// of the size; a single 512x512 int matrix takes tens of seconds.
pub const MAX_EXPONENT_LIMIT: u32 = 9;

/// Range of integer elements.
pub const INT_RANGE: Range<i64> = -10..10;

/// Generation parameters for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Element kind.
    pub kind: NumericKind,
    /// Exponent bound, see module docs.
    pub max_exponent: u32,
    /// Emit only the `2^max_exponent` matrix.
    pub only_max: bool,
}

impl GeneratorConfig {
    /// Creates a config with the default exponent bound.
    pub fn new(kind: NumericKind) -> Self {
        Self {
            kind,
            max_exponent: DEFAULT_MAX_EXPONENT,
            only_max: false,
        }
    }

    /// Validates a user-supplied exponent.
    pub fn with_max(mut self, max_exponent: i64) -> HarnessResult<Self> {
        if max_exponent < 0 {
            return Err(HarnessError::invalid_argument(
                "max matrix size expected to be not negative",
            ));
        }
        if max_exponent > i64::from(MAX_EXPONENT_LIMIT) {
            return Err(HarnessError::invalid_argument(format!(
                "max matrix size exponent {max_exponent} exceeds limit {MAX_EXPONENT_LIMIT}"
            )));
        }
        self.max_exponent = max_exponent as u32;
        Ok(self)
    }

    /// Sets only-max mode.
    pub fn only_max(mut self, only_max: bool) -> Self {
        self.only_max = only_max;
        self
    }

    /// Matrix dimensions this config produces, in emission order.
    pub fn dimensions(&self) -> Vec<usize> {
        if self.only_max {
            vec![1usize << self.max_exponent]
        } else {
            (0..self.max_exponent).map(|i| 1usize << i).collect()
        }
    }
}

/// Generates the test matrices for `config`, smallest first.
pub fn generate<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Vec<TestCase> {
    config
        .dimensions()
        .into_iter()
        .map(|dim| generate_one(config.kind, dim, rng))
        .collect()
}

/// Generates a single matrix of the given kind and dimension.
///
/// # Panics
///
/// Panics if `dimension` is zero.
pub fn generate_one<R: Rng + ?Sized>(kind: NumericKind, dimension: usize, rng: &mut R) -> TestCase {
    assert!(dimension > 0, "matrix dimension must be positive");
    let count = dimension * dimension;
    match kind {
        NumericKind::Int => TestCase::Int(square(
            dimension,
            (0..count).map(|_| rng.gen_range(INT_RANGE)).collect(),
        )),
        NumericKind::Float => TestCase::Float(square(
            dimension,
            (0..count).map(|_| rng.gen::<f32>()).collect(),
        )),
        NumericKind::Double => TestCase::Double(square(
            dimension,
            (0..count).map(|_| rng.gen::<f64>()).collect(),
        )),
    }
}

fn square<T>(dimension: usize, elements: Vec<T>) -> Matrix<T> {
    match Matrix::from_flat(dimension, elements) {
        Ok(m) => m,
        Err(e) => unreachable!("generator produced a malformed matrix: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_progression_dimensions() {
        let config = GeneratorConfig::new(NumericKind::Int).with_max(4).unwrap();
        assert_eq!(config.dimensions(), vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_only_max_dimensions() {
        let config = GeneratorConfig::new(NumericKind::Double)
            .with_max(3)
            .unwrap()
            .only_max(true);
        assert_eq!(config.dimensions(), vec![8]);

        let config = GeneratorConfig::new(NumericKind::Double)
            .with_max(0)
            .unwrap()
            .only_max(true);
        assert_eq!(config.dimensions(), vec![1]);
    }

    #[test]
    fn test_zero_exponent_progression_is_empty() {
        let config = GeneratorConfig::new(NumericKind::Int).with_max(0).unwrap();
        assert!(generate(&config, &mut create_rng(1)).is_empty());
    }

    #[test]
    fn test_negative_exponent_is_rejected() {
        let err = GeneratorConfig::new(NumericKind::Int).with_max(-1).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidArgument { .. }));
    }

    #[test]
    fn test_exponent_limit() {
        assert!(GeneratorConfig::new(NumericKind::Int)
            .with_max(i64::from(MAX_EXPONENT_LIMIT))
            .is_ok());
        assert!(GeneratorConfig::new(NumericKind::Int)
            .with_max(i64::from(MAX_EXPONENT_LIMIT) + 1)
            .is_err());
        // 1024x1024 int matrices are out of reach for the exact oracle.
        assert!(GeneratorConfig::new(NumericKind::Int).with_max(10).is_err());
    }

    #[test]
    fn test_same_seed_same_matrices() {
        let config = GeneratorConfig::new(NumericKind::Float).with_max(3).unwrap();
        let a = generate(&config, &mut create_rng(99));
        let b = generate(&config, &mut create_rng(99));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn generated_matrices_are_square_and_ordered(seed in any::<u64>(), max in 0i64..6) {
            for kind in NumericKind::ALL {
                let config = GeneratorConfig::new(kind).with_max(max).unwrap();
                let cases = generate(&config, &mut create_rng(seed));
                prop_assert_eq!(cases.len(), max as usize);
                for (i, case) in cases.iter().enumerate() {
                    prop_assert_eq!(case.kind(), kind);
                    prop_assert_eq!(case.dimension(), 1usize << i);
                    prop_assert_eq!(
                        case.element_tokens().len(),
                        case.dimension() * case.dimension()
                    );
                }
            }
        }

        #[test]
        fn only_max_emits_single_largest(seed in any::<u64>(), max in 0i64..6) {
            let config = GeneratorConfig::new(NumericKind::Int)
                .with_max(max)
                .unwrap()
                .only_max(true);
            let cases = generate(&config, &mut create_rng(seed));
            prop_assert_eq!(cases.len(), 1);
            prop_assert_eq!(cases[0].dimension(), 1usize << max);
        }

        #[test]
        fn elements_stay_in_range(seed in any::<u64>()) {
            let mut rng = create_rng(seed);
            if let TestCase::Int(m) = generate_one(NumericKind::Int, 8, &mut rng) {
                prop_assert!(m.elements().iter().all(|e| INT_RANGE.contains(e)));
            } else {
                prop_assert!(false, "expected integer matrix");
            }
            if let TestCase::Float(m) = generate_one(NumericKind::Float, 8, &mut rng) {
                prop_assert!(m.elements().iter().all(|e| (0.0..1.0).contains(e)));
            } else {
                prop_assert!(false, "expected float matrix");
            }
            if let TestCase::Double(m) = generate_one(NumericKind::Double, 8, &mut rng) {
                prop_assert!(m.elements().iter().all(|e| (0.0..1.0).contains(e)));
            } else {
                prop_assert!(false, "expected double matrix");
            }
        }
    }
}
