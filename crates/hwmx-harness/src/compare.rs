//! Kind-aware determinant comparison.
//!
//! Integer determinants must match exactly. Floating determinants match when
//! `|actual - expected| <= atol + rtol * max(|actual|, |expected|)`.
//!
//! | Kind   | rtol | atol |
//! |--------|------|------|
//! | float  | 1e-3 | 1e-6 |
//! | double | 1e-5 | 1e-9 |
//!
//! Double replies printed with six significant digits still match.
//!
//! A float driver overflows to infinity when the true determinant exceeds the
//! single precision range; a same-signed infinity then counts as a match.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};
use crate::exact::ExactInt;
use crate::kind::NumericKind;
use crate::oracle::Determinant;

/// Relative and absolute tolerance for one floating kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance, dominant near zero.
    pub atol: f64,
}

impl Tolerance {
    /// Creates a tolerance.
    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Whether `actual` is within tolerance of `expected`.
    pub fn accepts(&self, expected: f64, actual: f64) -> bool {
        if expected.is_infinite() || actual.is_infinite() {
            return expected == actual;
        }
        let bound = self.atol + self.rtol * expected.abs().max(actual.abs());
        (actual - expected).abs() <= bound
    }
}

/// Tolerances for the floating kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Tolerance for the `float` kind.
    pub float: Tolerance,
    /// Tolerance for the `double` kind.
    pub double: Tolerance,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            float: Tolerance::new(1e-3, 1e-6),
            double: Tolerance::new(1e-5, 1e-9),
        }
    }
}

impl Tolerances {
    /// Parses tolerances from JSON; omitted kinds keep their defaults.
    pub fn from_json(json: &str) -> HarnessResult<Self> {
        let tolerances: Tolerances =
            serde_json::from_str(json).map_err(HarnessError::ToleranceConfig)?;
        tolerances.validate()?;
        Ok(tolerances)
    }

    /// Reads tolerances from a JSON file.
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Tolerance for a floating kind, `None` for exact kinds.
    pub fn for_kind(&self, kind: NumericKind) -> Option<Tolerance> {
        match kind {
            NumericKind::Int => None,
            NumericKind::Float => Some(self.float),
            NumericKind::Double => Some(self.double),
        }
    }

    fn validate(&self) -> HarnessResult<()> {
        for (name, tol) in [("float", self.float), ("double", self.double)] {
            if !(tol.rtol >= 0.0 && tol.atol >= 0.0) {
                return Err(HarnessError::invalid_argument(format!(
                    "{name} tolerance must be non-negative, got rtol={} atol={}",
                    tol.rtol, tol.atol
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of comparing one reply against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Values agree under the kind's policy.
    Match,
    /// Values disagree.
    Mismatch,
    /// The reply is not a number of the expected shape.
    Unparseable,
}

/// Compares the driver's textual reply with the reference determinant.
pub fn compare(
    kind: NumericKind,
    expected: &Determinant,
    actual: &str,
    tolerances: &Tolerances,
) -> Comparison {
    let actual = actual.trim();
    match (tolerances.for_kind(kind), expected) {
        (None, Determinant::Exact(expected)) => match actual.parse::<ExactInt>() {
            Ok(value) if value == *expected => Comparison::Match,
            Ok(_) => Comparison::Mismatch,
            Err(_) => Comparison::Unparseable,
        },
        (tolerance, expected) => {
            let tolerance = tolerance.unwrap_or(Tolerance::new(0.0, 0.0));
            let expected = expected.as_f64();
            match actual.parse::<f64>() {
                Ok(value) if tolerance.accepts(expected, value) => Comparison::Match,
                Ok(value) if kind == NumericKind::Float && overflows_single(expected, value) => {
                    Comparison::Match
                }
                Ok(_) => Comparison::Mismatch,
                Err(_) => Comparison::Unparseable,
            }
        }
    }
}

/// `actual` is the infinity single precision arithmetic yields for `expected`.
fn overflows_single(expected: f64, actual: f64) -> bool {
    actual.is_infinite()
        && expected.abs() > f64::from(f32::MAX)
        && actual.is_sign_negative() == expected.is_sign_negative()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(kind: NumericKind, expected: Determinant, actual: &str) -> Comparison {
        compare(kind, &expected, actual, &Tolerances::default())
    }

    fn exact(v: i64) -> Determinant {
        Determinant::Exact(ExactInt::from(v))
    }

    #[test]
    fn test_integer_comparison_is_exact() {
        assert_eq!(check(NumericKind::Int, exact(5), "5"), Comparison::Match);
        assert_eq!(check(NumericKind::Int, exact(5), "6"), Comparison::Mismatch);
        assert_eq!(check(NumericKind::Int, exact(-2), " -2 "), Comparison::Match);
        assert_eq!(
            check(NumericKind::Int, exact(5), "5.0"),
            Comparison::Unparseable
        );
        assert_eq!(check(NumericKind::Int, exact(5), ""), Comparison::Unparseable);
    }

    #[test]
    fn test_integer_comparison_beyond_i128() {
        let big = "-123456789012345678901234567890123456789012345";
        let expected = Determinant::Exact(big.parse().unwrap());
        assert_eq!(check(NumericKind::Int, expected.clone(), big), Comparison::Match);
        assert_eq!(
            check(NumericKind::Int, expected, "-123456789012345678901234567890123456789012346"),
            Comparison::Mismatch
        );
    }

    #[test]
    fn test_floating_comparison_uses_tolerance() {
        for kind in [NumericKind::Float, NumericKind::Double] {
            assert_eq!(
                check(kind, Determinant::Approx(0.1 + 0.2), "0.30000000001"),
                Comparison::Match
            );
            assert_eq!(check(kind, Determinant::Approx(1.0), "2.0"), Comparison::Mismatch);
            assert_eq!(check(kind, Determinant::Approx(1.0), "nan"), Comparison::Mismatch);
            assert_eq!(check(kind, Determinant::Approx(1.0), "one"), Comparison::Unparseable);
        }
    }

    #[test]
    fn test_six_significant_digits_pass_for_double() {
        let expected = Determinant::Approx(-12.3456789);
        assert_eq!(check(NumericKind::Double, expected.clone(), "-12.3457"), Comparison::Match);
        assert_eq!(check(NumericKind::Double, expected, "-12.35"), Comparison::Mismatch);
    }

    #[test]
    fn test_absolute_tolerance_near_zero() {
        let expected = Determinant::Approx(1e-12);
        assert_eq!(check(NumericKind::Double, expected.clone(), "0"), Comparison::Match);
        assert_eq!(check(NumericKind::Double, expected, "1e-3"), Comparison::Mismatch);
    }

    #[test]
    fn test_infinities() {
        let tol = Tolerance::new(1e-3, 1e-6);
        assert!(tol.accepts(f64::INFINITY, f64::INFINITY));
        assert!(!tol.accepts(1e300, f64::INFINITY));
    }

    #[test]
    fn test_float_overflow_to_infinity() {
        let huge = Determinant::Approx(1e40);
        assert_eq!(check(NumericKind::Float, huge.clone(), "inf"), Comparison::Match);
        assert_eq!(check(NumericKind::Float, huge.clone(), "-inf"), Comparison::Mismatch);
        assert_eq!(check(NumericKind::Double, huge, "inf"), Comparison::Mismatch);
        assert_eq!(
            check(NumericKind::Float, Determinant::Approx(-1e40), "-inf"),
            Comparison::Match
        );
        assert_eq!(
            check(NumericKind::Float, Determinant::Approx(1.0), "inf"),
            Comparison::Mismatch
        );
        assert_eq!(
            check(NumericKind::Float, Determinant::Approx(3.0e38), "inf"),
            Comparison::Mismatch
        );
    }

    #[test]
    fn test_partial_tolerance_json() {
        let tolerances = Tolerances::from_json(r#"{"float": {"rtol": 0.01, "atol": 0.0}}"#).unwrap();
        assert_eq!(tolerances.float, Tolerance::new(0.01, 0.0));
        assert_eq!(tolerances.double, Tolerances::default().double);
    }

    #[test]
    fn test_invalid_tolerance_json() {
        assert!(matches!(
            Tolerances::from_json("{not json"),
            Err(HarnessError::ToleranceConfig(_))
        ));
        assert!(matches!(
            Tolerances::from_json(r#"{"double": {"rtol": -1.0, "atol": 0.0}}"#),
            Err(HarnessError::InvalidArgument { .. })
        ));
    }
}
