//! Numeric element kinds supported by the drivers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Suffix appended to a kind token to form its driver executable name.
pub const DRIVER_SUFFIX: &str = "_driver";

/// Element type of a generated matrix.
///
/// The kind selects the element distribution during generation, the driver
/// executable, and the comparison policy during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    /// Signed integers in `[-10, 10)`.
    Int,
    /// Single precision floats in `[0, 1)`.
    Float,
    /// Double precision floats in `[0, 1)`.
    Double,
}

impl NumericKind {
    /// All kinds in the order the runner tests them.
    pub const ALL: [NumericKind; 3] = [NumericKind::Int, NumericKind::Float, NumericKind::Double];

    /// Returns the token used on the command line and in driver names.
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericKind::Int => "int",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
        }
    }

    /// Returns the executable name of the driver for this kind, e.g. `int_driver`.
    pub fn driver_name(&self) -> String {
        format!(
            "{}{}{}",
            self.as_str(),
            DRIVER_SUFFIX,
            std::env::consts::EXE_SUFFIX
        )
    }

    /// Whether determinants of this kind are compared exactly.
    pub fn is_exact(&self) -> bool {
        matches!(self, NumericKind::Int)
    }

    /// Stable per-kind index, used for seed derivation.
    pub(crate) fn index(&self) -> u32 {
        match self {
            NumericKind::Int => 0,
            NumericKind::Float => 1,
            NumericKind::Double => 2,
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(NumericKind::Int),
            "float" => Ok(NumericKind::Float),
            "double" => Ok(NumericKind::Double),
            _ => Err(HarnessError::UnknownKind {
                token: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_token() {
        for kind in NumericKind::ALL {
            assert_eq!(kind.as_str().parse::<NumericKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "long double".parse::<NumericKind>().unwrap_err();
        assert!(matches!(err, HarnessError::UnknownKind { .. }));
    }

    #[test]
    fn test_driver_name() {
        let name = NumericKind::Float.driver_name();
        assert!(name.starts_with("float_driver"));
    }

    #[test]
    fn test_order_is_int_float_double() {
        assert_eq!(
            NumericKind::ALL,
            [NumericKind::Int, NumericKind::Float, NumericKind::Double]
        );
        assert!(NumericKind::Int.is_exact());
        assert!(!NumericKind::Double.is_exact());
    }
}
