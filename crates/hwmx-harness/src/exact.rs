//! Signed integers of unbounded size for exact determinants.
//!
//! Only what the multi-modular oracle and reply parsing need is provided:
//! scaling and offsetting by a machine word, remainder by a machine word,
//! magnitude subtraction, and decimal conversion.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const LIMB_RADIX: f64 = 4_294_967_296.0;
const DECIMAL_CHUNK: u32 = 1_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 9;

/// An exact signed integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExactInt {
    negative: bool,
    /// Little-endian base 2^32 limbs without trailing zeros. Zero is empty.
    limbs: Vec<u32>,
}

/// Reply text that is not a plain decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid integer literal")]
pub struct ParseExactIntError;

impl ExactInt {
    /// Zero.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Nearest `f64`, infinite beyond the `f64` range.
    pub fn to_f64(&self) -> f64 {
        let magnitude = self
            .limbs
            .iter()
            .rev()
            .fold(0.0, |acc, &limb| acc * LIMB_RADIX + f64::from(limb));
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    pub(crate) fn from_parts(negative: bool, mut limbs: Vec<u32>) -> Self {
        trim(&mut limbs);
        Self {
            negative: negative && !limbs.is_empty(),
            limbs,
        }
    }

    pub(crate) fn into_limbs(self) -> Vec<u32> {
        self.limbs
    }
}

impl From<i64> for ExactInt {
    fn from(value: i64) -> Self {
        Self::from(i128::from(value))
    }
}

impl From<i128> for ExactInt {
    fn from(value: i128) -> Self {
        let mut magnitude = value.unsigned_abs();
        let mut limbs = Vec::with_capacity(4);
        while magnitude != 0 {
            limbs.push(magnitude as u32);
            magnitude >>= 32;
        }
        Self::from_parts(value < 0, limbs)
    }
}

impl fmt::Display for ExactInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut limbs = self.limbs.clone();
        let mut chunks = Vec::new();
        while !limbs.is_empty() {
            chunks.push(divrem_small(&mut limbs, DECIMAL_CHUNK));
        }
        if self.negative {
            f.write_str("-")?;
        }
        let mut chunks = chunks.into_iter().rev();
        if let Some(first) = chunks.next() {
            write!(f, "{first}")?;
        }
        for chunk in chunks {
            write!(f, "{chunk:0width$}", width = DECIMAL_CHUNK_DIGITS)?;
        }
        Ok(())
    }
}

impl FromStr for ExactInt {
    type Err = ParseExactIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseExactIntError);
        }

        let mut limbs = Vec::new();
        let head = digits.len() % DECIMAL_CHUNK_DIGITS;
        let mut rest = digits;
        if head != 0 {
            let (chunk, tail) = rest.split_at(head);
            push_decimal_chunk(&mut limbs, chunk);
            rest = tail;
        }
        while !rest.is_empty() {
            let (chunk, tail) = rest.split_at(DECIMAL_CHUNK_DIGITS);
            push_decimal_chunk(&mut limbs, chunk);
            rest = tail;
        }
        Ok(Self::from_parts(negative, limbs))
    }
}

fn push_decimal_chunk(limbs: &mut Vec<u32>, chunk: &str) {
    let scale = 10u32.pow(chunk.len() as u32);
    // All ASCII digits and at most nine of them, so this fits a u32.
    let value = chunk
        .bytes()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    mul_small(limbs, scale);
    add_small(limbs, value);
}

fn trim(limbs: &mut Vec<u32>) {
    while limbs.last() == Some(&0) {
        limbs.pop();
    }
}

pub(crate) fn mul_small(limbs: &mut Vec<u32>, factor: u32) {
    let mut carry = 0u64;
    for limb in limbs.iter_mut() {
        let value = u64::from(*limb) * u64::from(factor) + carry;
        *limb = value as u32;
        carry = value >> 32;
    }
    if carry != 0 {
        limbs.push(carry as u32);
    }
    trim(limbs);
}

pub(crate) fn add_small(limbs: &mut Vec<u32>, addend: u32) {
    let mut carry = u64::from(addend);
    for limb in limbs.iter_mut() {
        if carry == 0 {
            return;
        }
        let value = u64::from(*limb) + carry;
        *limb = value as u32;
        carry = value >> 32;
    }
    if carry != 0 {
        limbs.push(carry as u32);
    }
}

/// Divides in place and returns the remainder.
fn divrem_small(limbs: &mut Vec<u32>, divisor: u32) -> u32 {
    let divisor = u64::from(divisor);
    let mut rem = 0u64;
    for limb in limbs.iter_mut().rev() {
        let current = (rem << 32) | u64::from(*limb);
        *limb = (current / divisor) as u32;
        rem = current % divisor;
    }
    trim(limbs);
    rem as u32
}

pub(crate) fn cmp_magnitude(a: &[u32], b: &[u32]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

/// `a - b`, requires `a >= b`.
pub(crate) fn sub_magnitude(a: &[u32], b: &[u32]) -> Vec<u32> {
    debug_assert!(cmp_magnitude(a, b) != Ordering::Less);
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = 0i64;
    for (i, &x) in a.iter().enumerate() {
        let y = b.get(i).copied().unwrap_or(0);
        let mut value = i64::from(x) - i64::from(y) - borrow;
        borrow = 0;
        if value < 0 {
            value += 1 << 32;
            borrow = 1;
        }
        out.push(value as u32);
    }
    trim(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn parse(s: &str) -> ExactInt {
        s.parse().unwrap()
    }

    #[test]
    fn test_zero() {
        assert_eq!(ExactInt::zero().to_string(), "0");
        assert_eq!(parse("-0"), ExactInt::zero());
        assert_eq!(parse("000"), ExactInt::zero());
        assert!(!parse("-0").is_negative());
    }

    #[test]
    fn test_large_decimal_round_trip() {
        let text = "-10000000000000000000000000000000000000000123456789";
        assert_eq!(parse(text).to_string(), text);
        assert_eq!(parse("+42"), ExactInt::from(42i64));
        assert_eq!(parse("0007").to_string(), "7");
    }

    #[test]
    fn test_rejects_non_integers() {
        for bad in ["", "-", "1.0", "1e3", " 1", "0x10", "--1", "12a"] {
            assert_eq!(bad.parse::<ExactInt>(), Err(ParseExactIntError), "{bad:?}");
        }
    }

    #[test]
    fn test_extreme_i128() {
        assert_eq!(ExactInt::from(i128::MIN).to_string(), i128::MIN.to_string());
        assert_eq!(ExactInt::from(i128::MAX).to_string(), i128::MAX.to_string());
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(ExactInt::from(-12345i64).to_f64(), -12345.0);
        assert_eq!(parse(&format!("1{}", "0".repeat(40))).to_f64(), 1e40);
        assert!(parse(&format!("1{}", "0".repeat(400))).to_f64().is_infinite());
    }

    #[test]
    fn test_magnitude_subtraction_borrows() {
        let a = ExactInt::from(1i128 << 64).into_limbs();
        let b = ExactInt::from(1i64).into_limbs();
        let diff = ExactInt::from_parts(false, sub_magnitude(&a, &b));
        assert_eq!(diff, ExactInt::from((1i128 << 64) - 1));
    }

    proptest! {
        #[test]
        fn display_matches_i128(value in any::<i128>()) {
            prop_assert_eq!(ExactInt::from(value).to_string(), value.to_string());
            prop_assert_eq!(parse(&value.to_string()), ExactInt::from(value));
        }

        #[test]
        fn ordering_matches_i128(a in any::<u64>(), b in any::<u64>()) {
            let la = ExactInt::from(i128::from(a)).into_limbs();
            let lb = ExactInt::from(i128::from(b)).into_limbs();
            prop_assert_eq!(cmp_magnitude(&la, &lb), a.cmp(&b));
        }
    }
}
