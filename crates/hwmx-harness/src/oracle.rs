//! Reference determinants.
//!
//! Integer matrices get an exact result. Small ones use fraction-free Bareiss
//! elimination over `i128`; when an intermediate overflows, the determinant is
//! computed modulo enough primes to cover the Hadamard bound and rebuilt with
//! the Chinese remainder theorem. Floating matrices use LU elimination with
//! partial pivoting in `f64`, including the `float` kind.

use std::cmp::Ordering;
use std::fmt;

use crate::exact::{self, ExactInt};
use crate::matrix::{Matrix, TestCase};

/// A reference determinant.
#[derive(Debug, Clone, PartialEq)]
pub enum Determinant {
    /// Exact value for integer matrices.
    Exact(ExactInt),
    /// Rounded value for floating matrices.
    Approx(f64),
}

impl Determinant {
    /// The value as `f64`, lossy for large exact values.
    pub fn as_f64(&self) -> f64 {
        match self {
            Determinant::Exact(v) => v.to_f64(),
            Determinant::Approx(v) => *v,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Determinant::Exact(v) => v.is_zero(),
            Determinant::Approx(v) => *v == 0.0,
        }
    }
}

impl fmt::Display for Determinant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Determinant::Exact(v) => write!(f, "{v}"),
            Determinant::Approx(v) => write!(f, "{v}"),
        }
    }
}

/// Computes the reference determinant of a test case.
pub fn determinant(case: &TestCase) -> Determinant {
    match case {
        TestCase::Int(m) => Determinant::Exact(det_exact(m)),
        TestCase::Float(m) => Determinant::Approx(det_lu(&m.map(|&e| f64::from(e)))),
        TestCase::Double(m) => Determinant::Approx(det_lu(m)),
    }
}

/// Exact determinant of an integer matrix.
pub fn det_exact(m: &Matrix<i64>) -> ExactInt {
    match det_bareiss(m) {
        Some(det) => ExactInt::from(det),
        None => det_modular(m),
    }
}

/// Bareiss elimination over `i128`. `None` if an intermediate overflows.
fn det_bareiss(m: &Matrix<i64>) -> Option<i128> {
    let n = m.dimension();
    let mut a: Vec<i128> = m.elements().iter().map(|&e| i128::from(e)).collect();
    let mut negate = false;
    let mut prev: i128 = 1;

    for k in 0..n.saturating_sub(1) {
        if a[k * n + k] == 0 {
            let Some(pivot) = (k + 1..n).find(|&i| a[i * n + k] != 0) else {
                return Some(0);
            };
            swap_rows(&mut a, n, k, pivot);
            negate = !negate;
        }

        let akk = a[k * n + k];
        for i in k + 1..n {
            let aik = a[i * n + k];
            for j in k + 1..n {
                let lhs = a[i * n + j].checked_mul(akk)?;
                let rhs = aik.checked_mul(a[k * n + j])?;
                // Exact division.
                a[i * n + j] = lhs.checked_sub(rhs)? / prev;
            }
            a[i * n + k] = 0;
        }
        prev = akk;
    }

    let det = a[n * n - 1];
    if negate {
        det.checked_neg()
    } else {
        Some(det)
    }
}

/// Multi-modular determinant, exact for any size.
fn det_modular(m: &Matrix<i64>) -> ExactInt {
    let n = m.dimension();
    // |det| <= product of row norms; the moduli must exceed twice that.
    let bound_bits: f64 = m
        .rows()
        .map(|row| {
            let norm_sq: f64 = row.iter().map(|&e| (e as f64) * (e as f64)).sum();
            0.5 * norm_sq.max(1.0).log2()
        })
        .sum();
    let count = (bound_bits / 30.0).ceil() as usize + 2;

    let primes: Vec<u32> = Primes::below_2_31().take(count).collect();
    let residues: Vec<u32> = primes
        .iter()
        .map(|&p| det_mod_prime(m.elements(), n, p))
        .collect();
    crt_symmetric(&residues, &primes)
}

/// Determinant modulo a prime below 2^31.
fn det_mod_prime(elements: &[i64], n: usize, p: u32) -> u32 {
    let p = u64::from(p);
    let mut a: Vec<u64> = elements
        .iter()
        .map(|&e| e.rem_euclid(p as i64) as u64)
        .collect();
    let mut det = 1u64;

    for k in 0..n {
        let Some(pivot) = (k..n).find(|&i| a[i * n + k] != 0) else {
            return 0;
        };
        if pivot != k {
            swap_rows(&mut a, n, k, pivot);
            det = p - det;
        }
        let akk = a[k * n + k];
        det = det * akk % p;
        let inv = pow_mod(akk, p - 2, p);
        for i in k + 1..n {
            let factor = a[i * n + k] * inv % p;
            if factor == 0 {
                continue;
            }
            for j in k + 1..n {
                let sub = factor * a[k * n + j] % p;
                a[i * n + j] = (a[i * n + j] + p - sub) % p;
            }
        }
    }
    det as u32
}

/// Rebuilds the value in `(-M/2, M/2]` from its residues, `M` the product of `primes`.
fn crt_symmetric(residues: &[u32], primes: &[u32]) -> ExactInt {
    // Garner mixed-radix digits.
    let mut digits: Vec<u64> = Vec::with_capacity(primes.len());
    for (i, (&r, &p)) in residues.iter().zip(primes).enumerate() {
        let p = u64::from(p);
        let mut x = u64::from(r);
        for (j, &d) in digits.iter().enumerate() {
            let pj = u64::from(primes[j]) % p;
            x = (x + p - d % p) % p * pow_mod(pj, p - 2, p) % p;
        }
        debug_assert_eq!(digits.len(), i);
        digits.push(x);
    }

    let mut value: Vec<u32> = Vec::new();
    for (&d, &p) in digits.iter().zip(primes).rev() {
        exact::mul_small(&mut value, p);
        exact::add_small(&mut value, d as u32);
    }

    let mut modulus = vec![1u32];
    for &p in primes {
        exact::mul_small(&mut modulus, p);
    }
    let mut doubled = value.clone();
    exact::mul_small(&mut doubled, 2);
    if exact::cmp_magnitude(&doubled, &modulus) == Ordering::Greater {
        ExactInt::from_parts(true, exact::sub_magnitude(&modulus, &value))
    } else {
        ExactInt::from_parts(false, value)
    }
}

fn pow_mod(mut base: u64, mut exp: u64, p: u64) -> u64 {
    let mut result = 1u64;
    base %= p;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % p;
        }
        base = base * base % p;
        exp >>= 1;
    }
    result
}

/// Primes in descending order starting below 2^31.
struct Primes {
    next: u32,
}

impl Primes {
    fn below_2_31() -> Self {
        Self { next: i32::MAX as u32 }
    }
}

impl Iterator for Primes {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.next > 2 {
            let candidate = self.next;
            self.next -= 2;
            if is_prime(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

fn is_prime(n: u32) -> bool {
    if n < 2 || n % 2 == 0 {
        return n == 2;
    }
    let n = u64::from(n);
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Determinant by LU elimination with partial pivoting.
pub fn det_lu(m: &Matrix<f64>) -> f64 {
    let n = m.dimension();
    let mut a = m.elements().to_vec();
    let mut det = 1.0;

    for k in 0..n {
        let mut pivot = k;
        for i in k + 1..n {
            if a[i * n + k].abs() > a[pivot * n + k].abs() {
                pivot = i;
            }
        }
        if a[pivot * n + k] == 0.0 {
            return 0.0;
        }
        if pivot != k {
            swap_rows(&mut a, n, k, pivot);
            det = -det;
        }

        let akk = a[k * n + k];
        det *= akk;
        for i in k + 1..n {
            let factor = a[i * n + k] / akk;
            if factor == 0.0 {
                continue;
            }
            for j in k + 1..n {
                a[i * n + j] -= factor * a[k * n + j];
            }
        }
    }

    det
}

fn swap_rows<T>(a: &mut [T], n: usize, r1: usize, r2: usize) {
    for j in 0..n {
        a.swap(r1 * n + j, r2 * n + j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_one;
    use crate::kind::NumericKind;
    use crate::rng::create_rng;
    use pretty_assertions::assert_eq;

    fn int(rows: Vec<Vec<i64>>) -> Matrix<i64> {
        Matrix::from_rows(rows).unwrap()
    }

    fn double(rows: Vec<Vec<f64>>) -> Matrix<f64> {
        Matrix::from_rows(rows).unwrap()
    }

    fn exact(v: i64) -> ExactInt {
        ExactInt::from(v)
    }

    fn random_int(dim: usize, seed: u64) -> Matrix<i64> {
        match generate_one(NumericKind::Int, dim, &mut create_rng(seed)) {
            TestCase::Int(m) => m,
            other => panic!("expected integer matrix, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_single_element() {
        assert_eq!(det_exact(&int(vec![vec![5]])), exact(5));
        assert_eq!(det_lu(&double(vec![vec![5.0]])), 5.0);
        assert_eq!(det_exact(&int(vec![vec![-7]])), exact(-7));
    }

    #[test]
    fn test_two_by_two() {
        assert_eq!(det_exact(&int(vec![vec![1, 2], vec![3, 4]])), exact(-2));
        assert!((det_lu(&double(vec![vec![1.0, 2.0], vec![3.0, 4.0]])) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_pivot_needs_row_swap() {
        assert_eq!(det_exact(&int(vec![vec![0, 1], vec![1, 0]])), exact(-1));
        assert_eq!(det_lu(&double(vec![vec![0.0, 1.0], vec![1.0, 0.0]])), -1.0);
    }

    #[test]
    fn test_singular_matrix() {
        let m = int(vec![vec![1, 2, 3], vec![2, 4, 6], vec![7, -1, 0]]);
        assert_eq!(det_exact(&m), ExactInt::zero());
        assert_eq!(det_modular(&m), ExactInt::zero());
        let m = int(vec![vec![0, 1, 2], vec![0, 3, 4], vec![0, 5, 6]]);
        assert_eq!(det_exact(&m), ExactInt::zero());
        assert_eq!(det_lu(&m.map(|&e| e as f64)), 0.0);
    }

    #[test]
    fn test_three_by_three() {
        let m = int(vec![vec![2, -3, 1], vec![2, 0, -1], vec![1, 4, 5]]);
        assert_eq!(det_exact(&m), exact(49));
        assert_eq!(det_modular(&m), exact(49));
        assert!((det_lu(&m.map(|&e| e as f64)) - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_modular_matches_bareiss() {
        for (dim, seed) in [(1, 1), (2, 2), (4, 3), (8, 4), (16, 5)] {
            let m = random_int(dim, seed);
            let bareiss = det_bareiss(&m).unwrap();
            assert_eq!(det_modular(&m), ExactInt::from(bareiss), "dim {dim}");
        }
    }

    #[test]
    fn test_beyond_i128() {
        // Diagonal of 10^10 entries: det is 10^40, beyond i128.
        let m = Matrix::build(4, |r, c| if r == c { 10_000_000_000i64 } else { 0 }).unwrap();
        assert!(det_bareiss(&m).is_none());
        assert_eq!(det_exact(&m).to_string(), format!("1{}", "0".repeat(40)));

        let m = Matrix::build(4, |r, c| match (r, c) {
            (0, 1) | (1, 0) => 10_000_000_000i64,
            (r, c) if r == c && r > 1 => 10_000_000_000,
            _ => 0,
        })
        .unwrap();
        assert_eq!(det_exact(&m).to_string(), format!("-1{}", "0".repeat(40)));
    }

    #[test]
    fn test_exact_and_lu_agree_on_random_matrices() {
        for (dim, seed) in [(1, 10), (4, 11), (32, 12), (64, 13)] {
            let m = random_int(dim, seed);
            let exact = det_exact(&m).to_f64();
            let approx = det_lu(&m.map(|&e| e as f64));
            assert!(
                (exact - approx).abs() <= 1e-6 * exact.abs().max(1.0),
                "dim {dim}: exact {exact} vs lu {approx}"
            );
        }
    }

    #[test]
    fn test_primes_descend() {
        let primes: Vec<u32> = Primes::below_2_31().take(3).collect();
        assert_eq!(primes, vec![2_147_483_647, 2_147_483_629, 2_147_483_587]);
    }

    #[test]
    fn test_float_case_dispatch() {
        let case = TestCase::Float(Matrix::from_rows(vec![vec![0.5f32, 0.25], vec![0.0, 2.0]]).unwrap());
        assert_eq!(determinant(&case), Determinant::Approx(1.0));
        assert!(determinant(&TestCase::Int(int(vec![vec![0]]))).is_zero());
    }
}
