//! Square matrices and kind-tagged test cases.

use std::fmt;

use crate::error::{HarnessError, HarnessResult};
use crate::kind::NumericKind;

/// A square, row-major matrix.
///
/// Every row has exactly `dimension` elements; construction rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    dimension: usize,
    elements: Vec<T>,
}

impl<T> Matrix<T> {
    /// Builds a matrix from a flat row-major element list.
    pub fn from_flat(dimension: usize, elements: Vec<T>) -> HarnessResult<Self> {
        if dimension == 0 {
            return Err(HarnessError::EmptyMatrix);
        }
        if elements.len() != dimension * dimension {
            return Err(HarnessError::NotSquare {
                rows: dimension,
                row: elements.len() / dimension,
                len: elements.len() % dimension,
            });
        }
        Ok(Self {
            dimension,
            elements,
        })
    }

    /// Builds a matrix from nested rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> HarnessResult<Self> {
        let dimension = rows.len();
        if dimension == 0 {
            return Err(HarnessError::EmptyMatrix);
        }
        if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(HarnessError::NotSquare {
                rows: dimension,
                row,
                len: bad.len(),
            });
        }
        Ok(Self {
            dimension,
            elements: rows.into_iter().flatten().collect(),
        })
    }

    /// Builds a matrix by calling `f(row, col)` for every position, row-major.
    pub fn build(dimension: usize, mut f: impl FnMut(usize, usize) -> T) -> HarnessResult<Self> {
        let mut elements = Vec::with_capacity(dimension * dimension);
        for row in 0..dimension {
            for col in 0..dimension {
                elements.push(f(row, col));
            }
        }
        Self::from_flat(dimension, elements)
    }

    /// Row and column count.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.elements[row * self.dimension + col]
    }

    /// All elements in row-major order.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.elements.chunks(self.dimension)
    }

    /// Converts every element, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            dimension: self.dimension,
            elements: self.elements.iter().map(f).collect(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let mut first = true;
            for elem in row {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{elem}")?;
                first = false;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A generated matrix tagged with its numeric kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TestCase {
    /// Integer elements.
    Int(Matrix<i64>),
    /// Single precision elements.
    Float(Matrix<f32>),
    /// Double precision elements.
    Double(Matrix<f64>),
}

impl TestCase {
    /// The numeric kind of the elements.
    pub fn kind(&self) -> NumericKind {
        match self {
            TestCase::Int(_) => NumericKind::Int,
            TestCase::Float(_) => NumericKind::Float,
            TestCase::Double(_) => NumericKind::Double,
        }
    }

    /// Row and column count.
    pub fn dimension(&self) -> usize {
        match self {
            TestCase::Int(m) => m.dimension(),
            TestCase::Float(m) => m.dimension(),
            TestCase::Double(m) => m.dimension(),
        }
    }

    /// Elements rendered as driver protocol tokens, row-major.
    pub fn element_tokens(&self) -> Vec<String> {
        match self {
            TestCase::Int(m) => m.elements().iter().map(ToString::to_string).collect(),
            TestCase::Float(m) => m.elements().iter().map(ToString::to_string).collect(),
            TestCase::Double(m) => m.elements().iter().map(ToString::to_string).collect(),
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestCase::Int(m) => m.fmt(f),
            TestCase::Float(m) => m.fmt(f),
            TestCase::Double(m) => m.fmt(f),
        }
    }
}
