//! Line-oriented driver protocol.
//!
//! Request: the dimension `n` on one line, then `n*n` element lines in
//! row-major order. Reply: exactly one line holding the determinant.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;

use crate::kind::NumericKind;
use crate::matrix::{Matrix, TestCase};

/// Framing errors on either side of the protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Stream ended before the expected line.
    #[error("unexpected end of stream while reading {expected}")]
    UnexpectedEof { expected: &'static str },

    /// A line could not be parsed.
    #[error("malformed {expected}: {line:?}")]
    Malformed { expected: &'static str, line: String },

    /// Underlying stream error.
    #[error("stream error: {0}")]
    Io(#[from] io::Error),
}

/// Writes a request for `case` and flushes the stream.
pub fn write_matrix<W: Write>(w: &mut W, case: &TestCase) -> io::Result<()> {
    writeln!(w, "{}", case.dimension())?;
    for token in case.element_tokens() {
        writeln!(w, "{token}")?;
    }
    w.flush()
}

/// Reads one line, without the trailing newline.
pub fn read_line<R: BufRead>(r: &mut R, expected: &'static str) -> Result<String, ProtocolError> {
    let mut line = String::new();
    if r.read_line(&mut line)? == 0 {
        return Err(ProtocolError::UnexpectedEof { expected });
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Reads the driver's reply line.
pub fn read_reply<R: BufRead>(r: &mut R) -> Result<String, ProtocolError> {
    read_line(r, "determinant line")
}

/// Reads a request without interpreting the element tokens.
pub fn read_raw<R: BufRead>(r: &mut R) -> Result<(usize, Vec<String>), ProtocolError> {
    let line = read_line(r, "dimension line")?;
    let dimension: usize = line.trim().parse().map_err(|_| ProtocolError::Malformed {
        expected: "dimension",
        line: line.clone(),
    })?;
    if dimension == 0 {
        return Err(ProtocolError::Malformed {
            expected: "dimension",
            line,
        });
    }

    let mut tokens = Vec::with_capacity(dimension * dimension);
    for _ in 0..dimension * dimension {
        tokens.push(read_line(r, "element line")?.trim().to_string());
    }
    Ok((dimension, tokens))
}

/// Reads a request and parses the elements as `kind`.
pub fn read_matrix<R: BufRead>(r: &mut R, kind: NumericKind) -> Result<TestCase, ProtocolError> {
    let (dimension, tokens) = read_raw(r)?;
    Ok(match kind {
        NumericKind::Int => TestCase::Int(parse_matrix(dimension, &tokens)?),
        NumericKind::Float => TestCase::Float(parse_matrix(dimension, &tokens)?),
        NumericKind::Double => TestCase::Double(parse_matrix(dimension, &tokens)?),
    })
}

fn parse_matrix<T: FromStr>(dimension: usize, tokens: &[String]) -> Result<Matrix<T>, ProtocolError> {
    let elements = tokens
        .iter()
        .map(|t| {
            t.parse::<T>().map_err(|_| ProtocolError::Malformed {
                expected: "element",
                line: t.clone(),
            })
        })
        .collect::<Result<Vec<T>, _>>()?;
    Matrix::from_flat(dimension, elements).map_err(|e| ProtocolError::Malformed {
        expected: "matrix",
        line: e.to_string(),
    })
}
