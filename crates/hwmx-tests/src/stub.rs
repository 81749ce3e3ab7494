//! Shared request handling for the stub driver binaries.

use std::io::{self, BufRead, Write};

use hwmx_harness::oracle::{det_exact, det_lu};
use hwmx_harness::protocol::{self, ProtocolError};
use hwmx_harness::Matrix;

/// A request as seen by a driver: dimension and raw element tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub dimension: usize,
    pub tokens: Vec<String>,
}

/// Reads one request from `input`.
pub fn read_request<R: BufRead>(input: &mut R) -> Result<Request, ProtocolError> {
    let (dimension, tokens) = protocol::read_raw(input)?;
    Ok(Request { dimension, tokens })
}

/// Correct determinant of a request, formatted the way a driver prints it.
///
/// Integer tokens get an exact answer; anything else is treated as floating.
pub fn reference_answer(request: &Request) -> Result<String, String> {
    let ints: Option<Vec<i64>> = request.tokens.iter().map(|t| t.parse().ok()).collect();
    if let Some(ints) = ints {
        let m = Matrix::from_flat(request.dimension, ints).map_err(|e| e.to_string())?;
        return Ok(det_exact(&m).to_string());
    }

    let floats = request
        .tokens
        .iter()
        .map(|t| t.parse::<f64>().map_err(|_| format!("bad element {t:?}")))
        .collect::<Result<Vec<_>, _>>()?;
    let m = Matrix::from_flat(request.dimension, floats).map_err(|e| e.to_string())?;
    Ok(det_lu(&m).to_string())
}

/// Reads a request from stdin and prints `answer(request)` as the reply line.
///
/// Returns the process exit code: 0 on success, 1 on bad input.
pub fn serve(answer: impl FnOnce(&Request) -> Result<String, String>) -> i32 {
    let stdin = io::stdin();
    let request = match read_request(&mut stdin.lock()) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("stub driver: {e}");
            return 1;
        }
    };
    match answer(&request) {
        Ok(reply) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if writeln!(out, "{reply}").and_then(|_| out.flush()).is_err() {
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("stub driver: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn request(dimension: usize, tokens: &[&str]) -> Request {
        Request {
            dimension,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_reference_answer_for_integers() {
        assert_eq!(reference_answer(&request(1, &["5"])).unwrap(), "5");
        assert_eq!(
            reference_answer(&request(2, &["1", "2", "3", "4"])).unwrap(),
            "-2"
        );
    }

    #[test]
    fn test_reference_answer_for_floats() {
        let answer = reference_answer(&request(2, &["0.5", "0", "0", "4"])).unwrap();
        assert_eq!(answer.parse::<f64>().unwrap(), 2.0);
    }

    #[test]
    fn test_read_request() {
        let mut input = Cursor::new("2\n1\n2\n3\n4\n");
        let req = read_request(&mut input).unwrap();
        assert_eq!(req, request(2, &["1", "2", "3", "4"]));
    }
}
