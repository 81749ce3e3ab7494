//! Driver channel exchanges against stub driver executables.

use std::path::Path;
use std::time::Duration;

use hwmx_harness::generator::generate_one;
use hwmx_harness::oracle;
use hwmx_harness::rng::create_rng;
use hwmx_harness::{
    compare, exchange, Comparison, DeterminantDriver, DriverConfig, DriverError, Matrix,
    NumericKind, ProcessDriver, ProtocolError, TestCase, Tolerances,
};
use pretty_assertions::assert_eq;

fn stub(name: &str) -> &'static Path {
    let path = match name {
        "reference" => env!("CARGO_BIN_EXE_stub_reference_driver"),
        "silent" => env!("CARGO_BIN_EXE_stub_silent_driver"),
        "sleepy" => env!("CARGO_BIN_EXE_stub_sleepy_driver"),
        "failing" => env!("CARGO_BIN_EXE_stub_failing_driver"),
        other => panic!("no stub named {other}"),
    };
    Path::new(path)
}

#[test]
fn reference_stub_answers_known_matrices() {
    let config = DriverConfig::default();
    let case = TestCase::Int(Matrix::from_rows(vec![vec![5]]).unwrap());
    assert_eq!(exchange(stub("reference"), &case, &config).unwrap().determinant, "5");

    let case = TestCase::Int(Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap());
    assert_eq!(exchange(stub("reference"), &case, &config).unwrap().determinant, "-2");
}

#[test]
fn reference_stub_agrees_with_oracle_for_every_kind() {
    let mut driver = ProcessDriver::resolve(stub("reference"), DriverConfig::default()).unwrap();
    let mut rng = create_rng(11);
    let tolerances = Tolerances::default();
    for kind in NumericKind::ALL {
        for dim in [1, 2, 4, 8, 32] {
            let case = generate_one(kind, dim, &mut rng);
            let reply = driver.exchange(&case).unwrap();
            let expected = oracle::determinant(&case);
            assert_eq!(
                compare(kind, &expected, &reply.determinant, &tolerances),
                Comparison::Match,
                "{kind} size {dim}: expected {expected}, got {}",
                reply.determinant
            );
            assert!(reply.diagnostic.is_none());
        }
    }
}

#[test]
fn sessions_do_not_leak_state_between_exchanges() {
    let mut driver = ProcessDriver::resolve(stub("reference"), DriverConfig::default()).unwrap();
    let a = TestCase::Int(Matrix::from_rows(vec![vec![2, 0], vec![0, 3]]).unwrap());
    let b = TestCase::Int(Matrix::from_rows(vec![vec![7]]).unwrap());
    assert_eq!(driver.exchange(&a).unwrap().determinant, "6");
    assert_eq!(driver.exchange(&b).unwrap().determinant, "7");
    assert_eq!(driver.exchange(&a).unwrap().determinant, "6");
}

#[test]
fn silent_stub_is_protocol_error() {
    let case = TestCase::Double(Matrix::from_rows(vec![vec![0.25]]).unwrap());
    let err = exchange(stub("silent"), &case, &DriverConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        DriverError::Protocol {
            source: ProtocolError::UnexpectedEof { .. },
            ..
        }
    ));
}

#[test]
fn failing_stub_reply_is_kept_with_diagnostic() {
    let case = TestCase::Int(Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap());
    let reply = exchange(stub("failing"), &case, &DriverConfig::default()).unwrap();
    assert_eq!(reply.determinant, "-2");
    let diagnostic = reply.diagnostic.unwrap();
    assert_eq!(diagnostic.exit_code, Some(3));
    assert!(diagnostic.stderr.contains("simulated crash"));
}

#[test]
fn sleepy_stub_is_killed_after_timeout() {
    let case = TestCase::Float(Matrix::from_rows(vec![vec![0.5]]).unwrap());
    let config = DriverConfig::default().timeout(Duration::from_millis(300));
    let err = exchange(stub("sleepy"), &case, &config).unwrap_err();
    match err {
        DriverError::Timeout { timeout, .. } => assert_eq!(timeout, Duration::from_millis(300)),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn large_request_does_not_deadlock() {
    let case = generate_one(NumericKind::Double, 128, &mut create_rng(3));
    let reply = exchange(stub("reference"), &case, &DriverConfig::default()).unwrap();
    let expected = oracle::determinant(&case);
    assert_eq!(
        compare(NumericKind::Double, &expected, &reply.determinant, &Tolerances::default()),
        Comparison::Match
    );
}
