//! Stub driver that answers correctly and then exits with status 3.

use hwmx_tests::stub::{reference_answer, serve};

fn main() {
    let code = serve(reference_answer);
    if code == 0 {
        eprintln!("stub driver: simulated crash after reply");
        std::process::exit(3);
    }
    std::process::exit(code);
}
