//! Stub driver that consumes the request and exits without answering.

use hwmx_tests::stub::read_request;

fn main() {
    let stdin = std::io::stdin();
    let _ = read_request(&mut stdin.lock());
}
