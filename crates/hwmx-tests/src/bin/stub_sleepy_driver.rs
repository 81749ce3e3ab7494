//! Stub driver that reads the request and then never answers.

use std::time::Duration;

use hwmx_tests::stub::read_request;

fn main() {
    let stdin = std::io::stdin();
    let _ = read_request(&mut stdin.lock());
    std::thread::sleep(Duration::from_secs(600));
}
