#![no_main]

use libfuzzer_sys::fuzz_target;
use tssrecover_core::{parse_container, FixedPassword, NoPassword};

fuzz_target!(|data: &[u8]| {
    // Containers come from untrusted files. Both the plain and the encrypted
    // path must return Ok or Err, never panic.
    let text = String::from_utf8_lossy(data);
    let _ = parse_container(&text, &NoPassword, "fuzz");
    let _ = parse_container(&text, &FixedPassword::new("fuzz"), "fuzz");
});
