#![no_main]

use libfuzzer_sys::fuzz_target;
use tssrecover_core::DerivationPath;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing must never panic; whatever it accepts must be non-hardened
        // and survive a Display round trip unchanged.
        if let Ok(path) = s.parse::<DerivationPath>() {
            assert!(path.non_hardened());
            let reparsed: DerivationPath = path
                .to_string()
                .parse()
                .expect("normalised path must parse");
            assert_eq!(reparsed.indices(), path.indices());
            assert!(!reparsed.had_hardened_markers());
        }
    }
});
