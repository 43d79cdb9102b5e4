#![no_main]
use libfuzzer_sys::fuzz_target;
use x509_altname::prelude::*;

fuzz_target!(|data: &[u8]| {
    if let Ok((_, ext)) = X509Extension::from_der(data) {
        let _ = ext.to_json();
    }
});
