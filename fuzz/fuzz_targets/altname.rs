#![no_main]
use libfuzzer_sys::fuzz_target;
use x509_altname::prelude::*;

fuzz_target!(|data: &[u8]| {
    if let Ok((_, alt_name)) = AltName::from_der(data) {
        // a decoded object can always be encoded and decoded again
        let der = alt_name.to_der_vec().expect("encoding failed");
        let (_, decoded) = AltName::from_der(&der).expect("decoding failed");
        assert_eq!(decoded, alt_name);
        let _ = alt_name.to_json();
    }
});
