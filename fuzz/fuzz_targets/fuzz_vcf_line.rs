//! Fuzz target for VCF line decoding
//!
//! Feeds arbitrary byte strings through the VCF line parser and on to the
//! HGVS id codec.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if input.len() > 1000 {
            return;
        }

        // Neither step may panic on any input
        if let Ok(Some(line)) = ferro_myvariant::vcf::parse_vcf_line(input, 1) {
            let _ = line.hgvs_ids();
        }
    }
});
