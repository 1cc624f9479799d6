//! Fuzz target for the assembler.
//!
//! Feeds arbitrary text to the assembler on every bus width. Errors are
//! expected; panics are bugs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sim6502::{assemble, WidthProfile};

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    for width in [8, 16, 32] {
        if let Ok(profile) = WidthProfile::new(width) {
            if let Ok(output) = assemble(&source, profile) {
                // every emitted cell must fit the bus
                for (address, cell) in output.cells() {
                    assert!(address <= profile.address_mask());
                    assert!(cell <= profile.data_mask());
                }
            }
        }
    }
});
