//! Fuzz target for the disassembler.
//!
//! Walks arbitrary cell sequences and checks that the listing tiles the
//! input exactly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sim6502::disassembler::disassemble_cells;
use sim6502::disassembler::formatter::format_line;
use sim6502::WidthProfile;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    wide: u8,
    start_address: u16,
    cells: Vec<u32>,
}

fuzz_target!(|input: FuzzInput| {
    if input.cells.len() > 65536 {
        return;
    }

    let width = [8, 16, 32][input.wide as usize % 3];
    let Ok(profile) = WidthProfile::new(width) else {
        return;
    };
    let cells: Vec<u32> = input
        .cells
        .iter()
        .map(|cell| cell & profile.data_mask())
        .collect();
    let start = input.start_address as u32;

    let instructions = disassemble_cells(&cells, start, &profile);

    let mut expected_address = start;
    let mut consumed = 0usize;
    for instr in &instructions {
        assert_eq!(instr.address, expected_address);
        assert!(instr.length() >= 1 && instr.length() <= 3);
        let _ = format_line(instr, &profile);
        expected_address = (expected_address + instr.length()) & profile.address_mask();
        consumed += instr.length() as usize;
    }

    // the last instruction may run past the end and read zeros
    assert!(consumed >= cells.len());
});
