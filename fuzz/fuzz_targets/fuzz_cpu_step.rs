//! Fuzz target for CPU step execution.
//!
//! Builds an arbitrary register file and instruction, executes one step and
//! checks that every register is still inside the bus width.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sim6502::{Memory, MemoryBus, WidthProfile, CPU};

#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    a: u32,
    x: u32,
    y: u32,
    sp: u32,
    status: u32,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    wide: u8,
    cpu_state: FuzzCpuState,
    /// Cells at $0600 (instruction + operands)
    instruction: [u32; 3],
    /// Zero page contents
    zero_page: [u32; 64],
}

fuzz_target!(|input: FuzzInput| {
    let width = [8, 16, 32][input.wide as usize % 3];
    let Ok(profile) = WidthProfile::new(width) else {
        return;
    };

    let mut memory = Memory::new(profile);
    memory.load(0x0600, &input.instruction);
    for (i, &cell) in input.zero_page.iter().enumerate() {
        memory.write(i as u32, cell);
    }

    let mut cpu = CPU::with_seed(memory, 0);
    cpu.set_a(input.cpu_state.a);
    cpu.set_x(input.cpu_state.x);
    cpu.set_y(input.cpu_state.y);
    cpu.set_sp(input.cpu_state.sp);
    cpu.set_status(input.cpu_state.status);

    // faults are fine, panics are not
    let _ = cpu.step();

    assert!(cpu.a() <= profile.data_mask());
    assert!(cpu.x() <= profile.data_mask());
    assert!(cpu.y() <= profile.data_mask());
    assert!(cpu.sp() <= profile.data_mask());
    assert!(cpu.pc() <= profile.address_mask());
});
