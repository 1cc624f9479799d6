//! Tests for the relative branches.
//!
//! The offset is a two's-complement cell relative to the address after the
//! branch.

use sim6502::{Memory, WidthProfile, CPU};

fn setup_cpu(width: u32, program: &[u32]) -> CPU<Memory> {
    let mut memory = Memory::new(WidthProfile::new(width).unwrap());
    memory.load(0x0600, program);
    CPU::with_seed(memory, 13)
}

#[test]
fn test_branch_not_taken_falls_through() {
    // BEQ +$10 with Z clear
    let mut cpu = setup_cpu(8, &[0xF0, 0x10]);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0602);
}

#[test]
fn test_branch_forward() {
    let mut cpu = setup_cpu(8, &[0xF0, 0x10]);
    cpu.set_flag_z(true);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0612);
}

#[test]
fn test_branch_backward() {
    // BNE -4
    let mut cpu = setup_cpu(8, &[0xD0, 0xFC]);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x05FE);
}

#[test]
fn test_countdown_loop() {
    // LDX #$03 / loop: DEX / BNE loop
    let mut cpu = setup_cpu(8, &[0xA2, 0x03, 0xCA, 0xD0, 0xFD]);

    for _ in 0..7 {
        cpu.step().unwrap();
    }

    assert_eq!(cpu.x(), 0);
    assert_eq!(cpu.pc(), 0x0605);
    assert_eq!(cpu.instructions(), 7);
}

#[test]
fn test_every_branch_condition() {
    // (opcode, flag setter, taken when flag is set)
    let cases: [(u32, fn(&mut CPU<Memory>, bool), bool); 8] = [
        (0x10, CPU::set_flag_n, false),
        (0x30, CPU::set_flag_n, true),
        (0x50, CPU::set_flag_v, false),
        (0x70, CPU::set_flag_v, true),
        (0x90, CPU::set_flag_c, false),
        (0xB0, CPU::set_flag_c, true),
        (0xD0, CPU::set_flag_z, false),
        (0xF0, CPU::set_flag_z, true),
    ];

    for (opcode, set_flag, taken_when_set) in cases {
        for flag in [false, true] {
            let mut cpu = setup_cpu(8, &[opcode, 0x04]);
            set_flag(&mut cpu, flag);

            cpu.step().unwrap();

            let expected = if flag == taken_when_set { 0x0606 } else { 0x0602 };
            assert_eq!(cpu.pc(), expected, "opcode ${:02X} flag {}", opcode, flag);
        }
    }
}

#[test]
fn test_sixteen_bit_branch_offset() {
    // BNE -$100 at 16 bits
    let mut cpu = setup_cpu(16, &[0xD0, 0xFF00]);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0502);
}

#[test]
fn test_thirty_two_bit_branch_offset() {
    let mut cpu = setup_cpu(32, &[0xB0, 0x0001_0000]);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0001_0602);
}

#[test]
fn test_branch_wraps_below_zero() {
    let mut memory = Memory::new(WidthProfile::eight_bit());
    memory.load(0x0000, &[0xD0, 0x80]);
    let mut cpu = CPU::with_seed(memory, 13);
    cpu.set_pc(0x0000);

    cpu.step().unwrap();

    // 0x0002 - 0x80 wraps to the top of memory
    assert_eq!(cpu.pc(), 0xFF82);
}
