//! Tests for JSR, RTS, RTI and JMP.
//!
//! JSR pushes the address of its last operand cell, high limb first. RTS pops
//! it back and adds one. At 32 bits an address is a single cell.

use sim6502::{Memory, MemoryBus, StepOutcome, WidthProfile, CPU};

fn setup_cpu(width: u32, program: &[u32]) -> CPU<Memory> {
    let mut memory = Memory::new(WidthProfile::new(width).unwrap());
    memory.load(0x0600, program);
    CPU::with_seed(memory, 17)
}

// ========== JSR / RTS ==========

#[test]
fn test_jsr_pushes_return_address() {
    // JSR $0700
    let mut cpu = setup_cpu(8, &[0x20, 0x00, 0x07]);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0700);
    assert_eq!(cpu.sp(), 0xFD);
    assert_eq!(cpu.memory().get(0x01FF), 0x06);
    assert_eq!(cpu.memory().get(0x01FE), 0x02);
}

#[test]
fn test_jsr_rts_round_trip() {
    // JSR $0700 / BRK, with RTS at $0700
    let mut cpu = setup_cpu(8, &[0x20, 0x00, 0x07, 0x00]);
    cpu.memory_mut().write(0x0700, 0x60);

    cpu.step().unwrap();
    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0603);
    assert_eq!(cpu.sp(), 0xFF);
    assert_eq!(cpu.step().unwrap(), StepOutcome::Break { pc: 0x0603 });
}

#[test]
fn test_jsr_leaves_flags_alone() {
    let mut cpu = setup_cpu(8, &[0x20, 0x00, 0x07]);
    cpu.set_flag_c(true);
    cpu.set_flag_z(true);
    let status = cpu.status();

    cpu.step().unwrap();

    assert_eq!(cpu.status(), status);
}

#[test]
fn test_sixteen_bit_jsr_pushes_two_limbs() {
    // JSR $00012345
    let mut cpu = setup_cpu(16, &[0x20, 0x2345, 0x0001]);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0001_2345);
    assert_eq!(cpu.memory().get(0x0001_00FF), 0x0000);
    assert_eq!(cpu.memory().get(0x0001_00FE), 0x0602);
    assert_eq!(cpu.sp(), 0x00FD);
}

#[test]
fn test_sixteen_bit_rts_returns() {
    let mut cpu = setup_cpu(16, &[0x20, 0x2345, 0x0001]);
    cpu.memory_mut().write(0x0001_2345, 0x60);

    cpu.step().unwrap();
    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0603);
    assert_eq!(cpu.sp(), 0x00FF);
}

#[test]
fn test_thirty_two_bit_jsr_single_cell() {
    let mut cpu = setup_cpu(32, &[0x20, 0x0001_0000]);
    cpu.memory_mut().write(0x0001_0000, 0x60);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0001_0000);
    assert_eq!(cpu.memory().get(0xFF), 0x0601);
    assert_eq!(cpu.sp(), 0xFE);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0602);
    assert_eq!(cpu.sp(), 0xFF);
}

// ========== RTI ==========

#[test]
fn test_rti_pops_status_then_address() {
    let mut cpu = setup_cpu(8, &[0x40]);
    cpu.set_sp(0xFC);
    cpu.memory_mut().set(0x01FD, 0x01);
    cpu.memory_mut().set(0x01FE, 0x34);
    cpu.memory_mut().set(0x01FF, 0x12);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x1234);
    assert!(cpu.flag_c());
    assert_eq!(cpu.status(), 0x31);
    assert_eq!(cpu.sp(), 0xFF);
}

// ========== JMP ==========

#[test]
fn test_jmp_absolute() {
    let mut cpu = setup_cpu(8, &[0x4C, 0x34, 0x12]);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x1234);
}

#[test]
fn test_jmp_indirect() {
    // JMP ($0020)
    let mut cpu = setup_cpu(8, &[0x6C, 0x20, 0x00]);
    cpu.memory_mut().write(0x20, 0x34);
    cpu.memory_mut().write(0x21, 0x12);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x1234);
}

#[test]
fn test_jmp_to_zero_ends_program() {
    let mut cpu = setup_cpu(8, &[0x4C, 0x00, 0x00]);

    let outcome = cpu.step().unwrap();

    assert_eq!(outcome, StepOutcome::EndOfProgram { pc: 0x0600 });
    assert_eq!(cpu.pc(), 0x0000);
}

#[test]
fn test_rts_to_zero_ends_program() {
    // RTS with $FFFF on the stack lands on $0000
    let mut cpu = setup_cpu(8, &[0x60]);
    cpu.set_sp(0xFD);
    cpu.memory_mut().set(0x01FE, 0xFF);
    cpu.memory_mut().set(0x01FF, 0xFF);

    let outcome = cpu.step().unwrap();

    assert_eq!(outcome, StepOutcome::EndOfProgram { pc: 0x0600 });
}
