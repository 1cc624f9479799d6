//! Tests for CMP, CPX, CPY and BIT.

use sim6502::{Memory, MemoryBus, WidthProfile, CPU};

fn setup_cpu(width: u32, program: &[u32]) -> CPU<Memory> {
    let mut memory = Memory::new(WidthProfile::new(width).unwrap());
    memory.load(0x0600, program);
    CPU::with_seed(memory, 3)
}

// ========== CMP ==========

#[test]
fn test_cmp_greater() {
    // CMP #$10
    let mut cpu = setup_cpu(8, &[0xC9, 0x10]);
    cpu.set_a(0x20);

    cpu.step().unwrap();

    assert!(cpu.flag_c());
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_n());
    assert_eq!(cpu.a(), 0x20, "CMP must not modify A");
}

#[test]
fn test_cmp_equal() {
    let mut cpu = setup_cpu(8, &[0xC9, 0x42]);
    cpu.set_a(0x42);

    cpu.step().unwrap();

    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_cmp_less() {
    let mut cpu = setup_cpu(8, &[0xC9, 0x20]);
    cpu.set_a(0x10);

    cpu.step().unwrap();

    assert!(!cpu.flag_c());
    assert!(!cpu.flag_z());
    // 0x10 - 0x20 = 0xF0
    assert!(cpu.flag_n());
}

#[test]
fn test_cmp_sixteen_bit_sign() {
    let mut cpu = setup_cpu(16, &[0xC9, 0x0001]);
    cpu.set_a(0x0000);

    cpu.step().unwrap();

    // 0x0000 - 0x0001 = 0xFFFF
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

// ========== CPX / CPY ==========

#[test]
fn test_cpx_immediate() {
    let mut cpu = setup_cpu(8, &[0xE0, 0x05]);
    cpu.set_x(0x05);

    cpu.step().unwrap();

    assert!(cpu.flag_z());
    assert!(cpu.flag_c());
}

#[test]
fn test_cpy_zero_page() {
    // CPY $30
    let mut cpu = setup_cpu(8, &[0xC4, 0x30]);
    cpu.memory_mut().write(0x30, 0x80);
    cpu.set_y(0x7F);

    cpu.step().unwrap();

    assert!(!cpu.flag_c());
    assert!(!cpu.flag_z());
    assert!(cpu.flag_n());
}

// ========== BIT ==========

#[test]
fn test_bit_copies_top_bits() {
    // BIT $10
    let mut cpu = setup_cpu(8, &[0x24, 0x10]);
    cpu.memory_mut().write(0x10, 0xC0);
    cpu.set_a(0x01);

    cpu.step().unwrap();

    assert!(cpu.flag_n());
    assert!(cpu.flag_v());
    assert!(cpu.flag_z());
    assert_eq!(cpu.a(), 0x01);
}

#[test]
fn test_bit_nonzero_and() {
    // BIT $1234
    let mut cpu = setup_cpu(8, &[0x2C, 0x34, 0x12]);
    cpu.memory_mut().write(0x1234, 0x0F);
    cpu.set_a(0x01);
    cpu.set_flag_n(true);
    cpu.set_flag_v(true);

    cpu.step().unwrap();

    assert!(!cpu.flag_n());
    assert!(!cpu.flag_v());
    assert!(!cpu.flag_z());
}

#[test]
fn test_bit_uses_width_sign_bits() {
    let mut cpu = setup_cpu(16, &[0x24, 0x0010]);
    cpu.memory_mut().write(0x10, 0x4080);
    cpu.set_a(0x0080);

    cpu.step().unwrap();

    // bit 7 is not the sign bit at 16 bits
    assert!(!cpu.flag_n());
    assert!(cpu.flag_v());
    assert!(!cpu.flag_z());
}
