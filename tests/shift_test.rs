//! Tests for ASL, LSR, ROL and ROR in accumulator and memory forms.

use sim6502::{Memory, MemoryBus, WidthProfile, CPU};

fn setup_cpu(width: u32, program: &[u32]) -> CPU<Memory> {
    let mut memory = Memory::new(WidthProfile::new(width).unwrap());
    memory.load(0x0600, program);
    CPU::with_seed(memory, 5)
}

#[test]
fn test_asl_accumulator() {
    let mut cpu = setup_cpu(8, &[0x0A]);
    cpu.set_a(0x81);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x02);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
    assert_eq!(cpu.pc(), 0x0601);
}

#[test]
fn test_asl_memory() {
    // ASL $20
    let mut cpu = setup_cpu(8, &[0x06, 0x20]);
    cpu.memory_mut().write(0x20, 0x40);

    cpu.step().unwrap();

    assert_eq!(cpu.memory().get(0x20), 0x80);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

#[test]
fn test_asl_sixteen_bit() {
    let mut cpu = setup_cpu(16, &[0x0A]);
    cpu.set_a(0x8001);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x0002);
    assert!(cpu.flag_c());
}

#[test]
fn test_lsr_accumulator() {
    let mut cpu = setup_cpu(8, &[0x4A]);
    cpu.set_a(0x01);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_lsr_absolute_x() {
    // LSR $0300,X
    let mut cpu = setup_cpu(8, &[0x5E, 0x00, 0x03]);
    cpu.set_x(0x04);
    cpu.memory_mut().write(0x0304, 0x84);

    cpu.step().unwrap();

    assert_eq!(cpu.memory().get(0x0304), 0x42);
    assert!(!cpu.flag_c());
}

#[test]
fn test_rol_carries_through() {
    let mut cpu = setup_cpu(8, &[0x2A]);
    cpu.set_a(0x80);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x01);
    assert!(cpu.flag_c());
}

#[test]
fn test_ror_carries_into_sign_bit() {
    let mut cpu = setup_cpu(8, &[0x6A]);
    cpu.set_a(0x02);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x81);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

#[test]
fn test_ror_thirty_two_bit() {
    let mut cpu = setup_cpu(32, &[0x6A]);
    cpu.set_a(0x0000_0001);
    cpu.set_flag_c(true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x8000_0000);
    assert!(cpu.flag_c());
    assert!(cpu.flag_n());
}

#[test]
fn test_rol_zero_page_x_wraps() {
    // ROL $FF,X with X=2 lands on $01
    let mut cpu = setup_cpu(8, &[0x36, 0xFF]);
    cpu.set_x(0x02);
    cpu.memory_mut().write(0x01, 0x40);

    cpu.step().unwrap();

    assert_eq!(cpu.memory().get(0x01), 0x80);
}
