//! Tests for instructions that stop or fault a run: BRK, CLI, SEI, unknown
//! opcodes. Also covers NOP, the flag instructions and WDM output.

use sim6502::{CpuEvent, ExecutionError, Memory, StepOutcome, WidthProfile, CPU};

fn setup_cpu(width: u32, program: &[u32]) -> CPU<Memory> {
    let mut memory = Memory::new(WidthProfile::new(width).unwrap());
    memory.load(0x0600, program);
    CPU::with_seed(memory, 19)
}

#[test]
fn test_brk_reports_its_address() {
    let mut cpu = setup_cpu(8, &[0xEA, 0x00]);

    assert_eq!(cpu.step().unwrap(), StepOutcome::Continue);
    assert_eq!(cpu.step().unwrap(), StepOutcome::Break { pc: 0x0601 });
    assert_eq!(cpu.instructions(), 2);
}

#[test]
fn test_brk_leaves_stack_alone() {
    let mut cpu = setup_cpu(8, &[0x00]);

    cpu.step().unwrap();

    assert_eq!(cpu.sp(), 0xFF);
    assert_eq!(cpu.status(), 0x30);
}

#[test]
fn test_empty_memory_is_brk() {
    let mut cpu = setup_cpu(16, &[]);

    assert_eq!(cpu.step().unwrap(), StepOutcome::Break { pc: 0x0600 });
}

#[test]
fn test_cli_is_unimplemented() {
    let mut cpu = setup_cpu(8, &[0x58]);

    let err = cpu.step().unwrap_err();

    assert_eq!(
        err,
        ExecutionError::UnimplementedFeature {
            mnemonic: "CLI",
            pc: 0x0600
        }
    );
    assert_eq!(cpu.pc(), 0x0600);
    assert!(!cpu.flag_i());
    assert_eq!(cpu.instructions(), 0);
}

#[test]
fn test_sei_is_unimplemented() {
    let mut cpu = setup_cpu(8, &[0xEA, 0x78]);
    cpu.step().unwrap();

    let err = cpu.step().unwrap_err();

    assert_eq!(err.pc(), 0x0601);
    assert!(err.to_string().contains("SEI"));
    assert!(!cpu.flag_i());
}

#[test]
fn test_unknown_opcode_faults() {
    let mut cpu = setup_cpu(8, &[0x02]);

    assert_eq!(
        cpu.step(),
        Err(ExecutionError::UnknownOpcode {
            opcode: 0x02,
            pc: 0x0600
        })
    );
    assert_eq!(cpu.pc(), 0x0600);
}

#[test]
fn test_nop_only_advances_pc() {
    let mut cpu = setup_cpu(8, &[0xEA]);
    let before = cpu.registers();

    cpu.step().unwrap();

    let after = cpu.registers();
    assert_eq!(after.pc, 0x0601);
    assert_eq!(after.a, before.a);
    assert_eq!(after.status, before.status);
}

#[test]
fn test_flag_instructions() {
    // SEC, SED, CLC, CLD, CLV
    let mut cpu = setup_cpu(8, &[0x38, 0xF8, 0x18, 0xD8, 0xB8]);
    cpu.set_flag_v(true);

    cpu.step().unwrap();
    assert!(cpu.flag_c());
    cpu.step().unwrap();
    assert!(cpu.flag_d());
    cpu.step().unwrap();
    assert!(!cpu.flag_c());
    cpu.step().unwrap();
    assert!(!cpu.flag_d());
    cpu.step().unwrap();
    assert!(!cpu.flag_v());
}

#[test]
fn test_wdm_outputs_accumulator() {
    // LDA #$48 / WDM #$00 / LDA #$69 / WDM #$00
    let mut cpu = setup_cpu(8, &[0xA9, 0x48, 0x42, 0x00, 0xA9, 0x69, 0x42, 0x00]);

    cpu.run_for_instructions(4).unwrap();

    assert_eq!(
        cpu.take_events(),
        vec![CpuEvent::Output(0x48), CpuEvent::Output(0x69)]
    );
    assert_eq!(cpu.pc(), 0x0608);
}
