//! # Control Flow Instructions
//!
//! This module implements control flow operations:
//! - JMP: Jump (absolute and indirect)
//! - JSR: Jump to Subroutine
//! - RTS: Return from Subroutine
//! - RTI: Return from Interrupt
//! - BRK: Break, which stops the run (there is no interrupt vector)
//! - NOP: No Operation
//! - WDM: writes the accumulator to the host as a character
//!
//! Return addresses are pushed one data cell at a time. On the 8- and 16-bit
//! buses an address is two cells and the high limb goes first; on the 32-bit
//! bus it is a single cell.

use crate::addressing::AddressingMode;
use crate::cpu::{CpuEvent, StepOutcome};
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the JMP instruction.
///
/// `JMP ($nnnn)` reads the target as a word from the pointer; there is no
/// page-wrap quirk.
pub(crate) fn execute_jmp<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    cpu.pc = cpu.effective_address(mode);
    Ok(())
}

/// Executes the JSR (Jump to Subroutine) instruction.
///
/// Pushes the address of the last operand cell, so RTS adds one on return.
pub(crate) fn execute_jsr<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let target = cpu.fetch_address();
    let am = cpu.profile.address_mask();
    let dm = cpu.profile.data_mask();
    let return_address = cpu.pc.wrapping_sub(1) & am;

    if cpu.profile.address_limbs() > 1 {
        cpu.push((return_address >> cpu.profile.data_width()) & dm);
    }
    cpu.push(return_address & dm);

    cpu.pc = target;
    Ok(())
}

fn pop_address<M: MemoryBus>(cpu: &mut CPU<M>) -> u32 {
    let mut address = cpu.pop();
    if cpu.profile.address_limbs() > 1 {
        address |= cpu.pop() << cpu.profile.data_width();
    }
    address & cpu.profile.address_mask()
}

/// Executes the RTS (Return from Subroutine) instruction.
pub(crate) fn execute_rts<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let address = pop_address(cpu);
    cpu.pc = cpu.next_address(address);
    Ok(())
}

/// Executes the RTI (Return from Interrupt) instruction.
///
/// Pops the status (bits `0x30` forced on), then the program counter.
pub(crate) fn execute_rti<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let status = cpu.pop() | 0x30;
    cpu.set_status(status);
    cpu.pc = pop_address(cpu);
    Ok(())
}

/// Executes the BRK instruction, which ends the run at this address.
pub(crate) fn execute_brk<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    Ok(StepOutcome::Break {
        pc: cpu.instruction_pc,
    })
}

/// Executes the NOP (No Operation) instruction.
pub(crate) fn execute_nop<M: MemoryBus>(_cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    Ok(())
}

/// Executes WDM: consumes its operand and emits the accumulator as output.
pub(crate) fn execute_wdm<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    cpu.effective_address(mode);
    cpu.events.push(CpuEvent::Output(cpu.a));
    Ok(())
}
