//! # Branch Instructions
//!
//! This module implements the conditional branches:
//! - BCC / BCS: carry clear / set
//! - BNE / BEQ: zero clear / set
//! - BPL / BMI: negative clear / set
//! - BVC / BVS: overflow clear / set
//!
//! The operand is one data cell read as a signed displacement over the
//! data-mask half range and added to the address after the operand. The
//! target wraps within the address mask. No flags are affected.

use crate::{ExecutionError, MemoryBus, CPU};

fn branch_if<M: MemoryBus>(cpu: &mut CPU<M>, condition: bool) -> Result<(), ExecutionError> {
    let offset = cpu.fetch_operand();

    if condition {
        let displacement = cpu.profile.to_signed(offset);
        cpu.pc = cpu.profile.offset_address(cpu.pc, displacement);
    }

    Ok(())
}

/// Executes the BCC (Branch if Carry Clear) instruction.
pub(crate) fn execute_bcc<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = !cpu.flag_c;
    branch_if(cpu, taken)
}

/// Executes the BCS (Branch if Carry Set) instruction.
pub(crate) fn execute_bcs<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = cpu.flag_c;
    branch_if(cpu, taken)
}

/// Executes the BEQ (Branch if Equal) instruction.
pub(crate) fn execute_beq<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = cpu.flag_z;
    branch_if(cpu, taken)
}

/// Executes the BNE (Branch if Not Equal) instruction.
pub(crate) fn execute_bne<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = !cpu.flag_z;
    branch_if(cpu, taken)
}

/// Executes the BMI (Branch if Minus) instruction.
pub(crate) fn execute_bmi<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = cpu.flag_n;
    branch_if(cpu, taken)
}

/// Executes the BPL (Branch if Plus) instruction.
pub(crate) fn execute_bpl<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = !cpu.flag_n;
    branch_if(cpu, taken)
}

/// Executes the BVC (Branch if Overflow Clear) instruction.
pub(crate) fn execute_bvc<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = !cpu.flag_v;
    branch_if(cpu, taken)
}

/// Executes the BVS (Branch if Overflow Set) instruction.
pub(crate) fn execute_bvs<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let taken = cpu.flag_v;
    branch_if(cpu, taken)
}
