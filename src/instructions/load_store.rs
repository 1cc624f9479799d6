//! # Load and Store Instructions
//!
//! This module implements register/memory transfers:
//! - LDA, LDX, LDY: load a register and set N and Z
//! - STA, STX, STY: store a register; no flags change
//!
//! Stores go through the memory bus, so a store into the frame buffer reaches
//! the display observer.

use crate::addressing::AddressingMode;
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the LDA (Load Accumulator) instruction.
pub(crate) fn execute_lda<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    cpu.a = cpu.operand_value(mode);
    cpu.set_nz(cpu.a);
    Ok(())
}

/// Executes the LDX (Load X Register) instruction.
pub(crate) fn execute_ldx<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    cpu.x = cpu.operand_value(mode);
    cpu.set_nz(cpu.x);
    Ok(())
}

/// Executes the LDY (Load Y Register) instruction.
pub(crate) fn execute_ldy<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    cpu.y = cpu.operand_value(mode);
    cpu.set_nz(cpu.y);
    Ok(())
}

/// Executes the STA (Store Accumulator) instruction.
pub(crate) fn execute_sta<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let addr = cpu.effective_address(mode);
    cpu.memory.write(addr, cpu.a);
    Ok(())
}

/// Executes the STX (Store X Register) instruction.
pub(crate) fn execute_stx<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let addr = cpu.effective_address(mode);
    cpu.memory.write(addr, cpu.x);
    Ok(())
}

/// Executes the STY (Store Y Register) instruction.
pub(crate) fn execute_sty<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let addr = cpu.effective_address(mode);
    cpu.memory.write(addr, cpu.y);
    Ok(())
}
