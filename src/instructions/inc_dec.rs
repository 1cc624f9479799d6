//! # Increment and Decrement Instructions
//!
//! INC/DEC operate on memory; INX, INY, DEX and DEY on the index registers.
//! All of them wrap within the data mask and set N and Z from the result.

use crate::addressing::AddressingMode;
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the INC (Increment Memory) instruction.
pub(crate) fn execute_inc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let addr = cpu.effective_address(mode);
    let value = cpu.memory.read(addr).wrapping_add(1) & cpu.profile.data_mask();
    cpu.memory.write(addr, value);
    cpu.set_nz(value);
    Ok(())
}

/// Executes the DEC (Decrement Memory) instruction.
pub(crate) fn execute_dec<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let addr = cpu.effective_address(mode);
    let value = cpu.memory.read(addr).wrapping_sub(1) & cpu.profile.data_mask();
    cpu.memory.write(addr, value);
    cpu.set_nz(value);
    Ok(())
}

pub(crate) fn execute_inx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.x = cpu.x.wrapping_add(1) & cpu.profile.data_mask();
    cpu.set_nz(cpu.x);
    Ok(())
}

pub(crate) fn execute_iny<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.y = cpu.y.wrapping_add(1) & cpu.profile.data_mask();
    cpu.set_nz(cpu.y);
    Ok(())
}

pub(crate) fn execute_dex<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.x = cpu.x.wrapping_sub(1) & cpu.profile.data_mask();
    cpu.set_nz(cpu.x);
    Ok(())
}

pub(crate) fn execute_dey<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.y = cpu.y.wrapping_sub(1) & cpu.profile.data_mask();
    cpu.set_nz(cpu.y);
    Ok(())
}
