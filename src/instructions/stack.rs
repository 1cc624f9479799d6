//! # Stack Operations
//!
//! This module implements stack manipulation instructions:
//! - PHA / PLA: push / pull the accumulator
//! - PHP / PLP: push / pull the status register
//!
//! The stack lives at `stack_base + SP` and grows downward. Wrapping past
//! either end of the bank is reported as a warning and execution continues.
//! There is no B latch: PHP pushes the status with bits `0x30` set and PLP
//! forces them on again.

use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the PHA (Push Accumulator) instruction.
pub(crate) fn execute_pha<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.a;
    cpu.push(value);
    Ok(())
}

/// Executes the PHP (Push Processor Status) instruction.
pub(crate) fn execute_php<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let status = cpu.status() | 0x30;
    cpu.push(status);
    Ok(())
}

/// Executes the PLA (Pull Accumulator) instruction. Sets N and Z.
pub(crate) fn execute_pla<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.a = cpu.pop();
    cpu.set_nz(cpu.a);
    Ok(())
}

/// Executes the PLP (Pull Processor Status) instruction.
pub(crate) fn execute_plp<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let status = cpu.pop() | 0x30;
    cpu.set_status(status);
    Ok(())
}
