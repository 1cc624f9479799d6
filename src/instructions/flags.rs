//! # Status Flag Instructions
//!
//! This module implements flag manipulation:
//! - CLC / SEC: clear / set carry
//! - CLD / SED: clear / set decimal mode
//! - CLV: clear overflow
//! - CLI / SEI: interrupts are not simulated, so both are fatal

use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the CLC (Clear Carry Flag) instruction.
pub(crate) fn execute_clc<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.flag_c = false;
    Ok(())
}

/// Executes the SEC (Set Carry Flag) instruction.
pub(crate) fn execute_sec<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.flag_c = true;
    Ok(())
}

/// Executes the CLD (Clear Decimal Mode) instruction.
pub(crate) fn execute_cld<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.flag_d = false;
    Ok(())
}

/// Executes the SED (Set Decimal Flag) instruction.
pub(crate) fn execute_sed<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.flag_d = true;
    Ok(())
}

/// Executes the CLV (Clear Overflow Flag) instruction.
pub(crate) fn execute_clv<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.flag_v = false;
    Ok(())
}

/// CLI halts with `UnimplementedFeature`; the I flag is left untouched.
pub(crate) fn execute_cli<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    Err(ExecutionError::UnimplementedFeature {
        mnemonic: "CLI",
        pc: cpu.instruction_pc,
    })
}

/// SEI halts with `UnimplementedFeature`; the I flag is left untouched.
pub(crate) fn execute_sei<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    Err(ExecutionError::UnimplementedFeature {
        mnemonic: "SEI",
        pc: cpu.instruction_pc,
    })
}
