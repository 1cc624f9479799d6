//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL and ROR, each on the accumulator (implied form) or on memory.
//! Carry receives the bit shifted out: bit `dw-1` for left shifts, bit 0 for
//! right shifts. N and Z come from the masked result.

use crate::addressing::AddressingMode;
use crate::{ExecutionError, MemoryBus, CPU};

/// Applies `op` to the accumulator or to the addressed cell and sets N and Z.
fn read_modify_write<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
    op: impl FnOnce(&mut CPU<M>, u32) -> u32,
) -> Result<(), ExecutionError> {
    if mode == AddressingMode::Implied {
        let value = cpu.a;
        cpu.a = op(cpu, value) & cpu.profile.data_mask();
        cpu.set_nz(cpu.a);
    } else {
        let addr = cpu.effective_address(mode);
        let value = cpu.memory.read(addr) & cpu.profile.data_mask();
        let result = op(cpu, value) & cpu.profile.data_mask();
        cpu.memory.write(addr, result);
        cpu.set_nz(result);
    }
    Ok(())
}

/// Executes the ASL (Arithmetic Shift Left) instruction.
pub(crate) fn execute_asl<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    read_modify_write(cpu, mode, |cpu, value| {
        cpu.flag_c = value & cpu.profile.sign_bit() != 0;
        ((value as u64) << 1) as u32
    })
}

/// Executes the LSR (Logical Shift Right) instruction.
pub(crate) fn execute_lsr<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    read_modify_write(cpu, mode, |cpu, value| {
        cpu.flag_c = value & 1 != 0;
        value >> 1
    })
}

/// Executes the ROL (Rotate Left) instruction. The old carry enters bit 0.
pub(crate) fn execute_rol<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    read_modify_write(cpu, mode, |cpu, value| {
        let carry_in = cpu.flag_c as u32;
        cpu.flag_c = value & cpu.profile.sign_bit() != 0;
        (((value as u64) << 1) as u32) | carry_in
    })
}

/// Executes the ROR (Rotate Right) instruction. The old carry enters the sign bit.
pub(crate) fn execute_ror<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    read_modify_write(cpu, mode, |cpu, value| {
        let carry_in = if cpu.flag_c { cpu.profile.sign_bit() } else { 0 };
        cpu.flag_c = value & 1 != 0;
        (value >> 1) | carry_in
    })
}
