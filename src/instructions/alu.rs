//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC: Add with Carry
//! - SBC: Subtract with Carry
//! - AND, ORA, EOR: bitwise logic on the accumulator
//! - CMP, CPX, CPY: register comparisons
//! - BIT: bit test
//!
//! Arithmetic is done in `i64` so the 32-bit profile has headroom for carries.
//! Decimal mode works on the low byte's two nibbles whatever the bus width.

use crate::addressing::AddressingMode;
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes the ADC (Add with Carry) instruction.
///
/// In binary mode C is set when the sum reaches `2^dw`. V starts set when both
/// operands share a sign, and is cleared again when the sum shows no signed
/// overflow.
///
/// In decimal mode the low nibble is corrected when it reaches 10 and the
/// result is corrected by `0x60` when it reaches 160, which also sets C.
pub(crate) fn execute_adc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    add_with_carry(cpu, value);
    Ok(())
}

pub(crate) fn add_with_carry<M: MemoryBus>(cpu: &mut CPU<M>, value: u32) {
    let sign = cpu.profile.sign_bit() as i64;
    let a = cpu.a as i64;
    let v = value as i64;
    let carry_in = cpu.flag_c as i64;

    let mut overflow = (a ^ v) & sign == 0;
    let carry;
    let mut sum;

    if cpu.flag_d {
        sum = (a & 0xF) + (v & 0xF) + carry_in;
        if sum >= 10 {
            sum = 0x10 | ((sum + 6) & 0xF);
        }
        sum += (a & 0xF0) + (v & 0xF0);
        if sum >= 160 {
            carry = true;
            if overflow && sum >= 0x180 {
                overflow = false;
            }
            sum += 0x60;
        } else {
            carry = false;
            if overflow && sum < 0x80 {
                overflow = false;
            }
        }
    } else {
        sum = a + v + carry_in;
        if sum >= 2 * sign {
            carry = true;
            if overflow && sum >= 3 * sign {
                overflow = false;
            }
        } else {
            carry = false;
            if overflow && sum < sign {
                overflow = false;
            }
        }
    }

    cpu.flag_c = carry;
    cpu.flag_v = overflow;
    cpu.a = (sum & cpu.profile.data_mask() as i64) as u32;
    cpu.set_nz(cpu.a);
}

/// Executes the SBC (Subtract with Carry) instruction.
///
/// C is the inverted borrow: it is set when `A >= operand + !C`. V starts set
/// when the operands differ in sign and is cleared when the difference shows
/// no signed overflow.
pub(crate) fn execute_sbc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    subtract_with_carry(cpu, value);
    Ok(())
}

pub(crate) fn subtract_with_carry<M: MemoryBus>(cpu: &mut CPU<M>, value: u32) {
    let sign = cpu.profile.sign_bit() as i64;
    let dm = cpu.profile.data_mask() as i64;
    let a = cpu.a as i64;
    let v = value as i64;
    let carry_in = cpu.flag_c as i64;

    let mut overflow = (a ^ v) & sign != 0;
    let carry;
    let mut diff;

    if cpu.flag_d {
        let mut low = 0xF + (a & 0xF) - (v & 0xF) + carry_in;
        if low < 0x10 {
            diff = 0;
            low -= 6;
        } else {
            diff = 0x10;
            low -= 0x10;
        }
        diff += 0xF0 + (a & 0xF0) - (v & 0xF0);
        if diff < 0x100 {
            carry = false;
            if overflow && diff < 0x80 {
                overflow = false;
            }
            diff -= 0x60;
        } else {
            carry = true;
            if overflow && diff >= 0x180 {
                overflow = false;
            }
        }
        diff += low;
    } else {
        diff = dm + a - v + carry_in;
        if diff < dm + 1 {
            carry = false;
            if overflow && diff < sign {
                overflow = false;
            }
        } else {
            carry = true;
            if overflow && diff >= 3 * sign {
                overflow = false;
            }
        }
    }

    cpu.flag_c = carry;
    cpu.flag_v = overflow;
    cpu.a = (diff & dm) as u32;
    cpu.set_nz(cpu.a);
}

/// Executes the AND (Logical AND) instruction. Updates Z and N.
pub(crate) fn execute_and<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    cpu.a &= value;
    cpu.set_nz(cpu.a);
    Ok(())
}

/// Executes the ORA (Logical Inclusive OR) instruction. Updates Z and N.
pub(crate) fn execute_ora<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    cpu.a |= value;
    cpu.set_nz(cpu.a);
    Ok(())
}

/// Executes the EOR (Exclusive OR) instruction. Updates Z and N.
pub(crate) fn execute_eor<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    cpu.a ^= value;
    cpu.set_nz(cpu.a);
    Ok(())
}

fn compare<M: MemoryBus>(cpu: &mut CPU<M>, register: u32, value: u32) {
    cpu.flag_c = register >= value;
    cpu.set_nz(register.wrapping_sub(value));
}

/// Executes the CMP (Compare Accumulator) instruction.
///
/// C is set when A >= operand; N and Z come from `A - operand`.
pub(crate) fn execute_cmp<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    let register = cpu.a;
    compare(cpu, register, value);
    Ok(())
}

pub(crate) fn execute_cpx<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    let register = cpu.x;
    compare(cpu, register, value);
    Ok(())
}

pub(crate) fn execute_cpy<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    let register = cpu.y;
    compare(cpu, register, value);
    Ok(())
}

/// Executes the BIT (Bit Test) instruction.
///
/// N and V are copied from the operand's top two bits; Z is set when
/// `A & operand` is zero. The accumulator is not changed.
pub(crate) fn execute_bit<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mode: AddressingMode,
) -> Result<(), ExecutionError> {
    let value = cpu.operand_value(mode);
    cpu.flag_n = value & cpu.profile.sign_bit() != 0;
    cpu.flag_v = value & cpu.profile.overflow_bit() != 0;
    cpu.flag_z = cpu.a & value == 0;
    Ok(())
}
