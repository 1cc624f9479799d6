//! Instruction decoder for the disassembler

use crate::addressing::AddressingMode;
use crate::disassembler::{Instruction, UNKNOWN_MNEMONIC};
use crate::opcodes::decode;
use crate::width::WidthProfile;

/// Decode the instruction at `address`, reading cells through `fetch`.
///
/// Unknown opcode cells (including anything above `0xFF`) decode to a
/// one-cell `???` instruction.
pub fn decode_instruction(
    fetch: impl Fn(u32) -> u32,
    address: u32,
    profile: &WidthProfile,
) -> Instruction {
    let opcode = fetch(address);

    let Some(decoded) = decode(opcode) else {
        return Instruction {
            address,
            cells: vec![opcode],
            mnemonic: UNKNOWN_MNEMONIC,
            addressing_mode: AddressingMode::Implied,
        };
    };

    let length = decoded.mode.instruction_length(profile);
    let cells = (0..length)
        .map(|i| fetch(profile.offset_address(address, i as i64)))
        .collect();

    Instruction {
        address,
        cells,
        mnemonic: decoded.mnemonic,
        addressing_mode: decoded.mode,
    }
}
