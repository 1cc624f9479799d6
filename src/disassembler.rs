//! 6502 Disassembler Module
//!
//! Converts machine cells back into mnemonics. Disassembly walks strictly
//! forward; cells that are not opcodes become one-cell `???` entries so the
//! walk always advances.

pub mod decoder;
pub mod formatter;

use crate::addressing::AddressingMode;
use crate::assembler::DEFAULT_ORIGIN;
use crate::memory::MemoryBus;
use crate::width::WidthProfile;

/// Mnemonic shown for cells that do not decode.
pub const UNKNOWN_MNEMONIC: &str = "???";

/// A single disassembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Memory address where this instruction starts
    pub address: u32,

    /// Opcode cell followed by operand cells
    pub cells: Vec<u32>,

    /// Instruction mnemonic, or `???` for an unknown cell
    pub mnemonic: &'static str,

    /// Addressing mode; `Implied` for unknown cells
    pub addressing_mode: AddressingMode,
}

impl Instruction {
    pub fn opcode(&self) -> u32 {
        self.cells.first().copied().unwrap_or(0)
    }

    pub fn operand_cells(&self) -> &[u32] {
        self.cells.get(1..).unwrap_or(&[])
    }

    /// Total size in cells
    pub fn length(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn is_unknown(&self) -> bool {
        self.mnemonic == UNKNOWN_MNEMONIC
    }

    /// Operand as a single number: the data cell, or the address assembled
    /// from its limbs.
    pub fn operand_value(&self, profile: &WidthProfile) -> Option<u32> {
        match self.operand_cells() {
            [] => None,
            [value] => Some(*value),
            [lo, hi, ..] => {
                let combined = (*lo as u64) | ((*hi as u64) << profile.data_width());
                Some((combined & profile.address_mask() as u64) as u32)
            }
        }
    }

    /// Absolute destination of a relative branch.
    pub fn branch_target(&self, profile: &WidthProfile) -> Option<u32> {
        if self.addressing_mode != AddressingMode::Relative {
            return None;
        }
        let offset = profile.to_signed(*self.operand_cells().first()?);
        Some(profile.offset_address(self.address, self.length() as i64 + offset))
    }
}

/// Options controlling which memory range is disassembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisassemblyOptions {
    /// Address of the first instruction
    pub start_address: u32,

    /// Number of cells to cover; the last instruction may extend past it
    pub length: u32,
}

impl Default for DisassemblyOptions {
    fn default() -> Self {
        Self {
            start_address: DEFAULT_ORIGIN,
            length: 0,
        }
    }
}

/// Disassemble a range of memory into instructions.
///
/// ```
/// use sim6502::{disassemble, DisassemblyOptions, Memory, WidthProfile};
///
/// let mut memory = Memory::new(WidthProfile::eight_bit());
/// memory.load(0x600, &[0xA9, 0x01, 0x8D, 0x00, 0x02]);
///
/// let listing = disassemble(&memory, DisassemblyOptions { start_address: 0x600, length: 5 });
/// assert_eq!(listing.len(), 2);
/// assert_eq!(listing[1].mnemonic, "STA");
/// ```
pub fn disassemble<M: MemoryBus>(memory: &M, options: DisassemblyOptions) -> Vec<Instruction> {
    let profile = memory.profile();
    walk(
        |address| memory.read(address),
        options.start_address,
        options.length,
        &profile,
    )
}

/// Disassemble a cell slice that would be loaded at `start_address`.
/// Cells past the end of the slice read as 0.
pub fn disassemble_cells(
    cells: &[u32],
    start_address: u32,
    profile: &WidthProfile,
) -> Vec<Instruction> {
    walk(
        |address| {
            address
                .checked_sub(start_address)
                .and_then(|offset| cells.get(offset as usize))
                .copied()
                .unwrap_or(0)
        },
        start_address,
        cells.len() as u32,
        profile,
    )
}

fn walk(
    fetch: impl Fn(u32) -> u32,
    start_address: u32,
    length: u32,
    profile: &WidthProfile,
) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut offset: u64 = 0;

    while offset < length as u64 {
        let address = profile.offset_address(start_address, offset as i64);
        let instr = decoder::decode_instruction(&fetch, address, profile);
        offset += instr.length() as u64;
        instructions.push(instr);
    }

    instructions
}
