//! # Addressing Modes
//!
//! This module defines the 12 operand forms shared by the assembler, the
//! disassembler and the CPU. The enum order is the opcode table's column
//! order, which is also the priority order the assembler tries operand
//! patterns in and the order the decoder scans a row in.

use crate::width::WidthProfile;

/// Addressing mode enumeration, in opcode-table column order.
///
/// # Operand Sizes
///
/// - **0 cells**: Implied (including the accumulator forms of the shifts)
/// - **1 cell**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, IndirectX, IndirectY, Relative
/// - **address limbs** (2 cells, or 1 on the 32-bit bus): Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand. Also covers `ASL A` style accumulator forms.
    ///
    /// Examples: CLC, RTS, LSR A
    Implied,

    /// Constant operand in the instruction stream.
    ///
    /// Example: LDA #$10
    Immediate,

    /// Address within the first data-width page.
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address plus X, wrapping within the zero page.
    ///
    /// Example: LDA $80,X
    ZeroPageX,

    /// Zero page address plus Y, wrapping within the zero page.
    ///
    /// Example: LDX $80,Y
    ZeroPageY,

    /// Full address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// Full address plus X.
    ///
    /// Example: LDA $1234,X
    AbsoluteX,

    /// Full address plus Y.
    ///
    /// Example: LDA $1234,Y
    AbsoluteY,

    /// Jump through a pointer. Only used by JMP.
    ///
    /// Example: JMP ($1234)
    Indirect,

    /// Indexed indirect: (ZP + X) then dereference.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y.
    ///
    /// Example: LDA ($40),Y
    IndirectY,

    /// Signed displacement used by the branches.
    ///
    /// Example: BNE loop
    Relative,
}

impl AddressingMode {
    /// All modes in column order.
    pub const ALL: [AddressingMode; 12] = [
        AddressingMode::Implied,
        AddressingMode::Immediate,
        AddressingMode::ZeroPage,
        AddressingMode::ZeroPageX,
        AddressingMode::ZeroPageY,
        AddressingMode::Absolute,
        AddressingMode::AbsoluteX,
        AddressingMode::AbsoluteY,
        AddressingMode::Indirect,
        AddressingMode::IndirectX,
        AddressingMode::IndirectY,
        AddressingMode::Relative,
    ];

    /// Column index of this mode in the opcode table.
    pub const fn column(self) -> usize {
        self as usize
    }

    /// Whether the operand is a full address rather than a single cell.
    pub fn takes_address(self) -> bool {
        matches!(
            self,
            AddressingMode::Absolute
                | AddressingMode::AbsoluteX
                | AddressingMode::AbsoluteY
                | AddressingMode::Indirect
        )
    }

    /// Number of operand cells following the opcode.
    pub fn operand_cells(self, profile: &WidthProfile) -> u32 {
        match self {
            AddressingMode::Implied => 0,
            mode if mode.takes_address() => profile.address_limbs(),
            _ => 1,
        }
    }

    /// Total instruction length in cells, opcode included.
    ///
    /// ```
    /// use sim6502::{AddressingMode, WidthProfile};
    ///
    /// let p8 = WidthProfile::eight_bit();
    /// assert_eq!(AddressingMode::Implied.instruction_length(&p8), 1);
    /// assert_eq!(AddressingMode::Relative.instruction_length(&p8), 2);
    /// assert_eq!(AddressingMode::Absolute.instruction_length(&p8), 3);
    ///
    /// let p32 = WidthProfile::new(32).unwrap();
    /// assert_eq!(AddressingMode::Absolute.instruction_length(&p32), 2);
    /// ```
    pub fn instruction_length(self, profile: &WidthProfile) -> u32 {
        1 + self.operand_cells(profile)
    }
}
