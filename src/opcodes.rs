//! # Opcode Table
//!
//! [`OPCODE_TABLE`] is the single source of truth for instruction encoding. Each
//! row names a mnemonic, the [`Operation`] the CPU dispatches to, and one opcode
//! slot per [`AddressingMode`] column. The assembler reads a row to encode, and
//! the disassembler and the CPU read [`DECODE_TABLE`], which is derived from the
//! rows at compile time.
//!
//! The table covers the 56 documented NMOS mnemonics plus `WDM` (0x42), a
//! pseudo-op that writes the accumulator to the host as a character.

use crate::addressing::AddressingMode;

/// The handler variant an opcode dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    Wdm,
}

/// One row of the opcode table.
///
/// # Examples
///
/// ```
/// use sim6502::{AddressingMode, opcodes::find_mnemonic};
///
/// let lda = find_mnemonic("lda").unwrap();
/// assert_eq!(lda.opcode(AddressingMode::Immediate), Some(0xA9));
/// assert_eq!(lda.opcode(AddressingMode::ZeroPageY), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeSpec {
    /// Upper-case mnemonic.
    pub mnemonic: &'static str,

    /// Handler variant shared by every opcode in the row.
    pub operation: Operation,

    /// Opcode per addressing-mode column, `None` where the form does not exist.
    pub opcodes: [Option<u8>; 12],
}

impl OpcodeSpec {
    /// Opcode for `mode`, if this mnemonic has that form.
    pub fn opcode(&self, mode: AddressingMode) -> Option<u8> {
        self.opcodes[mode.column()]
    }
}

/// Result of decoding one opcode cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub mnemonic: &'static str,
    pub operation: Operation,
    pub mode: AddressingMode,
}

macro_rules! slot {
    (-) => {
        None
    };
    ($code:literal) => {
        Some($code)
    };
}

macro_rules! opcode_row {
    ($mnemonic:literal, $operation:ident, [$($slot:tt),*]) => {
        OpcodeSpec {
            mnemonic: $mnemonic,
            operation: Operation::$operation,
            opcodes: [$(slot!($slot)),*],
        }
    };
}

/// Number of rows in [`OPCODE_TABLE`].
pub const OPCODE_ROWS: usize = 57;

/// The opcode table.
///
/// Columns: Impl, Imm, ZP, ZPX, ZPY, ABS, ABSX, ABSY, IND, INDX, INDY, REL.
#[rustfmt::skip]
pub const OPCODE_TABLE: [OpcodeSpec; OPCODE_ROWS] = [
    //                     Impl  Imm   ZP    ZPX   ZPY   ABS   ABSX  ABSY  IND   INDX  INDY  REL
    opcode_row!("ADC", Adc, [-,    0x69, 0x65, 0x75, -,    0x6D, 0x7D, 0x79, -,    0x61, 0x71, -   ]),
    opcode_row!("AND", And, [-,    0x29, 0x25, 0x35, -,    0x2D, 0x3D, 0x39, -,    0x21, 0x31, -   ]),
    opcode_row!("ASL", Asl, [0x0A, -,    0x06, 0x16, -,    0x0E, 0x1E, -,    -,    -,    -,    -   ]),
    opcode_row!("BIT", Bit, [-,    -,    0x24, -,    -,    0x2C, -,    -,    -,    -,    -,    -   ]),
    opcode_row!("BPL", Bpl, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0x10]),
    opcode_row!("BMI", Bmi, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0x30]),
    opcode_row!("BVC", Bvc, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0x50]),
    opcode_row!("BVS", Bvs, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0x70]),
    opcode_row!("BCC", Bcc, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0x90]),
    opcode_row!("BCS", Bcs, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0xB0]),
    opcode_row!("BNE", Bne, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0xD0]),
    opcode_row!("BEQ", Beq, [-,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    0xF0]),
    opcode_row!("BRK", Brk, [0x00, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("CMP", Cmp, [-,    0xC9, 0xC5, 0xD5, -,    0xCD, 0xDD, 0xD9, -,    0xC1, 0xD1, -   ]),
    opcode_row!("CPX", Cpx, [-,    0xE0, 0xE4, -,    -,    0xEC, -,    -,    -,    -,    -,    -   ]),
    opcode_row!("CPY", Cpy, [-,    0xC0, 0xC4, -,    -,    0xCC, -,    -,    -,    -,    -,    -   ]),
    opcode_row!("DEC", Dec, [-,    -,    0xC6, 0xD6, -,    0xCE, 0xDE, -,    -,    -,    -,    -   ]),
    opcode_row!("EOR", Eor, [-,    0x49, 0x45, 0x55, -,    0x4D, 0x5D, 0x59, -,    0x41, 0x51, -   ]),
    opcode_row!("CLC", Clc, [0x18, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("SEC", Sec, [0x38, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("CLI", Cli, [0x58, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("SEI", Sei, [0x78, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("CLV", Clv, [0xB8, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("CLD", Cld, [0xD8, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("SED", Sed, [0xF8, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("INC", Inc, [-,    -,    0xE6, 0xF6, -,    0xEE, 0xFE, -,    -,    -,    -,    -   ]),
    opcode_row!("JMP", Jmp, [-,    -,    -,    -,    -,    0x4C, -,    -,    0x6C, -,    -,    -   ]),
    opcode_row!("JSR", Jsr, [-,    -,    -,    -,    -,    0x20, -,    -,    -,    -,    -,    -   ]),
    opcode_row!("LDA", Lda, [-,    0xA9, 0xA5, 0xB5, -,    0xAD, 0xBD, 0xB9, -,    0xA1, 0xB1, -   ]),
    opcode_row!("LDX", Ldx, [-,    0xA2, 0xA6, -,    0xB6, 0xAE, -,    0xBE, -,    -,    -,    -   ]),
    opcode_row!("LDY", Ldy, [-,    0xA0, 0xA4, 0xB4, -,    0xAC, 0xBC, -,    -,    -,    -,    -   ]),
    opcode_row!("LSR", Lsr, [0x4A, -,    0x46, 0x56, -,    0x4E, 0x5E, -,    -,    -,    -,    -   ]),
    opcode_row!("NOP", Nop, [0xEA, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("ORA", Ora, [-,    0x09, 0x05, 0x15, -,    0x0D, 0x1D, 0x19, -,    0x01, 0x11, -   ]),
    opcode_row!("TAX", Tax, [0xAA, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("TXA", Txa, [0x8A, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("DEX", Dex, [0xCA, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("INX", Inx, [0xE8, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("TAY", Tay, [0xA8, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("TYA", Tya, [0x98, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("DEY", Dey, [0x88, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("INY", Iny, [0xC8, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("ROR", Ror, [0x6A, -,    0x66, 0x76, -,    0x6E, 0x7E, -,    -,    -,    -,    -   ]),
    opcode_row!("ROL", Rol, [0x2A, -,    0x26, 0x36, -,    0x2E, 0x3E, -,    -,    -,    -,    -   ]),
    opcode_row!("RTI", Rti, [0x40, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("RTS", Rts, [0x60, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("SBC", Sbc, [-,    0xE9, 0xE5, 0xF5, -,    0xED, 0xFD, 0xF9, -,    0xE1, 0xF1, -   ]),
    opcode_row!("STA", Sta, [-,    -,    0x85, 0x95, -,    0x8D, 0x9D, 0x99, -,    0x81, 0x91, -   ]),
    opcode_row!("TXS", Txs, [0x9A, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("TSX", Tsx, [0xBA, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("PHA", Pha, [0x48, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("PLA", Pla, [0x68, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("PHP", Php, [0x08, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("PLP", Plp, [0x28, -,    -,    -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
    opcode_row!("STX", Stx, [-,    -,    0x86, -,    0x96, 0x8E, -,    -,    -,    -,    -,    -   ]),
    opcode_row!("STY", Sty, [-,    -,    0x84, 0x94, -,    0x8C, -,    -,    -,    -,    -,    -   ]),
    opcode_row!("WDM", Wdm, [-,    0x42, 0x42, -,    -,    -,    -,    -,    -,    -,    -,    -   ]),
];

const fn build_decode_table() -> [Option<Decoded>; 256] {
    let mut table: [Option<Decoded>; 256] = [None; 256];
    let mut row = 0;
    while row < OPCODE_ROWS {
        let spec = &OPCODE_TABLE[row];
        let mut column = 0;
        while column < AddressingMode::ALL.len() {
            if let Some(code) = spec.opcodes[column] {
                // first (row, column) match wins
                if table[code as usize].is_none() {
                    table[code as usize] = Some(Decoded {
                        mnemonic: spec.mnemonic,
                        operation: spec.operation,
                        mode: AddressingMode::ALL[column],
                    });
                }
            }
            column += 1;
        }
        row += 1;
    }
    table
}

/// Opcode cell to handler variant, derived from [`OPCODE_TABLE`].
pub const DECODE_TABLE: [Option<Decoded>; 256] = build_decode_table();

/// Decodes an opcode cell. Cells above `0xFF` never decode.
///
/// ```
/// use sim6502::{AddressingMode, opcodes::{decode, Operation}};
///
/// let d = decode(0x6C).unwrap();
/// assert_eq!(d.operation, Operation::Jmp);
/// assert_eq!(d.mode, AddressingMode::Indirect);
/// assert!(decode(0x02).is_none());
/// assert!(decode(0x1EA).is_none());
/// ```
pub fn decode(cell: u32) -> Option<Decoded> {
    if cell > 0xFF {
        return None;
    }
    DECODE_TABLE[cell as usize]
}

/// Looks up a row by mnemonic, ignoring case.
pub fn find_mnemonic(mnemonic: &str) -> Option<&'static OpcodeSpec> {
    OPCODE_TABLE
        .iter()
        .find(|spec| spec.mnemonic.eq_ignore_ascii_case(mnemonic))
}
