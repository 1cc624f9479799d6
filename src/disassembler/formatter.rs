//! Formatting functions for disassembled instructions
//!
//! Numbers print in uppercase hex: data cells with `dw/4` digits, addresses
//! with `aw/4` digits. Branch operands print as absolute targets.

use crate::addressing::AddressingMode;
use crate::disassembler::Instruction;
use crate::width::WidthProfile;

/// Format a single instruction as assembly text, e.g. `LDA #$42`
pub fn format_instruction(instr: &Instruction, profile: &WidthProfile) -> String {
    let operand = format_operand(instr, profile);

    if operand.is_empty() {
        instr.mnemonic.to_string()
    } else {
        format!("{} {}", instr.mnemonic, operand)
    }
}

/// Format the operand based on addressing mode
pub fn format_operand(instr: &Instruction, profile: &WidthProfile) -> String {
    use AddressingMode::*;

    if instr.is_unknown() {
        return String::new();
    }

    let data = |value: u32| format!("${:0width$X}", value, width = profile.data_digits());
    let address = |value: u32| format!("${:0width$X}", value, width = profile.address_digits());
    let value = instr.operand_value(profile).unwrap_or(0);

    match instr.addressing_mode {
        Implied if is_accumulator_shift(instr.mnemonic) => "A".to_string(),
        Implied => String::new(),
        Immediate => format!("#{}", data(value)),
        ZeroPage => data(value),
        ZeroPageX => format!("{},X", data(value)),
        ZeroPageY => format!("{},Y", data(value)),
        Absolute => address(value),
        AbsoluteX => format!("{},X", address(value)),
        AbsoluteY => format!("{},Y", address(value)),
        Indirect => format!("({})", address(value)),
        IndirectX => format!("({},X)", data(value)),
        IndirectY => format!("({}),Y", data(value)),
        Relative => address(instr.branch_target(profile).unwrap_or(0)),
    }
}

fn is_accumulator_shift(mnemonic: &str) -> bool {
    matches!(mnemonic, "ASL" | "LSR" | "ROL" | "ROR")
}

/// Width of the cells column: room for three cells plus one space.
fn cells_column_width(profile: &WidthProfile) -> usize {
    3 * (profile.data_digits() + 1) + 1
}

/// One listing line: `$ADDR    c1 c2 c3  MNEM operand`
pub fn format_line(instr: &Instruction, profile: &WidthProfile) -> String {
    let cells = instr
        .cells
        .iter()
        .map(|cell| format!("{:0width$X}", cell, width = profile.data_digits()))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "${:0aw$X}    {:<cw$}{}",
        instr.address,
        cells,
        format_instruction(instr, profile),
        aw = profile.address_digits(),
        cw = cells_column_width(profile)
    )
}

/// Header and rule line sized to the profile.
pub fn format_header(profile: &WidthProfile) -> String {
    let address_column = profile.address_digits() + 5;
    let header = format!(
        "{:<aw$}{:<cw$}Disassembly",
        "Address",
        "Hexdump",
        aw = address_column,
        cw = cells_column_width(profile)
    );
    let rule = "-".repeat(address_column + cells_column_width(profile) + 16);
    format!("{}\n{}", header, rule)
}

/// Full listing: header, rule, then one line per instruction.
pub fn format_listing(instructions: &[Instruction], profile: &WidthProfile) -> String {
    let mut out = format_header(profile);
    for instr in instructions {
        out.push('\n');
        out.push_str(&format_line(instr, profile));
    }
    out
}
