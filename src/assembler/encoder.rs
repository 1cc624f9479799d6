//! Instruction encoder
//!
//! Picks an addressing mode for a parsed statement and emits its cells. Modes
//! are tried in opcode-table column order and the first one whose operand
//! syntax, value range and opcode slot all match wins, so `LDA $10` is zero
//! page while `JMP $10` is absolute.
//!
//! Encoding is pure: the same statement at the same address with the same
//! labels always yields the same cells. Pass 1 measures with
//! [`Resolution::Provisional`], pass 2 emits with [`Resolution::Final`].

use thiserror::Error;

use crate::addressing::AddressingMode;
use crate::assembler::parser::{Operand, Statement, Value};
use crate::assembler::symbol_table::LabelTable;
use crate::opcodes::{find_mnemonic, OpcodeSpec};
use crate::width::WidthProfile;

/// Why a statement could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("unknown mnemonic {0}")]
    UnknownMnemonic(String),

    #[error("invalid operand for {mnemonic}")]
    InvalidOperand { mnemonic: String },

    #[error("undefined label {0}")]
    UndefinedLabel(String),

    #[error("value ${value:X} exceeds ${max:X}")]
    ValueOutOfRange { value: u64, max: u32 },
}

/// How label references are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Unknown labels get a placeholder; only the length matters.
    Provisional,
    /// Every label must be defined.
    Final,
}

/// Everything encoding depends on besides the statement itself.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub profile: WidthProfile,
    /// Address of the first cell this statement emits
    pub address: u32,
    pub labels: &'a LabelTable,
    pub resolution: Resolution,
}

/// Cells for one statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    /// Chosen addressing mode, `None` for data and empty lines
    pub mode: Option<AddressingMode>,
    pub cells: Vec<u32>,
    /// Non-fatal diagnostic, e.g. a branch out of range
    pub warning: Option<String>,
}

impl Encoded {
    pub fn len(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Number of cells `statement` occupies, or 0 if it cannot be encoded yet.
pub fn measure_length(statement: &Statement, ctx: &EncodeContext) -> u32 {
    encode_statement(statement, ctx)
        .map(|encoded| encoded.len())
        .unwrap_or(0)
}

/// Encode a data or instruction statement. Origin and empty statements emit nothing.
///
/// ```
/// use sim6502::assembler::encoder::{encode_statement, EncodeContext, Resolution};
/// use sim6502::assembler::parser::parse_line;
/// use sim6502::assembler::symbol_table::LabelTable;
/// use sim6502::WidthProfile;
///
/// let labels = LabelTable::new();
/// let ctx = EncodeContext {
///     profile: WidthProfile::eight_bit(),
///     address: 0x600,
///     labels: &labels,
///     resolution: Resolution::Final,
/// };
/// let line = parse_line(1, "STA $0200,X").unwrap();
/// let encoded = encode_statement(&line.statement, &ctx).unwrap();
/// assert_eq!(encoded.cells, vec![0x9D, 0x00, 0x02]);
/// ```
pub fn encode_statement(statement: &Statement, ctx: &EncodeContext) -> Result<Encoded, EncodeError> {
    match statement {
        Statement::Empty | Statement::Origin(_) => Ok(Encoded::default()),
        Statement::Dcb(values) => encode_dcb(values, ctx),
        Statement::Instruction { mnemonic, operand } => {
            let spec = find_mnemonic(mnemonic)
                .ok_or_else(|| EncodeError::UnknownMnemonic(mnemonic.clone()))?;
            encode_instruction(spec, operand, ctx)
        }
    }
}

fn encode_dcb(values: &[u64], ctx: &EncodeContext) -> Result<Encoded, EncodeError> {
    let max = ctx.profile.data_mask();
    let cells = values
        .iter()
        .map(|&value| {
            if value > max as u64 {
                Err(EncodeError::ValueOutOfRange { value, max })
            } else {
                Ok(value as u32)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Encoded {
        mode: None,
        cells,
        warning: None,
    })
}

fn encode_instruction(
    spec: &OpcodeSpec,
    operand: &Operand,
    ctx: &EncodeContext,
) -> Result<Encoded, EncodeError> {
    for mode in AddressingMode::ALL {
        let Some(opcode) = spec.opcode(mode) else {
            continue;
        };
        if let Some((operand_cells, warning)) = match_mode(mode, operand, ctx)? {
            let mut cells = Vec::with_capacity(1 + operand_cells.len());
            cells.push(opcode as u32);
            cells.extend(operand_cells);
            return Ok(Encoded {
                mode: Some(mode),
                cells,
                warning,
            });
        }
    }

    Err(EncodeError::InvalidOperand {
        mnemonic: spec.mnemonic.to_string(),
    })
}

type ModeMatch = Option<(Vec<u32>, Option<String>)>;

/// Operand cells for `mode`, or `None` if the operand does not fit it.
fn match_mode(
    mode: AddressingMode,
    operand: &Operand,
    ctx: &EncodeContext,
) -> Result<ModeMatch, EncodeError> {
    use AddressingMode::*;

    let profile = &ctx.profile;
    let dm = profile.data_mask() as u64;
    let am = profile.address_mask() as u64;

    let cells = match (mode, operand) {
        (Implied, Operand::None) => Some(Vec::new()),
        (Implied, Operand::Direct(Value::Label(name))) if name.eq_ignore_ascii_case("A") => {
            Some(Vec::new())
        }

        (Immediate, Operand::Immediate(value)) if *value <= dm => Some(vec![*value as u32]),
        (Immediate, Operand::ImmediateLow(name)) => {
            let address = resolve(name, ctx)?;
            Some(vec![address & profile.data_mask()])
        }
        (Immediate, Operand::ImmediateHigh(name)) => {
            let address = resolve(name, ctx)? as u64;
            Some(vec![((address >> profile.data_width()) & dm) as u32])
        }

        (ZeroPage, Operand::Direct(Value::Number(n)))
        | (ZeroPageX, Operand::IndexedX(Value::Number(n)))
        | (ZeroPageY, Operand::IndexedY(Value::Number(n)))
        | (IndirectX, Operand::IndirectX(Value::Number(n)))
        | (IndirectY, Operand::IndirectY(Value::Number(n)))
            if *n <= dm =>
        {
            Some(vec![*n as u32])
        }

        (Absolute, Operand::Direct(value))
        | (AbsoluteX, Operand::IndexedX(value))
        | (AbsoluteY, Operand::IndexedY(value))
        | (Indirect, Operand::Indirect(value)) => match value {
            Value::Number(n) if *n <= am => Some(address_cells(*n as u32, profile)),
            Value::Number(_) => None,
            Value::Label(name) => Some(address_cells(resolve(name, ctx)?, profile)),
        },

        (Relative, Operand::Direct(value)) => {
            let target = match value {
                Value::Number(n) if *n <= am => *n as u32,
                Value::Number(_) => return Ok(None),
                Value::Label(name) => resolve(name, ctx)?,
            };
            let (offset, warning) = branch_offset(target, ctx);
            return Ok(Some((vec![offset], warning)));
        }

        _ => None,
    };

    Ok(cells.map(|cells| (cells, None)))
}

/// Address bound to `name`; in provisional mode an unknown label resolves to
/// the current address so that branches measure without warnings.
fn resolve(name: &str, ctx: &EncodeContext) -> Result<u32, EncodeError> {
    match (ctx.labels.address_of(name), ctx.resolution) {
        (Some(address), _) => Ok(address),
        (None, Resolution::Provisional) => Ok(ctx.address),
        (None, Resolution::Final) => Err(EncodeError::UndefinedLabel(name.to_string())),
    }
}

/// An absolute address as `address_limbs` cells, low limb first.
fn address_cells(address: u32, profile: &WidthProfile) -> Vec<u32> {
    if profile.address_limbs() == 1 {
        vec![address & profile.address_mask()]
    } else {
        let dm = profile.data_mask();
        vec![address & dm, (address >> profile.data_width()) & dm]
    }
}

/// Encoded displacement from the cell after the branch to `target`.
fn branch_offset(target: u32, ctx: &EncodeContext) -> (u32, Option<String>) {
    let profile = &ctx.profile;
    let next = ctx.address as i64 + AddressingMode::Relative.instruction_length(profile) as i64;
    let displacement = target as i64 - next;

    let modulus = profile.data_mask() as i64 + 1;
    let encoded = displacement.rem_euclid(modulus) as u32;

    let half = modulus / 2;
    let warning = (ctx.resolution == Resolution::Final
        && !(-half..half).contains(&displacement))
    .then(|| {
        format!(
            "branch to ${:0width$X} is out of range ({} cells)",
            target,
            displacement,
            width = profile.address_digits()
        )
    });

    (encoded, warning)
}
