//! 6502 Assembler Module
//!
//! Converts assembly language source code into machine cells for any
//! [`WidthProfile`].
//!
//! Assembly runs in two passes over the same parsed lines:
//!
//! 1. **Index**: every line is measured with provisional label resolution and
//!    labels are bound to the cursor before their line. A duplicate label
//!    aborts here, before any other diagnostic.
//! 2. **Encode**: every line is encoded against the complete label table into
//!    in-memory segments. The first failing line aborts the whole assembly.
//!
//! Nothing touches memory until [`AssemblerOutput::write_to`] is called, so a
//! failed assembly never leaves half a program behind.

pub mod encoder;
pub mod lexer;
pub mod parser;
pub mod source_map;
pub mod symbol_table;

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::memory::MemoryBus;
use crate::width::WidthProfile;
use encoder::{encode_statement, measure_length, EncodeContext, Resolution};
use parser::{parse_line, AssemblyLine, Statement};
use source_map::SourceMap;
use symbol_table::LabelTable;

/// Where code goes when no origin directive precedes it.
pub const DEFAULT_ORIGIN: u32 = 0x600;

/// An error that aborts assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    /// A label was defined twice.
    #[error("label {name} already defined at line {line} (first defined at line {first_line}): {text}")]
    LabelConflict {
        line: usize,
        name: String,
        first_line: usize,
        text: String,
    },

    /// A line could not be parsed or encoded.
    #[error("syntax error line {line}: {text} ({reason})")]
    Assembly {
        line: usize,
        text: String,
        reason: String,
    },

    /// An origin directive or emitted cell lies beyond the address space.
    #[error("line {line}: unable to relocate code outside memory (${address:X})")]
    AddressOutOfRange { line: usize, address: u64 },

    /// The source assembled to zero cells.
    #[error("no code to run")]
    EmptyProgram,
}

impl AssemblerError {
    /// 1-based source line, if the error belongs to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            AssemblerError::LabelConflict { line, .. }
            | AssemblerError::Assembly { line, .. }
            | AssemblerError::AddressOutOfRange { line, .. } => Some(*line),
            AssemblerError::EmptyProgram => None,
        }
    }
}

/// A non-fatal warning from the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerWarning {
    /// Line number where warning occurred
    pub line: usize,

    /// Warning message
    pub message: String,
}

impl fmt::Display for AssemblerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A run of consecutive cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: u32,
    pub cells: Vec<u32>,
}

/// Complete output from assembling source code
#[derive(Debug, Clone)]
pub struct AssemblerOutput {
    /// Address of the first emitted cell
    pub origin: u32,

    /// Number of cells emitted, sentinel excluded
    pub length: u32,

    /// Emitted cells, one segment per contiguous run
    pub segments: Vec<Segment>,

    /// Address of the trailing zero cell, `None` if code ends at the top of memory
    pub sentinel: Option<u32>,

    /// Label table with all defined labels
    pub labels: LabelTable,

    /// Source map for annotating halts and listings
    pub source_map: SourceMap,

    /// Non-fatal warnings encountered during assembly
    pub warnings: Vec<AssemblerWarning>,
}

impl AssemblerOutput {
    /// Every emitted `(address, cell)` pair in emission order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.segments.iter().flat_map(|segment| {
            segment
                .cells
                .iter()
                .enumerate()
                .map(move |(i, &cell)| (segment.start + i as u32, cell))
        })
    }

    /// Commit the program, then its sentinel, to memory.
    pub fn write_to<M: MemoryBus>(&self, memory: &mut M) {
        for (address, cell) in self.cells() {
            memory.write(address, cell);
        }
        if let Some(address) = self.sentinel {
            memory.write(address, 0);
        }
    }
}

/// Assemble source code for the given width profile.
///
/// ```
/// use sim6502::{assemble, WidthProfile};
///
/// let output = assemble("start: LDX #$00\n  INX\n  BNE start\n", WidthProfile::eight_bit()).unwrap();
/// assert_eq!(output.origin, 0x600);
/// assert_eq!(output.length, 5);
/// assert_eq!(output.labels.address_of("start"), Some(0x600));
/// assert_eq!(output.segments[0].cells, vec![0xA2, 0x00, 0xE8, 0xD0, 0xFB]);
/// assert_eq!(output.sentinel, Some(0x605));
/// ```
pub fn assemble(source: &str, profile: WidthProfile) -> Result<AssemblerOutput, AssemblerError> {
    let lines: Vec<Result<AssemblyLine, AssemblerError>> = source
        .lines()
        .enumerate()
        .map(|(index, text)| {
            parse_line(index + 1, text).map_err(|reason| AssemblerError::Assembly {
                line: index + 1,
                text: text.trim().to_string(),
                reason,
            })
        })
        .collect();

    info!("indexing labels");
    let labels = index_labels(&lines, profile)?;
    info!(count = labels.len(), "found {} label(s)", labels.len());

    info!("assembling code");
    let output = encode_lines(&lines, profile, labels)?;
    info!(
        origin = output.origin,
        length = output.length,
        "code assembled successfully, {} cells",
        output.length
    );

    Ok(output)
}

/// Pass 1: bind every label to the cursor before its line.
fn index_labels(
    lines: &[Result<AssemblyLine, AssemblerError>],
    profile: WidthProfile,
) -> Result<LabelTable, AssemblerError> {
    let mut labels = LabelTable::new();
    let mut cursor = DEFAULT_ORIGIN as u64;
    let am = profile.address_mask() as u64;

    for line in lines.iter().flatten() {
        let line_start = cursor;

        match &line.statement {
            Statement::Origin(address) if *address <= am => cursor = *address,
            Statement::Origin(_) | Statement::Empty => {}
            statement => {
                let ctx = EncodeContext {
                    profile,
                    address: (cursor & am) as u32,
                    labels: &labels,
                    resolution: Resolution::Provisional,
                };
                cursor += measure_length(statement, &ctx) as u64;
            }
        }

        if let Some(name) = &line.label {
            labels
                .define(name, (line_start & am) as u32, line.line_number)
                .map_err(|existing| AssemblerError::LabelConflict {
                    line: line.line_number,
                    name: name.clone(),
                    first_line: existing.defined_at,
                    text: line.text.trim().to_string(),
                })?;
            debug!(label = %name, address = line_start, "label defined");
        }
    }

    Ok(labels)
}

/// Pass 2: encode every line into segments.
fn encode_lines(
    lines: &[Result<AssemblyLine, AssemblerError>],
    profile: WidthProfile,
    labels: LabelTable,
) -> Result<AssemblerOutput, AssemblerError> {
    let am = profile.address_mask() as u64;
    let mut cursor = DEFAULT_ORIGIN as u64;
    let mut segments: Vec<Segment> = Vec::new();
    let mut source_map = SourceMap::new();
    let mut warnings = Vec::new();
    let mut length: u32 = 0;

    for line in lines {
        let line = line.as_ref().map_err(Clone::clone)?;

        let statement = match &line.statement {
            Statement::Empty => continue,
            Statement::Origin(address) => {
                if *address > am {
                    return Err(AssemblerError::AddressOutOfRange {
                        line: line.line_number,
                        address: *address,
                    });
                }
                cursor = *address;
                continue;
            }
            statement => statement,
        };

        let ctx = EncodeContext {
            profile,
            address: cursor as u32,
            labels: &labels,
            resolution: Resolution::Final,
        };
        let encoded =
            encode_statement(statement, &ctx).map_err(|err| AssemblerError::Assembly {
                line: line.line_number,
                text: line.text.trim().to_string(),
                reason: err.to_string(),
            })?;

        if encoded.is_empty() {
            continue;
        }

        let last = cursor + encoded.len() as u64 - 1;
        if last > am {
            return Err(AssemblerError::AddressOutOfRange {
                line: line.line_number,
                address: last,
            });
        }

        if let Some(message) = encoded.warning.clone() {
            warn!(line = line.line_number, "{}", message);
            warnings.push(AssemblerWarning {
                line: line.line_number,
                message,
            });
        }

        let start = cursor as u32;
        source_map.add_mapping(start, line.line_number, encoded.len());
        match segments.last_mut() {
            Some(segment) if segment.start as u64 + segment.cells.len() as u64 == cursor => {
                segment.cells.extend(&encoded.cells);
            }
            _ => segments.push(Segment {
                start,
                cells: encoded.cells.clone(),
            }),
        }

        length += encoded.len();
        cursor = last + 1;
    }

    if length == 0 {
        return Err(AssemblerError::EmptyProgram);
    }

    source_map.finalize();

    Ok(AssemblerOutput {
        origin: segments.first().map(|s| s.start).unwrap_or(DEFAULT_ORIGIN),
        length,
        segments,
        sentinel: (cursor <= am).then_some(cursor as u32),
        labels,
        source_map,
        warnings,
    })
}
