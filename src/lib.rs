//! # 6502-Family Simulator
//!
//! An instruction-set simulator for the 6502 and its wide-bus relatives, with a
//! matching two-pass assembler and a disassembler. One set of formulas covers
//! three machines, selected by a [`WidthProfile`]:
//!
//! - the 8-bit 6502 (16-bit addresses),
//! - a 16-bit variant (32-bit addresses),
//! - a 32-bit variant (32-bit addresses).
//!
//! ## Quick Start
//!
//! ```rust
//! use sim6502::{Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
//! sim.assemble("LDA #$05\nADC #$05\nBRK").unwrap();
//!
//! sim.step().unwrap();
//! let report = sim.step().unwrap();
//! assert_eq!(report.registers.a, 0x0A);
//! ```
//!
//! ## Architecture
//!
//! - `width` - bus width profiles and the masks derived from them
//! - `memory` - the `MemoryBus` trait and the sparse `Memory` store
//! - `addressing` / `opcodes` - addressing modes and the shared opcode table
//! - `cpu` - CPU state and the fetch-decode-execute step
//! - `assembler` - two-pass assembler with label resolution
//! - `disassembler` - decoder and listing formatter
//! - `simulator` - session facade that ties the pieces to a host
//! - `wasm` - JavaScript bindings (feature `wasm`)
//!
//! The opcode table is the single source of truth: the assembler, the
//! disassembler and the CPU all derive their behaviour from it.

use std::fmt;

use thiserror::Error;

pub mod addressing;
pub mod assembler;
pub mod cpu;
pub mod disassembler;
pub mod memory;
pub mod opcodes;
pub mod simulator;
pub mod width;

// Internal instruction implementations (not part of public API)
mod instructions;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use addressing::AddressingMode;
pub use assembler::{assemble, AssemblerError, AssemblerOutput, AssemblerWarning};
pub use cpu::{CpuEvent, Registers, StepOutcome, CPU};
pub use disassembler::{disassemble, DisassemblyOptions, Instruction};
pub use memory::{Memory, MemoryBus, WriteObserver};
pub use opcodes::{OpcodeSpec, Operation, OPCODE_TABLE};
pub use simulator::{HostEvents, RunState, Simulator, SimulatorConfig, SimulatorError, StepReport};
pub use width::{ConfigurationError, WidthProfile};

/// Fatal conditions raised while executing an instruction.
///
/// The CPU restores its program counter to the faulting fetch address before
/// returning one of these, so no partial effect of the instruction is visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The cell at `pc` is not an opcode in the table.
    #[error("unknown opcode ${opcode:X} at ${pc:X}")]
    UnknownOpcode { opcode: u32, pc: u32 },

    /// The instruction exists but its behaviour is not simulated.
    ///
    /// Raised by CLI and SEI, since interrupts are not simulated.
    #[error("{mnemonic} at ${pc:X}: interrupts not implemented")]
    UnimplementedFeature { mnemonic: &'static str, pc: u32 },
}

impl ExecutionError {
    /// Address of the instruction that faulted.
    pub fn pc(&self) -> u32 {
        match self {
            ExecutionError::UnknownOpcode { pc, .. } => *pc,
            ExecutionError::UnimplementedFeature { pc, .. } => *pc,
        }
    }
}

/// Which way the stack pointer wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDirection {
    /// A push at SP=0 wrapped SP to the data mask.
    Filled,
    /// A pop at SP=data mask wrapped SP to 0.
    Emptied,
}

impl fmt::Display for StackDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackDirection::Filled => f.write_str("filled"),
            StackDirection::Emptied => f.write_str("emptied"),
        }
    }
}

/// Non-fatal conditions reported while executing. Execution continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionWarning {
    #[error("stack {direction}, wrapping (SP=${sp:X})")]
    StackWraparound { direction: StackDirection, sp: u32 },
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// BRK executed at `pc`.
    Break { pc: u32 },
    /// The instruction at `pc` transferred control to address 0.
    EndOfProgram { pc: u32 },
    /// A fatal execution error.
    Fault(ExecutionError),
}

impl HaltReason {
    /// Address of the instruction that stopped the run.
    pub fn pc(&self) -> u32 {
        match self {
            HaltReason::Break { pc } | HaltReason::EndOfProgram { pc } => *pc,
            HaltReason::Fault(err) => err.pc(),
        }
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Break { pc } => write!(f, "BRK at ${:X}", pc),
            HaltReason::EndOfProgram { pc } => {
                write!(f, "program end, jump to $0000 from ${:X}", pc)
            }
            HaltReason::Fault(err) => write!(f, "{}", err),
        }
    }
}
