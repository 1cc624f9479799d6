//! # CPU State and Execution
//!
//! This module contains the CPU struct representing processor state for any
//! supported bus width, and the fetch-decode-execute step.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: Accumulator (A), index registers (X, Y), masked to the data width
//! - **Program counter** (PC): address-width pointer to the next instruction
//! - **Stack pointer** (SP): data-width offset into the stack bank
//! - **Status flags**: N, V, D, I, Z, C (individual bool fields). There is no B
//!   latch: bits `0x30` of the packed status always read as 1.
//! - **Instruction counter**: number of instructions executed since reset
//!
//! ## Execution Model
//!
//! - `step()`: Execute one instruction
//! - `run_for_instructions()`: Execute until a budget is used up or the program stops
//!
//! Before every fetch the cell at `$FE` is refreshed with a random value in
//! `0..=255`, so programs can read it as a random source.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::addressing::AddressingMode;
use crate::instructions;
use crate::memory::{MemoryBus, RANDOM_CELL};
use crate::opcodes::decode;
use crate::width::WidthProfile;
use crate::{ExecutionError, ExecutionWarning, StackDirection};

/// Program counter after reset.
pub const RESET_PC: u32 = 0x600;

/// Stack pointer after reset.
pub const RESET_SP: u32 = 0xFF;

/// Status register after reset. Bits 4 and 5 always read as 1.
pub const RESET_STATUS: u32 = 0x30;

const FLAG_D: u32 = 0x08;
const FLAG_I: u32 = 0x04;
const FLAG_Z: u32 = 0x02;
const FLAG_C: u32 = 0x01;

/// Side effects the CPU produces besides register and memory changes.
///
/// Collected during [`CPU::step`] and drained with [`CPU::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuEvent {
    Warning(ExecutionWarning),
    /// WDM wrote the accumulator to the host.
    Output(u32),
}

/// What a successfully executed instruction means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// BRK at `pc`.
    Break { pc: u32 },
    /// The instruction at `pc` left the program counter at 0.
    EndOfProgram { pc: u32 },
}

/// Snapshot of the register file.
///
/// The `Display` form is the register report shown by hosts:
///
/// ```text
/// A=$00 X=$00 Y=$00
/// SP=$FF PC=$0600
/// NV-BDIZC
/// 00110000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u32,
    pub x: u32,
    pub y: u32,
    pub sp: u32,
    pub pc: u32,
    /// Packed status, N at bit `data_width - 1` and V one below.
    pub status: u32,
    pub profile: WidthProfile,
}

impl Registers {
    /// The status flags packed into the classic 8-bit NV-BDIZC layout.
    pub fn status_byte(&self) -> u8 {
        let mut byte = (self.status & 0x3F) as u8;
        if self.status & self.profile.sign_bit() != 0 {
            byte |= 0x80;
        }
        if self.status & self.profile.overflow_bit() != 0 {
            byte |= 0x40;
        }
        byte
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dd = self.profile.data_digits();
        let ad = self.profile.address_digits();
        writeln!(
            f,
            "A=${:0dd$X} X=${:0dd$X} Y=${:0dd$X}",
            self.a,
            self.x,
            self.y,
            dd = dd
        )?;
        writeln!(f, "SP=${:0dd$X} PC=${:0ad$X}", self.sp, self.pc, dd = dd, ad = ad)?;
        writeln!(f, "NV-BDIZC")?;
        write!(f, "{:08b}", self.status_byte())
    }
}

/// CPU state and execution context.
///
/// Generic over the memory implementation via the `MemoryBus` trait. The width
/// profile is taken from the bus.
///
/// # Examples
///
/// ```
/// use sim6502::{CPU, Memory, WidthProfile};
///
/// let mut memory = Memory::new(WidthProfile::eight_bit());
/// memory.load(0x600, &[0xA9, 0x42]); // LDA #$42
///
/// let mut cpu = CPU::with_seed(memory, 1);
/// assert_eq!(cpu.pc(), 0x600);
/// assert_eq!(cpu.sp(), 0xFF);
///
/// cpu.step().unwrap();
/// assert_eq!(cpu.a(), 0x42);
/// assert_eq!(cpu.pc(), 0x602);
/// ```
pub struct CPU<M: MemoryBus> {
    pub(crate) profile: WidthProfile,

    /// Accumulator register
    pub(crate) a: u32,

    /// X index register
    pub(crate) x: u32,

    /// Y index register
    pub(crate) y: u32,

    /// Program counter (address of next cell to fetch)
    pub(crate) pc: u32,

    /// Stack pointer (stack base + sp gives the cell address)
    pub(crate) sp: u32,

    pub(crate) flag_n: bool,
    pub(crate) flag_v: bool,
    pub(crate) flag_d: bool,
    pub(crate) flag_i: bool,
    pub(crate) flag_z: bool,
    pub(crate) flag_c: bool,

    /// Address the current instruction was fetched from
    pub(crate) instruction_pc: u32,

    /// Instructions executed since reset
    pub(crate) instructions: u64,

    pub(crate) events: Vec<CpuEvent>,
    rng: StdRng,

    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a CPU in the reset state with an entropy-seeded random source.
    pub fn new(memory: M) -> Self {
        Self::with_rng(memory, StdRng::from_entropy())
    }

    /// Creates a CPU whose `$FE` random cell follows a reproducible sequence.
    pub fn with_seed(memory: M, seed: u64) -> Self {
        Self::with_rng(memory, StdRng::seed_from_u64(seed))
    }

    fn with_rng(memory: M, rng: StdRng) -> Self {
        let profile = memory.profile();
        Self {
            profile,
            a: 0,
            x: 0,
            y: 0,
            pc: RESET_PC,
            sp: RESET_SP,
            flag_n: false,
            flag_v: false,
            flag_d: false,
            flag_i: false,
            flag_z: false,
            flag_c: false,
            instruction_pc: RESET_PC,
            instructions: 0,
            events: Vec::new(),
            rng,
            memory,
        }
    }

    /// Restores the register file to its power-on values.
    ///
    /// A=X=Y=0, SP=$FF, P=$30, PC=$0600. Memory is left alone; clearing the
    /// zero page and screen is the session's job.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.pc = RESET_PC;
        self.sp = RESET_SP;
        self.set_status(RESET_STATUS);
        self.instruction_pc = RESET_PC;
        self.instructions = 0;
        self.events.clear();
    }

    /// Executes one instruction.
    ///
    /// 1. Refresh `$FE` with a random value
    /// 2. Fetch the opcode cell at PC and advance PC
    /// 3. Decode through the opcode table and dispatch
    ///
    /// On error the program counter is put back on the faulting instruction.
    ///
    /// # Examples
    ///
    /// ```
    /// use sim6502::{CPU, ExecutionError, Memory, WidthProfile};
    ///
    /// let mut memory = Memory::new(WidthProfile::eight_bit());
    /// memory.load(0x600, &[0x02]); // not an opcode
    ///
    /// let mut cpu = CPU::with_seed(memory, 7);
    /// assert_eq!(
    ///     cpu.step(),
    ///     Err(ExecutionError::UnknownOpcode { opcode: 0x02, pc: 0x600 })
    /// );
    /// assert_eq!(cpu.pc(), 0x600);
    /// ```
    pub fn step(&mut self) -> Result<StepOutcome, ExecutionError> {
        let random: u32 = self.rng.gen_range(0..=255);
        self.memory.write(RANDOM_CELL, random);

        let fetch_pc = self.pc;
        let opcode = self.memory.read(fetch_pc);
        let Some(decoded) = decode(opcode) else {
            return Err(ExecutionError::UnknownOpcode {
                opcode,
                pc: fetch_pc,
            });
        };

        self.instruction_pc = fetch_pc;
        self.pc = self.next_address(fetch_pc);

        tracing::trace!(
            pc = fetch_pc,
            mnemonic = decoded.mnemonic,
            mode = ?decoded.mode,
            "execute"
        );

        match instructions::execute(self, decoded) {
            Ok(outcome) => {
                self.instructions += 1;
                if outcome == StepOutcome::Continue && self.pc == 0 {
                    return Ok(StepOutcome::EndOfProgram { pc: fetch_pc });
                }
                Ok(outcome)
            }
            Err(err) => {
                self.pc = fetch_pc;
                Err(err)
            }
        }
    }

    /// Runs up to `budget` instructions, stopping early when the program stops.
    ///
    /// Returns the outcome of the last instruction executed.
    pub fn run_for_instructions(&mut self, budget: u64) -> Result<StepOutcome, ExecutionError> {
        let mut outcome = StepOutcome::Continue;
        for _ in 0..budget {
            outcome = self.step()?;
            if outcome != StepOutcome::Continue {
                break;
            }
        }
        Ok(outcome)
    }

    /// Drains the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<CpuEvent> {
        std::mem::take(&mut self.events)
    }

    // ========== Operand Helpers ==========

    pub(crate) fn next_address(&self, addr: u32) -> u32 {
        addr.wrapping_add(1) & self.profile.address_mask()
    }

    /// Reads the next cell of the instruction stream.
    pub(crate) fn fetch_operand(&mut self) -> u32 {
        let value = self.memory.read(self.pc) & self.profile.data_mask();
        self.pc = self.next_address(self.pc);
        value
    }

    /// Reads an address from the instruction stream, low limb first.
    pub(crate) fn fetch_address(&mut self) -> u32 {
        let lo = self.fetch_operand();
        if self.profile.address_limbs() == 1 {
            return lo;
        }
        let hi = self.fetch_operand();
        (lo | (hi << self.profile.data_width())) & self.profile.address_mask()
    }

    fn indexed(&self, base: u32, index: u32, mask: u32) -> u32 {
        ((base as u64 + index as u64) & mask as u64) as u32
    }

    /// Resolves the effective address for `mode`, consuming operand cells.
    ///
    /// Immediate operands resolve to the operand cell itself. Implied and
    /// relative forms have no address and resolve to the current PC without
    /// consuming anything.
    pub(crate) fn effective_address(&mut self, mode: AddressingMode) -> u32 {
        let dm = self.profile.data_mask();
        let am = self.profile.address_mask();
        match mode {
            AddressingMode::Implied | AddressingMode::Relative => self.pc,
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.next_address(self.pc);
                addr
            }
            AddressingMode::ZeroPage => self.fetch_operand(),
            AddressingMode::ZeroPageX => {
                let base = self.fetch_operand();
                self.indexed(base, self.x, dm)
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch_operand();
                self.indexed(base, self.y, dm)
            }
            AddressingMode::Absolute => self.fetch_address(),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_address();
                self.indexed(base, self.x, am)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_address();
                self.indexed(base, self.y, am)
            }
            AddressingMode::Indirect => {
                let pointer = self.fetch_address();
                self.memory.read_word(pointer)
            }
            AddressingMode::IndirectX => {
                let base = self.fetch_operand();
                let pointer = self.indexed(base, self.x, dm);
                self.memory.read_word(pointer)
            }
            AddressingMode::IndirectY => {
                let pointer = self.fetch_operand();
                let base = self.memory.read_word(pointer);
                self.indexed(base, self.y, am)
            }
        }
    }

    /// Reads the operand value for `mode`.
    pub(crate) fn operand_value(&mut self, mode: AddressingMode) -> u32 {
        let addr = self.effective_address(mode);
        self.memory.read(addr) & self.profile.data_mask()
    }

    /// Sets N and Z from `value` reduced to the data width.
    pub(crate) fn set_nz(&mut self, value: u32) {
        let value = value & self.profile.data_mask();
        self.flag_z = value == 0;
        self.flag_n = value & self.profile.sign_bit() != 0;
    }

    pub(crate) fn warn(&mut self, warning: ExecutionWarning) {
        tracing::warn!(pc = self.instruction_pc, "{}", warning);
        self.events.push(CpuEvent::Warning(warning));
    }

    // ========== Stack ==========

    fn stack_address(&self) -> u32 {
        self.profile
            .stack_base()
            .wrapping_add(self.sp & self.profile.data_mask())
    }

    /// Writes `value` at the stack pointer, then decrements it.
    pub(crate) fn push(&mut self, value: u32) {
        let addr = self.stack_address();
        self.memory.write(addr, value & self.profile.data_mask());

        if self.sp == 0 {
            self.sp = self.profile.data_mask();
            self.warn(ExecutionWarning::StackWraparound {
                direction: StackDirection::Filled,
                sp: self.sp,
            });
        } else {
            self.sp -= 1;
        }
    }

    /// Increments the stack pointer, then reads the cell it points at.
    pub(crate) fn pop(&mut self) -> u32 {
        if self.sp >= self.profile.data_mask() {
            self.sp = 0;
            self.warn(ExecutionWarning::StackWraparound {
                direction: StackDirection::Emptied,
                sp: self.sp,
            });
        } else {
            self.sp += 1;
        }
        self.memory.read(self.stack_address()) & self.profile.data_mask()
    }

    // ========== Register Getters ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u32 {
        self.a
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Returns the stack pointer value.
    ///
    /// The cell address is `profile.stack_base() + SP`; the stack grows downward.
    pub fn sp(&self) -> u32 {
        self.sp
    }

    pub fn profile(&self) -> WidthProfile {
        self.profile
    }

    /// Returns the number of instructions executed since reset.
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Returns the status register packed for this bus width.
    ///
    /// - Bit `dw-1`: N (Negative)
    /// - Bit `dw-2`: V (Overflow)
    /// - Bits 5 and 4: always 1
    /// - Bit 3: D (Decimal)
    /// - Bit 2: I (Interrupt Disable)
    /// - Bit 1: Z (Zero)
    /// - Bit 0: C (Carry)
    ///
    /// ```
    /// use sim6502::{CPU, Memory, WidthProfile};
    ///
    /// let mut cpu = CPU::with_seed(Memory::new(WidthProfile::new(16).unwrap()), 0);
    /// cpu.set_flag_n(true);
    /// assert_eq!(cpu.status(), 0x8030);
    /// ```
    pub fn status(&self) -> u32 {
        let mut status = RESET_STATUS;

        if self.flag_n {
            status |= self.profile.sign_bit();
        }
        if self.flag_v {
            status |= self.profile.overflow_bit();
        }
        if self.flag_d {
            status |= FLAG_D;
        }
        if self.flag_i {
            status |= FLAG_I;
        }
        if self.flag_z {
            status |= FLAG_Z;
        }
        if self.flag_c {
            status |= FLAG_C;
        }

        status
    }

    /// Loads every flag from a packed status value.
    pub fn set_status(&mut self, status: u32) {
        self.flag_n = status & self.profile.sign_bit() != 0;
        self.flag_v = status & self.profile.overflow_bit() != 0;
        self.flag_d = status & FLAG_D != 0;
        self.flag_i = status & FLAG_I != 0;
        self.flag_z = status & FLAG_Z != 0;
        self.flag_c = status & FLAG_C != 0;
    }

    /// Snapshot of every register.
    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status(),
            profile: self.profile,
        }
    }

    // ========== Status Flag Getters ==========

    pub fn flag_n(&self) -> bool {
        self.flag_n
    }

    pub fn flag_v(&self) -> bool {
        self.flag_v
    }

    pub fn flag_d(&self) -> bool {
        self.flag_d
    }

    pub fn flag_i(&self) -> bool {
        self.flag_i
    }

    pub fn flag_z(&self) -> bool {
        self.flag_z
    }

    pub fn flag_c(&self) -> bool {
        self.flag_c
    }

    // ========== Setters ==========

    pub fn set_a(&mut self, value: u32) {
        self.a = value & self.profile.data_mask();
    }

    pub fn set_x(&mut self, value: u32) {
        self.x = value & self.profile.data_mask();
    }

    pub fn set_y(&mut self, value: u32) {
        self.y = value & self.profile.data_mask();
    }

    pub fn set_sp(&mut self, value: u32) {
        self.sp = value & self.profile.data_mask();
    }

    pub fn set_pc(&mut self, value: u32) {
        self.pc = value & self.profile.address_mask();
    }

    pub fn set_flag_n(&mut self, value: bool) {
        self.flag_n = value;
    }

    pub fn set_flag_v(&mut self, value: bool) {
        self.flag_v = value;
    }

    pub fn set_flag_d(&mut self, value: bool) {
        self.flag_d = value;
    }

    pub fn set_flag_z(&mut self, value: bool) {
        self.flag_z = value;
    }

    pub fn set_flag_c(&mut self, value: bool) {
        self.flag_c = value;
    }

    // ========== Memory Access ==========

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}
