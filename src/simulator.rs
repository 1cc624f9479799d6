//! # Simulator Session
//!
//! [`Simulator`] owns one machine (memory, CPU, last assembled program) and
//! connects it to a host through the [`HostEvents`] sink. Hosts drive it in two
//! ways:
//!
//! - **single-step**: [`Simulator::step`] executes one instruction and returns
//!   the register report;
//! - **run**: [`Simulator::start`] arms the run and the host calls
//!   [`Simulator::run_batch`] from its own periodic timer until the returned
//!   [`RunState`] is no longer `Running`.
//!
//! Both paths execute through the same `CPU::step`.
//!
//! Host events are queued and delivered in order. If the host is already
//! borrowed when an event fires (it is driving the simulator from inside one
//! of its own methods, say), the event waits for the next delivery point:
//! any later event, the next `step`/`run_batch`, or [`Simulator::flush_events`].
//!
//! ```
//! use sim6502::{RunState, Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
//! sim.assemble("LDX #$03\nloop: DEX\nBNE loop\nBRK").unwrap();
//! sim.start();
//! while sim.run_batch() == RunState::Running {}
//!
//! assert!(matches!(sim.state(), RunState::Halted(_)));
//! assert_eq!(sim.registers().x, 0);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::assembler::parser::parse_number;
use crate::assembler::symbol_table::LabelTable;
use crate::assembler::{assemble, AssemblerError, AssemblerOutput};
use crate::cpu::{CpuEvent, Registers, StepOutcome, CPU};
use crate::disassembler::formatter::format_listing;
use crate::disassembler::{disassemble, DisassemblyOptions};
use crate::memory::{Memory, WriteObserver, FRAME_BUFFER_END, KEYPRESS_CELL};
use crate::width::{ConfigurationError, WidthProfile};
use crate::{ExecutionWarning, HaltReason};

/// Instructions per [`Simulator::run_batch`] call by default.
///
/// Prime, so a program's loop period rarely lines up with the host's refresh.
pub const DEFAULT_BATCH_SIZE: u32 = 97;

/// Callbacks from the simulator to its host. Every method defaults to a no-op.
pub trait HostEvents {
    /// A cell in the frame buffer (`$200..=$5FF`) was written.
    fn on_memory_write(&mut self, _address: u32, _value: u32) {}

    /// Execution stopped. `pc` is the address of the instruction responsible.
    fn on_halt(&mut self, _pc: u32, _reason: &HaltReason) {}

    /// Assembly failed because `name` was defined a second time at `line`.
    fn on_label_conflict(&mut self, _line: usize, _name: &str) {}

    /// Assembly failed at `line`, whose source text is `text`.
    fn on_assemble_error(&mut self, _line: usize, _text: &str) {}

    /// WDM emitted the accumulator.
    fn on_output(&mut self, _value: u32) {}

    /// A non-fatal condition occurred during execution.
    fn on_warning(&mut self, _warning: &ExecutionWarning) {}

    /// The machine was reset; displays should clear.
    fn on_reset(&mut self) {}
}

/// Shared handle to a host.
pub type SharedHost = Rc<RefCell<dyn HostEvents>>;

/// A host callback waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HostEvent {
    MemoryWrite { address: u32, value: u32 },
    Halt { pc: u32, reason: HaltReason },
    LabelConflict { line: usize, name: String },
    AssembleError { line: usize, text: String },
    Output(u32),
    Warning(ExecutionWarning),
    Reset,
}

impl HostEvent {
    fn deliver(self, host: &mut dyn HostEvents) {
        match self {
            HostEvent::MemoryWrite { address, value } => host.on_memory_write(address, value),
            HostEvent::Halt { pc, reason } => host.on_halt(pc, &reason),
            HostEvent::LabelConflict { line, name } => host.on_label_conflict(line, &name),
            HostEvent::AssembleError { line, text } => host.on_assemble_error(line, &text),
            HostEvent::Output(value) => host.on_output(value),
            HostEvent::Warning(warning) => host.on_warning(&warning),
            HostEvent::Reset => host.on_reset(),
        }
    }
}

/// Undelivered events, oldest first. Shared with the memory observer.
type EventQueue = Rc<RefCell<VecDeque<HostEvent>>>;

/// Hands queued events to the host, unless the host is borrowed right now.
fn deliver_pending(host: &SharedHost, pending: &EventQueue) {
    let mut host = match host.try_borrow_mut() {
        Ok(host) => host,
        // still queued; the next delivery point picks them up
        Err(_) => return,
    };
    loop {
        let event = pending.borrow_mut().pop_front();
        match event {
            Some(event) => event.deliver(&mut *host),
            None => break,
        }
    }
}

/// Forwards frame-buffer writes from memory to the host.
struct HostWriteForwarder {
    host: SharedHost,
    pending: EventQueue,
}

impl WriteObserver for HostWriteForwarder {
    fn cell_written(&mut self, address: u32, value: u32) {
        self.pending
            .borrow_mut()
            .push_back(HostEvent::MemoryWrite { address, value });
        deliver_pending(&self.host, &self.pending);
    }
}

/// Errors returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Assembler(#[from] AssemblerError),

    #[error("address ${0:X} is outside memory")]
    AddressOutOfRange(u64),

    #[error("unable to find/parse given address/label: {0}")]
    InvalidGotoTarget(String),

    #[error("operation not allowed while the program is running")]
    Running,
}

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Data bus width: 8, 16 or 32
    pub data_width: u32,

    /// Instructions per run batch
    pub batch_size: u32,

    /// Seed for the `$FE` random cell; entropy when `None`
    pub rng_seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            data_width: 8,
            batch_size: DEFAULT_BATCH_SIZE,
            rng_seed: None,
        }
    }
}

impl SimulatorConfig {
    fn validate(&self) -> Result<WidthProfile, ConfigurationError> {
        if self.batch_size == 0 {
            return Err(ConfigurationError::ZeroBatchSize);
        }
        WidthProfile::new(self.data_width)
    }
}

/// Where a session is in its run lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Not running; single-stepping is allowed.
    Stopped,
    /// Armed: the host should keep calling `run_batch`.
    Running,
    /// The last instruction stopped the program.
    Halted(HaltReason),
}

/// Result of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub registers: Registers,
    /// Set when this step stopped the program.
    pub halt: Option<HaltReason>,
}

/// One simulated machine plus its host connection.
pub struct Simulator {
    config: SimulatorConfig,
    cpu: CPU<Memory>,
    host: Option<SharedHost>,
    pending: EventQueue,
    program: Option<AssemblerOutput>,
    state: RunState,
}

impl Simulator {
    /// Builds a machine in the reset state.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let profile = config.validate()?;
        let pending = EventQueue::default();
        Ok(Self {
            cpu: build_cpu(profile, config.rng_seed, None, &pending),
            config,
            host: None,
            pending,
            program: None,
            state: RunState::Stopped,
        })
    }

    /// Connects a host. Frame-buffer writes start flowing immediately.
    pub fn set_host(&mut self, host: SharedHost) {
        self.cpu
            .memory_mut()
            .set_observer(Box::new(HostWriteForwarder {
                host: host.clone(),
                pending: self.pending.clone(),
            }));
        self.host = Some(host);
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn profile(&self) -> WidthProfile {
        self.cpu.profile()
    }

    /// Switches to another bus width.
    ///
    /// Memory, registers and the assembled program are discarded.
    pub fn configure(&mut self, data_width: u32) -> Result<(), SimulatorError> {
        let config = SimulatorConfig {
            data_width,
            ..self.config
        };
        let profile = config.validate()?;
        self.stop();
        self.config = config;
        self.cpu = build_cpu(profile, config.rng_seed, self.host.clone(), &self.pending);
        self.program = None;
        self.reset();
        debug!(data_width, "reconfigured");
        Ok(())
    }

    /// Resets the registers and clears zero page, stack and screen.
    ///
    /// The assembled program at `$600` stays in place.
    pub fn reset(&mut self) {
        self.stop();
        self.cpu.reset();

        let profile = self.profile();
        let memory = self.cpu.memory_mut();
        memory.clear_range(0, FRAME_BUFFER_END);
        if profile.data_width() == 16 {
            let base = profile.stack_base();
            memory.clear_range(base, base + profile.data_mask());
        }

        self.notify(HostEvent::Reset);
        self.state = RunState::Stopped;
    }

    /// Resets the machine and assembles `source` into memory.
    ///
    /// On failure nothing is written and the previous program is forgotten.
    pub fn assemble(&mut self, source: &str) -> Result<&AssemblerOutput, SimulatorError> {
        self.reset();
        self.program = None;

        match assemble(source, self.profile()) {
            Ok(output) => {
                output.write_to(self.cpu.memory_mut());
                Ok(self.program.insert(output))
            }
            Err(err) => {
                match &err {
                    AssemblerError::LabelConflict { line, name, .. } => {
                        self.notify(HostEvent::LabelConflict {
                            line: *line,
                            name: name.clone(),
                        })
                    }
                    AssemblerError::Assembly { line, text, .. } => {
                        self.notify(HostEvent::AssembleError {
                            line: *line,
                            text: text.clone(),
                        })
                    }
                    AssemblerError::AddressOutOfRange { line, .. } => {
                        let text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
                        self.notify(HostEvent::AssembleError {
                            line: *line,
                            text: text.trim().to_string(),
                        })
                    }
                    AssemblerError::EmptyProgram => {}
                }
                Err(err.into())
            }
        }
    }

    /// Executes one instruction.
    pub fn step(&mut self) -> Result<StepReport, SimulatorError> {
        if self.is_running() {
            return Err(SimulatorError::Running);
        }
        self.flush_events();

        let halt = self.execute_one();
        self.state = match &halt {
            Some(reason) => RunState::Halted(reason.clone()),
            None => RunState::Stopped,
        };

        Ok(StepReport {
            registers: self.cpu.registers(),
            halt,
        })
    }

    /// Arms a run. The host then calls [`Simulator::run_batch`] periodically.
    pub fn start(&mut self) {
        debug!(pc = self.cpu.pc(), "run started");
        self.state = RunState::Running;
    }

    /// Cancels a run. Takes effect at the next batch boundary.
    pub fn stop(&mut self) {
        if self.is_running() {
            debug!(pc = self.cpu.pc(), "run stopped");
            self.state = RunState::Stopped;
        }
    }

    /// Executes up to `batch_size` instructions of an armed run.
    pub fn run_batch(&mut self) -> RunState {
        self.flush_events();
        if !self.is_running() {
            return self.state.clone();
        }

        for _ in 0..self.config.batch_size {
            if let Some(reason) = self.execute_one() {
                self.state = RunState::Halted(reason);
                break;
            }
        }

        self.state.clone()
    }

    fn execute_one(&mut self) -> Option<HaltReason> {
        let result = self.cpu.step();

        for event in self.cpu.take_events() {
            match event {
                CpuEvent::Output(value) => self.notify(HostEvent::Output(value)),
                CpuEvent::Warning(warning) => self.notify(HostEvent::Warning(warning)),
            }
        }

        let reason = match result {
            Ok(StepOutcome::Continue) => return None,
            Ok(StepOutcome::Break { pc }) => HaltReason::Break { pc },
            Ok(StepOutcome::EndOfProgram { pc }) => HaltReason::EndOfProgram { pc },
            Err(err) => HaltReason::Fault(err),
        };

        debug!(
            pc = reason.pc(),
            line = ?self.source_line(reason.pc()),
            "halted: {}",
            reason
        );
        self.notify(HostEvent::Halt {
            pc: reason.pc(),
            reason: reason.clone(),
        });
        Some(reason)
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Sets PC from a label name or a hex address (`0x1F`, `$1F` or `1F`).
    ///
    /// Refused while a run is armed.
    pub fn goto(&mut self, target: &str) -> Result<u32, SimulatorError> {
        if self.is_running() {
            return Err(SimulatorError::Running);
        }

        let target = target.trim();
        let label_address = self
            .program
            .as_ref()
            .and_then(|program| program.labels.address_of(target));

        let address = match label_address {
            Some(address) => address as u64,
            None => {
                let digits = target
                    .strip_prefix("0x")
                    .or_else(|| target.strip_prefix("0X"))
                    .or_else(|| target.strip_prefix('$'))
                    .unwrap_or(target);
                parse_number(&format!("${}", digits))
                    .map_err(|_| SimulatorError::InvalidGotoTarget(target.to_string()))?
            }
        };

        if address == 0 || address > self.profile().address_mask() as u64 {
            return Err(SimulatorError::AddressOutOfRange(address));
        }

        debug!(address, "goto");
        self.cpu.set_pc(address as u32);
        Ok(address as u32)
    }

    /// Stores a key code in `$FF`, where programs poll for input.
    pub fn store_keypress(&mut self, keycode: u32) {
        self.cpu.memory_mut().store(KEYPRESS_CELL, keycode);
    }

    pub fn registers(&self) -> Registers {
        self.cpu.registers()
    }

    pub fn cpu(&self) -> &CPU<Memory> {
        &self.cpu
    }

    /// Direct machine access, refused while a run is armed.
    pub fn cpu_mut(&mut self) -> Result<&mut CPU<Memory>, SimulatorError> {
        if self.is_running() {
            return Err(SimulatorError::Running);
        }
        Ok(&mut self.cpu)
    }

    pub fn memory(&self) -> &Memory {
        self.cpu.memory()
    }

    /// The last successfully assembled program.
    pub fn program(&self) -> Option<&AssemblerOutput> {
        self.program.as_ref()
    }

    pub fn labels(&self) -> Option<&LabelTable> {
        self.program.as_ref().map(|program| &program.labels)
    }

    /// Source line of the assembled instruction covering `address`.
    pub fn source_line(&self, address: u32) -> Option<usize> {
        self.program
            .as_ref()
            .and_then(|program| program.source_map.find_containing(address))
            .map(|location| location.line)
    }

    /// Hex dump of the assembled program, one block per segment.
    pub fn hexdump(&self) -> Option<String> {
        let program = self.program.as_ref()?;
        let blocks: Vec<String> = program
            .segments
            .iter()
            .map(|segment| {
                self.memory()
                    .format_dump(segment.start, segment.cells.len() as u32)
            })
            .collect();
        Some(blocks.join("\n"))
    }

    /// Hex dump of an arbitrary range, as shown by a memory monitor.
    pub fn memory_dump(&self, start: u32, length: u32) -> String {
        self.memory().format_dump(start, length)
    }

    /// Disassembly listing of the assembled program as it sits in memory.
    pub fn disassembly(&self) -> Option<String> {
        let program = self.program.as_ref()?;
        let instructions: Vec<_> = program
            .segments
            .iter()
            .flat_map(|segment| {
                disassemble(
                    self.memory(),
                    DisassemblyOptions {
                        start_address: segment.start,
                        length: segment.cells.len() as u32,
                    },
                )
            })
            .collect();
        Some(format_listing(&instructions, &self.profile()))
    }

    /// Delivers events that were held back while the host was borrowed.
    pub fn flush_events(&self) {
        if let Some(host) = &self.host {
            deliver_pending(host, &self.pending);
        }
    }

    /// Number of events still waiting for the host.
    pub fn pending_events(&self) -> usize {
        self.pending.borrow().len()
    }

    fn notify(&self, event: HostEvent) {
        if let Some(host) = &self.host {
            self.pending.borrow_mut().push_back(event);
            deliver_pending(host, &self.pending);
        }
    }
}

fn build_cpu(
    profile: WidthProfile,
    seed: Option<u64>,
    host: Option<SharedHost>,
    pending: &EventQueue,
) -> CPU<Memory> {
    let mut memory = Memory::new(profile);
    if let Some(host) = host {
        memory.set_observer(Box::new(HostWriteForwarder {
            host,
            pending: pending.clone(),
        }));
    }
    match seed {
        Some(seed) => CPU::with_seed(memory, seed),
        None => CPU::new(memory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u32, u32)>,
        halts: Vec<u32>,
        resets: usize,
        conflicts: Vec<(usize, String)>,
    }

    impl HostEvents for Recorder {
        fn on_memory_write(&mut self, address: u32, value: u32) {
            self.writes.push((address, value));
        }
        fn on_halt(&mut self, pc: u32, _reason: &HaltReason) {
            self.halts.push(pc);
        }
        fn on_label_conflict(&mut self, line: usize, name: &str) {
            self.conflicts.push((line, name.to_string()));
        }
        fn on_reset(&mut self) {
            self.resets += 1;
        }
    }

    fn seeded() -> Simulator {
        Simulator::new(SimulatorConfig {
            rng_seed: Some(42),
            ..SimulatorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Simulator::new(SimulatorConfig {
                data_width: 12,
                ..SimulatorConfig::default()
            }),
            Err(SimulatorError::Configuration(ConfigurationError::UnsupportedDataWidth(12)))
        ));
        assert!(Simulator::new(SimulatorConfig {
            batch_size: 0,
            ..SimulatorConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_host_sees_frame_buffer_writes_and_halt() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut sim = seeded();
        sim.set_host(recorder.clone());

        sim.assemble("LDA #$01\nSTA $0200\nBRK").unwrap();
        sim.start();
        while sim.run_batch() == RunState::Running {}

        let recorder = recorder.borrow();
        assert!(recorder.writes.contains(&(0x200, 1)));
        assert_eq!(recorder.halts, vec![0x605]);
        assert!(recorder.resets >= 1);
    }

    #[test]
    fn test_label_conflict_reaches_host() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut sim = seeded();
        sim.set_host(recorder.clone());

        assert!(sim.assemble("A: NOP\nA: NOP").is_err());
        assert_eq!(recorder.borrow().conflicts, vec![(2, "A".to_string())]);
        assert!(sim.program().is_none());
    }

    #[test]
    fn test_cpu_mut_refused_while_running() {
        let mut sim = seeded();
        sim.assemble("loop: JMP loop").unwrap();
        sim.start();
        assert_eq!(sim.cpu_mut().err(), Some(SimulatorError::Running));
        assert_eq!(sim.step().err(), Some(SimulatorError::Running));
        sim.stop();
        assert!(sim.cpu_mut().is_ok());
    }

    #[test]
    fn test_run_batch_respects_batch_size() {
        let mut sim = Simulator::new(SimulatorConfig {
            batch_size: 10,
            rng_seed: Some(1),
            ..SimulatorConfig::default()
        })
        .unwrap();
        sim.assemble("loop: INX\nJMP loop").unwrap();
        sim.start();
        assert_eq!(sim.run_batch(), RunState::Running);
        assert_eq!(sim.cpu().instructions(), 10);
    }

    #[test]
    fn test_goto() {
        let mut sim = seeded();
        sim.assemble("NOP\nthere: NOP").unwrap();

        assert_eq!(sim.goto("there").unwrap(), 0x601);
        assert_eq!(sim.goto("$0700").unwrap(), 0x700);
        assert_eq!(sim.goto("0x0800").unwrap(), 0x800);
        assert_eq!(sim.goto("ab").unwrap(), 0xAB);
        assert_eq!(sim.registers().pc, 0xAB);
        assert_eq!(sim.goto("0"), Err(SimulatorError::AddressOutOfRange(0)));
        assert_eq!(
            sim.goto("$10000"),
            Err(SimulatorError::AddressOutOfRange(0x10000))
        );
        assert!(matches!(
            sim.goto("nowhere"),
            Err(SimulatorError::InvalidGotoTarget(_))
        ));
    }

    #[test]
    fn test_reset_keeps_program_clears_screen() {
        let mut sim = seeded();
        sim.assemble("LDA #$05\nSTA $0300").unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.memory().get(0x300), 5);

        sim.reset();
        assert_eq!(sim.memory().get(0x300), 0);
        assert_eq!(sim.memory().get(0x600), 0xA9);
        assert_eq!(sim.registers().pc, 0x600);
    }

    #[test]
    fn test_configure_switches_width() {
        let mut sim = seeded();
        sim.assemble("NOP").unwrap();
        sim.configure(16).unwrap();
        assert_eq!(sim.profile().data_width(), 16);
        assert!(sim.program().is_none());

        sim.assemble("LDA #$1234\nBRK").unwrap();
        let report = sim.step().unwrap();
        assert_eq!(report.registers.a, 0x1234);
    }

    #[test]
    fn test_keypress_lands_in_ff() {
        let mut sim = seeded();
        sim.store_keypress(0x77);
        assert_eq!(sim.memory().get(0xFF), 0x77);
    }

    #[test]
    fn test_listings() {
        let mut sim = seeded();
        assert!(sim.hexdump().is_none());
        sim.assemble("LDA #$01\nBRK").unwrap();
        assert_eq!(sim.hexdump().unwrap(), "0600: A9 01 00");
        let listing = sim.disassembly().unwrap();
        assert!(listing.contains("$0600    A9 01     LDA #$01"));
        assert!(listing.contains("$0602    00        BRK"));
    }

    #[test]
    fn test_halt_is_annotated_with_source_line() {
        let mut sim = seeded();
        sim.assemble("NOP\n\nBRK").unwrap();
        assert_eq!(sim.source_line(0x601), Some(3));
    }
}
