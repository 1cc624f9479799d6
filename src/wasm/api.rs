//! WASM API for the simulator.
//!
//! Provides JavaScript-callable interfaces for assembling, running and
//! inspecting a [`Simulator`]. Frame-buffer writes, halts, assembler
//! diagnostics and WDM output are forwarded to JavaScript callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::{HaltReason, HostEvents, RunState, Simulator, SimulatorConfig, SimulatorError};

/// Host that forwards simulator events to JavaScript functions
struct JsHost {
    on_pixel: js_sys::Function,
    on_message: js_sys::Function,
}

impl JsHost {
    fn message(&self, text: &str) {
        let _ = self.on_message.call1(&JsValue::NULL, &JsValue::from_str(text));
    }
}

impl HostEvents for JsHost {
    fn on_memory_write(&mut self, address: u32, value: u32) {
        let _ = self.on_pixel.call2(
            &JsValue::NULL,
            &JsValue::from(address),
            &JsValue::from(value),
        );
    }

    fn on_halt(&mut self, pc: u32, reason: &HaltReason) {
        self.message(&format!("Program stopped at PC=${:04X}: {}", pc, reason));
    }

    fn on_label_conflict(&mut self, line: usize, name: &str) {
        self.message(&format!("Label {} already defined at line {}", name, line));
    }

    fn on_assemble_error(&mut self, line: usize, text: &str) {
        self.message(&format!("Syntax error line {}: {}", line, text));
    }

    fn on_output(&mut self, value: u32) {
        let ch = char::from_u32(value).unwrap_or('?');
        self.message(&ch.to_string());
    }
}

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl From<SimulatorError> for JsError {
    fn from(err: SimulatorError) -> Self {
        JsError::new(&err.to_string())
    }
}

/// Result of assembly operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    origin: u32,
    length: u32,
    error_message: Option<String>,
    error_line: Option<usize>,
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn origin(&self) -> u32 {
        self.origin
    }

    /// Number of cells assembled
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }
}

/// Main simulator interface for JavaScript
#[wasm_bindgen]
pub struct WasmSimulator {
    sim: Simulator,
}

#[wasm_bindgen]
impl WasmSimulator {
    /// Create a simulator for `data_width` (8, 16 or 32).
    ///
    /// `on_pixel(address, value)` receives frame-buffer writes and
    /// `on_message(text)` receives status messages and WDM output.
    #[wasm_bindgen(constructor)]
    pub fn new(
        data_width: u32,
        on_pixel: js_sys::Function,
        on_message: js_sys::Function,
    ) -> Result<WasmSimulator, JsError> {
        let mut sim = Simulator::new(SimulatorConfig {
            data_width,
            ..SimulatorConfig::default()
        })?;
        sim.set_host(Rc::new(RefCell::new(JsHost {
            on_pixel,
            on_message,
        })));
        sim.reset();
        Ok(WasmSimulator { sim })
    }

    /// Switch bus width; memory and program are discarded
    pub fn configure(&mut self, data_width: u32) -> Result<(), JsError> {
        Ok(self.sim.configure(data_width)?)
    }

    /// Assemble source code into memory at $0600 (or its origin directive)
    pub fn assemble(&mut self, source: &str) -> AssemblyResult {
        match self.sim.assemble(source) {
            Ok(output) => AssemblyResult {
                success: true,
                origin: output.origin,
                length: output.length,
                error_message: None,
                error_line: None,
            },
            Err(err) => {
                let error_line = match &err {
                    SimulatorError::Assembler(inner) => inner.line(),
                    _ => None,
                };
                AssemblyResult {
                    success: false,
                    origin: 0,
                    length: 0,
                    error_message: Some(err.to_string()),
                    error_line,
                }
            }
        }
    }

    /// Execute a single instruction and return the register report
    pub fn step(&mut self) -> Result<String, JsError> {
        let report = self.sim.step()?;
        Ok(report.registers.to_string())
    }

    /// Arm a run; call `run_batch` from a timer afterwards
    pub fn start(&mut self) {
        self.sim.start();
    }

    pub fn stop(&mut self) {
        self.sim.stop();
    }

    /// Execute one batch; returns whether the run is still going
    pub fn run_batch(&mut self) -> bool {
        self.sim.run_batch() == RunState::Running
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.sim.is_running()
    }

    /// Reset registers and clear zero page, stack and screen
    pub fn reset(&mut self) {
        self.sim.reset();
    }

    /// Set PC to a label or hex address
    pub fn goto_address(&mut self, target: &str) -> Result<u32, JsError> {
        Ok(self.sim.goto(target)?)
    }

    /// Store a key code at $FF
    pub fn keypress(&mut self, keycode: u32) {
        self.sim.store_keypress(keycode);
    }

    /// Register report (A/X/Y, SP/PC, flags)
    pub fn registers(&self) -> String {
        self.sim.registers().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u32 {
        self.sim.cpu().pc()
    }

    /// Hex dump of the assembled program
    pub fn hexdump(&self) -> Option<String> {
        self.sim.hexdump()
    }

    /// Disassembly listing of the assembled program
    pub fn disassembly(&self) -> Option<String> {
        self.sim.disassembly()
    }

    /// Hex dump of `length` cells from `start`, for the memory monitor
    pub fn memory_dump(&self, start: u32, length: u32) -> String {
        self.sim.memory_dump(start, length)
    }

    /// Read a single cell
    pub fn read_memory(&self, address: u32) -> u32 {
        self.sim.memory().get(address)
    }

    /// The 32×32 frame buffer as palette indices, row-major
    pub fn frame_buffer(&self) -> Vec<u8> {
        (crate::memory::FRAME_BUFFER_START..=crate::memory::FRAME_BUFFER_END)
            .map(|address| crate::memory::palette_index(self.sim.memory().get(address)))
            .collect()
    }
}
