//! WebAssembly bindings for the simulator.
//!
//! Wraps a [`Simulator`](crate::Simulator) for browser hosts: the page's timer
//! drives `run_batch`, and a canvas paints the pixels reported through the
//! write callback.

pub mod api;

pub use api::WasmSimulator;
