//! EMBER command-line driver.
//!
//! Wires the dispatch engine to a loop thread, formats its events for the
//! console and writes optional JSON snapshots.

pub mod console;
pub mod dispatch_loop;
pub mod error;
pub mod snapshot;
pub mod state;

pub use ember_core as core;
