//! Dispatch runtime for EMBER.
//!
//! Prices (unit, incident) pairs, ranks pending incidents, searches for the
//! optimal assignment, and applies it to the fleet state store. Headless and
//! deterministic under a manual clock.

pub mod clock;
pub mod cost;
pub mod engine;
pub mod optimizer;
pub mod queue;
pub mod scenario;
pub mod store;

pub use ember_core as core;
pub use engine::DispatchEngine;
