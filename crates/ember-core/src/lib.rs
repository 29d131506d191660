//! Core types and definitions for the EMBER dispatch optimizer.
//!
//! This crate defines the vocabulary shared across all other crates:
//! records, commands, report views, events, configuration, and constants.
//! It has no dependency on the dispatch runtime or any driver.

pub mod commands;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod records;
pub mod state;
pub mod types;
