//! # Olive Ledger Library
//!
//! This library exposes the CLI command layer for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;

// Re-export olive_ledger_core for convenience
pub use olive_ledger_core;
