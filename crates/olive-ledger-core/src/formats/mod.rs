//! # Formats Module
//!
//! Serialization of whole ledgers.
//!
//! This module contains the canonical binary snapshot format (header +
//! postcard). The same [`LedgerSnapshot`] type is what the app renders as
//! JSON.
//!
//! Note: File I/O operations remain in the app layer (apps/olive-ledger).
//! This module only handles format conversion (pure transformations).

mod persistence;

pub use persistence::*;
