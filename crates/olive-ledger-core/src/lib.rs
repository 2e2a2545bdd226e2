//! # Olive Ledger Core
//!
//! Deterministic traceability rules for olive-oil production.
//!
//! Growers cultivate olives, producers press oil, bottlers grade and bottle
//! it. Transactions append environmental readings (pesticide exposure, soil
//! contamination, acidity) to cultivation and production records, and the
//! grading transaction derives a quality classification from them.
//!
//! ## Layout
//!
//! ```text
//!   Transaction ──▶ recorder / grading / demo ──▶ Ledger trait
//!                                                   │
//!                        ┌──────────────────────────┴─────────┐
//!                   MemoryLedger (+ formats)             RedbLedger
//! ```
//!
//! The crate performs no I/O of its own except through the stores, and
//! never logs. Hosting, transport and logging belong to the app layer.

pub mod acidity;
pub mod config;
pub mod demo;
pub mod entity;
pub mod error;
pub mod formats;
pub mod grading;
pub mod ledger;
pub mod primitives;
pub mod recorder;
pub mod storage;
pub mod transaction;

pub use acidity::{Acidity, AcidityParseError};
pub use config::LedgerConfig;
pub use entity::{
    Address, Collection, Cultivation, Entity, Grade, Participant, Production, Timestamp,
};
pub use error::{LedgerError, Result};
pub use grading::{AcidityClass, OilType};
pub use ledger::{Ledger, LedgerStore, MemoryLedger};
pub use storage::RedbLedger;
pub use transaction::{Receipt, Transaction, submit};
