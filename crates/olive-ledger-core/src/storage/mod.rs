//! # Storage Module
//!
//! Disk-backed ledger storage using redb.
//!
//! Uses redb embedded database for:
//! - ACID transactions (one redb write transaction per ledger transaction)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)

mod redb_ledger;

pub use redb_ledger::RedbLedger;
