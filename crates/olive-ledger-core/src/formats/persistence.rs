//! Canonical snapshot encoding.
//!
//! Layout: 4-byte magic `OLVL`, 1-byte format version, postcard body.
//! Entities are written in canonical order, so equal ledgers always encode to
//! equal bytes.

use crate::error::{LedgerError, Result};
use crate::{Entity, MemoryLedger};
use serde::{Deserialize, Serialize};

/// Magic bytes opening every snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"OLVL";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 1;

/// A whole ledger as a flat, ordered list of entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub entities: Vec<Entity>,
}

impl From<&MemoryLedger> for LedgerSnapshot {
    fn from(ledger: &MemoryLedger) -> Self {
        Self {
            entities: ledger.entities().cloned().collect(),
        }
    }
}

impl From<LedgerSnapshot> for MemoryLedger {
    fn from(snapshot: LedgerSnapshot) -> Self {
        MemoryLedger::from_entities(snapshot.entities)
    }
}

/// Encode a ledger as a canonical snapshot.
pub fn encode_snapshot(ledger: &MemoryLedger) -> Result<Vec<u8>> {
    let body = postcard::to_stdvec(&LedgerSnapshot::from(ledger))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&SNAPSHOT_MAGIC);
    bytes.push(SNAPSHOT_VERSION);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a canonical snapshot.
pub fn decode_snapshot(bytes: &[u8]) -> Result<MemoryLedger> {
    let Some((magic, rest)) = bytes.split_first_chunk::<4>() else {
        return Err(LedgerError::Format("snapshot is truncated".to_string()));
    };
    if *magic != SNAPSHOT_MAGIC {
        return Err(LedgerError::Format("not an olive ledger snapshot".to_string()));
    }

    let Some((&version, body)) = rest.split_first() else {
        return Err(LedgerError::Format("snapshot is truncated".to_string()));
    };
    if version != SNAPSHOT_VERSION {
        return Err(LedgerError::Format(format!(
            "unsupported snapshot version {version} (expected {SNAPSHOT_VERSION})"
        )));
    }

    let (snapshot, trailing): (LedgerSnapshot, &[u8]) = postcard::take_from_bytes(body)?;
    if !trailing.is_empty() {
        return Err(LedgerError::Format(format!(
            "{} trailing bytes after snapshot",
            trailing.len()
        )));
    }

    Ok(snapshot.into())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Acidity, Ledger, Production, Timestamp, demo, recorder};

    fn demo_ledger() -> Result<MemoryLedger> {
        let mut ledger = MemoryLedger::new();
        demo::setup_demo(&mut ledger, Timestamp(1_000_000))?;
        recorder::record_acidity_reading(
            &mut ledger,
            demo::DEMO_PRODUCTION,
            Acidity::from_micros(250_000),
        )?;
        Ok(ledger)
    }

    #[test]
    fn snapshot_preserves_entities() -> Result<()> {
        let ledger = demo_ledger()?;
        let restored = decode_snapshot(&encode_snapshot(&ledger)?)?;

        assert_eq!(restored, ledger);
        let oil: Production = restored.production(demo::DEMO_PRODUCTION)?;
        assert_eq!(oil.acidity_readings, vec![Acidity::from_micros(250_000)]);
        Ok(())
    }

    #[test]
    fn encoding_is_deterministic() -> Result<()> {
        let first = encode_snapshot(&demo_ledger()?)?;
        let second = encode_snapshot(&demo_ledger()?)?;
        assert_eq!(first, second);
        assert!(first.starts_with(b"OLVL"));
        Ok(())
    }

    #[test]
    fn empty_ledger_round_trips() -> Result<()> {
        let restored = decode_snapshot(&encode_snapshot(&MemoryLedger::new())?)?;
        assert!(restored.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_bad_header() {
        assert!(matches!(
            decode_snapshot(b"OL"),
            Err(LedgerError::Format(_))
        ));
        assert!(matches!(
            decode_snapshot(b"XXXX\x01"),
            Err(LedgerError::Format(_))
        ));
        assert!(matches!(
            decode_snapshot(b"OLVL\x09\x00"),
            Err(LedgerError::Format(_))
        ));
    }

    #[test]
    fn rejects_trailing_bytes() -> Result<()> {
        let mut bytes = encode_snapshot(&MemoryLedger::new())?;
        bytes.push(0);
        assert!(matches!(decode_snapshot(&bytes), Err(LedgerError::Format(_))));
        Ok(())
    }
}
