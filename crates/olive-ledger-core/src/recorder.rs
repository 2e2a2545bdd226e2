//! # Reading Recorder
//!
//! Appends readings to cultivation and production histories.
//!
//! Each call loads the target entity, appends exactly one value to the end of
//! the matching collection and persists the entity with one `update`. Values
//! are not validated and not deduplicated; grading derives distinct sets when
//! it needs them.

use crate::error::Result;
use crate::{Acidity, Entity, Ledger};

/// Append a pesticide label to a cultivation.
///
/// Returns the number of pesticide readings after the append.
pub fn record_pesticide_reading(
    ledger: &mut dyn Ledger,
    cultivation_id: &str,
    label: &str,
) -> Result<usize> {
    let mut cultivation = ledger.cultivation(cultivation_id)?;
    cultivation.pesticide_readings.push(label.to_string());
    let count = cultivation.pesticide_readings.len();
    ledger.update(Entity::Cultivation(cultivation))?;
    Ok(count)
}

/// Append a soil contaminant label to a cultivation.
///
/// Returns the number of soil readings after the append.
pub fn record_soil_reading(
    ledger: &mut dyn Ledger,
    cultivation_id: &str,
    label: &str,
) -> Result<usize> {
    let mut cultivation = ledger.cultivation(cultivation_id)?;
    cultivation.soil_readings.push(label.to_string());
    let count = cultivation.soil_readings.len();
    ledger.update(Entity::Cultivation(cultivation))?;
    Ok(count)
}

/// Append an acidity value to a production batch.
///
/// Returns the number of acidity readings after the append.
pub fn record_acidity_reading(
    ledger: &mut dyn Ledger,
    production_id: &str,
    acidity: Acidity,
) -> Result<usize> {
    let mut production = ledger.production(production_id)?;
    production.acidity_readings.push(acidity);
    let count = production.acidity_readings.len();
    ledger.update(Entity::Production(production))?;
    Ok(count)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cultivation, LedgerError, MemoryLedger, Production};

    fn ledger_with_batches() -> Result<MemoryLedger> {
        let mut ledger = MemoryLedger::new();
        ledger.create(Entity::Cultivation(Cultivation::new("OLIVE_BATCH_001", "g@x")))?;
        ledger.create(Entity::Production(Production::new("OIL_BATCH_001", "p@x")))?;
        Ok(ledger)
    }

    #[test]
    fn first_reading_starts_collection() -> Result<()> {
        let mut ledger = ledger_with_batches()?;
        let count = record_soil_reading(&mut ledger, "OLIVE_BATCH_001", "NONE")?;

        assert_eq!(count, 1);
        assert_eq!(
            ledger.cultivation("OLIVE_BATCH_001")?.soil_readings,
            vec!["NONE"]
        );
        Ok(())
    }

    #[test]
    fn readings_append_in_call_order_with_duplicates() -> Result<()> {
        let mut ledger = ledger_with_batches()?;
        for label in ["CHEMICALS", "NATURAL_TOXINS", "CHEMICALS"] {
            record_pesticide_reading(&mut ledger, "OLIVE_BATCH_001", label)?;
        }

        let cultivation = ledger.cultivation("OLIVE_BATCH_001")?;
        assert_eq!(
            cultivation.pesticide_readings,
            vec!["CHEMICALS", "NATURAL_TOXINS", "CHEMICALS"]
        );
        assert!(cultivation.soil_readings.is_empty());
        Ok(())
    }

    #[test]
    fn acidity_readings_append() -> Result<()> {
        let mut ledger = ledger_with_batches()?;
        record_acidity_reading(&mut ledger, "OIL_BATCH_001", Acidity::from_percent(3))?;
        let count = record_acidity_reading(
            &mut ledger,
            "OIL_BATCH_001",
            Acidity::from_micros(500_000),
        )?;

        assert_eq!(count, 2);
        assert_eq!(
            ledger.production("OIL_BATCH_001")?.acidity_readings,
            vec![Acidity::from_percent(3), Acidity::from_micros(500_000)]
        );
        Ok(())
    }

    #[test]
    fn missing_target_is_not_found() -> Result<()> {
        let mut ledger = ledger_with_batches()?;
        let result = record_acidity_reading(&mut ledger, "OIL_BATCH_404", Acidity::from_percent(1));
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));

        let result = record_soil_reading(&mut ledger, "OIL_BATCH_001", "NONE");
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
        Ok(())
    }
}
