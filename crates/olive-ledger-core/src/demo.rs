//! Demo seeding.
//!
//! Creates one grower, producer and bottler plus a cultivation/production
//! pair with fixed sample values, so a fresh ledger can be walked through the
//! reading and grading transactions.

use crate::error::Result;
use crate::primitives::{DEFAULT_BOTTLER, SECONDS_PER_DAY};
use crate::{
    Address, Collection, Cultivation, Entity, Ledger, Participant, Production, Timestamp,
};

pub const DEMO_GROWER: &str = "olivefarmer@twotrees.com";
pub const DEMO_PRODUCER: &str = "producer@twotrees.com";
pub const DEMO_BOTTLER: &str = DEFAULT_BOTTLER;
pub const DEMO_CULTIVATION: &str = "OLIVE_BATCH_001";
pub const DEMO_PRODUCTION: &str = "OIL_BATCH_001";

/// Number of entities [`setup_demo`] creates.
pub const DEMO_ENTITY_COUNT: usize = 5;

/// Seed the demo entities. Seeding an already seeded ledger is a `Conflict`.
///
/// Olives are picked the day before `timestamp`; oil is crushed and stored
/// at `timestamp`.
pub fn setup_demo(ledger: &mut dyn Ledger, timestamp: Timestamp) -> Result<usize> {
    let yesterday = timestamp.offset(-SECONDS_PER_DAY);

    let grower = Participant::new(DEMO_GROWER, Address::in_country("Italy"));
    let producer = Participant::new(DEMO_PRODUCER, Address::in_country("US"));
    let bottler = Participant::new(DEMO_BOTTLER, Address::in_country("US"));

    let crop = Cultivation {
        process: "HANDPICKED".to_string(),
        pesticide_type: "NATURAL_TOXINS".to_string(),
        picking_date: yesterday,
        origin: Address::in_country("Italy"),
        ..Cultivation::new(DEMO_CULTIVATION, DEMO_GROWER)
    };

    let oil_batch = Production {
        method: "COLD_EXTRACTION".to_string(),
        crushing_date: timestamp,
        stored_date: timestamp,
        ..Production::new(DEMO_PRODUCTION, DEMO_PRODUCER)
    };

    ledger.bulk_create(Collection::Grower, vec![Entity::Grower(grower)])?;
    ledger.bulk_create(Collection::Producer, vec![Entity::Producer(producer)])?;
    ledger.bulk_create(Collection::Bottler, vec![Entity::Bottler(bottler)])?;
    ledger.bulk_create(Collection::Cultivation, vec![Entity::Cultivation(crop)])?;
    ledger.bulk_create(Collection::Production, vec![Entity::Production(oil_batch)])?;

    Ok(DEMO_ENTITY_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LedgerError, LedgerStore, MemoryLedger};

    #[test]
    fn seeds_every_collection_but_grades() -> Result<()> {
        let mut ledger = MemoryLedger::new();
        let created = setup_demo(&mut ledger, Timestamp(1_000_000))?;

        assert_eq!(created, ledger.len());
        for collection in [
            Collection::Grower,
            Collection::Producer,
            Collection::Bottler,
            Collection::Cultivation,
            Collection::Production,
        ] {
            assert_eq!(ledger.count(collection), 1, "{collection}");
        }
        assert_eq!(ledger.count(Collection::Grade), 0);
        Ok(())
    }

    #[test]
    fn demo_dates_follow_timestamp() -> Result<()> {
        let mut ledger = MemoryLedger::new();
        setup_demo(&mut ledger, Timestamp(1_000_000))?;

        let crop = ledger.cultivation(DEMO_CULTIVATION)?;
        assert_eq!(crop.picking_date, Timestamp(1_000_000 - 86_400));
        assert_eq!(crop.grower, DEMO_GROWER);
        assert!(crop.pesticide_readings.is_empty());

        let oil = ledger.production(DEMO_PRODUCTION)?;
        assert_eq!(oil.crushing_date, Timestamp(1_000_000));
        assert_eq!(oil.stored_date, Timestamp(1_000_000));
        assert_eq!(oil.producer, DEMO_PRODUCER);
        Ok(())
    }

    #[test]
    fn demo_bottler_is_the_default_grading_bottler() -> Result<()> {
        let mut ledger = MemoryLedger::new();
        setup_demo(&mut ledger, Timestamp(1))?;

        let config = crate::LedgerConfig::default();
        assert!(ledger.contains(Collection::Bottler, &config.bottler)?);
        Ok(())
    }

    #[test]
    fn seeding_twice_conflicts_and_changes_nothing() -> Result<()> {
        let mut ledger = MemoryLedger::new();
        ledger.transact(|tx| setup_demo(tx, Timestamp(10)))?;
        let before = ledger.clone();

        let again = ledger.transact(|tx| setup_demo(tx, Timestamp(20)));
        assert!(matches!(again, Err(LedgerError::Conflict { .. })));
        assert_eq!(ledger, before);
        Ok(())
    }
}
