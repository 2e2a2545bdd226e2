//! redb-backed ledger.
//!
//! One table per collection, named `<namespace>.<Collection>`. Keys are
//! entity ids, values are postcard-encoded [`Entity`] records.

use crate::error::{LedgerError, Result};
use crate::ledger::{validate_batch, validate_update};
use crate::{Collection, Entity, Ledger, LedgerConfig, LedgerStore, MemoryLedger};
use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, TableError, WriteTransaction,
};
use std::path::Path;

type EntityTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;

fn decode(bytes: &[u8]) -> Result<Entity> {
    Ok(postcard::from_bytes(bytes)?)
}

/// A ledger persisted in a redb database file.
pub struct RedbLedger {
    db: Database,
    namespace: String,
}

impl std::fmt::Debug for RedbLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbLedger")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl RedbLedger {
    /// Create a database file, or open it if it already exists.
    pub fn create(path: impl AsRef<Path>, config: &LedgerConfig) -> Result<Self> {
        let db = Database::create(path)?;
        let ledger = Self {
            db,
            namespace: config.namespace.clone(),
        };
        ledger.ensure_tables()?;
        Ok(ledger)
    }

    /// Open an existing database file.
    pub fn open(path: impl AsRef<Path>, config: &LedgerConfig) -> Result<Self> {
        let db = Database::open(path)?;
        Ok(Self {
            db,
            namespace: config.namespace.clone(),
        })
    }

    fn ensure_tables(&self) -> Result<()> {
        let txn = self.db.begin_write()?;
        for collection in Collection::ALL {
            let name = collection.qualified_name(&self.namespace);
            txn.open_table(EntityTable::new(&name))?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl LedgerStore for RedbLedger {
    fn transact<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Ledger) -> Result<T>,
    {
        let txn = self.db.begin_write()?;
        let outcome = {
            let mut view = RedbTransaction {
                txn: &txn,
                namespace: &self.namespace,
            };
            work(&mut view)
        };

        match outcome {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                drop(txn);
                Err(err)
            }
        }
    }

    fn snapshot(&self) -> Result<MemoryLedger> {
        let read = self.db.begin_read()?;
        let mut entities = Vec::new();

        for collection in Collection::ALL {
            let name = collection.qualified_name(&self.namespace);
            let table = match read.open_table(EntityTable::new(&name)) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => continue,
                Err(err) => return Err(err.into()),
            };
            for item in table.iter()? {
                let (_id, value) = item?;
                entities.push(decode(value.value())?);
            }
        }

        Ok(MemoryLedger::from_entities(entities))
    }
}

// =============================================================================
// TRANSACTION VIEW
// =============================================================================

/// The ledger as seen from inside one redb write transaction.
struct RedbTransaction<'t> {
    txn: &'t WriteTransaction,
    namespace: &'t str,
}

impl RedbTransaction<'_> {
    fn table_name(&self, collection: Collection) -> String {
        collection.qualified_name(self.namespace)
    }

    fn write(&self, entity: &Entity) -> Result<()> {
        let name = self.table_name(entity.collection());
        let bytes = postcard::to_stdvec(entity)?;
        let mut table = self.txn.open_table(EntityTable::new(&name))?;
        table.insert(entity.id(), bytes.as_slice())?;
        Ok(())
    }
}

impl Ledger for RedbTransaction<'_> {
    fn get(&self, collection: Collection, id: &str) -> Result<Entity> {
        let name = self.table_name(collection);
        let table = self.txn.open_table(EntityTable::new(&name))?;
        let entity = match table.get(id)? {
            Some(value) => decode(value.value())?,
            None => return Err(LedgerError::not_found(collection, id)),
        };
        Ok(entity)
    }

    fn contains(&self, collection: Collection, id: &str) -> Result<bool> {
        let name = self.table_name(collection);
        let table = self.txn.open_table(EntityTable::new(&name))?;
        let found = table.get(id)?.is_some();
        Ok(found)
    }

    fn create(&mut self, entity: Entity) -> Result<()> {
        if self.contains(entity.collection(), entity.id())? {
            return Err(LedgerError::conflict(entity.collection(), entity.id()));
        }
        self.write(&entity)
    }

    fn update(&mut self, entity: Entity) -> Result<()> {
        validate_update(&*self, &entity)?;
        self.write(&entity)
    }

    fn bulk_create(&mut self, collection: Collection, entities: Vec<Entity>) -> Result<()> {
        validate_batch(&*self, collection, &entities)?;
        for entity in &entities {
            self.write(entity)?;
        }
        Ok(())
    }

    fn list(&self, collection: Collection) -> Result<Vec<Entity>> {
        let name = self.table_name(collection);
        let table = self.txn.open_table(EntityTable::new(&name))?;
        let mut entities = Vec::new();
        for item in table.iter()? {
            let (_id, value) = item?;
            entities.push(decode(value.value())?);
        }
        Ok(entities)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Acidity, Address, Grade, Participant, Timestamp, demo, recorder};
    use tempfile::TempDir;

    type TestResult<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

    fn temp_ledger() -> TestResult<(TempDir, RedbLedger)> {
        let dir = tempfile::tempdir()?;
        let ledger = RedbLedger::create(dir.path().join("ledger.redb"), &LedgerConfig::default())?;
        Ok((dir, ledger))
    }

    #[test]
    fn committed_writes_are_visible() -> TestResult {
        let (_dir, mut ledger) = temp_ledger()?;
        ledger.transact(|tx| demo::setup_demo(tx, Timestamp(50)))?;

        let snapshot = ledger.snapshot()?;
        assert_eq!(snapshot.len(), demo::DEMO_ENTITY_COUNT);
        assert_eq!(
            snapshot.cultivation(demo::DEMO_CULTIVATION)?.process,
            "HANDPICKED"
        );
        Ok(())
    }

    #[test]
    fn failed_transaction_is_rolled_back() -> TestResult {
        let (_dir, mut ledger) = temp_ledger()?;
        ledger.transact(|tx| demo::setup_demo(tx, Timestamp(50)))?;

        let result = ledger.transact(|tx| {
            recorder::record_acidity_reading(tx, demo::DEMO_PRODUCTION, Acidity::from_percent(1))?;
            recorder::record_acidity_reading(tx, "OIL_BATCH_404", Acidity::from_percent(1))
        });
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));

        let snapshot = ledger.snapshot()?;
        assert!(
            snapshot
                .production(demo::DEMO_PRODUCTION)?
                .acidity_readings
                .is_empty()
        );
        Ok(())
    }

    #[test]
    fn create_conflicts_and_update_requires_existing() -> TestResult {
        let (_dir, mut ledger) = temp_ledger()?;
        let bottler = Entity::Bottler(Participant::new("b@x", Address::in_country("US")));

        ledger.transact(|tx| tx.create(bottler.clone()))?;
        let dup = ledger.transact(|tx| tx.create(bottler.clone()));
        assert!(matches!(dup, Err(LedgerError::Conflict { .. })));

        let ghost = Entity::Grower(Participant::new("ghost@x", Address::default()));
        let missing = ledger.transact(|tx| tx.update(ghost));
        assert!(matches!(missing, Err(LedgerError::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn grades_are_immutable() -> TestResult {
        let (_dir, mut ledger) = temp_ledger()?;
        let grade = |oil_grade: &str| {
            Entity::Grade(Grade {
                id: "OIL_GRADE_001".to_string(),
                bottled_date: Timestamp(5),
                oil_grade: oil_grade.to_string(),
                bottler: "b@x".to_string(),
            })
        };

        ledger.transact(|tx| tx.create(grade("VIRGIN")))?;
        let result = ledger.transact(|tx| tx.update(grade("BEAUTY")));
        assert!(matches!(result, Err(LedgerError::Conflict { .. })));

        let stored = ledger.snapshot()?.grade("OIL_GRADE_001")?;
        assert_eq!(stored.oil_grade, "VIRGIN");
        Ok(())
    }

    #[test]
    fn bulk_create_conflict_writes_nothing() -> TestResult {
        let (_dir, mut ledger) = temp_ledger()?;
        let grower = |id: &str| Entity::Grower(Participant::new(id, Address::in_country("Italy")));

        ledger.transact(|tx| tx.create(grower("b@x")))?;
        let result = ledger.transact(|tx| {
            tx.bulk_create(Collection::Grower, vec![grower("a@x"), grower("b@x")])
        });
        assert!(matches!(result, Err(LedgerError::Conflict { .. })));
        assert_eq!(ledger.snapshot()?.count(Collection::Grower), 1);
        Ok(())
    }

    #[test]
    fn data_survives_reopen() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ledger.redb");
        let config = LedgerConfig::default();
        {
            let mut ledger = RedbLedger::create(&path, &config)?;
            ledger.transact(|tx| demo::setup_demo(tx, Timestamp(50)))?;
        }

        let mut reopened = RedbLedger::open(&path, &config)?;
        let listed = reopened.transact(|tx| tx.list(Collection::Grower))?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), demo::DEMO_GROWER);
        Ok(())
    }

    #[test]
    fn namespaces_are_isolated() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ledger.redb");
        {
            let mut ledger = RedbLedger::create(&path, &LedgerConfig::default())?;
            ledger.transact(|tx| demo::setup_demo(tx, Timestamp(50)))?;
        }

        let other = RedbLedger::open(&path, &LedgerConfig::new().with_namespace("com.example"))?;
        assert!(other.snapshot()?.is_empty());
        Ok(())
    }
}
