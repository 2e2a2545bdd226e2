//! # Ledger Gateway
//!
//! The storage boundary between the traceability rules and whatever holds
//! the entity registries.
//!
//! ```text
//!   recorder / grading / demo ──▶ Ledger (per-collection CRUD)
//!   transaction::submit ────────▶ LedgerStore (atomic unit of work)
//! ```
//!
//! Rules only ever see `&mut dyn Ledger`. A [`LedgerStore`] hands one out for
//! the duration of a transaction and commits its writes only when the
//! transaction returns `Ok`.

use crate::error::{LedgerError, Result};
use crate::{Collection, Cultivation, Entity, Grade, Production};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// LEDGER TRAIT
// =============================================================================

/// Per-collection entity registry operations.
///
/// Implementations must keep collections disjoint: the same id may exist in
/// two collections as two unrelated entities.
pub trait Ledger {
    /// Fetch an entity. Fails with `NotFound` when absent.
    fn get(&self, collection: Collection, id: &str) -> Result<Entity>;

    /// Check whether an id exists in a collection.
    fn contains(&self, collection: Collection, id: &str) -> Result<bool>;

    /// Insert a new entity. Fails with `Conflict` when the id exists.
    fn create(&mut self, entity: Entity) -> Result<()>;

    /// Replace an existing entity. Fails with `NotFound` when absent and with
    /// `Conflict` for grades, which never change once created.
    fn update(&mut self, entity: Entity) -> Result<()>;

    /// Insert many entities into one collection, all or nothing.
    fn bulk_create(&mut self, collection: Collection, entities: Vec<Entity>) -> Result<()>;

    /// All entities of a collection in ascending id order.
    fn list(&self, collection: Collection) -> Result<Vec<Entity>>;

    /// Fetch a cultivation by id.
    fn cultivation(&self, id: &str) -> Result<Cultivation> {
        match self.get(Collection::Cultivation, id)? {
            Entity::Cultivation(cultivation) => Ok(cultivation),
            other => Err(mismatch(Collection::Cultivation, &other)),
        }
    }

    /// Fetch a production batch by id.
    fn production(&self, id: &str) -> Result<Production> {
        match self.get(Collection::Production, id)? {
            Entity::Production(production) => Ok(production),
            other => Err(mismatch(Collection::Production, &other)),
        }
    }

    /// Fetch a grade by id.
    fn grade(&self, id: &str) -> Result<Grade> {
        match self.get(Collection::Grade, id)? {
            Entity::Grade(grade) => Ok(grade),
            other => Err(mismatch(Collection::Grade, &other)),
        }
    }
}

fn mismatch(expected: Collection, found: &Entity) -> LedgerError {
    LedgerError::CollectionMismatch {
        expected,
        found: found.collection(),
    }
}

/// Check a bulk-create batch before any write happens.
///
/// Every entity must belong to `collection`, no id may repeat inside the
/// batch, and no id may already exist in the store.
pub(crate) fn validate_batch(
    ledger: &dyn Ledger,
    collection: Collection,
    entities: &[Entity],
) -> Result<()> {
    let mut seen = BTreeSet::new();
    for entity in entities {
        if entity.collection() != collection {
            return Err(mismatch(collection, entity));
        }
        if !seen.insert(entity.id()) || ledger.contains(collection, entity.id())? {
            return Err(LedgerError::conflict(collection, entity.id()));
        }
    }
    Ok(())
}

/// Check an update before it is written.
pub(crate) fn validate_update(ledger: &dyn Ledger, entity: &Entity) -> Result<()> {
    let collection = entity.collection();
    if !ledger.contains(collection, entity.id())? {
        return Err(LedgerError::not_found(collection, entity.id()));
    }
    if collection == Collection::Grade {
        return Err(LedgerError::conflict(collection, entity.id()));
    }
    Ok(())
}

// =============================================================================
// LEDGER STORE TRAIT
// =============================================================================

/// A store that runs ledger work as atomic transactions.
pub trait LedgerStore {
    /// Run `work` against the store. Writes are kept only if it returns `Ok`.
    fn transact<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Ledger) -> Result<T>;

    /// Copy the whole store into memory for read-only inspection.
    fn snapshot(&self) -> Result<MemoryLedger>;
}

// =============================================================================
// IN-MEMORY LEDGER
// =============================================================================

/// BTreeMap-backed ledger.
///
/// Iteration order is deterministic: collections in [`Collection::ALL`]
/// order, entities by ascending id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    collections: BTreeMap<Collection, BTreeMap<String, Entity>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from entities, later duplicates replacing earlier ones.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut ledger = Self::new();
        for entity in entities {
            ledger.put(entity);
        }
        ledger
    }

    /// All entities in canonical order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.collections.values().flat_map(BTreeMap::values)
    }

    /// Number of entities in one collection.
    #[must_use]
    pub fn count(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map_or(0, BTreeMap::len)
    }

    /// Total number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put(&mut self, entity: Entity) {
        self.collections
            .entry(entity.collection())
            .or_default()
            .insert(entity.id().to_string(), entity);
    }
}

impl Ledger for MemoryLedger {
    fn get(&self, collection: Collection, id: &str) -> Result<Entity> {
        self.collections
            .get(&collection)
            .and_then(|entities| entities.get(id))
            .cloned()
            .ok_or_else(|| LedgerError::not_found(collection, id))
    }

    fn contains(&self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .get(&collection)
            .is_some_and(|entities| entities.contains_key(id)))
    }

    fn create(&mut self, entity: Entity) -> Result<()> {
        if self.contains(entity.collection(), entity.id())? {
            return Err(LedgerError::conflict(entity.collection(), entity.id()));
        }
        self.put(entity);
        Ok(())
    }

    fn update(&mut self, entity: Entity) -> Result<()> {
        validate_update(&*self, &entity)?;
        self.put(entity);
        Ok(())
    }

    fn bulk_create(&mut self, collection: Collection, entities: Vec<Entity>) -> Result<()> {
        validate_batch(&*self, collection, &entities)?;
        for entity in entities {
            self.put(entity);
        }
        Ok(())
    }

    fn list(&self, collection: Collection) -> Result<Vec<Entity>> {
        Ok(self
            .collections
            .get(&collection)
            .map(|entities| entities.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl LedgerStore for MemoryLedger {
    fn transact<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Ledger) -> Result<T>,
    {
        let before = self.clone();
        let outcome = work(self);
        if outcome.is_err() {
            *self = before;
        }
        outcome
    }

    fn snapshot(&self) -> Result<MemoryLedger> {
        Ok(self.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
