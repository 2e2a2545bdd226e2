//! # CLI Commands
//!
//! One `cmd_*` function per subcommand. Each opens the store named by
//! [`StoreOptions`], runs at most one ledger transaction per call (the batch
//! `submit` command runs one per record) and prints the result.
//!
//! Two backends are supported:
//! - `file`: the whole ledger is a canonical snapshot file, loaded into
//!   memory and written back after every committed transaction.
//! - `redb`: a redb database, one write transaction per ledger transaction.

use olive_ledger_core::formats::{LedgerSnapshot, decode_snapshot, encode_snapshot};
use olive_ledger_core::{
    Acidity, AcidityParseError, Collection, Entity, Ledger, LedgerConfig, LedgerError,
    LedgerStore, MemoryLedger, Receipt, RedbLedger, Timestamp, Transaction, submit,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid acidity: {0}")]
    Acidity(#[from] AcidityParseError),

    #[error("unknown backend '{0}' (expected 'file' or 'redb')")]
    UnknownBackend(String),

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("unknown export format '{0}' (expected 'json' or 'canonical')")]
    UnknownFormat(String),

    #[error("no ledger at {} (run init first)", .0.display())]
    NotInitialized(PathBuf),

    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("transaction {index} of {total} failed: {source}")]
    Batch {
        index: usize,
        total: usize,
        source: Box<CliError>,
    },
}

// =============================================================================
// STORE SELECTION
// =============================================================================

/// Where the ledger lives and how commands report.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub db_path: PathBuf,
    /// `file` or `redb`.
    pub backend: String,
    pub config: LedgerConfig,
    /// Print machine-readable JSON instead of text.
    pub json: bool,
}

impl StoreOptions {
    pub fn new(db_path: impl Into<PathBuf>, backend: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            backend: backend.into(),
            config: LedgerConfig::default(),
            json: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    File,
    Redb,
}

impl Backend {
    fn parse(name: &str) -> Result<Self, CliError> {
        match name {
            "file" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            other => Err(CliError::UnknownBackend(other.to_string())),
        }
    }
}

/// An opened ledger store.
pub enum Store {
    File { path: PathBuf, ledger: MemoryLedger },
    Redb(RedbLedger),
}

impl Store {
    /// Open the store, creating an empty one if the path does not exist.
    pub fn open(options: &StoreOptions) -> Result<Self, CliError> {
        match Backend::parse(&options.backend)? {
            Backend::File => Ok(Self::File {
                path: options.db_path.clone(),
                ledger: load_or_create_ledger(&options.db_path)?,
            }),
            Backend::Redb => Ok(Self::Redb(RedbLedger::create(
                &options.db_path,
                &options.config,
            )?)),
        }
    }

    /// Open an existing store for reading. A missing path is an error rather
    /// than a fresh empty ledger.
    pub fn open_existing(options: &StoreOptions) -> Result<Self, CliError> {
        let backend = Backend::parse(&options.backend)?;
        if !options.db_path.exists() {
            return Err(CliError::NotInitialized(options.db_path.clone()));
        }
        match backend {
            Backend::File => Ok(Self::File {
                path: options.db_path.clone(),
                ledger: load_or_create_ledger(&options.db_path)?,
            }),
            Backend::Redb => Ok(Self::Redb(RedbLedger::open(
                &options.db_path,
                &options.config,
            )?)),
        }
    }

    /// Execute one transaction atomically and persist the result.
    pub fn submit(
        &mut self,
        config: &LedgerConfig,
        transaction: &Transaction,
    ) -> Result<Receipt, CliError> {
        match self {
            Self::File { path, ledger } => {
                let receipt = submit(ledger, config, transaction)?;
                save_ledger(ledger, path)?;
                Ok(receipt)
            }
            Self::Redb(db) => Ok(submit(db, config, transaction)?),
        }
    }

    /// Read the whole store into memory.
    pub fn snapshot(&self) -> Result<MemoryLedger, CliError> {
        match self {
            Self::File { ledger, .. } => Ok(ledger.clone()),
            Self::Redb(db) => Ok(db.snapshot()?),
        }
    }
}

/// Load a snapshot file, or start an empty ledger if it does not exist.
pub fn load_or_create_ledger(path: &Path) -> Result<MemoryLedger, CliError> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot file, starting empty ledger");
        return Ok(MemoryLedger::new());
    }
    let bytes = std::fs::read(path)?;
    Ok(decode_snapshot(&bytes)?)
}

/// Write a ledger as a canonical snapshot, replacing the file atomically.
pub fn save_ledger(ledger: &MemoryLedger, path: &Path) -> Result<(), CliError> {
    let bytes = encode_snapshot(ledger)?;
    let staging = path.with_extension("tmp");
    std::fs::write(&staging, &bytes)?;
    std::fs::rename(&staging, path)?;
    Ok(())
}

/// Current wall-clock time, or `fallback` when given.
pub fn timestamp_or_now(fallback: Option<i64>) -> Timestamp {
    fallback.map(Timestamp).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Timestamp(i64::try_from(secs).unwrap_or(i64::MAX))
    })
}

// =============================================================================
// TRANSACTION COMMANDS
// =============================================================================

/// Create an empty store.
pub fn cmd_init(options: &StoreOptions, force: bool) -> Result<(), CliError> {
    let backend = Backend::parse(&options.backend)?;
    let path = &options.db_path;

    if path.exists() {
        if !force {
            return Err(CliError::AlreadyExists(path.clone()));
        }
        warn!(path = %path.display(), "overwriting existing store");
        std::fs::remove_file(path)?;
    }

    match backend {
        Backend::File => save_ledger(&MemoryLedger::new(), path)?,
        Backend::Redb => {
            RedbLedger::create(path, &options.config)?;
        }
    }

    info!(path = %path.display(), backend = %options.backend, "initialized ledger");
    println!("Initialized {} ledger at {}", options.backend, path.display());
    Ok(())
}

/// Run one transaction against the store and report it.
pub fn run_transaction(
    options: &StoreOptions,
    transaction: &Transaction,
) -> Result<Receipt, CliError> {
    let mut store = Store::open(options)?;
    log_intent(transaction, &options.config);
    let receipt = store.submit(&options.config, transaction)?;
    log_receipt(&receipt);
    print_receipt(&receipt, options.json)?;
    Ok(receipt)
}

/// Seed the demo participants and batches.
pub fn cmd_setup_demo(options: &StoreOptions, timestamp: Option<i64>) -> Result<Receipt, CliError> {
    run_transaction(
        options,
        &Transaction::SetupDemo {
            timestamp: timestamp_or_now(timestamp),
        },
    )
}

/// Record a pesticide reading on a cultivation.
pub fn cmd_pesticide(
    options: &StoreOptions,
    cultivation: &str,
    pesticide: &str,
) -> Result<Receipt, CliError> {
    run_transaction(
        options,
        &Transaction::PesticideReading {
            cultivation: cultivation.to_string(),
            pesticide: pesticide.to_string(),
        },
    )
}

/// Record a soil reading on a cultivation.
pub fn cmd_soil(
    options: &StoreOptions,
    cultivation: &str,
    contaminant: &str,
) -> Result<Receipt, CliError> {
    run_transaction(
        options,
        &Transaction::SoilReading {
            cultivation: cultivation.to_string(),
            contaminant: contaminant.to_string(),
        },
    )
}

/// Record an acidity reading on a production batch.
pub fn cmd_acidity(
    options: &StoreOptions,
    production: &str,
    acidity: &str,
) -> Result<Receipt, CliError> {
    let acidity: Acidity = acidity.parse()?;
    run_transaction(
        options,
        &Transaction::AcidityReading {
            production: production.to_string(),
            acidity,
        },
    )
}

/// Grade a production batch against its cultivation.
pub fn cmd_grade(
    options: &StoreOptions,
    cultivation: &str,
    production: &str,
    timestamp: Option<i64>,
) -> Result<Receipt, CliError> {
    run_transaction(
        options,
        &Transaction::DetermineGrade {
            cultivation: cultivation.to_string(),
            production: production.to_string(),
            timestamp: timestamp_or_now(timestamp),
        },
    )
}

/// Run a JSON array of transactions, each atomically, stopping at the first
/// failure. Transactions before the failing one stay committed.
pub fn cmd_submit(options: &StoreOptions, input: &Path) -> Result<Vec<Receipt>, CliError> {
    let content = std::fs::read_to_string(input)?;
    let transactions: Vec<Transaction> = serde_json::from_str(&content)?;
    let total = transactions.len();
    info!(file = %input.display(), total, "submitting transaction batch");

    let mut store = Store::open(options)?;
    let mut receipts = Vec::with_capacity(total);
    for (position, transaction) in transactions.iter().enumerate() {
        log_intent(transaction, &options.config);
        let receipt = store
            .submit(&options.config, transaction)
            .map_err(|source| {
                warn!(index = position, kind = transaction.kind(), error = %source, "batch stopped");
                CliError::Batch {
                    index: position.saturating_add(1),
                    total,
                    source: Box::new(source),
                }
            })?;
        log_receipt(&receipt);
        receipts.push(receipt);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&receipts)?);
    } else {
        for receipt in &receipts {
            print_receipt(receipt, false)?;
        }
    }
    Ok(receipts)
}

// =============================================================================
// INSPECTION COMMANDS
// =============================================================================

/// Entity counts per collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub backend: String,
    pub namespace: String,
    pub counts: Vec<(String, usize)>,
    pub total: usize,
}

/// Print entity counts per collection.
pub fn cmd_status(options: &StoreOptions) -> Result<StatusReport, CliError> {
    let ledger = Store::open_existing(options)?.snapshot()?;
    let report = StatusReport {
        backend: options.backend.clone(),
        namespace: options.config.namespace.clone(),
        counts: Collection::ALL
            .into_iter()
            .map(|c| (c.name().to_string(), ledger.count(c)))
            .collect(),
        total: ledger.len(),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Ledger: {} ({})", options.db_path.display(), report.backend);
        println!("Namespace: {}", report.namespace);
        for (name, count) in &report.counts {
            println!("  {name:<12} {count}");
        }
        println!("  {:<12} {}", "total", report.total);
    }
    Ok(report)
}

/// Print one entity, or every entity of a collection when `id` is `None`.
pub fn cmd_show(
    options: &StoreOptions,
    collection: &str,
    id: Option<&str>,
) -> Result<Vec<Entity>, CliError> {
    let collection = Collection::parse(collection)
        .ok_or_else(|| CliError::UnknownCollection(collection.to_string()))?;
    let ledger = Store::open_existing(options)?.snapshot()?;

    let entities = match id {
        Some(id) => vec![ledger.get(collection, id)?],
        None => ledger.list(collection)?,
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&entities)?);
    } else if entities.is_empty() {
        println!("No {} entities", options.config.qualified(collection));
    } else {
        for entity in &entities {
            println!("{}", describe(entity));
        }
    }
    Ok(entities)
}

/// Write the whole store to `output` as `json` or `canonical` bytes.
pub fn cmd_export(options: &StoreOptions, output: &Path, format: &str) -> Result<(), CliError> {
    if !matches!(format, "json" | "canonical") {
        return Err(CliError::UnknownFormat(format.to_string()));
    }
    let ledger = Store::open_existing(options)?.snapshot()?;
    let bytes = if format == "json" {
        serde_json::to_vec_pretty(&LedgerSnapshot::from(&ledger))?
    } else {
        encode_snapshot(&ledger)?
    };
    std::fs::write(output, &bytes)?;

    info!(output = %output.display(), format, entities = ledger.len(), "exported ledger");
    println!(
        "Exported {} entities to {}",
        ledger.len(),
        output.display()
    );
    Ok(())
}

/// Load a canonical snapshot into the store, all or nothing.
///
/// Any id already present in the target makes the whole import fail.
pub fn cmd_import(options: &StoreOptions, input: &Path) -> Result<usize, CliError> {
    let bytes = std::fs::read(input)?;
    let incoming = decode_snapshot(&bytes)?;
    let count = incoming.len();

    match Store::open(options)? {
        Store::File { path, mut ledger } => {
            import_into(&mut ledger, &incoming)?;
            save_ledger(&ledger, &path)?;
        }
        Store::Redb(mut db) => import_into(&mut db, &incoming)?,
    }

    info!(input = %input.display(), entities = count, "imported snapshot");
    println!("Imported {count} entities from {}", input.display());
    Ok(count)
}

fn import_into<S: LedgerStore>(store: &mut S, incoming: &MemoryLedger) -> Result<(), CliError> {
    store.transact(|ledger| {
        for collection in Collection::ALL {
            let batch = incoming.list(collection)?;
            if !batch.is_empty() {
                ledger.bulk_create(collection, batch)?;
            }
        }
        Ok(())
    })?;
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn log_intent(transaction: &Transaction, config: &LedgerConfig) {
    debug!(kind = transaction.kind(), "executing transaction");
    match transaction {
        Transaction::PesticideReading {
            cultivation,
            pesticide,
        } => info!(%cultivation, %pesticide, "adding pesticide reading"),
        Transaction::SoilReading {
            cultivation,
            contaminant,
        } => info!(%cultivation, %contaminant, "adding soil reading"),
        Transaction::AcidityReading {
            production,
            acidity,
        } => info!(%production, %acidity, "adding acidity reading"),
        Transaction::DetermineGrade {
            cultivation,
            production,
            ..
        } => info!(%cultivation, %production, bottler = %config.bottler, "determining grade"),
        Transaction::SetupDemo { timestamp } => {
            info!(%timestamp, namespace = %config.namespace, "seeding demo entities");
        }
    }
}

fn log_receipt(receipt: &Receipt) {
    match receipt {
        Receipt::ReadingRecorded {
            collection,
            entity,
            total,
            ..
        } => debug!(%collection, %entity, total, "reading recorded"),
        Receipt::Graded { grade } => {
            info!(grade = %grade.id, oil_type = %grade.oil_grade, "determined oil type");
        }
        Receipt::DemoSeeded { entities } => info!(entities, "demo entities created"),
    }
}

fn print_receipt(receipt: &Receipt, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(receipt)?);
        return Ok(());
    }
    match receipt {
        Receipt::ReadingRecorded {
            collection,
            entity,
            reading,
            total,
        } => println!("Added {reading} to {collection} {entity} ({total} readings)"),
        Receipt::Graded { grade } => println!(
            "Graded {}: {} (bottler {}, bottled at {})",
            grade.id, grade.oil_grade, grade.bottler, grade.bottled_date
        ),
        Receipt::DemoSeeded { entities } => println!("Seeded {entities} demo entities"),
    }
    Ok(())
}

fn join<T: ToString>(values: &[T]) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line text rendering of an entity.
fn describe(entity: &Entity) -> String {
    match entity {
        Entity::Grower(p) | Entity::Producer(p) | Entity::Bottler(p) => {
            format!("{} {} [{}]", entity.collection(), p.id, p.address.country)
        }
        Entity::Cultivation(c) => format!(
            "Cultivation {} grower={} process={} picked={} origin={} pesticides=[{}] soil=[{}]",
            c.id,
            c.grower,
            c.process,
            c.picking_date,
            c.origin.country,
            join(&c.pesticide_readings),
            join(&c.soil_readings)
        ),
        Entity::Production(p) => format!(
            "Production {} producer={} method={} crushed={} stored={} acidity=[{}]",
            p.id,
            p.producer,
            p.method,
            p.crushing_date,
            p.stored_date,
            join(&p.acidity_readings)
        ),
        Entity::Grade(g) => format!(
            "Grade {} oil={} bottler={} bottled={}",
            g.id, g.oil_grade, g.bottler, g.bottled_date
        ),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use olive_ledger_core::{Address, Participant};

    #[test]
    fn backend_names() {
        assert_eq!(Backend::parse("file").ok(), Some(Backend::File));
        assert_eq!(Backend::parse("redb").ok(), Some(Backend::Redb));
        assert!(matches!(
            Backend::parse("sqlite"),
            Err(CliError::UnknownBackend(_))
        ));
    }

    #[test]
    fn explicit_timestamp_wins() {
        assert_eq!(timestamp_or_now(Some(42)), Timestamp(42));
        assert!(timestamp_or_now(None).0 > 0);
    }

    #[test]
    fn describe_participant_and_empty_readings() {
        let bottler = Entity::Bottler(Participant::new("b@x", Address::in_country("US")));
        assert_eq!(describe(&bottler), "Bottler b@x [US]");
        assert_eq!(join::<String>(&[]), "-");
    }
}
