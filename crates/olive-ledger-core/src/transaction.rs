//! # Transactions
//!
//! Typed transaction records and their dispatch.
//!
//! A [`Transaction`] is plain data; [`Transaction::execute`] runs it against
//! a ledger and [`submit`] runs it inside one atomic unit of a
//! [`LedgerStore`]. Nothing is retried and no error is caught here.

use crate::error::Result;
use crate::{Acidity, Collection, Grade, Ledger, LedgerConfig, LedgerStore, Timestamp};
use crate::{demo, grading, recorder};
use serde::{Deserialize, Serialize};

/// Transaction entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    /// Append a pesticide label to a cultivation.
    PesticideReading {
        cultivation: String,
        pesticide: String,
    },
    /// Append a soil contaminant label to a cultivation.
    SoilReading {
        cultivation: String,
        contaminant: String,
    },
    /// Append an acidity value to a production batch.
    AcidityReading {
        production: String,
        acidity: Acidity,
    },
    /// Grade a production batch and record the grade.
    DetermineGrade {
        cultivation: String,
        production: String,
        timestamp: Timestamp,
    },
    /// Seed the demo entities.
    SetupDemo { timestamp: Timestamp },
}

/// What a committed transaction did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Receipt {
    ReadingRecorded {
        collection: Collection,
        entity: String,
        reading: String,
        /// Length of the reading list after the append.
        total: usize,
    },
    Graded { grade: Grade },
    DemoSeeded { entities: usize },
}

impl Transaction {
    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PesticideReading { .. } => "pesticide_reading",
            Self::SoilReading { .. } => "soil_reading",
            Self::AcidityReading { .. } => "acidity_reading",
            Self::DetermineGrade { .. } => "determine_grade",
            Self::SetupDemo { .. } => "setup_demo",
        }
    }

    /// Run the transaction against a ledger.
    ///
    /// Not atomic by itself; use [`submit`] for all-or-nothing semantics.
    pub fn execute(&self, ledger: &mut dyn Ledger, config: &LedgerConfig) -> Result<Receipt> {
        match self {
            Self::PesticideReading {
                cultivation,
                pesticide,
            } => {
                let total = recorder::record_pesticide_reading(ledger, cultivation, pesticide)?;
                Ok(Receipt::ReadingRecorded {
                    collection: Collection::Cultivation,
                    entity: cultivation.clone(),
                    reading: pesticide.clone(),
                    total,
                })
            }
            Self::SoilReading {
                cultivation,
                contaminant,
            } => {
                let total = recorder::record_soil_reading(ledger, cultivation, contaminant)?;
                Ok(Receipt::ReadingRecorded {
                    collection: Collection::Cultivation,
                    entity: cultivation.clone(),
                    reading: contaminant.clone(),
                    total,
                })
            }
            Self::AcidityReading {
                production,
                acidity,
            } => {
                let total = recorder::record_acidity_reading(ledger, production, *acidity)?;
                Ok(Receipt::ReadingRecorded {
                    collection: Collection::Production,
                    entity: production.clone(),
                    reading: acidity.to_string(),
                    total,
                })
            }
            Self::DetermineGrade {
                cultivation,
                production,
                timestamp,
            } => {
                let grade =
                    grading::determine_grade(ledger, config, cultivation, production, *timestamp)?;
                Ok(Receipt::Graded { grade })
            }
            Self::SetupDemo { timestamp } => {
                let entities = demo::setup_demo(ledger, *timestamp)?;
                Ok(Receipt::DemoSeeded { entities })
            }
        }
    }
}

/// Execute one transaction atomically against a store.
pub fn submit<S: LedgerStore>(
    store: &mut S,
    config: &LedgerConfig,
    transaction: &Transaction,
) -> Result<Receipt> {
    store.transact(|ledger| transaction.execute(ledger, config))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LedgerError, MemoryLedger};

    fn seeded() -> Result<MemoryLedger> {
        let mut ledger = MemoryLedger::new();
        submit(
            &mut ledger,
            &LedgerConfig::default(),
            &Transaction::SetupDemo {
                timestamp: Timestamp(1_000),
            },
        )?;
        Ok(ledger)
    }

    #[test]
    fn full_grading_flow() -> Result<()> {
        let mut ledger = seeded()?;
        let config = LedgerConfig::default();

        let steps = [
            Transaction::SoilReading {
                cultivation: "OLIVE_BATCH_001".into(),
                contaminant: "NONE".into(),
            },
            Transaction::PesticideReading {
                cultivation: "OLIVE_BATCH_001".into(),
                pesticide: "NATURAL_TOXINS".into(),
            },
            Transaction::AcidityReading {
                production: "OIL_BATCH_001".into(),
                acidity: Acidity::from_micros(1_500_000),
            },
        ];
        for step in &steps {
            submit(&mut ledger, &config, step)?;
        }

        let receipt = submit(
            &mut ledger,
            &config,
            &Transaction::DetermineGrade {
                cultivation: "OLIVE_BATCH_001".into(),
                production: "OIL_BATCH_001".into(),
                timestamp: Timestamp(2_000),
            },
        )?;

        let Receipt::Graded { grade } = receipt else {
            return Err(LedgerError::Format("expected a grade receipt".into()));
        };
        assert_eq!(grade.id, "OIL_GRADE_001");
        assert_eq!(grade.oil_grade, "ORGANIC_EXTRA_VIRGIN");
        Ok(())
    }

    #[test]
    fn reading_receipt_reports_total() -> Result<()> {
        let mut ledger = seeded()?;
        let config = LedgerConfig::default();
        let tx = Transaction::AcidityReading {
            production: "OIL_BATCH_001".into(),
            acidity: Acidity::from_percent(2),
        };
        submit(&mut ledger, &config, &tx)?;
        let receipt = submit(&mut ledger, &config, &tx)?;

        assert_eq!(
            receipt,
            Receipt::ReadingRecorded {
                collection: Collection::Production,
                entity: "OIL_BATCH_001".into(),
                reading: "2".into(),
                total: 2,
            }
        );
        Ok(())
    }

    #[test]
    fn failed_grade_leaves_ledger_untouched() -> Result<()> {
        let mut ledger = seeded()?;
        submit(
            &mut ledger,
            &LedgerConfig::default(),
            &Transaction::SoilReading {
                cultivation: "OLIVE_BATCH_001".into(),
                contaminant: "NONE".into(),
            },
        )?;
        let before = ledger.clone();

        let result = submit(
            &mut ledger,
            &LedgerConfig::default(),
            &Transaction::DetermineGrade {
                cultivation: "OLIVE_BATCH_001".into(),
                production: "OIL_BATCH_001".into(),
                timestamp: Timestamp(3),
            },
        );

        assert!(matches!(result, Err(LedgerError::EmptyAcidity { .. })));
        assert_eq!(ledger, before);
        Ok(())
    }

    #[test]
    fn transactions_parse_from_json() {
        let json = r#"[
            {"type": "setup_demo", "timestamp": 100},
            {"type": "acidity_reading", "production": "OIL_BATCH_001", "acidity": "0.75"},
            {"type": "determine_grade", "cultivation": "C", "production": "P", "timestamp": 7},
            {"type": "acidity_reading", "production": "OIL_BATCH_001", "acidity": 1.5},
            {"type": "acidity_reading", "production": "OIL_BATCH_001", "acidity": 10}
        ]"#;
        let parsed: std::result::Result<Vec<Transaction>, _> = serde_json::from_str(json);
        let parsed = parsed.unwrap_or_default();

        assert_eq!(parsed.len(), 5);
        assert_eq!(
            parsed[1],
            Transaction::AcidityReading {
                production: "OIL_BATCH_001".into(),
                acidity: Acidity::from_micros(750_000),
            }
        );
        assert_eq!(parsed[2].kind(), "determine_grade");
        assert_eq!(
            parsed[3],
            Transaction::AcidityReading {
                production: "OIL_BATCH_001".into(),
                acidity: Acidity::from_micros(1_500_000),
            }
        );
        assert_eq!(
            parsed[4],
            Transaction::AcidityReading {
                production: "OIL_BATCH_001".into(),
                acidity: Acidity::from_percent(10),
            }
        );
    }
}
