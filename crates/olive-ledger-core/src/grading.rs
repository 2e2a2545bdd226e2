//! # Grade Evaluator
//!
//! Derives the oil type of a production batch from the readings of its
//! cultivation and its own acidity readings, then records the grade.
//!
//! ## Decision procedure
//!
//! 1. Distinct soil labels must be exactly `{"NONE"}`; anything else is
//!    `REJECTED` and acidity is never looked at.
//! 2. Without a `"CHEMICALS"` pesticide reading the label gets `ORGANIC_`.
//! 3. The highest acidity reading picks the class, upper bounds inclusive:
//!    `<= 1` delicate extra virgin, `<= 2` extra virgin, `<= 4` virgin.
//! 4. Above 4 the result is `BEAUTY` outright, dropping the organic prefix.
//!
//! Step 4 reads like an oversight in the original rule set (every other class
//! keeps the prefix) but downstream consumers depend on the exact label, so
//! it is kept as is.
//!
//! Readings are append-only lists; distinct sets are computed here on every
//! evaluation, so order and repetition never affect the result.

use crate::error::{LedgerError, Result};
use crate::primitives::{ORGANIC_PREFIX, PESTICIDE_CHEMICALS, SOIL_CLEAN};
use crate::{Acidity, Cultivation, Entity, Grade, Ledger, LedgerConfig, Production, Timestamp};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// OIL TYPES
// =============================================================================

/// Acidity band of an accepted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AcidityClass {
    /// Max acidity `<= 1`.
    DelicateExtraVirgin,
    /// Max acidity in `(1, 2]`.
    ExtraVirgin,
    /// Max acidity in `(2, 4]`.
    Virgin,
}

impl AcidityClass {
    /// Band for a maximum acidity, or `None` above 4%.
    #[must_use]
    pub fn for_max_acidity(max: Acidity) -> Option<Self> {
        if max <= Acidity::from_percent(1) {
            Some(Self::DelicateExtraVirgin)
        } else if max <= Acidity::from_percent(2) {
            Some(Self::ExtraVirgin)
        } else if max <= Acidity::from_percent(4) {
            Some(Self::Virgin)
        } else {
            None
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::DelicateExtraVirgin => "DELICATE_EXTRA_VIRGIN",
            Self::ExtraVirgin => "EXTRA_VIRGIN",
            Self::Virgin => "VIRGIN",
        }
    }
}

/// Outcome of grading one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OilType {
    /// Soil readings were not exclusively clean.
    Rejected,
    /// Accepted and within the virgin acidity bands.
    Classified { organic: bool, class: AcidityClass },
    /// Accepted but above 4% acidity.
    Beauty,
}

impl fmt::Display for OilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => f.write_str("REJECTED"),
            Self::Beauty => f.write_str("BEAUTY"),
            Self::Classified { organic, class } => {
                if *organic {
                    f.write_str(ORGANIC_PREFIX)?;
                }
                f.write_str(class.label())
            }
        }
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Classify raw reading lists.
///
/// Returns `None` when the soil check passes but there is no acidity reading
/// to take a maximum over. A rejected batch never needs acidity.
pub fn evaluate<S: AsRef<str>>(
    soil_readings: &[S],
    pesticide_readings: &[S],
    acidity_readings: &[Acidity],
) -> Option<OilType> {
    let soil: BTreeSet<&str> = soil_readings.iter().map(AsRef::as_ref).collect();
    let pesticides: BTreeSet<&str> = pesticide_readings.iter().map(AsRef::as_ref).collect();

    if soil.len() != 1 || !soil.contains(SOIL_CLEAN) {
        return Some(OilType::Rejected);
    }

    let organic = !pesticides.contains(PESTICIDE_CHEMICALS);
    let max_acidity = acidity_readings.iter().copied().max()?;

    Some(match AcidityClass::for_max_acidity(max_acidity) {
        Some(class) => OilType::Classified { organic, class },
        None => OilType::Beauty,
    })
}

/// Classify a cultivation/production pair.
///
/// Fails with `EmptyAcidity` when the batch would need an acidity maximum but
/// the production has no readings.
pub fn grade_batch(cultivation: &Cultivation, production: &Production) -> Result<OilType> {
    evaluate(
        &cultivation.soil_readings,
        &cultivation.pesticide_readings,
        &production.acidity_readings,
    )
    .ok_or_else(|| LedgerError::EmptyAcidity {
        production: production.id.clone(),
    })
}

/// Derive a grade id from a production id.
///
/// The first occurrence of the configured batch prefix is removed and the
/// grade prefix prepended: `OIL_BATCH_001` becomes `OIL_GRADE_001`.
#[must_use]
pub fn grade_id(production_id: &str, config: &LedgerConfig) -> String {
    let suffix = if config.batch_prefix.is_empty() {
        production_id.to_string()
    } else {
        production_id.replacen(config.batch_prefix.as_str(), "", 1)
    };
    format!("{}{}", config.grade_prefix, suffix)
}

/// Grade a production batch against its cultivation and record the result.
///
/// The new grade is created once; grading the same production twice fails
/// with `Conflict` from the ledger.
pub fn determine_grade(
    ledger: &mut dyn Ledger,
    config: &LedgerConfig,
    cultivation_id: &str,
    production_id: &str,
    timestamp: Timestamp,
) -> Result<Grade> {
    let cultivation = ledger.cultivation(cultivation_id)?;
    let production = ledger.production(production_id)?;
    let oil_type = grade_batch(&cultivation, &production)?;

    let grade = Grade {
        id: grade_id(&production.id, config),
        bottled_date: timestamp,
        oil_grade: oil_type.to_string(),
        bottler: config.bottler.clone(),
    };
    ledger.create(Entity::Grade(grade.clone()))?;
    Ok(grade)
}

// =============================================================================
// TESTS
// =============================================================================
