//! # Entities
//!
//! Assets and participants tracked by the ledger.
//!
//! Every entity lives in exactly one [`Collection`] and is keyed by a string
//! identifier. Participants (growers, producers, bottlers) share one shape;
//! their role is given by the collection they are stored in.

use crate::Acidity;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// TIMESTAMP
// =============================================================================

/// Whole seconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Shift by a signed number of seconds, saturating at the bounds.
    #[must_use]
    pub fn offset(self, seconds: i64) -> Self {
        Self(self.0.saturating_add(seconds))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Named entity collections (asset and participant registries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collection {
    Grower,
    Producer,
    Bottler,
    Cultivation,
    Production,
    Grade,
}

impl Collection {
    /// All collections in canonical order.
    pub const ALL: [Collection; 6] = [
        Collection::Grower,
        Collection::Producer,
        Collection::Bottler,
        Collection::Cultivation,
        Collection::Production,
        Collection::Grade,
    ];

    /// Unqualified type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Grower => "Grower",
            Self::Producer => "Producer",
            Self::Bottler => "Bottler",
            Self::Cultivation => "Cultivation",
            Self::Production => "Production",
            Self::Grade => "Grade",
        }
    }

    /// Type name qualified by a namespace, e.g. `org.twotrees.safety.Grade`.
    #[must_use]
    pub fn qualified_name(self, namespace: &str) -> String {
        if namespace.is_empty() {
            self.name().to_string()
        } else {
            format!("{namespace}.{}", self.name())
        }
    }

    /// Parse a collection name, case-insensitive.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PARTICIPANTS
// =============================================================================

/// A postal address. Only the country is tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
}

impl Address {
    #[must_use]
    pub fn in_country(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
        }
    }
}

/// A grower, producer or bottler, identified by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub address: Address,
}

impl Participant {
    #[must_use]
    pub fn new(id: impl Into<String>, address: Address) -> Self {
        Self {
            id: id.into(),
            address,
        }
    }
}

// =============================================================================
// ASSETS
// =============================================================================

/// A harvested batch of olives and the environmental readings taken on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cultivation {
    pub id: String,
    /// How the olives were harvested (e.g. `HANDPICKED`).
    pub process: String,
    /// Pesticide type declared at cultivation time.
    pub pesticide_type: String,
    /// Grower participant id.
    pub grower: String,
    pub picking_date: Timestamp,
    pub origin: Address,
    /// Append-only.
    #[serde(default)]
    pub pesticide_readings: Vec<String>,
    /// Append-only.
    #[serde(default)]
    pub soil_readings: Vec<String>,
}

impl Cultivation {
    /// A cultivation with no readings yet.
    #[must_use]
    pub fn new(id: impl Into<String>, grower: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            process: String::new(),
            pesticide_type: String::new(),
            grower: grower.into(),
            picking_date: Timestamp::default(),
            origin: Address::default(),
            pesticide_readings: Vec::new(),
            soil_readings: Vec::new(),
        }
    }
}

/// A pressed batch of oil and its acidity readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub id: String,
    /// Extraction method (e.g. `COLD_EXTRACTION`).
    pub method: String,
    pub crushing_date: Timestamp,
    pub stored_date: Timestamp,
    /// Producer participant id.
    pub producer: String,
    /// Append-only.
    #[serde(default)]
    pub acidity_readings: Vec<Acidity>,
}

impl Production {
    /// A production batch with no readings yet.
    #[must_use]
    pub fn new(id: impl Into<String>, producer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method: String::new(),
            crushing_date: Timestamp::default(),
            stored_date: Timestamp::default(),
            producer: producer.into(),
            acidity_readings: Vec::new(),
        }
    }
}

/// The immutable quality classification of a bottled production batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: String,
    pub bottled_date: Timestamp,
    /// Oil type label, e.g. `ORGANIC_EXTRA_VIRGIN`.
    pub oil_grade: String,
    /// Bottler participant id.
    pub bottler: String,
}

// =============================================================================
// ENTITY
// =============================================================================

/// Any record the ledger stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Grower(Participant),
    Producer(Participant),
    Bottler(Participant),
    Cultivation(Cultivation),
    Production(Production),
    Grade(Grade),
}

impl Entity {
    /// The collection this entity belongs to.
    #[must_use]
    pub fn collection(&self) -> Collection {
        match self {
            Self::Grower(_) => Collection::Grower,
            Self::Producer(_) => Collection::Producer,
            Self::Bottler(_) => Collection::Bottler,
            Self::Cultivation(_) => Collection::Cultivation,
            Self::Production(_) => Collection::Production,
            Self::Grade(_) => Collection::Grade,
        }
    }

    /// The entity identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Grower(p) | Self::Producer(p) | Self::Bottler(p) => &p.id,
            Self::Cultivation(c) => &c.id,
            Self::Production(p) => &p.id,
            Self::Grade(g) => &g.id,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
