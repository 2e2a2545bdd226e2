//! Ledger configuration.
//!
//! Identities and naming that grading and storage depend on. Nothing here is
//! read from the environment; the host decides where values come from.

use crate::Collection;
use crate::primitives::{
    DEFAULT_BATCH_PREFIX, DEFAULT_BOTTLER, DEFAULT_GRADE_PREFIX, DEFAULT_NAMESPACE,
};
use serde::{Deserialize, Serialize};

/// Values passed into every transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Namespace qualifying collection names.
    pub namespace: String,
    /// Bottler referenced by grades created by this ledger.
    pub bottler: String,
    /// Literal removed from a production id to derive its grade id.
    pub batch_prefix: String,
    /// Literal prepended to derived grade ids.
    pub grade_prefix: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            bottler: DEFAULT_BOTTLER.to_string(),
            batch_prefix: DEFAULT_BATCH_PREFIX.to_string(),
            grade_prefix: DEFAULT_GRADE_PREFIX.to_string(),
        }
    }
}

impl LedgerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_bottler(mut self, bottler: impl Into<String>) -> Self {
        self.bottler = bottler.into();
        self
    }

    #[must_use]
    pub fn with_batch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.batch_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_grade_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.grade_prefix = prefix.into();
        self
    }

    /// Fully qualified name of a collection under this namespace.
    #[must_use]
    pub fn qualified(&self, collection: Collection) -> String {
        collection.qualified_name(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_identities() {
        let config = LedgerConfig::default();
        assert_eq!(config.namespace, "org.twotrees.safety");
        assert_eq!(config.bottler, "bottler@twotrees.com");
        assert_eq!(config.batch_prefix, "OIL_BATCH_");
        assert_eq!(config.grade_prefix, "OIL_GRADE_");
    }

    #[test]
    fn builder_overrides_fields() {
        let config = LedgerConfig::new()
            .with_namespace("com.example")
            .with_bottler("line-2@example.com");
        assert_eq!(config.qualified(Collection::Production), "com.example.Production");
        assert_eq!(config.bottler, "line-2@example.com");
    }
}
