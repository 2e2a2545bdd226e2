//! Fixed labels and defaults shared across the core.

/// Soil label meaning no contaminant was detected.
pub const SOIL_CLEAN: &str = "NONE";

/// Pesticide label marking synthetic chemical treatment.
pub const PESTICIDE_CHEMICALS: &str = "CHEMICALS";

/// Prefix applied to classified oil when no chemicals were recorded.
pub const ORGANIC_PREFIX: &str = "ORGANIC_";

/// Default namespace qualifying collection names.
pub const DEFAULT_NAMESPACE: &str = "org.twotrees.safety";

/// Default bottler referenced by newly created grades.
pub const DEFAULT_BOTTLER: &str = "bottler@twotrees.com";

/// Default literal removed from production ids when deriving grade ids.
pub const DEFAULT_BATCH_PREFIX: &str = "OIL_BATCH_";

/// Default literal prepended to derived grade ids.
pub const DEFAULT_GRADE_PREFIX: &str = "OIL_GRADE_";

/// Seconds in one day, used by the demo seeder.
pub const SECONDS_PER_DAY: i64 = 86_400;
