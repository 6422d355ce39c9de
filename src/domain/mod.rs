// ============================================================================
// Domain Models Module
// Capability flags, the bit vector that stores them, and probe configuration
// ============================================================================

pub mod arch;
pub mod config;
pub mod feature;
pub mod feature_set;

pub use arch::{Architecture, SimdLevel};
pub use config::{ProbeConfig, DEFAULT_CPUINFO_PATH};
pub use feature::{Feature, FeatureFamily, UnknownFeature, FEATURE_COUNT};
pub use feature_set::FeatureSet;
