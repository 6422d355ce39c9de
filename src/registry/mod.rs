// ============================================================================
// Registry Module
// Process-wide capability registry and the query API built on it
// ============================================================================

pub mod compile_time;
mod provider;
mod query;

pub use provider::{
    check_feature, check_feature_index, get_registry, init_with_config, LazyRegistry, Registry,
};
pub use query::*;
