// ============================================================================
// Utilities Module
// Helpers for embedding programs
// ============================================================================

#[cfg(feature = "logging")]
mod logging;

#[cfg(feature = "logging")]
pub use logging::init_logging;
