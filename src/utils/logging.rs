// ============================================================================
// Logging Setup
// Installs a tracing-subscriber fmt layer for binaries and demos
// ============================================================================

use crate::errors::{PlatformError, PlatformResult};
use tracing::Level;

/// Install a global `fmt` subscriber at `level`.
///
/// Fails if another global subscriber is already set.
pub fn init_logging(level: Level) -> PlatformResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| PlatformError::Logging(e.to_string()))
}
