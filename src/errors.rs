// ============================================================================
// Platform Errors
// Error types for probe sources, configuration and registry setup
// ============================================================================
//
// None of these ever reach a capability query. Probes turn source errors into
// "capability absent" and log them; only setup calls return them.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while setting up or feeding the capability registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A capability source file could not be read
    SourceUnavailable { path: PathBuf, kind: io::ErrorKind },
    /// The global registry was already built before configuration arrived
    AlreadyInitialized,
    /// Configuration failed validation
    InvalidConfig(&'static str),
    /// Rendering a capability report failed
    Serialization(String),
    /// A global logging subscriber could not be installed
    Logging(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::SourceUnavailable { path, kind } => {
                write!(
                    f,
                    "capability source unavailable: {} ({})",
                    path.display(),
                    kind
                )
            },
            PlatformError::AlreadyInitialized => {
                write!(f, "capability registry already initialized")
            },
            PlatformError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            PlatformError::Serialization(msg) => write!(f, "report serialization failed: {}", msg),
            PlatformError::Logging(msg) => write!(f, "logging setup failed: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Result type alias for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
