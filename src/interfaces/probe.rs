// ============================================================================
// Capability Probe Interface
// Contract for platform-specific raw capability collection
// ============================================================================

use crate::domain::FeatureSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strategy that fills the registry's bit vector for one platform.
///
/// # Contract
/// - `collect` never fails and never panics. When its source is missing or
///   malformed it leaves the affected bits untouched (false).
/// - It only ever sets bits it can prove; under-detection is acceptable,
///   over-detection is not.
///
/// Implementations must be `Send + Sync` so a probe can be shared with the
/// thread that wins registry construction.
pub trait CapabilityProbe: Send + Sync {
    /// Write detected flags into `features`.
    fn collect(&self, features: &mut FeatureSet);

    /// Vendor and model strings, when the platform exposes them.
    fn identify(&self) -> Option<CpuIdentity> {
        None
    }

    /// Short name, used for logging and reports.
    fn name(&self) -> &'static str;
}

/// Human-readable processor identification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CpuIdentity {
    /// Vendor id, e.g. "GenuineIntel"
    pub vendor: String,
    /// Marketing brand string, when available
    pub brand: Option<String>,
}

impl std::fmt::Display for CpuIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.brand {
            Some(brand) => write!(f, "{} ({})", brand, self.vendor),
            None => write!(f, "{}", self.vendor),
        }
    }
}
