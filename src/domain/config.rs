// ============================================================================
// Probe Configuration
// Inputs that shape how the registry is populated
// ============================================================================

use super::feature::Feature;
use super::feature_set::FeatureSet;
use crate::errors::{PlatformError, PlatformResult};
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default location of the kernel CPU description on Linux.
pub const DEFAULT_CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Configuration applied when the registry is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProbeConfig {
    /// CPU description file read by the ARM/Linux probe
    pub cpuinfo_path: PathBuf,

    /// Flags forced off after probing, whatever the hardware reports.
    /// Useful for exercising scalar fallbacks on capable machines.
    pub disabled: FeatureSet,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cpuinfo_path: PathBuf::from(DEFAULT_CPUINFO_PATH),
            disabled: FeatureSet::empty(),
        }
    }
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: Read CPU description text from another file
    pub fn with_cpuinfo_path(mut self, path: impl AsRef<Path>) -> Self {
        self.cpuinfo_path = path.as_ref().to_path_buf();
        self
    }

    /// Builder method: Force a flag off
    pub fn with_disabled(mut self, feature: Feature) -> Self {
        self.disabled.insert(feature);
        self
    }

    /// Builder method: Force several flags off
    pub fn with_disabled_set(mut self, features: FeatureSet) -> Self {
        self.disabled = self.disabled.union(features);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> PlatformResult<()> {
        if self.cpuinfo_path.as_os_str().is_empty() {
            return Err(PlatformError::InvalidConfig(
                "cpuinfo path cannot be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.cpuinfo_path, PathBuf::from("/proc/cpuinfo"));
        assert!(config.disabled.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ProbeConfig::new()
            .with_cpuinfo_path("/tmp/cpuinfo")
            .with_disabled(Feature::Avx512F)
            .with_disabled_set(FeatureSet::empty().with(Feature::Avx2));

        assert_eq!(config.cpuinfo_path, PathBuf::from("/tmp/cpuinfo"));
        assert!(config.disabled.contains(Feature::Avx512F));
        assert!(config.disabled.contains(Feature::Avx2));
    }

    #[test]
    fn test_validate_empty_path() {
        let config = ProbeConfig::new().with_cpuinfo_path("");
        assert_eq!(
            config.validate(),
            Err(PlatformError::InvalidConfig("cpuinfo path cannot be empty"))
        );
    }
}
