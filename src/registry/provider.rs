// ============================================================================
// Capability Registry
// Process-wide, construct-once table of capability flags
// ============================================================================
//
// Construction runs exactly one probe, once. `OnceLock` provides the
// exactly-once guarantee and the release/acquire edge between the thread that
// builds the registry and every thread that reads it. After that, queries are
// plain reads of an immutable bit vector.

use crate::domain::{Architecture, Feature, FeatureSet, ProbeConfig, SimdLevel};
use crate::errors::{PlatformError, PlatformResult};
use crate::interfaces::{CapabilityProbe, CpuIdentity};
use crate::probe::default_probe;
use std::fmt;
use std::sync::OnceLock;

/// Immutable snapshot of what the CPU/OS supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    features: FeatureSet,
    identity: Option<CpuIdentity>,
    probe: &'static str,
}

impl Registry {
    /// Run `probe` once and freeze its result, minus `config.disabled`.
    pub fn from_probe(probe: &dyn CapabilityProbe, config: &ProbeConfig) -> Self {
        let mut features = FeatureSet::empty();
        probe.collect(&mut features);

        let forced_off = features.bits() & config.disabled.bits() != 0;
        let features = features.difference(config.disabled);
        let identity = probe.identify();

        tracing::info!(
            probe = probe.name(),
            arch = %Architecture::detect(),
            features = %features,
            forced_off,
            "cpu capability registry initialized"
        );

        Self {
            features,
            identity,
            probe: probe.name(),
        }
    }

    /// Probe the current machine with the default configuration.
    pub fn detect() -> Self {
        Self::with_config(&ProbeConfig::default())
    }

    /// Probe the current machine with the target's default probe.
    pub fn with_config(config: &ProbeConfig) -> Self {
        let probe = default_probe(config);
        Self::from_probe(probe.as_ref(), config)
    }

    /// Stored bit for `feature`.
    #[inline]
    pub fn check(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }

    /// Stored bit for a raw flag index. Unknown indices are `false`.
    #[inline]
    pub fn check_index(&self, index: i64) -> bool {
        self.features.contains_index(index)
    }

    #[inline]
    pub fn features(&self) -> FeatureSet {
        self.features
    }

    pub fn identity(&self) -> Option<&CpuIdentity> {
        self.identity.as_ref()
    }

    /// Name of the probe that populated this registry.
    pub fn probe_name(&self) -> &'static str {
        self.probe
    }

    pub fn architecture(&self) -> Architecture {
        Architecture::detect()
    }

    pub fn simd_level(&self) -> SimdLevel {
        SimdLevel::from_features(self.features)
    }

    /// JSON capability report.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> PlatformResult<String> {
        #[derive(serde::Serialize)]
        struct Report<'a> {
            architecture: Architecture,
            probe: &'static str,
            identity: Option<&'a CpuIdentity>,
            simd_level: SimdLevel,
            features: Vec<&'static str>,
        }

        let report = Report {
            architecture: self.architecture(),
            probe: self.probe,
            identity: self.identity.as_ref(),
            simd_level: self.simd_level(),
            features: self.features.enabled().iter().map(|f| f.name()).collect(),
        };

        serde_json::to_string_pretty(&report)
            .map_err(|e| PlatformError::Serialization(e.to_string()))
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU: {}", self.architecture())?;
        if let Some(identity) = &self.identity {
            write!(f, " [{}]", identity)?;
        }
        write!(
            f,
            " with {} via {}: {}",
            self.simd_level(),
            self.probe,
            self.features
        )
    }
}

/// A registry slot that is filled exactly once, on first use.
///
/// Concurrent first callers block until the single initializer finishes and
/// then all observe the same fully-built registry.
#[derive(Debug, Default)]
pub struct LazyRegistry {
    cell: OnceLock<Registry>,
}

impl LazyRegistry {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// The registry, if already built.
    #[inline]
    pub fn get(&self) -> Option<&Registry> {
        self.cell.get()
    }

    /// The registry, building it with `init` if this is the first access.
    #[inline]
    pub fn get_or_init_with<F>(&self, init: F) -> &Registry
    where
        F: FnOnce() -> Registry,
    {
        self.cell.get_or_init(init)
    }

    /// The registry, building it from `probe` if this is the first access.
    pub fn get_or_probe(&self, probe: &dyn CapabilityProbe, config: &ProbeConfig) -> &Registry {
        self.get_or_init_with(|| Registry::from_probe(probe, config))
    }

    /// Build the registry with `init`, failing if it already exists or another
    /// thread's initializer won.
    pub fn init_with<F>(&self, init: F) -> PlatformResult<&Registry>
    where
        F: FnOnce() -> Registry,
    {
        let mut built_here = false;
        let registry = self.cell.get_or_init(|| {
            built_here = true;
            init()
        });

        if built_here {
            Ok(registry)
        } else {
            Err(PlatformError::AlreadyInitialized)
        }
    }
}

static GLOBAL: LazyRegistry = LazyRegistry::new();

/// The process-wide registry, probing the CPU on first call.
#[inline]
pub fn get_registry() -> &'static Registry {
    GLOBAL.get_or_init_with(Registry::detect)
}

/// Build the process-wide registry with a custom configuration.
///
/// Must run before the first query; afterwards it returns
/// [`PlatformError::AlreadyInitialized`] and the existing registry is kept.
pub fn init_with_config(config: ProbeConfig) -> PlatformResult<&'static Registry> {
    config.validate()?;
    GLOBAL.init_with(|| Registry::with_config(&config))
}

/// Shorthand for `get_registry().check(feature)`.
#[inline]
pub fn check_feature(feature: Feature) -> bool {
    get_registry().check(feature)
}

/// Shorthand for `get_registry().check_index(index)`.
#[inline]
pub fn check_feature_index(index: i64) -> bool {
    get_registry().check_index(index)
}
