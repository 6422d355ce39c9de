// ============================================================================
// ARM Linux Capability Probe
// Parses the kernel's /proc/cpuinfo text for NEON, VFPv3 and ARMv7
// ============================================================================
//
// Two lines matter, in the form the ARM kernels print them:
//
//     Features	: half thumb fastmult vfp edsp neon vfpv3 tls vfpv4 idiva idivt
//     CPU architecture: 7
//
// The Features value is split on single spaces, so runs of spaces yield empty
// tokens which simply match nothing. If a line appears several times (one
// block per core), the last one wins.

use super::ArmFamily;
use crate::domain::{Feature, FeatureSet};
use crate::errors::{PlatformError, PlatformResult};
use crate::interfaces::CapabilityProbe;
use smallvec::SmallVec;
use std::fs;
use std::path::{Path, PathBuf};

const FEATURES_PREFIX: &str = "Features\t";
const CPU_ARCH_PREFIX: &str = "CPU architecture:";

type Tokens<'a> = SmallVec<[&'a str; 32]>;

/// Value part of a `Features` line, or `None` for any other line.
///
/// The key must be followed by the tab the kernel writes. The value starts
/// after the colon, or right after the tab when there is none.
fn features_value(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(FEATURES_PREFIX)?;
    Some(match rest.split_once(':') {
        Some((_, value)) => value,
        None => rest,
    })
}

/// Parse the architecture number the way `strtol` would with a full-match check:
/// leading whitespace allowed, anything after the digits rejects the value.
fn parse_arch_number(value: &str) -> Option<i64> {
    value.trim_start().parse::<i64>().ok()
}

/// Extract capability flags from cpuinfo text.
///
/// Token mapping depends on the register width of the build:
/// `neon` and `vfpv3` count on 32-bit ARM, `asimd` counts on AArch64.
/// `CPU architecture: 7` sets ARMv7 on either. Missing lines leave their flags
/// false; this never fails.
pub fn parse_cpuinfo(text: &str, family: ArmFamily) -> FeatureSet {
    let mut tokens: Tokens<'_> = SmallVec::new();
    let mut cpu_arch: Option<i64> = None;

    for line in text.lines() {
        if let Some(value) = features_value(line) {
            tokens = value.split(' ').collect();
        } else if let Some(value) = line.strip_prefix(CPU_ARCH_PREFIX) {
            if let Some(n) = parse_arch_number(value) {
                cpu_arch = Some(n);
            }
        }
    }

    let mut features = FeatureSet::empty();

    if cpu_arch == Some(7) {
        features.insert(Feature::ArmV7);
    }

    for token in tokens {
        match (family, token) {
            (ArmFamily::Arm32, "neon") => features.insert(Feature::ArmNeon),
            (ArmFamily::Arm32, "vfpv3") => features.insert(Feature::ArmVfpV3),
            (ArmFamily::Arm64, "asimd") => features.insert(Feature::ArmNeon),
            _ => {},
        }
    }

    features
}

/// Read a cpuinfo-format file.
pub fn read_cpuinfo(path: &Path) -> PlatformResult<String> {
    fs::read_to_string(path).map_err(|e| PlatformError::SourceUnavailable {
        path: path.to_path_buf(),
        kind: e.kind(),
    })
}

/// Probe that reads a cpuinfo-format file on every `collect`.
#[derive(Debug, Clone)]
pub struct CpuinfoProbe {
    path: PathBuf,
    family: ArmFamily,
}

impl CpuinfoProbe {
    pub fn new(path: impl Into<PathBuf>, family: ArmFamily) -> Self {
        Self {
            path: path.into(),
            family,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CapabilityProbe for CpuinfoProbe {
    fn collect(&self, features: &mut FeatureSet) {
        match read_cpuinfo(&self.path) {
            Ok(text) => {
                let found = parse_cpuinfo(&text, self.family);
                tracing::debug!(
                    path = %self.path.display(),
                    family = ?self.family,
                    found = %found,
                    "parsed cpuinfo"
                );
                *features = features.union(found);
            },
            Err(e) => {
                tracing::debug!(error = %e, "cpuinfo unreadable, ARM flags left unset");
            },
        }
    }

    fn name(&self) -> &'static str {
        "arm-linux-cpuinfo"
    }
}
