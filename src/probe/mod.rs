// ============================================================================
// Capability Probes
// Platform-specific strategies that populate the registry
//
// Selected at compile time by target architecture and OS:
// - x86 / x86_64: CPUID leaves 0, 1, 7, 0x80000000, 0x80000001
// - ARM on Android: getauxval(AT_HWCAP / AT_PLATFORM)
// - ARM on Linux: /proc/cpuinfo text
// - Everything else: no-op, all flags false
//
// The parsing/mapping halves of every probe build on all targets so they can
// be tested anywhere; only the raw-source halves are cfg-gated.
// ============================================================================

pub mod cpuinfo;
pub mod hwcap;
pub mod x86;

pub use cpuinfo::{parse_cpuinfo, CpuinfoProbe};
pub use hwcap::{map_hwcaps, AuxvSnapshot, AuxvSource, HwcapProbe};
pub use x86::{CpuidRegs, CpuidSource, X86Probe};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use x86::NativeCpuid;

#[cfg(target_os = "android")]
pub use hwcap::NativeAuxv;

use crate::domain::{FeatureSet, ProbeConfig};
use crate::interfaces::CapabilityProbe;

/// Register width of an ARM target; decides which tokens and HWCAP bits count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmFamily {
    /// AArch32
    Arm32,
    /// AArch64
    Arm64,
}

impl ArmFamily {
    /// Family of the build target, `None` off ARM.
    pub const fn current() -> Option<Self> {
        if cfg!(target_arch = "arm") {
            Some(ArmFamily::Arm32)
        } else if cfg!(target_arch = "aarch64") {
            Some(ArmFamily::Arm64)
        } else {
            None
        }
    }
}

/// Probe that detects nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProbe;

impl CapabilityProbe for NoOpProbe {
    fn collect(&self, _features: &mut FeatureSet) {}

    fn name(&self) -> &'static str {
        "none"
    }
}

/// The probe for the current build target.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn default_probe(_config: &ProbeConfig) -> Box<dyn CapabilityProbe> {
    if NativeCpuid::is_available() {
        Box::new(X86Probe::native())
    } else {
        tracing::debug!("cpuid instruction unavailable");
        Box::new(NoOpProbe)
    }
}

/// The probe for the current build target.
#[cfg(all(any(target_arch = "arm", target_arch = "aarch64"), target_os = "android"))]
pub fn default_probe(_config: &ProbeConfig) -> Box<dyn CapabilityProbe> {
    match HwcapProbe::native() {
        Some(probe) => Box::new(probe),
        None => Box::new(NoOpProbe),
    }
}

/// The probe for the current build target.
#[cfg(all(any(target_arch = "arm", target_arch = "aarch64"), target_os = "linux"))]
pub fn default_probe(config: &ProbeConfig) -> Box<dyn CapabilityProbe> {
    match ArmFamily::current() {
        Some(family) => Box::new(CpuinfoProbe::new(config.cpuinfo_path.clone(), family)),
        None => Box::new(NoOpProbe),
    }
}

/// The probe for the current build target.
#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    all(
        any(target_arch = "arm", target_arch = "aarch64"),
        any(target_os = "android", target_os = "linux")
    )
)))]
pub fn default_probe(_config: &ProbeConfig) -> Box<dyn CapabilityProbe> {
    Box::new(NoOpProbe)
}
