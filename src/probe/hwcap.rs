// ============================================================================
// Android Capability Probe
// Maps the kernel HWCAP bitmask (getauxval) onto NEON, VFPv3 and ARMv7
// ============================================================================
//
// Bit positions: arch/arm/include/uapi/asm/hwcap.h and
// arch/arm64/include/uapi/asm/hwcap.h.

use super::ArmFamily;
use crate::domain::{Feature, FeatureSet};
use crate::interfaces::CapabilityProbe;

/// 32-bit ARM `HWCAP_NEON`
pub const HWCAP_ARM_NEON: u64 = 1 << 12;
/// 32-bit ARM `HWCAP_VFPv3`
pub const HWCAP_ARM_VFPV3: u64 = 1 << 13;
/// 32-bit ARM `HWCAP_VFPv3D16` (VFPv3 with 16 double registers)
pub const HWCAP_ARM_VFPV3D16: u64 = 1 << 14;
/// AArch64 `HWCAP_ASIMD`
pub const HWCAP_ARM64_ASIMD: u64 = 1 << 1;

/// Raw auxiliary-vector values the mapping needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuxvSnapshot {
    /// `AT_HWCAP`
    pub hwcap: u64,
    /// `AT_PLATFORM`, e.g. "v7l" or "aarch64"
    pub platform: Option<String>,
}

/// Source of auxiliary-vector values.
pub trait AuxvSource: Send + Sync {
    fn read(&self) -> AuxvSnapshot;
}

/// Architecture version encoded in an `AT_PLATFORM` string like "v7l".
fn platform_arch_version(platform: &str) -> Option<u32> {
    let digits: String = platform
        .strip_prefix('v')?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Translate HWCAP bits into capability flags for the given family.
pub fn map_hwcaps(family: ArmFamily, auxv: &AuxvSnapshot) -> FeatureSet {
    let mut features = FeatureSet::empty();

    match family {
        ArmFamily::Arm32 => {
            let armv7 = auxv
                .platform
                .as_deref()
                .and_then(platform_arch_version)
                .is_some_and(|v| v >= 7);
            features.set(Feature::ArmV7, armv7);
            features.set(
                Feature::ArmVfpV3,
                auxv.hwcap & (HWCAP_ARM_VFPV3 | HWCAP_ARM_VFPV3D16) != 0,
            );
            features.set(Feature::ArmNeon, auxv.hwcap & HWCAP_ARM_NEON != 0);
        },
        ArmFamily::Arm64 => {
            features.set(Feature::ArmNeon, auxv.hwcap & HWCAP_ARM64_ASIMD != 0);
        },
    }

    features
}

/// The process's own auxiliary vector via `getauxval`.
#[cfg(target_os = "android")]
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeAuxv;

#[cfg(target_os = "android")]
impl AuxvSource for NativeAuxv {
    fn read(&self) -> AuxvSnapshot {
        use std::ffi::CStr;

        // SAFETY: getauxval only reads the auxiliary vector and returns 0 for
        // missing entries.
        let hwcap = unsafe { libc::getauxval(libc::AT_HWCAP) } as u64;
        let platform_ptr = unsafe { libc::getauxval(libc::AT_PLATFORM) } as *const libc::c_char;

        let platform = if platform_ptr.is_null() {
            None
        } else {
            // SAFETY: a non-zero AT_PLATFORM points at a NUL-terminated string
            // the kernel placed on the initial stack; it lives for the process.
            unsafe { CStr::from_ptr(platform_ptr) }
                .to_str()
                .ok()
                .map(str::to_owned)
        };

        AuxvSnapshot { hwcap, platform }
    }
}

/// HWCAP-based probe, generic over the auxv source.
#[derive(Debug, Clone)]
pub struct HwcapProbe<S> {
    source: S,
    family: ArmFamily,
}

impl<S: AuxvSource> HwcapProbe<S> {
    pub fn new(source: S, family: ArmFamily) -> Self {
        Self { source, family }
    }
}

#[cfg(target_os = "android")]
impl HwcapProbe<NativeAuxv> {
    /// Probe for the running process, if built for an ARM target.
    pub fn native() -> Option<Self> {
        ArmFamily::current().map(|family| Self::new(NativeAuxv, family))
    }
}

impl<S: AuxvSource> CapabilityProbe for HwcapProbe<S> {
    fn collect(&self, features: &mut FeatureSet) {
        let auxv = self.source.read();
        let found = map_hwcaps(self.family, &auxv);
        tracing::debug!(
            hwcap = format_args!("{:#x}", auxv.hwcap),
            platform = ?auxv.platform,
            found = %found,
            "mapped hwcaps"
        );
        *features = features.union(found);
    }

    fn name(&self) -> &'static str {
        "arm-hwcap"
    }
}
