// ============================================================================
// Architecture and SIMD Level
// Compile-time target architecture and the best vector tier a feature set allows
// ============================================================================

use super::feature::Feature;
use super::feature_set::FeatureSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// CPU architecture the crate was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Architecture {
    /// i386 family (32-bit)
    X86,
    /// x86_64 (Intel/AMD 64-bit)
    X86_64,
    /// AArch32
    Arm,
    /// AArch64 (including Apple Silicon)
    Aarch64,
    /// Anything else; no probe runs and every flag stays false
    Other,
}

impl Architecture {
    /// The architecture of the current build target.
    #[inline]
    pub const fn detect() -> Self {
        if cfg!(target_arch = "x86_64") {
            Architecture::X86_64
        } else if cfg!(target_arch = "x86") {
            Architecture::X86
        } else if cfg!(target_arch = "aarch64") {
            Architecture::Aarch64
        } else if cfg!(target_arch = "arm") {
            Architecture::Arm
        } else {
            Architecture::Other
        }
    }

    #[inline]
    pub const fn is_x86_family(self) -> bool {
        matches!(self, Architecture::X86 | Architecture::X86_64)
    }

    #[inline]
    pub const fn is_arm_family(self) -> bool {
        matches!(self, Architecture::Arm | Architecture::Aarch64)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Arm => write!(f, "arm"),
            Architecture::Aarch64 => write!(f, "aarch64"),
            Architecture::Other => write!(f, "other"),
        }
    }
}

/// Widest usable vector tier.
///
/// Within one family, levels are ordered by capability, so callers can write
/// `level >= SimdLevel::Avx2` to gate an x86 code path. Comparing an ARM tier
/// with an x86 tier means nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SimdLevel {
    /// No SIMD, scalar operations only
    None,
    /// x86 SSE2 (128-bit)
    Sse2,
    /// ARM NEON (128-bit)
    Neon,
    /// x86 SSE4.2 (128-bit, with string/CRC instructions)
    Sse4_2,
    /// x86 AVX2 (256-bit)
    Avx2,
    /// x86 AVX-512 Foundation (512-bit)
    Avx512,
}

impl SimdLevel {
    /// Pick the highest tier supported by `features`.
    pub fn from_features(features: FeatureSet) -> Self {
        if features.contains(Feature::Avx512F) {
            SimdLevel::Avx512
        } else if features.contains(Feature::Avx2) {
            SimdLevel::Avx2
        } else if features.contains(Feature::Sse4_2) {
            SimdLevel::Sse4_2
        } else if features.contains(Feature::ArmNeon) {
            SimdLevel::Neon
        } else if features.contains(Feature::Sse2) {
            SimdLevel::Sse2
        } else {
            SimdLevel::None
        }
    }

}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimdLevel::None => write!(f, "None (Scalar)"),
            SimdLevel::Sse2 => write!(f, "SSE2"),
            SimdLevel::Neon => write!(f, "ARM NEON"),
            SimdLevel::Sse4_2 => write!(f, "SSE4.2"),
            SimdLevel::Avx2 => write!(f, "AVX2"),
            SimdLevel::Avx512 => write!(f, "AVX-512"),
        }
    }
}
