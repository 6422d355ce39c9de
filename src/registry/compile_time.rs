// ============================================================================
// Compile-Time Capability Gates
// What the toolchain can emit, and what the build already guarantees
// ============================================================================

use crate::domain::{Feature, FeatureFamily, FeatureSet};

/// Whether the build target can encode instructions for `feature` at all.
///
/// When this is false the runtime query is a constant `false` and no probe
/// runs for it.
#[inline]
pub const fn toolchain_supports(feature: Feature) -> bool {
    match feature.family() {
        FeatureFamily::X86 => cfg!(any(target_arch = "x86", target_arch = "x86_64")),
        FeatureFamily::Arm => cfg!(any(target_arch = "arm", target_arch = "aarch64")),
    }
}

/// Whether the build was compiled with `feature` enabled (`-C target-feature`
/// or `-C target-cpu`).
///
/// Such a binary cannot run on a CPU lacking the feature, so the answer is
/// `true` without probing. MMX, AVX-512 PF/ER and ARMv7 have no target-feature
/// name the compiler reports, so they always go through the registry.
#[inline]
pub const fn statically_enabled(feature: Feature) -> bool {
    match feature {
        Feature::Sse => cfg!(target_feature = "sse"),
        Feature::Sse2 => cfg!(target_feature = "sse2"),
        Feature::Sse3 => cfg!(target_feature = "sse3"),
        Feature::Ssse3 => cfg!(target_feature = "ssse3"),
        Feature::Sse4_1 => cfg!(target_feature = "sse4.1"),
        Feature::Sse4_2 => cfg!(target_feature = "sse4.2"),
        Feature::Sse4a => cfg!(target_feature = "sse4a"),
        Feature::Avx => cfg!(target_feature = "avx"),
        Feature::Avx2 => cfg!(target_feature = "avx2"),
        Feature::Avx512F => cfg!(target_feature = "avx512f"),
        Feature::Avx512Cd => cfg!(target_feature = "avx512cd"),
        Feature::Avx512Dq => cfg!(target_feature = "avx512dq"),
        Feature::Avx512Bw => cfg!(target_feature = "avx512bw"),
        Feature::Avx512Vl => cfg!(target_feature = "avx512vl"),
        Feature::Fma => cfg!(target_feature = "fma"),
        Feature::Movbe => cfg!(target_feature = "movbe"),
        Feature::Popcnt => cfg!(target_feature = "popcnt"),
        Feature::ArmNeon => cfg!(target_feature = "neon"),
        Feature::ArmVfpV3 => cfg!(target_feature = "vfp3"),
        Feature::Mmx | Feature::Avx512Pf | Feature::Avx512Er | Feature::ArmV7 => false,
    }
}

/// Every flag the build guarantees.
pub fn statically_enabled_set() -> FeatureSet {
    Feature::ALL
        .into_iter()
        .filter(|f| statically_enabled(*f))
        .collect()
}
