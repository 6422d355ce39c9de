// ============================================================================
// Capability Queries
// One argument-free boolean function per flag, callable from any thread
// ============================================================================

use super::compile_time::{statically_enabled, toolchain_supports};
use super::provider::get_registry;
use crate::domain::Feature;

/// Resolve a flag in three steps:
///
/// 1. target cannot encode it: `false`, the registry is never touched
/// 2. the build already requires it: `true`
/// 3. otherwise: the registry bit
#[inline]
pub fn supports(feature: Feature) -> bool {
    if !toolchain_supports(feature) {
        return false;
    }
    if statically_enabled(feature) {
        return true;
    }
    get_registry().check(feature)
}

macro_rules! support_fns {
    ($($(#[$meta:meta])* $name:ident => $feature:ident;)*) => {
        $(
            $(#[$meta])*
            #[inline]
            pub fn $name() -> bool {
                supports(Feature::$feature)
            }
        )*

        /// Every per-flag query with its flag, in index order.
        pub const QUERIES: &[(Feature, fn() -> bool)] = &[
            $((Feature::$feature, $name as fn() -> bool),)*
        ];
    };
}

support_fns! {
    /// MMX (x86)
    support_mmx => Mmx;
    /// SSE (x86)
    support_sse => Sse;
    /// SSE2 (x86)
    support_sse2 => Sse2;
    /// SSE3 (x86)
    support_sse3 => Sse3;
    /// SSSE3 (x86)
    support_ssse3 => Ssse3;
    /// SSE4.1 (x86)
    support_sse4_1 => Sse4_1;
    /// SSE4.2 (x86)
    support_sse4_2 => Sse4_2;
    /// SSE4A (x86, AMD)
    support_sse4a => Sse4a;
    /// AVX (x86)
    support_avx => Avx;
    /// AVX2 (x86)
    support_avx2 => Avx2;
    /// AVX-512 Foundation (x86)
    support_avx512f => Avx512F;
    /// AVX-512 Conflict Detection (x86)
    support_avx512cd => Avx512Cd;
    /// AVX-512 Doubleword and Quadword (x86)
    support_avx512dq => Avx512Dq;
    /// AVX-512 Byte and Word (x86)
    support_avx512bw => Avx512Bw;
    /// AVX-512 Vector Length Extensions (x86)
    support_avx512vl => Avx512Vl;
    /// AVX-512 Prefetch (x86)
    support_avx512pf => Avx512Pf;
    /// AVX-512 Exponential and Reciprocal (x86)
    support_avx512er => Avx512Er;
    /// FMA3 (x86)
    support_fma => Fma;
    /// MOVBE instruction (x86)
    support_movbe => Movbe;
    /// POPCNT instruction (x86)
    support_popcnt => Popcnt;
    /// ARMv7 instruction set (ARM)
    support_armv7 => ArmV7;
    /// VFPv3 floating point (ARM)
    support_arm_vfpv3 => ArmVfpV3;
    /// NEON / Advanced SIMD (ARM, AArch64)
    support_arm_neon => ArmNeon;
}
