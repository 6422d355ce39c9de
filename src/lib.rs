// ============================================================================
// Platform Info Library
// Process-wide CPU capability registry for choosing vectorized code paths
// ============================================================================

//! # Platform Info
//!
//! Answers "does this CPU/OS support capability X" for a fixed set of SIMD
//! and arithmetic extensions, probing the hardware at most once per process.
//!
//! ## Features
//!
//! - **Exactly-once, lazy probing** behind a `OnceLock`, safe under
//!   concurrent first access
//! - **x86 / x86_64** via `CPUID` leaves 1, 7 and 0x80000001
//! - **ARM / AArch64** via `/proc/cpuinfo` on Linux and `getauxval` on Android
//! - **Never fails**: unknown flags, missing leaves and unreadable sources
//!   all read as "unsupported"
//! - **Injectable probes** for tests and unusual platforms
//!
//! ## Example
//!
//! ```rust
//! use platform_info::prelude::*;
//!
//! if support_avx2() {
//!     println!("taking the AVX2 path");
//! } else if support_arm_neon() {
//!     println!("taking the NEON path");
//! }
//!
//! let registry = get_registry();
//! println!("{}", registry);
//! assert!(!registry.check_index(-1));
//! ```

pub mod domain;
pub mod errors;
pub mod interfaces;
pub mod probe;
pub mod registry;
pub mod utils;

pub use errors::{PlatformError, PlatformResult};

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{Architecture, Feature, FeatureSet, ProbeConfig, SimdLevel};
    pub use crate::errors::{PlatformError, PlatformResult};
    pub use crate::interfaces::{CapabilityProbe, CpuIdentity};
    pub use crate::registry::{
        check_feature, get_registry, init_with_config, support_arm_neon, support_arm_vfpv3,
        support_armv7, support_avx, support_avx2, support_avx512bw, support_avx512cd,
        support_avx512dq, support_avx512er, support_avx512f, support_avx512pf, support_avx512vl,
        support_fma, support_mmx, support_movbe, support_popcnt, support_sse, support_sse2,
        support_sse3, support_sse4_1, support_sse4_2, support_sse4a, support_ssse3, supports,
        LazyRegistry, Registry,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use crate::probe::{parse_cpuinfo, ArmFamily, CpuidRegs, CpuidSource, CpuinfoProbe, X86Probe};

    /// CPU that answers leaf 0 with max leaf 7 and sets AVX2 + SSE2.
    struct Avx2Cpu;

    impl CpuidSource for Avx2Cpu {
        fn cpuid(&self, leaf: u32, _sub_leaf: u32) -> CpuidRegs {
            match leaf {
                0 => CpuidRegs {
                    eax: 7,
                    ..Default::default()
                },
                1 => CpuidRegs {
                    edx: 1 << 26,
                    ..Default::default()
                },
                7 => CpuidRegs {
                    ebx: 1 << 5,
                    ..Default::default()
                },
                _ => CpuidRegs::default(),
            }
        }
    }

    #[test]
    fn test_end_to_end_injected_x86_probe() {
        let lazy = LazyRegistry::new();
        let registry = lazy.get_or_probe(&X86Probe::new(Avx2Cpu), &ProbeConfig::default());

        assert!(registry.check(Feature::Sse2));
        assert!(registry.check(Feature::Avx2));
        assert!(!registry.check(Feature::Avx512F));
        assert!(!registry.check(Feature::ArmNeon));
        assert_eq!(registry.simd_level(), SimdLevel::Avx2);
        assert_eq!(registry.probe_name(), "x86-cpuid");

        // Forcing AVX2 off drops the tier back to SSE2
        let config = ProbeConfig::new().with_disabled(Feature::Avx2);
        let scalarish = Registry::from_probe(&X86Probe::new(Avx2Cpu), &config);
        assert_eq!(scalarish.simd_level(), SimdLevel::Sse2);
    }

    #[test]
    fn test_end_to_end_missing_cpuinfo() {
        let config = ProbeConfig::new().with_cpuinfo_path("/nonexistent/cpuinfo");
        let probe = CpuinfoProbe::new(config.cpuinfo_path.clone(), ArmFamily::Arm64);
        let registry = Registry::from_probe(&probe, &config);

        assert!(registry.features().is_empty());
        assert_eq!(registry.simd_level(), SimdLevel::None);
    }

    #[test]
    fn test_end_to_end_cpuinfo_text() {
        let features = parse_cpuinfo(
            "Features\t: fp asimd evtstrm crc32\nCPU architecture: 8\n",
            ArmFamily::Arm64,
        );
        assert_eq!(features, FeatureSet::empty().with(Feature::ArmNeon));
    }

    #[test]
    fn test_global_queries_are_consistent() {
        let registry = get_registry();
        for feature in Feature::ALL {
            // A probed bit can only be widened by a static guarantee, never narrowed
            if registry.check(feature) && crate::registry::compile_time::toolchain_supports(feature)
            {
                assert!(supports(feature), "{}", feature);
            }
        }
        assert!(!registry.check_index(Feature::ALL.len() as i64));
    }
}
