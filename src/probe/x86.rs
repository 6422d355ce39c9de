// ============================================================================
// x86 / x86_64 Capability Probe
// Maps CPUID leaf 1, leaf 7 and leaf 0x80000001 bits onto capability flags
// ============================================================================
//
// Register layout reference: Intel SDM Vol. 2A, "CPUID - CPU Identification".
//
// | Leaf        | Reg | Bits                                                  |
// |-------------|-----|-------------------------------------------------------|
// | 1           | EDX | 23 MMX, 25 SSE, 26 SSE2                               |
// | 1           | ECX | 0 SSE3, 9 SSSE3, 12 FMA, 19 SSE4.1, 20 SSE4.2,        |
// |             |     | 22 MOVBE, 23 POPCNT, 28 AVX                           |
// | 7 (sub 0)   | EBX | 5 AVX2, 16 F, 17 DQ, 26 PF, 27 ER, 28 CD, 30 BW, 31 VL |
// | 0x80000001  | ECX | 6 SSE4A                                               |

use crate::domain::{Feature, FeatureSet};
use crate::interfaces::{CapabilityProbe, CpuIdentity};

/// First extended CPUID leaf; querying it returns the highest extended leaf.
pub const EXTENDED_LEAF_BASE: u32 = 0x8000_0000;

const EXTENDED_FEATURES_LEAF: u32 = EXTENDED_LEAF_BASE + 1;
const BRAND_LEAVES: [u32; 3] = [
    EXTENDED_LEAF_BASE + 2,
    EXTENDED_LEAF_BASE + 3,
    EXTENDED_LEAF_BASE + 4,
];

const LEAF1_EDX: [(u32, Feature); 3] = [
    (23, Feature::Mmx),
    (25, Feature::Sse),
    (26, Feature::Sse2),
];

const LEAF1_ECX: [(u32, Feature); 8] = [
    (0, Feature::Sse3),
    (9, Feature::Ssse3),
    (12, Feature::Fma),
    (19, Feature::Sse4_1),
    (20, Feature::Sse4_2),
    (22, Feature::Movbe),
    (23, Feature::Popcnt),
    (28, Feature::Avx),
];

const LEAF7_EBX: [(u32, Feature); 8] = [
    (5, Feature::Avx2),
    (16, Feature::Avx512F),
    (17, Feature::Avx512Dq),
    (26, Feature::Avx512Pf),
    (27, Feature::Avx512Er),
    (28, Feature::Avx512Cd),
    (30, Feature::Avx512Bw),
    (31, Feature::Avx512Vl),
];

const EXT1_ECX: [(u32, Feature); 1] = [(6, Feature::Sse4a)];

/// Output registers of one CPUID invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuidRegs {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// Anything that can answer CPUID queries.
///
/// The hardware instruction is one implementation; tests feed fabricated
/// register values through the same probe logic.
pub trait CpuidSource: Send + Sync {
    fn cpuid(&self, leaf: u32, sub_leaf: u32) -> CpuidRegs;
}

/// The real `CPUID` instruction.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCpuid;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl NativeCpuid {
    /// Whether this CPU implements `CPUID` at all.
    ///
    /// Every x86_64 part does; very old i386/i486 parts and SGX enclaves do not.
    pub fn is_available() -> bool {
        #[cfg(target_env = "sgx")]
        {
            false
        }
        #[cfg(all(target_arch = "x86", not(target_env = "sgx")))]
        {
            core::arch::x86::has_cpuid()
        }
        #[cfg(all(target_arch = "x86_64", not(target_env = "sgx")))]
        {
            true
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl CpuidSource for NativeCpuid {
    #[inline]
    fn cpuid(&self, leaf: u32, sub_leaf: u32) -> CpuidRegs {
        #[cfg(target_arch = "x86")]
        use core::arch::x86::__cpuid_count;
        #[cfg(target_arch = "x86_64")]
        use core::arch::x86_64::__cpuid_count;

        // SAFETY: only constructed behind `is_available()`; CPUID has no
        // memory side effects, and out-of-range leaves return defined data.
        #[allow(unused_unsafe)]
        let r = unsafe { __cpuid_count(leaf, sub_leaf) };
        CpuidRegs {
            eax: r.eax,
            ebx: r.ebx,
            ecx: r.ecx,
            edx: r.edx,
        }
    }
}

/// CPUID-based probe, generic over where register values come from.
#[derive(Debug, Clone, Default)]
pub struct X86Probe<S> {
    source: S,
}

impl<S: CpuidSource> X86Probe<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    fn max_extended_leaf(&self) -> Option<u32> {
        let eax = self.source.cpuid(EXTENDED_LEAF_BASE, 0).eax;
        (eax >= EXTENDED_LEAF_BASE).then_some(eax)
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl X86Probe<NativeCpuid> {
    /// Probe backed by the hardware instruction.
    pub fn native() -> Self {
        Self::new(NativeCpuid)
    }
}

#[inline]
fn apply_bits(reg: u32, table: &[(u32, Feature)], features: &mut FeatureSet) {
    for &(bit, feature) in table {
        features.set(feature, reg & (1u32 << bit) != 0);
    }
}

fn vendor_string(leaf0: CpuidRegs) -> String {
    let mut bytes = [0u8; 12];
    bytes[0..4].copy_from_slice(&leaf0.ebx.to_le_bytes());
    bytes[4..8].copy_from_slice(&leaf0.edx.to_le_bytes());
    bytes[8..12].copy_from_slice(&leaf0.ecx.to_le_bytes());
    clean_ascii(&bytes)
}

fn clean_ascii(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

impl<S: CpuidSource> CapabilityProbe for X86Probe<S> {
    fn collect(&self, features: &mut FeatureSet) {
        let max_leaf = self.source.cpuid(0, 0).eax;
        if max_leaf == 0 {
            tracing::debug!("cpuid reports no standard feature leaves, skipping probe");
            return;
        }

        let leaf1 = self.source.cpuid(1, 0);
        apply_bits(leaf1.edx, &LEAF1_EDX, features);
        apply_bits(leaf1.ecx, &LEAF1_ECX, features);

        if max_leaf >= 7 {
            let leaf7 = self.source.cpuid(7, 0);
            apply_bits(leaf7.ebx, &LEAF7_EBX, features);
        } else {
            tracing::debug!(max_leaf, "cpuid leaf 7 unavailable, AVX2/AVX-512 left unset");
        }

        match self.max_extended_leaf() {
            Some(max_ext) if max_ext >= EXTENDED_FEATURES_LEAF => {
                let ext1 = self.source.cpuid(EXTENDED_FEATURES_LEAF, 0);
                apply_bits(ext1.ecx, &EXT1_ECX, features);
            },
            _ => tracing::debug!("cpuid extended leaves unavailable, SSE4A left unset"),
        }

        tracing::debug!(max_leaf, features = %features, "cpuid probe finished");
    }

    fn identify(&self) -> Option<CpuIdentity> {
        let vendor = vendor_string(self.source.cpuid(0, 0));

        let brand = match self.max_extended_leaf() {
            Some(max_ext) if max_ext >= BRAND_LEAVES[2] => {
                let mut bytes = Vec::with_capacity(48);
                for leaf in BRAND_LEAVES {
                    let r = self.source.cpuid(leaf, 0);
                    for reg in [r.eax, r.ebx, r.ecx, r.edx] {
                        bytes.extend_from_slice(&reg.to_le_bytes());
                    }
                }
                Some(clean_ascii(&bytes)).filter(|s| !s.is_empty())
            },
            _ => None,
        };

        tracing::debug!(vendor = %vendor, brand = ?brand, "cpuid identification");
        Some(CpuIdentity { vendor, brand })
    }

    fn name(&self) -> &'static str {
        "x86-cpuid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fabricated CPUID: unknown leaves read as all-zero, every query is recorded.
    #[derive(Default)]
    struct FakeCpuid {
        leaves: HashMap<u32, CpuidRegs>,
        queried: Mutex<Vec<u32>>,
    }

    impl FakeCpuid {
        fn leaf(mut self, leaf: u32, regs: CpuidRegs) -> Self {
            self.leaves.insert(leaf, regs);
            self
        }

        fn was_queried(&self, leaf: u32) -> bool {
            self.queried.lock().unwrap().contains(&leaf)
        }
    }

    impl CpuidSource for FakeCpuid {
        fn cpuid(&self, leaf: u32, _sub_leaf: u32) -> CpuidRegs {
            self.queried.lock().unwrap().push(leaf);
            self.leaves.get(&leaf).copied().unwrap_or_default()
        }
    }

    fn regs(eax: u32, ebx: u32, ecx: u32, edx: u32) -> CpuidRegs {
        CpuidRegs { eax, ebx, ecx, edx }
    }

    fn x86_flags(features: FeatureSet) -> Vec<Feature> {
        features
            .enabled()
            .into_iter()
            .filter(|f| f.family() == crate::domain::FeatureFamily::X86)
            .collect()
    }

    fn probe(source: FakeCpuid) -> (X86Probe<FakeCpuid>, FeatureSet) {
        let probe = X86Probe::new(source);
        let mut features = FeatureSet::empty();
        probe.collect(&mut features);
        (probe, features)
    }

    #[test]
    fn test_leaf1_edx_bit26_is_sse2_only() {
        let fake = FakeCpuid::default()
            .leaf(0, regs(1, 0, 0, 0))
            .leaf(1, regs(0, 0, 0, 1 << 26));
        let (_, features) = probe(fake);

        assert_eq!(x86_flags(features), vec![Feature::Sse2]);
    }

    #[test]
    fn test_leaf1_ecx_mapping() {
        let ecx = (1 << 0) | (1 << 9) | (1 << 12) | (1 << 19) | (1 << 20) | (1 << 22) | (1 << 23) | (1 << 28);
        let fake = FakeCpuid::default()
            .leaf(0, regs(1, 0, 0, 0))
            .leaf(1, regs(0, 0, ecx, (1 << 23) | (1 << 25)));
        let (_, features) = probe(fake);

        assert_eq!(
            x86_flags(features),
            vec![
                Feature::Mmx,
                Feature::Sse,
                Feature::Sse3,
                Feature::Ssse3,
                Feature::Sse4_1,
                Feature::Sse4_2,
                Feature::Avx,
                Feature::Fma,
                Feature::Movbe,
                Feature::Popcnt,
            ]
        );
    }

    #[test]
    fn test_leaf7_ebx_bit31_is_avx512vl() {
        let fake = FakeCpuid::default()
            .leaf(0, regs(7, 0, 0, 0))
            .leaf(7, regs(0, 1 << 31, 0, 0));
        let (_, features) = probe(fake);

        assert_eq!(x86_flags(features), vec![Feature::Avx512Vl]);
    }

    #[test]
    fn test_leaf7_full_mapping() {
        let ebx = (1 << 5) | (1 << 16) | (1 << 17) | (1 << 26) | (1 << 27) | (1 << 28) | (1 << 30);
        let fake = FakeCpuid::default()
            .leaf(0, regs(0xd, 0, 0, 0))
            .leaf(7, regs(0, ebx, 0, 0));
        let (_, features) = probe(fake);

        assert_eq!(
            x86_flags(features),
            vec![
                Feature::Avx2,
                Feature::Avx512F,
                Feature::Avx512Cd,
                Feature::Avx512Dq,
                Feature::Avx512Bw,
                Feature::Avx512Pf,
                Feature::Avx512Er,
            ]
        );
    }

    #[test]
    fn test_max_leaf_one_skips_leaf7() {
        let fake = FakeCpuid::default()
            .leaf(0, regs(1, 0, 0, 0))
            .leaf(1, regs(0, 0, 0, 1 << 26))
            .leaf(7, regs(0, u32::MAX, 0, 0));
        let (probe, features) = probe(fake);

        assert!(!probe.source().was_queried(7));
        assert!(!features.contains(Feature::Avx2));
        assert!(!features.contains(Feature::Avx512F));
        assert!(features.contains(Feature::Sse2));
    }

    #[test]
    fn test_zero_leaves_aborts() {
        let fake = FakeCpuid::default()
            .leaf(0, regs(0, 0, 0, 0))
            .leaf(1, regs(0, 0, u32::MAX, u32::MAX));
        let (probe, features) = probe(fake);

        assert!(features.is_empty());
        assert!(!probe.source().was_queried(1));
    }

    #[test]
    fn test_sse4a_requires_extended_leaf() {
        let with_ext = FakeCpuid::default()
            .leaf(0, regs(1, 0, 0, 0))
            .leaf(EXTENDED_LEAF_BASE, regs(EXTENDED_LEAF_BASE + 1, 0, 0, 0))
            .leaf(EXTENDED_LEAF_BASE + 1, regs(0, 0, 1 << 6, 0));
        let (_, features) = probe(with_ext);
        assert!(features.contains(Feature::Sse4a));

        let without_ext = FakeCpuid::default()
            .leaf(0, regs(1, 0, 0, 0))
            .leaf(EXTENDED_LEAF_BASE, regs(EXTENDED_LEAF_BASE, 0, 0, 0))
            .leaf(EXTENDED_LEAF_BASE + 1, regs(0, 0, 1 << 6, 0));
        let (probe, features) = probe(without_ext);
        assert!(!features.contains(Feature::Sse4a));
        assert!(!probe.source().was_queried(EXTENDED_LEAF_BASE + 1));
    }

    #[test]
    fn test_identify_vendor_and_brand() {
        // "GenuineIntel" = "Genu" "ineI" "ntel" in EBX, EDX, ECX
        let leaf0 = regs(
            0xd,
            u32::from_le_bytes(*b"Genu"),
            u32::from_le_bytes(*b"ntel"),
            u32::from_le_bytes(*b"ineI"),
        );

        let mut brand = [0u8; 48];
        let text = b"  Test CPU @ 3.00GHz";
        brand[..text.len()].copy_from_slice(text);
        let word = |i: usize| u32::from_le_bytes(brand[i * 4..i * 4 + 4].try_into().unwrap());

        let mut fake = FakeCpuid::default()
            .leaf(0, leaf0)
            .leaf(EXTENDED_LEAF_BASE, regs(EXTENDED_LEAF_BASE + 4, 0, 0, 0));
        for (n, leaf) in BRAND_LEAVES.iter().enumerate() {
            let base = n * 4;
            fake = fake.leaf(
                *leaf,
                regs(word(base), word(base + 1), word(base + 2), word(base + 3)),
            );
        }

        let identity = X86Probe::new(fake).identify().unwrap();
        assert_eq!(identity.vendor, "GenuineIntel");
        assert_eq!(identity.brand.as_deref(), Some("Test CPU @ 3.00GHz"));
    }

    #[test]
    fn test_identify_without_brand_leaves() {
        let fake = FakeCpuid::default().leaf(0, regs(1, 0, 0, 0));
        let identity = X86Probe::new(fake).identify().unwrap();
        assert_eq!(identity.vendor, "");
        assert_eq!(identity.brand, None);
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn test_native_probe_runs() {
        if !NativeCpuid::is_available() {
            return;
        }
        let probe = X86Probe::native();
        let mut features = FeatureSet::empty();
        probe.collect(&mut features);

        #[cfg(target_arch = "x86_64")]
        assert!(features.contains(Feature::Sse2));
        assert!(features.enabled().iter().all(|f| f.family() == crate::domain::FeatureFamily::X86));
        println!("native cpuid: {}", features);
    }

    proptest! {
        #[test]
        fn prop_leaf1_bits_map_exactly(ecx in any::<u32>(), edx in any::<u32>()) {
            let fake = FakeCpuid::default()
                .leaf(0, regs(1, 0, 0, 0))
                .leaf(1, regs(0, 0, ecx, edx));
            let (_, features) = probe(fake);

            for (bit, feature) in LEAF1_EDX {
                prop_assert_eq!(features.contains(feature), edx & (1 << bit) != 0);
            }
            for (bit, feature) in LEAF1_ECX {
                prop_assert_eq!(features.contains(feature), ecx & (1 << bit) != 0);
            }
            prop_assert!(!features.contains(Feature::Avx2));
            prop_assert!(!features.contains(Feature::Sse4a));
        }

        #[test]
        fn prop_leaf7_gated_by_max_leaf(max_leaf in 1u32..32, ebx in any::<u32>()) {
            let fake = FakeCpuid::default()
                .leaf(0, regs(max_leaf, 0, 0, 0))
                .leaf(7, regs(0, ebx, 0, 0));
            let (_, features) = probe(fake);

            for (bit, feature) in LEAF7_EBX {
                let expected = max_leaf >= 7 && ebx & (1 << bit) != 0;
                prop_assert_eq!(features.contains(feature), expected);
            }
        }
    }
}
