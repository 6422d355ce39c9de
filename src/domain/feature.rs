// ============================================================================
// Capability Flags
// Closed enumeration of the instruction-set extensions the registry tracks
// ============================================================================

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of capability flags. Also the length of the registry bit vector.
pub const FEATURE_COUNT: usize = 23;

/// One CPU instruction-set extension.
///
/// Each variant maps 1:1 to a stable storage index (its discriminant), so the
/// registry can keep every flag in a single fixed-width bit vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Feature {
    // x86 / x86_64
    Mmx = 0,
    Sse = 1,
    Sse2 = 2,
    Sse3 = 3,
    Ssse3 = 4,
    Sse4_1 = 5,
    Sse4_2 = 6,
    Sse4a = 7,
    Avx = 8,
    Avx2 = 9,
    /// AVX-512 Foundation
    Avx512F = 10,
    /// AVX-512 Conflict Detection
    Avx512Cd = 11,
    /// AVX-512 Doubleword and Quadword
    Avx512Dq = 12,
    /// AVX-512 Byte and Word
    Avx512Bw = 13,
    /// AVX-512 Vector Length Extensions
    Avx512Vl = 14,
    /// AVX-512 Prefetch
    Avx512Pf = 15,
    /// AVX-512 Exponential and Reciprocal
    Avx512Er = 16,
    Fma = 17,
    Movbe = 18,
    Popcnt = 19,

    // ARM / AArch64
    ArmV7 = 20,
    ArmVfpV3 = 21,
    ArmNeon = 22,
}

/// Which architecture family a flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFamily {
    X86,
    Arm,
}

impl Feature {
    /// Every flag, in index order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Mmx,
        Feature::Sse,
        Feature::Sse2,
        Feature::Sse3,
        Feature::Ssse3,
        Feature::Sse4_1,
        Feature::Sse4_2,
        Feature::Sse4a,
        Feature::Avx,
        Feature::Avx2,
        Feature::Avx512F,
        Feature::Avx512Cd,
        Feature::Avx512Dq,
        Feature::Avx512Bw,
        Feature::Avx512Vl,
        Feature::Avx512Pf,
        Feature::Avx512Er,
        Feature::Fma,
        Feature::Movbe,
        Feature::Popcnt,
        Feature::ArmV7,
        Feature::ArmVfpV3,
        Feature::ArmNeon,
    ];

    /// Storage index of this flag.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a flag by raw index.
    ///
    /// Negative and too-large indices yield `None`.
    #[inline]
    pub fn from_index(index: i64) -> Option<Feature> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Lowercase name as used by compilers and `/proc/cpuinfo`.
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Mmx => "mmx",
            Feature::Sse => "sse",
            Feature::Sse2 => "sse2",
            Feature::Sse3 => "sse3",
            Feature::Ssse3 => "ssse3",
            Feature::Sse4_1 => "sse4.1",
            Feature::Sse4_2 => "sse4.2",
            Feature::Sse4a => "sse4a",
            Feature::Avx => "avx",
            Feature::Avx2 => "avx2",
            Feature::Avx512F => "avx512f",
            Feature::Avx512Cd => "avx512cd",
            Feature::Avx512Dq => "avx512dq",
            Feature::Avx512Bw => "avx512bw",
            Feature::Avx512Vl => "avx512vl",
            Feature::Avx512Pf => "avx512pf",
            Feature::Avx512Er => "avx512er",
            Feature::Fma => "fma",
            Feature::Movbe => "movbe",
            Feature::Popcnt => "popcnt",
            Feature::ArmV7 => "armv7",
            Feature::ArmVfpV3 => "vfpv3",
            Feature::ArmNeon => "neon",
        }
    }

    /// Architecture family this flag belongs to.
    #[inline]
    pub const fn family(self) -> FeatureFamily {
        match self {
            Feature::ArmV7 | Feature::ArmVfpV3 | Feature::ArmNeon => FeatureFamily::Arm,
            _ => FeatureFamily::X86,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFeature(pub String);

impl fmt::Display for UnknownFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown capability flag: {}", self.0)
    }
}

impl std::error::Error for UnknownFeature {}

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_and_ordered() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
        assert_eq!(Feature::ALL.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_from_index_bounds() {
        assert_eq!(Feature::from_index(0), Some(Feature::Mmx));
        assert_eq!(Feature::from_index(22), Some(Feature::ArmNeon));
        assert_eq!(Feature::from_index(-1), None);
        assert_eq!(Feature::from_index(FEATURE_COUNT as i64), None);
        assert_eq!(Feature::from_index(i64::MAX), None);
    }

    #[test]
    fn test_name_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(feature.name().parse::<Feature>(), Ok(feature));
        }
        assert_eq!("AVX2".parse::<Feature>(), Ok(Feature::Avx2));
        assert!("avx1024".parse::<Feature>().is_err());
    }

    #[test]
    fn test_family() {
        assert_eq!(Feature::Sse2.family(), FeatureFamily::X86);
        assert_eq!(Feature::Avx512Vl.family(), FeatureFamily::X86);
        assert_eq!(Feature::ArmNeon.family(), FeatureFamily::Arm);
        assert_eq!(Feature::ArmV7.family(), FeatureFamily::Arm);
    }
}
