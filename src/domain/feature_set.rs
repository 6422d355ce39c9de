// ============================================================================
// Feature Set
// Fixed-size bit vector indexed by capability flag
// ============================================================================

use super::feature::{Feature, FEATURE_COUNT};
use arrayvec::ArrayVec;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A set of capability flags, one bit per [`Feature`].
///
/// Bits above [`FEATURE_COUNT`] are never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u32", into = "u32"))]
pub struct FeatureSet(u32);

const VALID_MASK: u32 = (1u32 << FEATURE_COUNT) - 1;

impl FeatureSet {
    /// The empty set.
    pub const EMPTY: FeatureSet = FeatureSet(0);

    /// Create an empty set.
    #[inline]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Build a set from raw bits, dropping anything out of range.
    #[inline]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & VALID_MASK)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Set or clear the bit for `feature`.
    #[inline]
    pub fn set(&mut self, feature: Feature, value: bool) {
        let mask = 1u32 << feature.index();
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    #[inline]
    pub fn insert(&mut self, feature: Feature) {
        self.set(feature, true);
    }

    /// Builder form of [`FeatureSet::insert`].
    #[inline]
    pub fn with(mut self, feature: Feature) -> Self {
        self.insert(feature);
        self
    }

    #[inline]
    pub const fn contains(self, feature: Feature) -> bool {
        self.0 & (1u32 << feature.index()) != 0
    }

    /// Check a flag by raw index.
    ///
    /// Any index outside `0..FEATURE_COUNT` is reported as absent.
    #[inline]
    pub fn contains_index(self, index: i64) -> bool {
        Feature::from_index(index).is_some_and(|f| self.contains(f))
    }

    #[inline]
    pub const fn union(self, other: FeatureSet) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn difference(self, other: FeatureSet) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All flags present in the set, in index order.
    pub fn enabled(self) -> ArrayVec<Feature, FEATURE_COUNT> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.contains(*f))
            .collect()
    }
}

impl From<u32> for FeatureSet {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl From<FeatureSet> for u32 {
    fn from(set: FeatureSet) -> Self {
        set.bits()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = FeatureSet::empty();
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        for (i, feature) in self.enabled().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", feature)?;
        }
        Ok(())
    }
}
