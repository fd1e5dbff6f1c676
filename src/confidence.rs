//! Strength to confidence mapping

use serde::{Deserialize, Serialize};

/// Strength at or above which a detection is HIGH
pub const HIGH_CUTOFF: u8 = 85;
/// Strength at or above which a detection is MEDIUM
pub const MEDIUM_CUTOFF: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    #[inline]
    pub fn from_strength(strength: u8) -> Self {
        match strength {
            s if s >= HIGH_CUTOFF => Confidence::High,
            s if s >= MEDIUM_CUTOFF => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    /// Label for a set of strengths, taken from the maximum. None if empty.
    pub fn aggregate(strengths: impl IntoIterator<Item = u8>) -> Option<Self> {
        strengths.into_iter().max().map(Self::from_strength)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoffs() {
        assert_eq!(Confidence::from_strength(0), Confidence::Low);
        assert_eq!(Confidence::from_strength(69), Confidence::Low);
        assert_eq!(Confidence::from_strength(70), Confidence::Medium);
        assert_eq!(Confidence::from_strength(84), Confidence::Medium);
        assert_eq!(Confidence::from_strength(85), Confidence::High);
        assert_eq!(Confidence::from_strength(100), Confidence::High);
    }

    #[test]
    fn test_aggregate_uses_max() {
        assert_eq!(Confidence::aggregate([40, 90, 72]), Some(Confidence::High));
        assert_eq!(Confidence::aggregate(Vec::<u8>::new()), None);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(serde_json::to_string(&Confidence::Medium).unwrap(), "\"MEDIUM\"");
    }
}
