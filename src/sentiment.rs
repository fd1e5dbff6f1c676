//! Market backdrop from broad-index and sector one-day moves

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

impl Sentiment {
    /// Classify a one-day percent change: >= +1 bullish, < -1 bearish.
    /// Non-finite input is treated as flat.
    pub fn from_change(pct: f64) -> Self {
        match pct {
            p if !p.is_finite() => Sentiment::Neutral,
            p if p >= 1.0 => Sentiment::Bullish,
            p if p < -1.0 => Sentiment::Bearish,
            _ => Sentiment::Neutral,
        }
    }

    /// Ordinal score used for weighting (bearish 1 .. bullish 3)
    #[inline]
    pub fn score(self) -> u32 {
        match self {
            Sentiment::Bearish => 1,
            Sentiment::Neutral => 2,
            Sentiment::Bullish => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReport {
    pub broad: Sentiment,
    pub sector: Sentiment,
    pub overall: Sentiment,
    pub advisory: &'static str,
    pub risk: RiskTier,
}

// Weights in tenths: 0.6 broad, 0.4 sector. Thresholds scaled the same way.
const BROAD_WEIGHT: u32 = 6;
const SECTOR_WEIGHT: u32 = 4;
const BULLISH_MIN: u32 = 25;
const NEUTRAL_MIN: u32 = 15;

impl SentimentReport {
    pub fn classify(broad_change_pct: f64, sector_change_pct: f64) -> Self {
        let broad = Sentiment::from_change(broad_change_pct);
        let sector = Sentiment::from_change(sector_change_pct);

        let weighted = BROAD_WEIGHT * broad.score() + SECTOR_WEIGHT * sector.score();
        let overall = match weighted {
            w if w >= BULLISH_MIN => Sentiment::Bullish,
            w if w >= NEUTRAL_MIN => Sentiment::Neutral,
            _ => Sentiment::Bearish,
        };

        let (advisory, risk) = match overall {
            Sentiment::Bullish => (
                "Favorable backdrop for put credit spreads; standard sizing",
                RiskTier::Low,
            ),
            Sentiment::Neutral => (
                "Mixed backdrop; favor wider strikes and reduced size",
                RiskTier::Moderate,
            ),
            Sentiment::Bearish => (
                "Weak backdrop; avoid new put credit spreads or size minimally",
                RiskTier::High,
            ),
        };

        Self {
            broad,
            sector,
            overall,
            advisory,
            risk,
        }
    }
}
