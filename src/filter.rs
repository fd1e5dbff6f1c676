//! Scan filter settings
//!
//! Supplied by the caller and read-only during a scan. Values arriving from a UI
//! are normally already in range; [`FilterConfig::clamped`] repairs anything
//! that is not, [`FilterConfig::validate`] reports it instead.

use serde::{Deserialize, Serialize};

use crate::{Indicators, PatternError, Result};

/// Longest accepted breakout lookback, about one trading year
pub const MAX_LOOKBACK_DAYS: usize = 250;

/// Moving average used by the support gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaType {
    #[default]
    Sma,
    Ema,
}

impl MaType {
    /// 20-period average of the chosen type on `bar`
    #[inline]
    pub fn value<T: Indicators>(self, bar: &T) -> Option<f64> {
        match self {
            MaType::Sma => bar.sma20(),
            MaType::Ema => bar.ema20(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub adx_min: f64,
    /// Require the close to hold the selected moving average
    pub ma_support: bool,
    pub ma_type: MaType,
    /// Percent the close may sit below the moving average and still pass
    pub ma_tolerance_pct: f64,
    /// Bars defining breakout resistance/support
    pub lookback_days: usize,
    /// Current volume over lookback mean required for a breakout
    pub volume_breakout_ratio: f64,
    /// Detections weaker than this are dropped
    pub pattern_strength_min: u8,
    /// 20-day relative volume required before any detector runs in `scan`
    pub min_volume_ratio: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            rsi_min: 30.0,
            rsi_max: 70.0,
            adx_min: 20.0,
            ma_support: true,
            ma_type: MaType::Sma,
            ma_tolerance_pct: 2.0,
            lookback_days: 20,
            volume_breakout_ratio: 2.0,
            pattern_strength_min: 60,
            min_volume_ratio: 1.0,
        }
    }
}

impl FilterConfig {
    /// Parse a (possibly partial) JSON document; absent fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PatternError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PatternError::InvalidConfig(e.to_string()))
    }

    /// Copy with every field forced into a usable range.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let mut out = self.clone();

        out.rsi_min = finite_or(out.rsi_min, defaults.rsi_min).clamp(0.0, 100.0);
        out.rsi_max = finite_or(out.rsi_max, defaults.rsi_max).clamp(0.0, 100.0);
        if out.rsi_min > out.rsi_max {
            std::mem::swap(&mut out.rsi_min, &mut out.rsi_max);
        }
        out.adx_min = finite_or(out.adx_min, defaults.adx_min).max(0.0);
        out.ma_tolerance_pct = finite_or(out.ma_tolerance_pct, defaults.ma_tolerance_pct).clamp(0.0, 100.0);
        if out.lookback_days == 0 {
            out.lookback_days = defaults.lookback_days;
        }
        out.lookback_days = out.lookback_days.min(MAX_LOOKBACK_DAYS);
        out.volume_breakout_ratio = positive_or(out.volume_breakout_ratio, defaults.volume_breakout_ratio);
        out.min_volume_ratio = positive_or(out.min_volume_ratio, defaults.min_volume_ratio);
        out.pattern_strength_min = out.pattern_strength_min.min(100);
        out
    }

    /// Report the first field `clamped` would have to change.
    pub fn validate(&self) -> Result<()> {
        check_range("rsi_min", self.rsi_min, 0.0, 100.0)?;
        check_range("rsi_max", self.rsi_max, 0.0, 100.0)?;
        if self.rsi_min > self.rsi_max {
            return Err(PatternError::InvalidConfig(format!(
                "rsi_min {} exceeds rsi_max {}",
                self.rsi_min, self.rsi_max
            )));
        }
        check_range("adx_min", self.adx_min, 0.0, f64::MAX)?;
        check_range("ma_tolerance_pct", self.ma_tolerance_pct, 0.0, 100.0)?;
        if self.lookback_days == 0 {
            return Err(PatternError::InvalidValue("lookback_days must be > 0"));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(PatternError::OutOfRange {
                field: "lookback_days",
                value: self.lookback_days as f64,
                min: 1.0,
                max: MAX_LOOKBACK_DAYS as f64,
            });
        }
        if !(self.volume_breakout_ratio.is_finite() && self.volume_breakout_ratio > 0.0) {
            return Err(PatternError::InvalidValue("volume_breakout_ratio must be > 0"));
        }
        if !(self.min_volume_ratio.is_finite() && self.min_volume_ratio > 0.0) {
            return Err(PatternError::InvalidValue("min_volume_ratio must be > 0"));
        }
        check_range("pattern_strength_min", f64::from(self.pattern_strength_min), 0.0, 100.0)
    }
}

#[inline]
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[inline]
fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(PatternError::OutOfRange { field, value, min, max });
    }
    Ok(())
}
