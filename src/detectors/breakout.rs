//! Current-day breakout above a tight lookback range
//!
//! The last bar must close above the lookback resistance on a volume surge while
//! the lookback range itself stays narrow. Strength is additive: four point
//! buckets, each scored from the current bar alone.

use std::collections::HashMap;

use super::helpers::{
    max_high, mean_volume, min_low, pct_above, points_at_least, points_at_most, range_pct,
    trailing_window, CLOSE_POSITION_POINTS, MAGNITUDE_POINTS, TIGHTNESS_POINTS, VOLUME_POINTS,
};
use crate::{
    filter::FilterConfig,
    params::{get_multiple, get_percent, get_period, get_ratio, ParamMeta, ParameterizedDetector},
    Details, Multiple, OHLCVExt, PatternDetector, PatternError, PatternKind, PatternSignal, Period,
    Ratio, Result, OHLCV,
};

/// Breakout of the prior `lookback` bars' range on the last bar
#[derive(Debug, Clone)]
pub struct CurrentDayBreakoutDetector {
    pub lookback: Period,
    /// Close must exceed resistance by this fraction
    pub close_buffer: Ratio,
    /// Intraday-high threshold over resistance. Reported in details, never gates.
    pub high_buffer: Ratio,
    /// Current volume over lookback mean volume
    pub min_volume_ratio: Multiple,
    /// Lookback range (percent of support) must stay below this
    pub max_consolidation_pct: f64,
}

impl Default for CurrentDayBreakoutDetector {
    fn default() -> Self {
        Self {
            lookback: Period::new_const(20),
            close_buffer: Ratio::new_const(0.005),
            high_buffer: Ratio::new_const(0.01),
            min_volume_ratio: Multiple::new_const(2.0),
            max_consolidation_pct: 15.0,
        }
    }
}

impl CurrentDayBreakoutDetector {
    /// Lookback and volume ratio taken from the filter settings
    pub fn from_filter(filter: &FilterConfig) -> Self {
        let defaults = Self::default();
        Self {
            lookback: Period::new(filter.lookback_days).unwrap_or(defaults.lookback),
            min_volume_ratio: Multiple::new(filter.volume_breakout_ratio)
                .unwrap_or(defaults.min_volume_ratio),
            ..defaults
        }
    }
}

/// Additive breakout score from the four current-day measurements.
///
/// Each input maps independently through its point table, so the result never
/// decreases as magnitude, volume ratio or close position grow, or as the
/// consolidation range shrinks.
pub fn breakout_strength(
    breakout_pct: f64,
    volume_ratio: f64,
    consolidation_pct: f64,
    close_position_pct: f64,
) -> u8 {
    points_at_least(breakout_pct, &MAGNITUDE_POINTS)
        + points_at_least(volume_ratio, &VOLUME_POINTS)
        + points_at_most(consolidation_pct, &TIGHTNESS_POINTS)
        + points_at_least(close_position_pct, &CLOSE_POSITION_POINTS)
}

impl PatternDetector for CurrentDayBreakoutDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::CurrentDayBreakout
    }

    fn min_bars(&self) -> usize {
        self.lookback.get().saturating_add(2)
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<PatternSignal> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (window, current) = trailing_window(bars, self.lookback.get())?;

        let resistance = max_high(window);
        let support = min_low(window);
        let avg_volume = mean_volume(window);
        let consolidation_pct = range_pct(resistance, support)?;
        if avg_volume <= 0.0 {
            return None;
        }

        let close = current.close();
        let volume_ratio = current.volume() / avg_volume;

        let price_breakout = close > resistance * (1.0 + self.close_buffer.get());
        let volume_breakout = current.volume() > avg_volume * self.min_volume_ratio.get();
        let tight_consolidation = consolidation_pct < self.max_consolidation_pct;
        if !(price_breakout && volume_breakout && tight_consolidation) {
            return None;
        }

        let high_breakout_level = resistance * (1.0 + self.high_buffer.get());
        let breakout_pct = pct_above(close, resistance)?;
        let close_position = current.close_position().unwrap_or(0.0);

        let strength = breakout_strength(breakout_pct, volume_ratio, consolidation_pct, close_position);

        let mut details = Details::new();
        details.insert("resistance", resistance.into());
        details.insert("support", support.into());
        details.insert("breakout_pct", breakout_pct.into());
        details.insert("volume_ratio", volume_ratio.into());
        details.insert("avg_volume", avg_volume.into());
        details.insert("consolidation_pct", consolidation_pct.into());
        details.insert("close_strength_pct", close_position.into());
        details.insert("high_breakout_level", high_breakout_level.into());
        details.insert("high_breakout", (current.high() > high_breakout_level).into());
        if let Some(date) = current.date() {
            details.insert("date", date.into());
        }

        Some(PatternSignal { strength, details })
    }

    fn validate_config(&self) -> Result<()> {
        if !(self.max_consolidation_pct.is_finite() && self.max_consolidation_pct > 0.0) {
            return Err(PatternError::InvalidValue("max_consolidation_pct must be > 0"));
        }
        Ok(())
    }
}

static CURRENT_DAY_BREAKOUT_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("lookback", 20.0, (10.0, 40.0, 5.0), "Bars defining resistance and support"),
    ParamMeta::ratio("close_buffer", 0.005, (0.0, 0.02, 0.0025), "Close above resistance"),
    ParamMeta::ratio("high_buffer", 0.01, (0.0, 0.03, 0.005), "Reported intraday-high threshold"),
    ParamMeta::multiple("min_volume_ratio", 2.0, (1.5, 4.0, 0.5), "Volume over lookback mean"),
    ParamMeta::percent("max_consolidation_pct", 15.0, (8.0, 20.0, 1.0), "Maximum lookback range"),
];

impl ParameterizedDetector for CurrentDayBreakoutDetector {
    fn param_meta() -> &'static [ParamMeta] {
        CURRENT_DAY_BREAKOUT_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let detector = Self {
            lookback: get_period(params, "lookback", 20)?,
            close_buffer: get_ratio(params, "close_buffer", 0.005)?,
            high_buffer: get_ratio(params, "high_buffer", 0.01)?,
            min_volume_ratio: get_multiple(params, "min_volume_ratio", 2.0)?,
            max_consolidation_pct: get_percent(params, "max_consolidation_pct", 15.0)?,
        };
        PatternDetector::validate_config(&detector)?;
        Ok(detector)
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::CurrentDayBreakout
    }
}
