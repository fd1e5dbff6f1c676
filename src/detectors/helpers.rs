//! Window statistics and scoring tables shared by the detectors
//!
//! Every window here ends *before* the current (last) bar.

use crate::OHLCV;

// ============================================================
// BREAKOUT SCORING TABLES
// ============================================================
// (threshold, points): first row whose threshold is met wins.

/// Close above resistance, percent (value >= threshold)
pub const MAGNITUDE_POINTS: [(f64, u8); 4] = [(3.0, 35), (2.0, 25), (1.0, 20), (0.5, 15)];
/// Current volume over lookback mean (value >= threshold)
pub const VOLUME_POINTS: [(f64, u8); 3] = [(4.0, 30), (3.0, 25), (2.0, 20)];
/// Lookback range as percent of support (value <= threshold)
pub const TIGHTNESS_POINTS: [(f64, u8); 3] = [(8.0, 25), (12.0, 20), (15.0, 15)];
/// Close position inside the session range, percent (value >= threshold)
pub const CLOSE_POSITION_POINTS: [(f64, u8); 2] = [(80.0, 10), (60.0, 5)];

/// Points for the first row with `value >= threshold`, else 0
#[inline]
pub fn points_at_least(value: f64, table: &[(f64, u8)]) -> u8 {
    table
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0, |(_, points)| *points)
}

/// Points for the first row with `value <= threshold`, else 0
#[inline]
pub fn points_at_most(value: f64, table: &[(f64, u8)]) -> u8 {
    table
        .iter()
        .find(|(threshold, _)| value <= *threshold)
        .map_or(0, |(_, points)| *points)
}

// ============================================================
// WINDOW HELPERS
// ============================================================

/// Split into (the `period` bars before the last, last bar).
/// None unless at least `period + 1` bars are present.
#[inline]
pub fn trailing_window<T>(bars: &[T], period: usize) -> Option<(&[T], &T)> {
    let (current, history) = bars.split_last()?;
    let start = history.len().checked_sub(period)?;
    Some((&history[start..], current))
}

#[inline]
pub fn max_high<T: OHLCV>(bars: &[T]) -> f64 {
    bars.iter().map(|b| b.high()).fold(f64::NEG_INFINITY, f64::max)
}

#[inline]
pub fn min_low<T: OHLCV>(bars: &[T]) -> f64 {
    bars.iter().map(|b| b.low()).fold(f64::INFINITY, f64::min)
}

/// Mean volume, 0 for an empty slice
#[inline]
pub fn mean_volume<T: OHLCV>(bars: &[T]) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    bars.iter().map(|b| b.volume()).sum::<f64>() / bars.len() as f64
}

/// Mean volume of up to `period` bars preceding the last one
#[inline]
pub fn trailing_mean_volume<T: OHLCV>(bars: &[T], period: usize) -> f64 {
    match bars.split_last() {
        Some((_, history)) => {
            let start = history.len().saturating_sub(period);
            mean_volume(&history[start..])
        }
        None => 0.0,
    }
}

/// `(high - low) / low * 100`. None if `low` is not positive.
#[inline]
pub fn range_pct(high: f64, low: f64) -> Option<f64> {
    (low > f64::EPSILON).then(|| (high - low) / low * 100.0)
}

/// Percent move from `base` to `value`. None if `base` is not positive.
#[inline]
pub fn pct_above(value: f64, base: f64) -> Option<f64> {
    (base > f64::EPSILON).then(|| (value - base) / base * 100.0)
}
