//! Relative volume of the current session
//!
//! Averages cover the bars *before* the last one, so a spike on the current day
//! cannot inflate its own baseline. The last bar is only the numerator.

use serde::Serialize;

use crate::OHLCV;

/// Bars needed: a 20-bar baseline plus the current day
pub const VOLUME_MIN_BARS: usize = 21;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VolumeAssessment {
    pub current_volume: f64,
    pub avg_5: f64,
    pub avg_10: f64,
    pub avg_20: f64,
    pub ratio_5: f64,
    pub ratio_10: f64,
    pub ratio_20: f64,
    /// `ratio_20 >= min_ratio`; the shorter ratios are informational
    pub passes: bool,
}

impl VolumeAssessment {
    /// True for the all-zero value returned when the series is too short
    pub fn is_insufficient(&self) -> bool {
        *self == Self::default()
    }
}

/// Assess the last bar's volume against its 5/10/20-bar trailing averages.
///
/// Fewer than [`VOLUME_MIN_BARS`] bars yields the default (failing, all-zero)
/// assessment rather than an error.
pub fn check_volume<T: OHLCV>(bars: &[T], min_ratio: f64) -> VolumeAssessment {
    let Some((current, history)) = bars.split_last() else {
        return VolumeAssessment::default();
    };
    if bars.len() < VOLUME_MIN_BARS {
        return VolumeAssessment::default();
    }

    let current_volume = current.volume();
    let avg = |n: usize| -> f64 {
        let window = &history[history.len() - n..];
        window.iter().map(|b| b.volume()).sum::<f64>() / n as f64
    };
    let ratio = |avg: f64| if avg > 0.0 { current_volume / avg } else { 0.0 };

    let (avg_5, avg_10, avg_20) = (avg(5), avg(10), avg(20));
    let ratio_20 = ratio(avg_20);

    VolumeAssessment {
        current_volume,
        avg_5,
        avg_10,
        avg_20,
        ratio_5: ratio(avg_5),
        ratio_10: ratio(avg_10),
        ratio_20,
        passes: ratio_20 >= min_ratio,
    }
}
