//! Base-completion patterns confirmed on the last bar
//!
//! Both detectors score all-or-nothing: every condition contributes a fixed
//! block and any failing condition declines the pattern entirely.

use std::{collections::HashMap, ops::Range};

use super::helpers::{max_high, min_low, range_pct, trailing_mean_volume, trailing_window};
use crate::{
    params::{get_multiple, get_percent, get_period, get_ratio, ParamMeta, ParameterizedDetector},
    Details, Multiple, PatternDetector, PatternError, PatternKind, PatternSignal, Period, Ratio,
    Result, OHLCV,
};

// ============================================================
// CUP AND HANDLE
// ============================================================

/// Bars needed for a cup-and-handle evaluation
pub const CUP_MIN_BARS: usize = 40;

// Layout of the 30 bars preceding the current day
const CUP_WINDOW: usize = 30;
const CUP_RIM_BARS: usize = 20;
const CUP_BOTTOM: Range<usize> = 5..15;
const HANDLE_BARS: usize = 10;

const CUP_VALID_POINTS: u8 = 30;
const CUP_BREAKOUT_POINTS: u8 = 40;
const CUP_VOLUME_POINTS: u8 = 30;

/// Cup-and-handle breakout.
///
/// Of the 30 bars before the current day, the first 20 set the cup rim
/// (max high), bars 5..15 the cup bottom (min low) and the last 10 the handle
/// (max high). The current bar must close over the handle on rising volume.
#[derive(Debug, Clone)]
pub struct CupAndHandleDetector {
    /// Close must exceed the handle high by this fraction
    pub breakout_buffer: Ratio,
    /// Bars averaged for the volume baseline
    pub volume_period: Period,
    pub min_volume_multiple: Multiple,
    pub min_depth_pct: f64,
    pub max_depth_pct: f64,
}

impl Default for CupAndHandleDetector {
    fn default() -> Self {
        Self {
            breakout_buffer: Ratio::new_const(0.005),
            volume_period: Period::new_const(20),
            min_volume_multiple: Multiple::new_const(1.5),
            min_depth_pct: 15.0,
            max_depth_pct: 50.0,
        }
    }
}

impl PatternDetector for CupAndHandleDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::CupAndHandle
    }

    fn min_bars(&self) -> usize {
        CUP_MIN_BARS
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<PatternSignal> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (window, current) = trailing_window(bars, CUP_WINDOW)?;

        let cup_high = max_high(&window[..CUP_RIM_BARS]);
        let cup_low = min_low(&window[CUP_BOTTOM]);
        let handle_high = max_high(&window[CUP_WINDOW - HANDLE_BARS..]);
        let avg_volume = trailing_mean_volume(bars, self.volume_period.get());

        if cup_high <= f64::EPSILON {
            return None;
        }
        // measured from the rim, not from the low
        let depth_pct = (cup_high - cup_low) / cup_high * 100.0;

        let valid_cup = (self.min_depth_pct..=self.max_depth_pct).contains(&depth_pct);
        let breakout = current.close() > handle_high * (1.0 + self.breakout_buffer.get());
        let volume_confirmed =
            avg_volume > 0.0 && current.volume() > avg_volume * self.min_volume_multiple.get();
        if !(valid_cup && breakout && volume_confirmed) {
            return None;
        }

        let mut details = Details::new();
        details.insert("cup_high", cup_high.into());
        details.insert("cup_low", cup_low.into());
        details.insert("cup_depth_pct", depth_pct.into());
        details.insert("handle_high", handle_high.into());
        details.insert("volume_ratio", (current.volume() / avg_volume).into());
        if let Some(date) = current.date() {
            details.insert("date", date.into());
        }

        Some(PatternSignal {
            strength: CUP_VALID_POINTS + CUP_BREAKOUT_POINTS + CUP_VOLUME_POINTS,
            details,
        })
    }

    fn validate_config(&self) -> Result<()> {
        let (min, max) = (self.min_depth_pct, self.max_depth_pct);
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || max > 100.0 || min >= max {
            return Err(PatternError::InvalidConfig(format!(
                "cup depth bounds [{min}, {max}] must satisfy 0 <= min < max <= 100"
            )));
        }
        Ok(())
    }
}

static CUP_AND_HANDLE_PARAMS: &[ParamMeta] = &[
    ParamMeta::ratio("breakout_buffer", 0.005, (0.0, 0.02, 0.0025), "Close above handle high"),
    ParamMeta::period("volume_period", 20.0, (10.0, 30.0, 5.0), "Volume baseline bars"),
    ParamMeta::multiple("min_volume_multiple", 1.5, (1.0, 3.0, 0.25), "Volume over baseline"),
    ParamMeta::percent("min_depth_pct", 15.0, (8.0, 20.0, 1.0), "Shallowest cup"),
    ParamMeta::percent("max_depth_pct", 50.0, (30.0, 60.0, 5.0), "Deepest cup"),
];

impl ParameterizedDetector for CupAndHandleDetector {
    fn param_meta() -> &'static [ParamMeta] {
        CUP_AND_HANDLE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let detector = Self {
            breakout_buffer: get_ratio(params, "breakout_buffer", 0.005)?,
            volume_period: get_period(params, "volume_period", 20)?,
            min_volume_multiple: get_multiple(params, "min_volume_multiple", 1.5)?,
            min_depth_pct: get_percent(params, "min_depth_pct", 15.0)?,
            max_depth_pct: get_percent(params, "max_depth_pct", 50.0)?,
        };
        PatternDetector::validate_config(&detector)?;
        Ok(detector)
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::CupAndHandle
    }
}

// ============================================================
// FLAT BASE
// ============================================================

/// Bars needed for a flat-base evaluation
pub const FLAT_BASE_MIN_BARS: usize = 20;

const FLAT_TIGHT_POINTS: u8 = 40;
const FLAT_BREAKOUT_POINTS: u8 = 35;
const FLAT_VOLUME_POINTS: u8 = 25;

/// Breakout from a narrow sideways base.
///
/// The base is the `base_period` bars before the current day; its range must be
/// under `max_range_pct` of its low.
#[derive(Debug, Clone)]
pub struct FlatBaseDetector {
    pub base_period: Period,
    pub max_range_pct: f64,
    /// Close must exceed the base high by this fraction
    pub breakout_buffer: Ratio,
    /// Bars averaged for the volume baseline
    pub volume_period: Period,
    pub min_volume_multiple: Multiple,
}

impl Default for FlatBaseDetector {
    fn default() -> Self {
        Self {
            base_period: Period::new_const(15),
            max_range_pct: 12.0,
            breakout_buffer: Ratio::new_const(0.003),
            volume_period: Period::new_const(20),
            min_volume_multiple: Multiple::new_const(1.8),
        }
    }
}

impl PatternDetector for FlatBaseDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::FlatBaseBreakout
    }

    fn min_bars(&self) -> usize {
        FLAT_BASE_MIN_BARS.max(self.base_period.get().saturating_add(1))
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<PatternSignal> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (base, current) = trailing_window(bars, self.base_period.get())?;

        let base_high = max_high(base);
        let base_low = min_low(base);
        let base_range_pct = range_pct(base_high, base_low)?;
        let avg_volume = trailing_mean_volume(bars, self.volume_period.get());

        let tight_base = base_range_pct < self.max_range_pct;
        let breakout = current.close() > base_high * (1.0 + self.breakout_buffer.get());
        let volume_surge =
            avg_volume > 0.0 && current.volume() > avg_volume * self.min_volume_multiple.get();
        if !(tight_base && breakout && volume_surge) {
            return None;
        }

        let mut details = Details::new();
        details.insert("base_high", base_high.into());
        details.insert("base_low", base_low.into());
        details.insert("base_range_pct", base_range_pct.into());
        details.insert("volume_ratio", (current.volume() / avg_volume).into());
        if let Some(date) = current.date() {
            details.insert("date", date.into());
        }

        Some(PatternSignal {
            strength: FLAT_TIGHT_POINTS + FLAT_BREAKOUT_POINTS + FLAT_VOLUME_POINTS,
            details,
        })
    }

    fn validate_config(&self) -> Result<()> {
        if !(self.max_range_pct.is_finite() && self.max_range_pct > 0.0) {
            return Err(PatternError::InvalidValue("max_range_pct must be > 0"));
        }
        Ok(())
    }
}

static FLAT_BASE_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("base_period", 15.0, (10.0, 25.0, 5.0), "Bars forming the base"),
    ParamMeta::percent("max_range_pct", 12.0, (6.0, 15.0, 1.0), "Widest base range"),
    ParamMeta::ratio("breakout_buffer", 0.003, (0.0, 0.01, 0.001), "Close above base high"),
    ParamMeta::period("volume_period", 20.0, (10.0, 30.0, 5.0), "Volume baseline bars"),
    ParamMeta::multiple("min_volume_multiple", 1.8, (1.2, 3.0, 0.2), "Volume over baseline"),
];

impl ParameterizedDetector for FlatBaseDetector {
    fn param_meta() -> &'static [ParamMeta] {
        FLAT_BASE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let detector = Self {
            base_period: get_period(params, "base_period", 15)?,
            max_range_pct: get_percent(params, "max_range_pct", 12.0)?,
            breakout_buffer: get_ratio(params, "breakout_buffer", 0.003)?,
            volume_period: get_period(params, "volume_period", 20)?,
            min_volume_multiple: get_multiple(params, "min_volume_multiple", 1.8)?,
        };
        PatternDetector::validate_config(&detector)?;
        Ok(detector)
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::FlatBaseBreakout
    }
}
