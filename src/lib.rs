//! # breakscan - current-day breakout and base-pattern scanner
//!
//! Scans daily bar series (with precomputed indicators) and flags instruments whose
//! most recent session completed a volume-confirmed breakout or a base pattern
//! (cup-and-handle, flat base). Each detection carries a 0..=100 strength and a
//! confidence label intended to size a put credit spread.
//!
//! ## Quick Start
//!
//! ```rust
//! use breakscan::prelude::*;
//!
//! let scanner = ScannerBuilder::new()
//!     .filter(FilterConfig::default())
//!     .build()
//!     .unwrap();
//!
//! let bars: Vec<DailyBar> = vec![];
//! let detections = scanner.detect(&bars);
//! assert!(detections.is_empty());
//! ```

pub mod confidence;
pub mod detectors;
pub mod filter;
pub mod params;
pub mod sentiment;
pub mod volume;

pub mod prelude {
    pub use crate::{
        // Scoring
        confidence::Confidence,
        // Detectors
        detectors::{breakout_strength, CupAndHandleDetector, CurrentDayBreakoutDetector, FlatBaseDetector},
        // Configuration
        filter::{FilterConfig, MaType},
        // Parameters
        params::{get_multiple, get_percent, get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        // Parallel
        scan_parallel,
        scan_parallel_bounded,
        // Sentiment
        sentiment::{RiskTier, Sentiment, SentimentReport},
        // Volume
        volume::{check_volume, VolumeAssessment},
        // Engine
        BuiltinDetector,
        DailyBar,
        DetailValue,
        Details,
        IndicatorValues,
        Indicators,
        Multiple,
        OHLCVExt,
        PatternDetection,
        PatternDetector,
        // Errors
        PatternError,
        PatternKind,
        PatternScanner,
        PatternSignal,
        Period,
        Ratio,
        Result,
        ScanError,
        ScanResult,
        ScannerBuilder,
        OHLCV,
    };
}

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::{confidence::Confidence, filter::FilterConfig, volume::VolumeAssessment};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors raised by configuration and strict data validation.
///
/// Detection never returns these: short series and missing indicators are
/// silent declines.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("Bar dates not strictly increasing at index {index}")]
    UnorderedDates { index: usize },

    #[error("Worker pool: {0}")]
    ThreadPool(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(PatternError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

/// Positive multiplier applied to a reference level (e.g. 2.0x average volume)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Multiple(f64);

impl Multiple {
    /// Create a new Multiple, validating the value is finite and > 0
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(PatternError::InvalidValue("Multiple cannot be NaN or infinite"));
        }
        if value <= 0.0 {
            return Err(PatternError::InvalidValue("Multiple must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Multiple {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Multiple {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Multiple::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// BAR TRAITS
// ============================================================

/// Core daily bar trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Session date. Only reported in details and checked by strict validation.
    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Extension trait with computed properties for daily bars
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Where the close sits inside the session range, 0 (low) ..= 100 (high).
    /// Returns None if range is zero.
    #[inline]
    fn close_position(&self) -> Option<f64> {
        let range = self.range();
        (range > f64::EPSILON).then(|| (self.close() - self.low()) / range * 100.0)
    }

    /// Validate price/volume consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) || self.volume().is_nan() {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "NaN in bar",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) || self.volume().is_infinite() {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "Infinite value in bar",
            });
        }
        if self.high() < self.low() {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "high < low",
            });
        }
        if self.volume() < 0.0 {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "negative volume",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Precomputed indicator values aligned with each bar.
///
/// Every accessor defaults to `None`; the scanner treats `None` and NaN alike
/// and declines whatever depends on the missing value.
pub trait Indicators: OHLCV {
    fn rsi(&self) -> Option<f64> {
        None
    }
    fn sma20(&self) -> Option<f64> {
        None
    }
    fn sma50(&self) -> Option<f64> {
        None
    }
    fn ema20(&self) -> Option<f64> {
        None
    }
    fn bb_upper(&self) -> Option<f64> {
        None
    }
    fn bb_lower(&self) -> Option<f64> {
        None
    }
    fn bb_middle(&self) -> Option<f64> {
        None
    }
    fn macd(&self) -> Option<f64> {
        None
    }
    fn macd_signal(&self) -> Option<f64> {
        None
    }
    fn macd_hist(&self) -> Option<f64> {
        None
    }
    fn adx(&self) -> Option<f64> {
        None
    }
    fn atr(&self) -> Option<f64> {
        None
    }
    fn stoch_k(&self) -> Option<f64> {
        None
    }
    fn williams_r(&self) -> Option<f64> {
        None
    }
}

/// Indicator columns as supplied by an indicator provider
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IndicatorValues {
    pub rsi: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub ema20: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_middle: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub adx: Option<f64>,
    pub atr: Option<f64>,
    pub stoch_k: Option<f64>,
    pub williams_r: Option<f64>,
}

/// Ready-made daily record: prices, volume and indicators for one session
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(flatten)]
    pub indicators: IndicatorValues,
}

impl OHLCV for DailyBar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Indicators for DailyBar {
    fn rsi(&self) -> Option<f64> {
        self.indicators.rsi
    }
    fn sma20(&self) -> Option<f64> {
        self.indicators.sma20
    }
    fn sma50(&self) -> Option<f64> {
        self.indicators.sma50
    }
    fn ema20(&self) -> Option<f64> {
        self.indicators.ema20
    }
    fn bb_upper(&self) -> Option<f64> {
        self.indicators.bb_upper
    }
    fn bb_lower(&self) -> Option<f64> {
        self.indicators.bb_lower
    }
    fn bb_middle(&self) -> Option<f64> {
        self.indicators.bb_middle
    }
    fn macd(&self) -> Option<f64> {
        self.indicators.macd
    }
    fn macd_signal(&self) -> Option<f64> {
        self.indicators.macd_signal
    }
    fn macd_hist(&self) -> Option<f64> {
        self.indicators.macd_hist
    }
    fn adx(&self) -> Option<f64> {
        self.indicators.adx
    }
    fn atr(&self) -> Option<f64> {
        self.indicators.atr
    }
    fn stoch_k(&self) -> Option<f64> {
        self.indicators.stoch_k
    }
    fn williams_r(&self) -> Option<f64> {
        self.indicators.williams_r
    }
}

/// Check bars for NaN/infinite prices, inverted ranges and out-of-order dates
pub fn validate_series<T: OHLCV>(bars: &[T]) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            PatternError::InvalidBar { reason, .. } => PatternError::InvalidBar { index: i, reason },
            other => other,
        })?;
        if let Some(date) = bar.date() {
            if previous.is_some_and(|p| date <= p) {
                return Err(PatternError::UnorderedDates { index: i });
            }
            previous = Some(date);
        }
    }
    Ok(())
}

// ============================================================
// PATTERN KINDS & DETECTIONS
// ============================================================

/// Pattern family a detection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum PatternKind {
    CurrentDayBreakout,
    CupAndHandle,
    FlatBaseBreakout,
}

impl PatternKind {
    /// Stable identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::CurrentDayBreakout => "CURRENT_DAY_BREAKOUT",
            PatternKind::CupAndHandle => "CUP_AND_HANDLE",
            PatternKind::FlatBaseBreakout => "FLAT_BASE_BREAKOUT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::CurrentDayBreakout => "Current Day Breakout",
            PatternKind::CupAndHandle => "Cup and Handle",
            PatternKind::FlatBaseBreakout => "Flat Base Breakout",
        }
    }

    /// Historical follow-through rate (percent) quoted alongside detections
    pub fn success_rate(&self) -> u8 {
        match self {
            PatternKind::CurrentDayBreakout => 72,
            PatternKind::CupAndHandle => 65,
            PatternKind::FlatBaseBreakout => 68,
        }
    }

    pub fn research_basis(&self) -> &'static str {
        match self {
            PatternKind::CurrentDayBreakout => {
                "Volume-confirmed close above a tight 20-day range (Bulkowski breakout studies)"
            }
            PatternKind::CupAndHandle => {
                "O'Neil cup-with-handle base, breakout on above-average volume"
            }
            PatternKind::FlatBaseBreakout => {
                "O'Neil flat base: sideways range under 12% resolved on a volume surge"
            }
        }
    }

    /// How well the pattern suits selling a put credit spread below it (0..=100)
    pub fn pcs_suitability(&self) -> u8 {
        match self {
            PatternKind::CurrentDayBreakout => 85,
            PatternKind::CupAndHandle => 80,
            PatternKind::FlatBaseBreakout => 90,
        }
    }

    /// All kinds confirm on the most recent session
    pub fn is_current_day(&self) -> bool {
        true
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value in a detection's detail map
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum DetailValue {
    Number(f64),
    Date(NaiveDate),
    Flag(bool),
}

impl DetailValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DetailValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DetailValue::Flag(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for DetailValue {
    fn from(v: f64) -> Self {
        DetailValue::Number(v)
    }
}

impl From<bool> for DetailValue {
    fn from(v: bool) -> Self {
        DetailValue::Flag(v)
    }
}

impl From<NaiveDate> for DetailValue {
    fn from(v: NaiveDate) -> Self {
        DetailValue::Date(v)
    }
}

/// Ordered detail map; ordering keeps repeated scans byte-identical
pub type Details = BTreeMap<&'static str, DetailValue>;

/// Raw detector output before it is labelled
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSignal {
    /// 0..=100
    pub strength: u8,
    pub details: Details,
}

/// Labelled detection returned by the scanner
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PatternDetection {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub strength: u8,
    pub success_rate: u8,
    pub research_basis: &'static str,
    pub pcs_suitability: u8,
    pub confidence: Confidence,
    pub details: Details,
    pub is_current_day: bool,
}

impl PatternDetection {
    pub fn new(kind: PatternKind, signal: PatternSignal) -> Self {
        Self {
            kind,
            strength: signal.strength,
            success_rate: kind.success_rate(),
            research_basis: kind.research_basis(),
            pcs_suitability: kind.pcs_suitability(),
            confidence: Confidence::from_strength(signal.strength),
            details: signal.details,
            is_current_day: kind.is_current_day(),
        }
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// Detector evaluated on the last bar of a series.
///
/// All bars but the last form the lookback window; only the last bar may
/// confirm a pattern. Series shorter than `min_bars` yield `None`.
pub trait PatternDetector: Send + Sync {
    fn kind(&self) -> PatternKind;
    fn min_bars(&self) -> usize;
    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<PatternSignal>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// Builtin base detectors - enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<PatternSignal> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, bars)),*
                }
            }

            #[inline]
            pub fn kind(&self) -> PatternKind {
                match self {
                    $(Self::$variant(d) => PatternDetector::kind(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_bars(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    CupAndHandle(CupAndHandleDetector),
    FlatBase(FlatBaseDetector),
}

// ============================================================
// PATTERN SCANNER
// ============================================================

/// Fewest bars the scanner will evaluate
pub const MIN_SCAN_BARS: usize = 30;

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<PatternKind>>,
}

/// Stateless scanning service.
///
/// Holds only read-only configuration, so one instance can be shared across
/// threads and calls; identical input always yields identical output.
#[derive(Debug, Clone)]
pub struct PatternScanner {
    filter: FilterConfig,
    breakout: CurrentDayBreakoutDetector,
    bases: Vec<BuiltinDetector>,
    config: EngineConfig,
}

impl PatternScanner {
    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn breakout_detector(&self) -> &CurrentDayBreakoutDetector {
        &self.breakout
    }

    /// Relative-volume assessment of the last bar.
    #[inline]
    pub fn check_volume<T: OHLCV>(&self, bars: &[T], min_ratio: f64) -> VolumeAssessment {
        volume::check_volume(bars, min_ratio)
    }

    /// Static indicator gates on the last bar: RSI band, minimum ADX and,
    /// if enabled, closing above the selected moving average less tolerance.
    pub fn passes_gates<T: Indicators>(&self, bars: &[T]) -> bool {
        let Some(current) = bars.last() else {
            return false;
        };
        let filter = &self.filter;

        let Some(rsi) = finite(current.rsi()) else {
            trace!("rsi missing");
            return false;
        };
        if rsi < filter.rsi_min || rsi > filter.rsi_max {
            debug!(rsi, min = filter.rsi_min, max = filter.rsi_max, "rsi gate failed");
            return false;
        }

        let Some(adx) = finite(current.adx()) else {
            trace!("adx missing");
            return false;
        };
        if adx < filter.adx_min {
            debug!(adx, min = filter.adx_min, "adx gate failed");
            return false;
        }

        if filter.ma_support {
            let Some(ma) = finite(filter.ma_type.value(current)) else {
                trace!(ma_type = ?filter.ma_type, "moving average missing");
                return false;
            };
            let floor = ma * (1.0 - filter.ma_tolerance_pct / 100.0);
            if current.close() < floor {
                debug!(close = current.close(), floor, "moving average gate failed");
                return false;
            }
        }

        true
    }

    /// Run the gates and detectors on the last bar of `bars`.
    ///
    /// A current-day breakout that clears the strength threshold is returned
    /// alone; otherwise each base detector contributes independently.
    pub fn detect<T: Indicators>(&self, bars: &[T]) -> Vec<PatternDetection> {
        if bars.len() < MIN_SCAN_BARS {
            trace!(bars = bars.len(), need = MIN_SCAN_BARS, "series too short");
            return Vec::new();
        }
        if !self.passes_gates(bars) {
            return Vec::new();
        }

        // The breakout always runs: a qualifying one suppresses the bases even
        // when the pattern filter hides it.
        if let Some(signal) = self.breakout.detect(bars) {
            if signal.strength >= self.filter.pattern_strength_min {
                if !self.should_include(PatternKind::CurrentDayBreakout) {
                    trace!(strength = signal.strength, "breakout filtered out");
                    return Vec::new();
                }
                debug!(strength = signal.strength, "current-day breakout");
                return vec![PatternDetection::new(PatternKind::CurrentDayBreakout, signal)];
            }
            trace!(strength = signal.strength, "breakout below strength threshold");
        }

        let mut results = Vec::new();
        for detector in &self.bases {
            let kind = detector.kind();
            if bars.len() < detector.min_bars() || !self.should_include(kind) {
                continue;
            }
            match detector.detect(bars) {
                Some(signal) if signal.strength >= self.filter.pattern_strength_min => {
                    debug!(pattern = %kind, strength = signal.strength, "base pattern");
                    results.push(PatternDetection::new(kind, signal));
                }
                Some(signal) => {
                    trace!(pattern = %kind, strength = signal.strength, "below strength threshold")
                }
                None => trace!(pattern = %kind, "declined"),
            }
        }
        results
    }

    /// Volume gate followed by `detect`, as used for a universe scan.
    pub fn scan<T: Indicators>(&self, symbol: &str, bars: &[T]) -> Result<ScanResult> {
        if self.config.validate_data {
            validate_series(bars)?;
        }

        let volume = volume::check_volume(bars, self.filter.min_volume_ratio);
        let detections = if volume.passes {
            self.detect(bars)
        } else {
            trace!(symbol, ratio_20 = volume.ratio_20, "volume gate failed");
            Vec::new()
        };

        Ok(ScanResult {
            symbol: symbol.to_string(),
            volume,
            detections,
        })
    }

    fn should_include(&self, kind: PatternKind) -> bool {
        match self.config.pattern_filter {
            Some(ref filter) => filter.contains(&kind),
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        PatternDetector::validate_config(&self.breakout)?;
        for d in &self.bases {
            d.validate_config()?;
        }
        Ok(())
    }
}

#[inline]
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternScanner instances
#[derive(Debug, Clone, Default)]
pub struct ScannerBuilder {
    filter: FilterConfig,
    breakout: Option<CurrentDayBreakoutDetector>,
    cup_and_handle: Option<CupAndHandleDetector>,
    flat_base: Option<FlatBaseDetector>,
    config: EngineConfig,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter settings; clamped into a usable range on `build`
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Override the breakout detector derived from the filter settings
    pub fn breakout(mut self, detector: CurrentDayBreakoutDetector) -> Self {
        self.breakout = Some(detector);
        self
    }

    pub fn cup_and_handle(mut self, detector: CupAndHandleDetector) -> Self {
        self.cup_and_handle = Some(detector);
        self
    }

    pub fn flat_base(mut self, detector: FlatBaseDetector) -> Self {
        self.flat_base = Some(detector);
        self
    }

    /// Enable/disable strict bar validation in `scan`
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Restrict output to specific pattern kinds
    pub fn only_patterns(mut self, kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        self.config.pattern_filter = Some(kinds.into_iter().collect());
        self
    }

    /// Build the scanner
    pub fn build(self) -> Result<PatternScanner> {
        let filter = self.filter.clamped();
        let breakout = match self.breakout {
            Some(detector) => detector,
            None => CurrentDayBreakoutDetector::from_filter(&filter),
        };
        let scanner = PatternScanner {
            filter,
            breakout,
            bases: vec![
                BuiltinDetector::CupAndHandle(self.cup_and_handle.unwrap_or_default()),
                BuiltinDetector::FlatBase(self.flat_base.unwrap_or_default()),
            ],
            config: self.config,
        };
        scanner.validate()?;
        Ok(scanner)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanResult {
    pub symbol: String,
    pub volume: VolumeAssessment,
    pub detections: Vec<PatternDetection>,
}

impl ScanResult {
    /// Highest strength across detections
    pub fn max_strength(&self) -> Option<u8> {
        self.detections.iter().map(|d| d.strength).max()
    }

    /// Instrument-level label from the strongest detection
    pub fn confidence(&self) -> Option<Confidence> {
        self.max_strength().map(Confidence::from_strength)
    }
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel scanning of multiple instruments on rayon's global pool.
///
/// Results keep input order.
pub fn scan_parallel<'a, T, I>(
    scanner: &PatternScanner,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: Indicators + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            scanner.scan(symbol, bars).map_err(|error| ScanError {
                symbol: symbol.to_string(),
                error,
            })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    debug!(
        scanned = successes.len(),
        failed = errors.len(),
        flagged = successes.iter().filter(|r| !r.detections.is_empty()).count(),
        "parallel scan complete"
    );

    (successes, errors)
}

/// Like [`scan_parallel`] but on a dedicated pool of `workers` threads, for
/// callers that must cap concurrency.
pub fn scan_parallel_bounded<'a, T, I>(
    scanner: &PatternScanner,
    instruments: I,
    workers: usize,
) -> Result<(Vec<ScanResult>, Vec<ScanError>)>
where
    T: Indicators + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])> + Send,
{
    if workers == 0 {
        return Err(PatternError::InvalidValue("worker count must be > 0"));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PatternError::ThreadPool(e.to_string()))?;
    Ok(pool.install(|| scan_parallel(scanner, instruments)))
}

// ============================================================
// TESTS
// ============================================================
