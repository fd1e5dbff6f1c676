//! Property-based tests using proptest.
//!
//! Invariants that must hold for any input: scoring monotonicity, declining on
//! short or loose data, confidence partitioning and repeatable scans.

use proptest::prelude::*;

use breakscan::prelude::*;

#[derive(Debug, Clone, Copy)]
struct TestBar {
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.l
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        self.v
    }
}

impl Indicators for TestBar {
    fn rsi(&self) -> Option<f64> {
        Some(55.0)
    }

    fn adx(&self) -> Option<f64> {
        Some(30.0)
    }

    fn sma20(&self) -> Option<f64> {
        Some(self.l)
    }
}

// ==================== Generators ====================

/// Bars drifting around one base price, low <= close <= high and positive
/// volume. Any window stays within about 12.3% high-to-low, so the breakout's
/// consolidation condition holds.
fn arb_bars(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<TestBar>> {
    (
        10.0..200.0_f64,
        prop::collection::vec(
            (0.0..0.08_f64, 0.0..0.04_f64, 0.0..=1.0_f64, 100.0..10_000.0_f64),
            min_len..=max_len,
        ),
    )
        .prop_map(|(base, rows)| {
            rows.into_iter()
                .map(|(offset, spread, pos, v)| {
                    let l = base * (1.0 + offset);
                    let h = l * (1.0 + spread);
                    TestBar { h, l, c: l + (h - l) * pos, v }
                })
                .collect()
        })
}

/// `arb_bars` history followed by a current bar closing `jump` over the
/// history's highest high on `surge` times its mean volume. Covers both
/// sides of the close buffer and the volume ratio.
fn arb_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<TestBar>> {
    (arb_bars(min_len - 1, max_len - 1), -0.02..0.06_f64, 0.5..6.0_f64).prop_map(
        |(mut bars, jump, surge)| {
            let resistance = bars.iter().map(|b| b.h).fold(f64::NEG_INFINITY, f64::max);
            let mean = bars.iter().map(|b| b.v).sum::<f64>() / bars.len() as f64;
            let c = resistance * (1.0 + jump);
            bars.push(TestBar { h: c * 1.01, l: c * 0.98, c, v: mean * surge });
            bars
        },
    )
}

// ==================== Volume ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Fewer than 21 bars never pass and report a zero ratio
    #[test]
    fn prop_volume_short_series(bars in arb_bars(0, 20), min_ratio in 0.0..5.0_f64) {
        let a = check_volume(&bars, min_ratio);
        prop_assert!(!a.passes);
        prop_assert_eq!(a.ratio_20, 0.0);
    }

    /// Passing is exactly the 20-day ratio meeting the threshold
    #[test]
    fn prop_volume_gate_uses_ratio_20(bars in arb_bars(21, 60), min_ratio in 0.1..5.0_f64) {
        let a = check_volume(&bars, min_ratio);
        prop_assert_eq!(a.passes, a.ratio_20 >= min_ratio);
    }
}

// ==================== Breakout scoring ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_strength_monotonic_in_magnitude(
        a in 0.0..6.0_f64, b in 0.0..6.0_f64,
        vol in 0.0..6.0_f64, range in 0.0..20.0_f64, pos in 0.0..=100.0_f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(breakout_strength(lo, vol, range, pos) <= breakout_strength(hi, vol, range, pos));
    }

    #[test]
    fn prop_strength_monotonic_in_volume(
        a in 0.0..6.0_f64, b in 0.0..6.0_f64,
        mag in 0.0..6.0_f64, range in 0.0..20.0_f64, pos in 0.0..=100.0_f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(breakout_strength(mag, lo, range, pos) <= breakout_strength(mag, hi, range, pos));
    }

    /// Tighter (smaller) consolidation never scores lower
    #[test]
    fn prop_strength_monotonic_in_tightness(
        a in 0.0..20.0_f64, b in 0.0..20.0_f64,
        mag in 0.0..6.0_f64, vol in 0.0..6.0_f64, pos in 0.0..=100.0_f64,
    ) {
        let (tight, loose) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(breakout_strength(mag, vol, tight, pos) >= breakout_strength(mag, vol, loose, pos));
    }

    #[test]
    fn prop_strength_bounded(
        mag in -5.0..50.0_f64, vol in 0.0..50.0_f64, range in 0.0..50.0_f64, pos in 0.0..=100.0_f64,
    ) {
        prop_assert!(breakout_strength(mag, vol, range, pos) <= 100);
    }
}

// ==================== Breakout detector ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A lookback range of 15% or more never yields a breakout
    #[test]
    fn prop_no_breakout_without_tight_consolidation(
        support in 10.0..100.0_f64,
        extra in 0.1501..1.0_f64,
        jump in 0.0..0.5_f64,
        surge in 1.0..10.0_f64,
    ) {
        let resistance = support * (1.0 + extra);
        let mut bars: Vec<TestBar> = (0..25)
            .map(|_| TestBar { h: resistance, l: support, c: (support + resistance) / 2.0, v: 1000.0 })
            .collect();
        let close = resistance * (1.0 + jump);
        bars.push(TestBar { h: close, l: resistance, c: close, v: 1000.0 * surge });

        prop_assert!(CurrentDayBreakoutDetector::default().detect(&bars).is_none());
    }

    /// A clear close over the lookback high on 3x its volume always fires
    #[test]
    fn prop_breakout_fires_on_clear_setup(mut bars in arb_bars(25, 40), jump in 0.01..0.06_f64) {
        let window = &bars[bars.len() - 20..];
        let resistance = window.iter().map(|b| b.h).fold(f64::NEG_INFINITY, f64::max);
        let mean = window.iter().map(|b| b.v).sum::<f64>() / 20.0;
        let c = resistance * (1.0 + jump);
        bars.push(TestBar { h: c * 1.01, l: c * 0.98, c, v: mean * 3.0 });

        let signal = CurrentDayBreakoutDetector::default().detect(&bars);
        prop_assert!(signal.is_some());
    }

    /// Any breakout that fires scores within 0..=100 and closed above the buffer
    #[test]
    fn prop_breakout_signal_consistent(bars in arb_series(22, 60)) {
        if let Some(signal) = CurrentDayBreakoutDetector::default().detect(&bars) {
            prop_assert!(signal.strength <= 100);
            let resistance = signal.details["resistance"].as_f64().unwrap();
            prop_assert!(bars[bars.len() - 1].c > resistance * (1.0 + 0.005));
        }
    }
}

// ==================== Confidence ====================

proptest! {
    #[test]
    fn prop_confidence_partition(strength in 0u8..=100) {
        let expected = if strength >= 85 {
            Confidence::High
        } else if strength >= 70 {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        prop_assert_eq!(Confidence::from_strength(strength), expected);
    }

    #[test]
    fn prop_confidence_monotonic(a in 0u8..=100, b in 0u8..=100) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Confidence::from_strength(lo) <= Confidence::from_strength(hi));
    }
}

// ==================== Scanner ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A reported current-day breakout is always the only detection
    #[test]
    fn prop_breakout_excludes_base_patterns(bars in arb_series(30, 60), min in 0u8..=100) {
        let scanner = ScannerBuilder::new()
            .filter(FilterConfig { pattern_strength_min: min, ..FilterConfig::default() })
            .build()
            .unwrap();
        let detections = scanner.detect(&bars);
        if detections.iter().any(|d| d.kind == PatternKind::CurrentDayBreakout) {
            prop_assert_eq!(detections.len(), 1);
        }
        prop_assert!(detections.iter().all(|d| d.strength >= min));
    }

    #[test]
    fn prop_detect_repeatable(bars in arb_series(30, 60)) {
        let scanner = ScannerBuilder::new()
            .filter(FilterConfig { pattern_strength_min: 0, ..FilterConfig::default() })
            .build()
            .unwrap();
        prop_assert_eq!(scanner.detect(&bars), scanner.detect(&bars));
    }
}
