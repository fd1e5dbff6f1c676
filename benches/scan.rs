//! Benchmarks for breakout and base-pattern scanning.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use breakscan::prelude::*;

/// Simple test bar with fixed indicator readings that pass the default gates
#[derive(Debug, Clone, Copy)]
struct TestBar {
  o: f64,
  h: f64,
  l: f64,
  c: f64,
  v: f64,
}

impl OHLCV for TestBar {
  fn open(&self) -> f64 {
    self.o
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
    Some(25.0)
  }

  fn sma20(&self) -> Option<f64> {
    Some(self.l)
  }
}

/// Generate drifting bars with periodic volume spikes
fn generate_bars(n: usize, seed: usize) -> Vec<TestBar> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 50.0 + (seed % 50) as f64;

  for i in 0..n {
    let k = i + seed * 31;
    let change = ((k * 7 + 13) % 100) as f64 / 100.0 - 0.48; // Deterministic "random"
    let volatility = 0.5 + ((k * 3) % 10) as f64 / 10.0;
    let volume = if k % 23 == 0 { 4000.0 } else { 900.0 + ((k * 11) % 200) as f64 };

    let o = price;
    let c = (price + change).max(1.0);
    let h = o.max(c) + volatility * 0.5;
    let l = (o.min(c) - volatility * 0.5).max(0.5);

    bars.push(TestBar { o, h, l, c, v: volume });
    price = c;
  }

  bars
}

fn bench_detect(c: &mut Criterion) {
  let bars = generate_bars(60, 0);
  let scanner = ScannerBuilder::new().build().unwrap();

  c.bench_function("detect_60_bars", |b| {
    b.iter(|| {
      let _ = black_box(scanner.detect(black_box(&bars)));
    })
  });
}

fn bench_scan(c: &mut Criterion) {
  let bars = generate_bars(250, 0);
  let scanner = ScannerBuilder::new().build().unwrap();

  c.bench_function("scan_250_bars", |b| {
    b.iter(|| {
      let _ = black_box(scanner.scan(black_box("SYM"), black_box(&bars)));
    })
  });
}

fn bench_volume(c: &mut Criterion) {
  let bars = generate_bars(250, 0);

  c.bench_function("check_volume_250_bars", |b| {
    b.iter(|| {
      let _ = black_box(check_volume(black_box(&bars), 1.5));
    })
  });
}

fn bench_parallel_universe(c: &mut Criterion) {
  let scanner = ScannerBuilder::new().build().unwrap();

  let mut group = c.benchmark_group("universe");

  for size in [10, 100, 500].iter() {
    let data: Vec<(String, Vec<TestBar>)> =
      (0..*size).map(|i| (format!("SYM{i}"), generate_bars(60, i))).collect();
    let instruments: Vec<(&str, &[TestBar])> =
      data.iter().map(|(symbol, bars)| (symbol.as_str(), bars.as_slice())).collect();

    group.bench_with_input(BenchmarkId::new("scan_parallel", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(scan_parallel(black_box(&scanner), black_box(instruments.clone())));
      })
    });
  }

  group.finish();
}

criterion_group!(benches, bench_detect, bench_scan, bench_volume, bench_parallel_universe);
criterion_main!(benches);
