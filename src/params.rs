//! Parameter metadata for pattern detectors
//!
//! Describes each detector's tunable thresholds so they can be documented,
//! swept in a grid search, or built from a key/value map.
//!
//! # Example
//!
//! ```rust
//! use breakscan::params::{ParamMeta, ParameterizedDetector};
//! use breakscan::prelude::*;
//!
//! for param in FlatBaseDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{Multiple, PatternError, PatternKind, Period, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Fraction in 0.0..=1.0 (price buffers)
  Ratio,
  /// Positive integer bar count
  Period,
  /// Positive multiplier (volume multiples)
  Multiple,
  /// Percent in 0.0..=100.0 (range and depth limits)
  Percent,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn multiple(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Multiple, default, range, description }
  }

  pub const fn percent(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Percent, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    if step <= 0.0 {
      return vec![min];
    }
    let steps = ((max - min) / step + 1e-9).floor() as usize;
    (0..=steps).map(|i| min + step * i as f64).collect()
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value.is_nan() || value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Period if value < 1.0 || value.fract() != 0.0 => {
        Err(PatternError::InvalidValue("Period must be a positive integer"))
      },
      ParamType::Multiple if value <= 0.0 => Err(PatternError::InvalidValue("Multiple must be > 0")),
      _ => Ok(()),
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors that support parameterization
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  fn pattern_kind() -> PatternKind;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
    return Err(PatternError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

pub fn get_multiple(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Multiple> {
  let value = params.get(key).copied().unwrap_or(default);
  Multiple::new(value)
}

pub fn get_percent(params: &HashMap<&str, f64>, key: &'static str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !(0.0..=100.0).contains(&value) {
    return Err(PatternError::OutOfRange { field: key, value, min: 0.0, max: 100.0 });
  }
  Ok(value)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_meta_constructors() {
    let meta = ParamMeta::multiple("volume", 2.0, (1.5, 4.0, 0.5), "Volume multiple");
    assert_eq!(meta.param_type, ParamType::Multiple);
    assert_eq!(meta.default, 2.0);

    let meta = ParamMeta::percent("range", 12.0, (8.0, 15.0, 1.0), "Range");
    assert_eq!(meta.param_type, ParamType::Percent);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::multiple("test", 2.0, (1.5, 2.5, 0.5), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 3);
    assert!((grid[0] - 1.5).abs() < f64::EPSILON);
    assert!((grid[1] - 2.0).abs() < f64::EPSILON);
    assert!((grid[2] - 2.5).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validate_period() {
    let meta = ParamMeta::period("test", 20.0, (10.0, 30.0, 5.0), "Test");

    assert!(meta.validate(20.0).is_ok());
    assert!(meta.validate(12.5).is_err());
    assert!(meta.validate(35.0).is_err());
  }

  #[test]
  fn test_validate_nan() {
    let meta = ParamMeta::ratio("test", 0.005, (0.0, 0.02, 0.001), "Test");
    assert!(meta.validate(f64::NAN).is_err());
  }

  #[test]
  fn test_helpers_fall_back_to_defaults() {
    let mut params = HashMap::new();
    params.insert("lookback", 30.0);
    params.insert("volume", 3.0);

    assert_eq!(get_period(&params, "lookback", 20).unwrap().get(), 30);
    assert_eq!(get_period(&params, "other", 20).unwrap().get(), 20);
    assert_eq!(get_multiple(&params, "volume", 2.0).unwrap().get(), 3.0);
    assert!((get_ratio(&params, "buffer", 0.005).unwrap().get() - 0.005).abs() < f64::EPSILON);
    assert_eq!(get_percent(&params, "range", 12.0).unwrap(), 12.0);
  }

  #[test]
  fn test_helpers_reject_bad_values() {
    let mut params = HashMap::new();
    params.insert("lookback", 0.0);
    params.insert("volume", -1.0);
    params.insert("range", 120.0);

    assert!(get_period(&params, "lookback", 20).is_err());
    assert!(get_multiple(&params, "volume", 2.0).is_err());
    assert!(get_percent(&params, "range", 12.0).is_err());
  }
}
