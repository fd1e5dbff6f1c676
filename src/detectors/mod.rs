//! Pattern detectors
//!
//! Every detector evaluates only the last bar of a series as the confirmation
//! bar; earlier bars supply reference levels.
//!
//! - **Breakout**: current-day close above a tight lookback range, additive score.
//! - **Base**: cup-and-handle and flat-base breakouts, all-or-nothing score.

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod base;
pub mod breakout;

impl_with_defaults!(CurrentDayBreakoutDetector, CupAndHandleDetector, FlatBaseDetector);

pub use base::*;
pub use breakout::*;
pub use helpers::*;
