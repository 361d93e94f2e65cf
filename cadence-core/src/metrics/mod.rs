//! Temporal aggregation and streak metrics.
//!
//! Everything here is a pure, synchronous computation over immutable
//! snapshots. Data flows one direction:
//!
//! ```text
//! DurationSeries ──> period (resolve boundaries)
//!                      ├──> target / rollup (summarize)
//!                      └──> streak (stateful chain via checkpoint)
//! ```
//!
//! [`tracker::MetricsTracker`] sits on top and wires these functions to the
//! collaborator traits in [`crate::store`].

pub mod period;
pub mod rollup;
pub mod streak;
pub mod target;
pub mod tracker;

pub use period::{period_duration, period_range, period_series, period_start};
pub use rollup::Rollup;
pub use streak::{activity_streak, advance};
pub use target::{completion, target_hit};
pub use tracker::{MetricsTracker, StreakStatus};

use chrono::{Local, NaiveDate};

/// Today as a naive calendar date in the fixed local zone.
///
/// Passed explicitly into every computation so tests and backfills can pin
/// their own "today".
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
