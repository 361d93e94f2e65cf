//! Fixed-window rollups over a duration series.
//!
//! The stateless sibling of the streak engine: no targets, no checkpoints,
//! just sums over calendar-day windows anchored at today.

use chrono::NaiveDate;

use crate::types::DurationSeries;

/// Totals for the standard display windows, in seconds.
///
/// Window membership is by calendar-day difference with an inclusive
/// boundary (`days_ago <= N`), not elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rollup {
    pub today: u64,
    pub last_7_days: u64,
    pub last_30_days: u64,
    pub last_365_days: u64,
    pub all_time: u64,
}

impl Rollup {
    /// Compute all windows in a single pass over the series.
    ///
    /// Entries dated after today (clock skew at the data source) count
    /// toward `all_time` only.
    pub fn compute(series: &DurationSeries, today: NaiveDate) -> Self {
        let mut rollup = Rollup::default();
        for (date, seconds) in series.iter() {
            rollup.all_time += seconds;
            let days_ago = (today - date).num_days();
            if days_ago < 0 {
                continue;
            }
            if days_ago == 0 {
                rollup.today += seconds;
            }
            if days_ago <= 7 {
                rollup.last_7_days += seconds;
            }
            if days_ago <= 30 {
                rollup.last_30_days += seconds;
            }
            if days_ago <= 365 {
                rollup.last_365_days += seconds;
            }
        }
        rollup
    }
}
