//! Incremental streak scanning with checkpoint compression.
//!
//! A streak is the count of consecutive qualifying periods ending at the most
//! recently completed one. Rather than re-walking all history on every query,
//! [`advance`] resumes from the last persisted [`StreakCheckpoint`] and only
//! scans the gap between the checkpoint's anchor and the last completed
//! period:
//!
//! ```text
//!   today
//!     |  offset 1   offset 2   offset 3        anchor
//!     v     v          v          v              v
//!  ...][ period ][ period ][ period ][ ... ][ period ][...
//!           scan <------ scan <------ scan     +count   (stop)
//! ```
//!
//! Periods already verified as part of a prior checkpoint are never
//! rescanned: reaching the anchor absorbs the stored count and stops. The
//! returned checkpoint's anchor is always the start of the most recently
//! completed period, so an immediate re-run short-circuits on its first
//! iteration.
//!
//! The current in-progress period is deliberately not part of the result;
//! "streak including today" is a presentation decision made by the caller
//! (see [`MetricsTracker`](super::tracker::MetricsTracker)), so that a
//! not-yet-hit today never corrupts the persisted state.

use chrono::{Datelike, NaiveDate, Weekday};

use super::period::{period_duration, period_start};
use super::target::target_hit;
use crate::error::{Error, Result};
use crate::types::{DurationSeries, PeriodKind, StreakCheckpoint, TargetSpec};

/// Advance a daily or weekly streak from its persisted checkpoint.
///
/// Walks completed periods backwards from offset 1 (yesterday, or the last
/// completed Monday-week), counting every target hit, skipping excluded
/// weekdays (daily only), and stopping at the first miss or at the
/// checkpoint anchor, whichever comes first. The scan never crosses the
/// sentinel epoch, which bounds it even for pathological inputs.
///
/// An unreconcilable checkpoint (anchor in the future, anchor before the
/// epoch, weekly anchor off Monday) is demoted to the sentinel with a
/// warning instead of failing the computation.
///
/// Month and year kinds carry no checkpoint; see [`activity_streak`].
pub fn advance(
    series: &DurationSeries,
    spec: &TargetSpec,
    checkpoint: &StreakCheckpoint,
    kind: PeriodKind,
    today: NaiveDate,
) -> Result<StreakCheckpoint> {
    if !kind.has_checkpoint() {
        return Err(Error::InvalidArgument(format!(
            "{} streaks are recomputed fresh, not advanced from a checkpoint",
            kind
        )));
    }

    let checkpoint = match reconcile(checkpoint, kind, today) {
        Ok(checkpoint) => checkpoint,
        Err(e) => {
            tracing::warn!(error = %e, kind = %kind, "Resetting unreconcilable streak checkpoint");
            StreakCheckpoint::sentinel()
        }
    };

    let floor = StreakCheckpoint::sentinel_epoch();
    let new_anchor = period_start(kind, 1, today)?;
    let mut count: u32 = 0;
    let mut offset: i32 = 1;

    loop {
        let date = period_start(kind, offset, today)?;
        if date < floor {
            break;
        }
        if !checkpoint.is_sentinel() && date == checkpoint.anchor {
            // Gap fully re-verified; the stored count is still valid.
            count += checkpoint.count;
            break;
        }
        if kind == PeriodKind::Day && spec.is_excluded(date) {
            // Excluded days neither extend nor break the streak.
            offset += 1;
            continue;
        }
        let duration = period_duration(series, kind, offset, today)?;
        if !target_hit(spec.target_hours(), duration) {
            break;
        }
        count += 1;
        offset += 1;
    }

    Ok(StreakCheckpoint::new(count, new_anchor))
}

/// Degenerate streak for month and year periods: 1 if the current period has
/// any activity, else 0. Recomputed fresh on every call, never persisted.
pub fn activity_streak(series: &DurationSeries, kind: PeriodKind, today: NaiveDate) -> Result<u32> {
    let duration = period_duration(series, kind, 0, today)?;
    Ok(u32::from(duration > 0))
}

/// Sanity-check a stored checkpoint against today.
///
/// Failures here are data-quality problems (clock skew, corrupted
/// persistence), recovered by the caller with the sentinel.
fn reconcile(
    checkpoint: &StreakCheckpoint,
    kind: PeriodKind,
    today: NaiveDate,
) -> Result<StreakCheckpoint> {
    if checkpoint.is_sentinel() {
        return Ok(*checkpoint);
    }
    let last_complete = period_start(kind, 1, today)?;
    if checkpoint.anchor > last_complete {
        return Err(Error::StaleCheckpoint(format!(
            "anchor {} is ahead of the last completed {} period ({})",
            checkpoint.anchor, kind, last_complete
        )));
    }
    if checkpoint.anchor < StreakCheckpoint::sentinel_epoch() {
        return Err(Error::StaleCheckpoint(format!(
            "anchor {} predates the tracked epoch",
            checkpoint.anchor
        )));
    }
    if kind == PeriodKind::Week && checkpoint.anchor.weekday() != Weekday::Mon {
        return Err(Error::StaleCheckpoint(format!(
            "weekly anchor {} is not a Monday",
            checkpoint.anchor
        )));
    }
    Ok(*checkpoint)
}
