//! Per-subject metrics orchestration.
//!
//! [`MetricsTracker`] wires the pure period/target/streak functions to the
//! collaborator traits from [`crate::store`] and owns the checkpoint write
//! policy. It is invoked once per (subject, period kind) pair; subjects have
//! disjoint series and checkpoints, so invocations can happen in any order
//! or in parallel without coordination.

use chrono::NaiveDate;

use super::period::{period_duration, period_series};
use super::rollup::Rollup;
use super::streak;
use super::target::{completion, target_hit};
use crate::error::Result;
use crate::store::{CheckpointStore, SeriesSource, TargetSource};
use crate::types::{PeriodKind, Subject};

/// Streak state as shown to the user, including the in-progress period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreakStatus {
    /// Persisted streak plus one if the in-progress period already qualifies
    pub count: u32,
    /// Completion fraction of the in-progress period, in `[0, 1]`
    pub completion: f64,
    /// Whether the in-progress period has hit its target
    pub target_hit: bool,
}

/// Computes user-facing metrics for any subject against pluggable
/// collaborators.
pub struct MetricsTracker<'a> {
    series: &'a dyn SeriesSource,
    targets: &'a dyn TargetSource,
    checkpoints: &'a dyn CheckpointStore,
}

impl<'a> MetricsTracker<'a> {
    pub fn new(
        series: &'a dyn SeriesSource,
        targets: &'a dyn TargetSource,
        checkpoints: &'a dyn CheckpointStore,
    ) -> Self {
        Self { series, targets, checkpoints }
    }

    /// Current streak for a subject, checkpoint included.
    ///
    /// For daily and weekly kinds this advances the persisted checkpoint
    /// (writing it back only when it changed — an up-to-date checkpoint is a
    /// no-op read) and then adds the in-progress period on top if it already
    /// hits its target. That last addition is presentation only and is never
    /// persisted, so a not-yet-hit today cannot corrupt the checkpoint.
    ///
    /// Month and year streaks are degenerate: 1 if the current period has
    /// any activity, else 0.
    pub fn current_streak(
        &self,
        subject: &Subject,
        kind: PeriodKind,
        today: NaiveDate,
    ) -> Result<StreakStatus> {
        let series = self.series.duration_series(subject)?;
        let spec = self.targets.target_spec(subject, kind)?;
        let current = period_duration(&series, kind, 0, today)?;

        if !kind.has_checkpoint() {
            return Ok(StreakStatus {
                count: streak::activity_streak(&series, kind, today)?,
                completion: completion(None, current),
                target_hit: current > 0,
            });
        }

        let stored = self.checkpoints.load(subject, kind)?;
        let advanced = streak::advance(&series, &spec, &stored, kind, today)?;
        if advanced != stored {
            self.checkpoints.save(subject, kind, &advanced)?;
            tracing::debug!(
                subject = %subject,
                kind = %kind,
                count = advanced.count,
                anchor = %advanced.anchor,
                "Advanced streak checkpoint"
            );
        }

        let hit_now = target_hit(spec.target_hours(), current);
        // An excluded weekday neither extends nor breaks the streak, today
        // included: it contributes nothing to the displayed count.
        let counts_today = hit_now && !(kind == PeriodKind::Day && spec.is_excluded(today));

        Ok(StreakStatus {
            count: advanced.count + u32::from(counts_today),
            completion: completion(spec.target_hours(), current),
            target_hit: hit_now,
        })
    }

    /// Fixed-window rollups over the subject's series.
    pub fn rollup(&self, subject: &Subject, today: NaiveDate) -> Result<Rollup> {
        let series = self.series.duration_series(subject)?;
        Ok(Rollup::compute(&series, today))
    }

    /// Durations for the subject's last `reps` periods, oldest first.
    pub fn period_breakdown(
        &self,
        subject: &Subject,
        kind: PeriodKind,
        reps: i32,
        today: NaiveDate,
    ) -> Result<Vec<u64>> {
        let series = self.series.duration_series(subject)?;
        period_series(&series, kind, reps, today)
    }
}
