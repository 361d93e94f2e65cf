//! Collaborator boundary for the metrics core.
//!
//! The engine never fetches, persists, or watches anything itself: it is
//! handed a fresh [`DurationSeries`] snapshot per call and reads/writes
//! checkpoints through a store. These traits name that boundary; the
//! in-memory implementations serve embedders and tests, and
//! [`SqliteCheckpointStore`] is the durable default.
//!
//! Subjects have disjoint keys, so implementations only need to make the
//! read/write of a single checkpoint record atomic; no cross-subject
//! synchronization is required.

pub mod sqlite;

pub use sqlite::SqliteCheckpointStore;

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::types::{DurationSeries, PeriodKind, StreakCheckpoint, Subject, TargetSpec};

// ============================================
// Traits
// ============================================

/// Source of per-subject duration snapshots.
///
/// Refreshed by an external import pipeline on its own schedule; the core
/// only ever reads whatever snapshot is current.
pub trait SeriesSource {
    fn duration_series(&self, subject: &Subject) -> Result<DurationSeries>;
}

/// Source of per-(subject, kind) target specifications.
pub trait TargetSource {
    fn target_spec(&self, subject: &Subject, kind: PeriodKind) -> Result<TargetSpec>;
}

/// Persistence for streak checkpoints.
pub trait CheckpointStore {
    /// Stored checkpoint, or the sentinel for a fresh (subject, kind) pair.
    fn load(&self, subject: &Subject, kind: PeriodKind) -> Result<StreakCheckpoint>;

    /// Overwrite the checkpoint for a (subject, kind) pair.
    fn save(&self, subject: &Subject, kind: PeriodKind, checkpoint: &StreakCheckpoint)
        -> Result<()>;
}

// ============================================
// In-memory implementations
// ============================================

/// In-memory series snapshots, replaced wholesale per refresh.
#[derive(Debug, Default)]
pub struct MemorySeriesSource {
    inner: RwLock<HashMap<String, DurationSeries>>,
}

impl MemorySeriesSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new snapshot for a subject, dropping the previous one.
    pub fn replace(&self, subject: &Subject, series: DurationSeries) {
        self.inner
            .write()
            .unwrap()
            .insert(subject.storage_key(), series);
    }
}

impl SeriesSource for MemorySeriesSource {
    fn duration_series(&self, subject: &Subject) -> Result<DurationSeries> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .get(&subject.storage_key())
            .cloned()
            .unwrap_or_default())
    }
}

/// Fixed target specs applied to every subject.
///
/// Month and year periods never carry a target.
#[derive(Debug, Clone, Default)]
pub struct StaticTargets {
    pub daily: TargetSpec,
    pub weekly: TargetSpec,
}

impl StaticTargets {
    pub fn new(daily: TargetSpec, weekly: TargetSpec) -> Self {
        Self { daily, weekly }
    }

    /// Daily spec only; weekly stays unbounded.
    pub fn daily(daily: TargetSpec) -> Self {
        Self { daily, weekly: TargetSpec::unbounded() }
    }
}

impl TargetSource for StaticTargets {
    fn target_spec(&self, _subject: &Subject, kind: PeriodKind) -> Result<TargetSpec> {
        Ok(match kind {
            PeriodKind::Day => self.daily.clone(),
            PeriodKind::Week => self.weekly.clone(),
            PeriodKind::Month | PeriodKind::Year => TargetSpec::unbounded(),
        })
    }
}

/// In-memory checkpoint store for tests and embedders without persistence.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    inner: RwLock<HashMap<(String, PeriodKind), StreakCheckpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, subject: &Subject, kind: PeriodKind) -> Result<StreakCheckpoint> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .get(&(subject.storage_key(), kind))
            .copied()
            .unwrap_or_else(StreakCheckpoint::sentinel))
    }

    fn save(
        &self,
        subject: &Subject,
        kind: PeriodKind,
        checkpoint: &StreakCheckpoint,
    ) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .insert((subject.storage_key(), kind), *checkpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_memory_series_snapshots() {
        let source = MemorySeriesSource::new();
        let subject = Subject::project("cadence");

        // Unknown subject reads as empty
        assert!(source.duration_series(&subject).unwrap().is_empty());

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        source.replace(&subject, [(date, 60u64)].into_iter().collect());
        assert_eq!(source.duration_series(&subject).unwrap().total(), 60);

        // A refresh replaces the snapshot instead of merging
        source.replace(&subject, DurationSeries::new());
        assert!(source.duration_series(&subject).unwrap().is_empty());
    }

    #[test]
    fn test_memory_checkpoints_default_to_sentinel() {
        let store = MemoryCheckpointStore::new();
        let subject = Subject::Aggregate;

        let fresh = store.load(&subject, PeriodKind::Day).unwrap();
        assert!(fresh.is_sentinel());

        let anchor = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        store.save(&subject, PeriodKind::Day, &StreakCheckpoint::new(9, anchor)).unwrap();
        assert_eq!(store.load(&subject, PeriodKind::Day).unwrap().count, 9);

        // Kinds are independent keys
        assert!(store.load(&subject, PeriodKind::Week).unwrap().is_sentinel());
    }

    #[test]
    fn test_static_targets_scope_by_kind() {
        let targets = StaticTargets::new(TargetSpec::hours(1.0), TargetSpec::hours(8.0));
        let subject = Subject::Aggregate;

        assert_eq!(
            targets.target_spec(&subject, PeriodKind::Day).unwrap().target_hours(),
            Some(1.0)
        );
        assert_eq!(
            targets.target_spec(&subject, PeriodKind::Week).unwrap().target_hours(),
            Some(8.0)
        );
        assert_eq!(
            targets.target_spec(&subject, PeriodKind::Month).unwrap().target_hours(),
            None
        );
    }
}
