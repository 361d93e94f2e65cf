//! Core domain types for cadence
//!
//! These types form the substrate every metric is computed from.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Subject** | The entity a duration series belongs to: the aggregate total or one named project |
//! | **Period** | A contiguous calendar window of a given kind (day/week/month/year) |
//! | **Streak** | Count of consecutive qualifying periods ending at the most recently completed one |
//! | **Checkpoint** | Persisted `{count, anchor}` pair that lets a streak scan resume instead of restart |
//! | **Target** | Optional hours-per-period threshold a period must meet to qualify |
//! | **Excluded day** | A weekday skipped (neither breaking nor extending) by the daily streak |
//!
//! All dates are naive calendar dates in one fixed local zone. Multi-timezone
//! reconciliation is out of scope.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

// ============================================
// Subject
// ============================================

/// The owner of a duration series: the aggregate total or one named project.
///
/// Each subject carries its own series, its own targets, and its own streak
/// checkpoints. There is no cross-subject invariant; subjects can be refreshed
/// and evaluated independently and in any order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum Subject {
    /// Total across all projects
    Aggregate,
    /// A single named project
    Project(String),
}

impl Subject {
    /// Convenience constructor for a project subject.
    pub fn project(name: impl Into<String>) -> Self {
        Subject::Project(name.into())
    }

    /// Stable key used by checkpoint stores.
    ///
    /// The `project:` prefix keeps a project literally named "aggregate"
    /// distinct from the aggregate subject.
    pub fn storage_key(&self) -> String {
        match self {
            Subject::Aggregate => "aggregate".to_string(),
            Subject::Project(name) => format!("project:{}", name),
        }
    }

    /// Human-readable name for display and logs.
    pub fn display_name(&self) -> &str {
        match self {
            Subject::Aggregate => "all projects",
            Subject::Project(name) => name,
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

// ============================================
// PeriodKind
// ============================================

/// The calendar granularity a metric is bucketed by.
///
/// Week periods start on Monday; month and year periods start on the 1st.
/// Only [`Day`](PeriodKind::Day) and [`Week`](PeriodKind::Week) carry a
/// target and a persisted streak; month and year support aggregation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodKind {
    /// Identifier used in storage and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Day => "day",
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
            PeriodKind::Year => "year",
        }
    }

    /// Whether streaks of this kind advance from a persisted checkpoint.
    ///
    /// Month and year "streaks" are degenerate (1 if any activity, else 0)
    /// and recomputed fresh on every call.
    pub fn has_checkpoint(&self) -> bool {
        matches!(self, PeriodKind::Day | PeriodKind::Week)
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PeriodKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "day" => Ok(PeriodKind::Day),
            "week" => Ok(PeriodKind::Week),
            "month" => Ok(PeriodKind::Month),
            "year" => Ok(PeriodKind::Year),
            _ => Err(format!("unknown period kind: {}", s)),
        }
    }
}

// ============================================
// DateRange
// ============================================

/// An inclusive `[start, end]` calendar window.
///
/// The concrete resolution of a (kind, offset) period lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First date of the window (inclusive)
    pub start: NaiveDate,
    /// Last date of the window (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range. `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "range start {} after end {}", start, end);
        Self { start, end }
    }

    /// A one-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, at least 1.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterate every date in the window, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

// ============================================
// DurationSeries
// ============================================

/// Sparse mapping from calendar date to non-negative seconds coded.
///
/// Absent dates read as zero. The series is owned by one subject and replaced
/// wholesale on each data refresh; the metrics engine only ever reads a
/// snapshot and never mutates it.
///
/// Construction from raw string-keyed data is lenient: malformed date keys
/// and negative durations come from loosely-validated external sources and
/// are skipped with a warning rather than aborting the whole series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationSeries {
    entries: BTreeMap<NaiveDate, u64>,
}

impl DurationSeries {
    /// An empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from raw `"YYYY-MM-DD" -> seconds` pairs.
    ///
    /// Entries with unparseable dates or negative durations are dropped.
    /// Duplicate dates accumulate.
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let mut entries = BTreeMap::new();
        for (key, seconds) in raw {
            let date = match parse_series_date(&key) {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping series entry");
                    continue;
                }
            };
            if seconds < 0 {
                tracing::warn!(key = %key, seconds, "Skipping negative-duration series entry");
                continue;
            }
            *entries.entry(date).or_insert(0) += seconds as u64;
        }
        Self { entries }
    }

    /// Seconds recorded on `date`, zero if absent.
    pub fn seconds_on(&self, date: NaiveDate) -> u64 {
        self.entries.get(&date).copied().unwrap_or(0)
    }

    /// Sum of all entries within the inclusive range.
    pub fn sum_range(&self, range: &DateRange) -> u64 {
        self.entries
            .range(range.start..=range.end)
            .map(|(_, seconds)| seconds)
            .sum()
    }

    /// Sum over the entire series.
    pub fn total(&self) -> u64 {
        self.entries.values().sum()
    }

    /// Number of dates with a recorded duration.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(date, seconds)` pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.entries.iter().map(|(date, seconds)| (*date, *seconds))
    }
}

impl FromIterator<(NaiveDate, u64)> for DurationSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, u64)>>(iter: I) -> Self {
        let mut entries = BTreeMap::new();
        for (date, seconds) in iter {
            *entries.entry(date).or_insert(0) += seconds;
        }
        Self { entries }
    }
}

impl Serialize for DurationSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (date, seconds) in &self.entries {
            map.serialize_entry(&date.format("%Y-%m-%d").to_string(), seconds)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DurationSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: BTreeMap<String, i64> = BTreeMap::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

/// Parse an ISO `YYYY-MM-DD` series key.
pub(crate) fn parse_series_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::MalformedDate(s.to_string()))
}

// ============================================
// StreakCheckpoint
// ============================================

/// Persisted resume point for the incremental streak scan.
///
/// `anchor` is the start date of the most recently completed period the
/// streak was verified through (yesterday for daily, Monday of the last
/// completed week for weekly); `count` is the streak length ending at that
/// period. A fresh subject starts at the sentinel, whose epoch anchor
/// predates any real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCheckpoint {
    /// Consecutive qualifying periods ending at `anchor`
    pub count: u32,
    /// Start date of the last completed period verified
    pub anchor: NaiveDate,
}

impl StreakCheckpoint {
    pub fn new(count: u32, anchor: NaiveDate) -> Self {
        Self { count, anchor }
    }

    /// The fixed epoch no real data precedes. Also the scan floor: the
    /// incremental scan never walks past it, which bounds every scan.
    pub fn sentinel_epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
    }

    /// The checkpoint of a subject with no verified history.
    pub fn sentinel() -> Self {
        Self { count: 0, anchor: Self::sentinel_epoch() }
    }

    pub fn is_sentinel(&self) -> bool {
        self.anchor == Self::sentinel_epoch()
    }
}

impl Default for StreakCheckpoint {
    fn default() -> Self {
        Self::sentinel()
    }
}

// ============================================
// TargetSpec
// ============================================

/// Per-(subject, period-kind) qualification rule.
///
/// An absent target means "any activity qualifies". Excluded weekdays apply
/// to the daily streak only: an excluded day neither extends nor breaks it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSpec {
    target_hours: Option<f64>,
    excluded_weekdays: BTreeSet<u8>,
}

impl TargetSpec {
    /// Build a spec, dropping unusable values from loosely-validated config:
    /// non-positive target hours and weekday numbers outside 1..=7.
    pub fn new(target_hours: Option<f64>, excluded_weekdays: impl IntoIterator<Item = u8>) -> Self {
        let target_hours = match target_hours {
            Some(hours) if hours > 0.0 => Some(hours),
            Some(hours) => {
                tracing::warn!(hours, "Ignoring non-positive target");
                None
            }
            None => None,
        };

        let mut excluded = BTreeSet::new();
        for weekday in excluded_weekdays {
            if (1..=7).contains(&weekday) {
                excluded.insert(weekday);
            } else {
                tracing::warn!(weekday, "Ignoring excluded weekday outside 1..=7");
            }
        }
        if excluded.len() == 7 {
            tracing::warn!("All seven weekdays excluded; the daily streak cannot grow");
        }

        Self { target_hours, excluded_weekdays: excluded }
    }

    /// A target with no excluded weekdays.
    pub fn hours(target_hours: f64) -> Self {
        Self::new(Some(target_hours), [])
    }

    /// No target, no exclusions: any activity qualifies.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn target_hours(&self) -> Option<f64> {
        self.target_hours
    }

    /// Whether `date` falls on an excluded weekday.
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded_weekdays
            .contains(&(date.weekday().number_from_monday() as u8))
    }

    pub fn has_exclusions(&self) -> bool {
        !self.excluded_weekdays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_subject_storage_keys() {
        assert_eq!(Subject::Aggregate.storage_key(), "aggregate");
        assert_eq!(Subject::project("cadence").storage_key(), "project:cadence");
        // A project literally named "aggregate" stays distinct
        assert_ne!(
            Subject::project("aggregate").storage_key(),
            Subject::Aggregate.storage_key()
        );
    }

    #[test]
    fn test_period_kind_roundtrip() {
        for kind in [PeriodKind::Day, PeriodKind::Week, PeriodKind::Month, PeriodKind::Year] {
            assert_eq!(kind.as_str().parse::<PeriodKind>().unwrap(), kind);
        }
        assert!("fortnight".parse::<PeriodKind>().is_err());
    }

    #[test]
    fn test_period_kind_checkpoints() {
        assert!(PeriodKind::Day.has_checkpoint());
        assert!(PeriodKind::Week.has_checkpoint());
        assert!(!PeriodKind::Month.has_checkpoint());
        assert!(!PeriodKind::Year.has_checkpoint());
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(date(2024, 2, 1), date(2024, 2, 29));
        assert_eq!(range.num_days(), 29);
        assert!(range.contains(date(2024, 2, 15)));
        assert!(!range.contains(date(2024, 3, 1)));
        assert_eq!(range.days().count(), 29);
        assert_eq!(range.days().next(), Some(date(2024, 2, 1)));
        assert_eq!(range.days().last(), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_series_from_raw_skips_bad_entries() {
        let series = DurationSeries::from_raw([
            ("2024-01-01".to_string(), 3600),
            ("not-a-date".to_string(), 1200),
            ("2024-01-02".to_string(), -5),
            ("2024-13-40".to_string(), 100),
        ]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.seconds_on(date(2024, 1, 1)), 3600);
        assert_eq!(series.seconds_on(date(2024, 1, 2)), 0);
        assert_eq!(series.total(), 3600);
    }

    #[test]
    fn test_series_sum_range() {
        let series: DurationSeries = [
            (date(2024, 1, 1), 100),
            (date(2024, 1, 15), 200),
            (date(2024, 2, 1), 400),
        ]
        .into_iter()
        .collect();

        let january = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(series.sum_range(&january), 300);
        assert_eq!(series.total(), 700);
    }

    #[test]
    fn test_series_serde_roundtrip() {
        let json = r#"{"2024-03-01": 1800, "2024-03-02": 5400, "garbage": 99}"#;
        let series: DurationSeries = serde_json::from_str(json).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.seconds_on(date(2024, 3, 2)), 5400);

        let out = serde_json::to_string(&series).unwrap();
        let back: DurationSeries = serde_json::from_str(&out).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn test_checkpoint_sentinel() {
        let sentinel = StreakCheckpoint::sentinel();
        assert_eq!(sentinel.count, 0);
        assert!(sentinel.is_sentinel());
        assert!(!StreakCheckpoint::new(3, date(2024, 5, 1)).is_sentinel());
        assert_eq!(StreakCheckpoint::default(), sentinel);
    }

    #[test]
    fn test_target_spec_sanitizes_input() {
        let spec = TargetSpec::new(Some(-1.0), [0, 6, 7, 8]);
        assert_eq!(spec.target_hours(), None);
        // Saturday 2024-06-15, Sunday 2024-06-16
        assert!(spec.is_excluded(date(2024, 6, 15)));
        assert!(spec.is_excluded(date(2024, 6, 16)));
        // Monday survives the out-of-range 0 and 8
        assert!(!spec.is_excluded(date(2024, 6, 17)));
    }

    #[test]
    fn test_target_spec_excluded_weekday() {
        let spec = TargetSpec::new(Some(1.5), [1]);
        assert_eq!(spec.target_hours(), Some(1.5));
        // 2024-06-17 is a Monday
        assert!(spec.is_excluded(date(2024, 6, 17)));
        assert!(!spec.is_excluded(date(2024, 6, 18)));
        assert!(spec.has_exclusions());
        assert!(!TargetSpec::unbounded().has_exclusions());
    }
}
