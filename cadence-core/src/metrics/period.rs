//! Period boundary resolution and duration aggregation.
//!
//! Periods are addressed by `(kind, offset)`: offset 0 is the current
//! in-progress period, offset 1 the immediately preceding complete one, and
//! so on backwards. Negative offsets are a programmer error, surfaced as
//! [`Error::InvalidArgument`] and never silently clamped.
//!
//! Week periods start on Monday; month and year periods on the 1st. A month
//! period covers the whole calendar month through its last day, inclusive.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::error::{Error, Result};
use crate::types::{DateRange, DurationSeries, PeriodKind};

/// Reject negative `offset`/`reps` arguments.
fn checked_count(value: i32, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("{} must be non-negative, got {}", what, value)))
}

/// Start date of the period `offset` periods before the current one.
pub fn period_start(kind: PeriodKind, offset: i32, today: NaiveDate) -> Result<NaiveDate> {
    let offset = checked_count(offset, "offset")?;
    let start = match kind {
        PeriodKind::Day => today - Duration::days(offset as i64),
        PeriodKind::Week => {
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            monday - Duration::days(offset as i64 * 7)
        }
        PeriodKind::Month => {
            let first = today.with_day(1).expect("day 1 is always valid");
            first
                .checked_sub_months(Months::new(offset))
                .ok_or_else(|| {
                    Error::InvalidArgument(format!("offset of {} months is out of range", offset))
                })?
        }
        PeriodKind::Year => NaiveDate::from_ymd_opt(today.year() - offset as i32, 1, 1)
            .ok_or_else(|| {
                Error::InvalidArgument(format!("offset of {} years is out of range", offset))
            })?,
    };
    Ok(start)
}

/// Full inclusive date window of the period `offset` periods back.
pub fn period_range(kind: PeriodKind, offset: i32, today: NaiveDate) -> Result<DateRange> {
    let start = period_start(kind, offset, today)?;
    let end = match kind {
        PeriodKind::Day => start,
        PeriodKind::Week => start + Duration::days(6),
        PeriodKind::Month => {
            let next_month = start.checked_add_months(Months::new(1)).ok_or_else(|| {
                Error::InvalidArgument(format!("month starting {} is out of range", start))
            })?;
            next_month - Duration::days(1)
        }
        PeriodKind::Year => {
            NaiveDate::from_ymd_opt(start.year(), 12, 31).expect("Dec 31 is always valid")
        }
    };
    Ok(DateRange::new(start, end))
}

/// Sum of the series over the resolved period.
pub fn period_duration(
    series: &DurationSeries,
    kind: PeriodKind,
    offset: i32,
    today: NaiveDate,
) -> Result<u64> {
    let range = period_range(kind, offset, today)?;
    Ok(series.sum_range(&range))
}

/// Durations for the last `reps` periods, oldest first, current period last.
///
/// `reps = 0` yields an empty sequence.
pub fn period_series(
    series: &DurationSeries,
    kind: PeriodKind,
    reps: i32,
    today: NaiveDate,
) -> Result<Vec<u64>> {
    let reps = checked_count(reps, "reps")?;
    let mut durations = Vec::with_capacity(reps as usize);
    for offset in (0..reps as i32).rev() {
        durations.push(period_duration(series, kind, offset, today)?);
    }
    Ok(durations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-06-19 is a Wednesday
    const TODAY: (i32, u32, u32) = (2024, 6, 19);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn test_day_starts() {
        assert_eq!(period_start(PeriodKind::Day, 0, today()).unwrap(), today());
        assert_eq!(
            period_start(PeriodKind::Day, 3, today()).unwrap(),
            date(2024, 6, 16)
        );
    }

    #[test]
    fn test_week_starts_on_monday() {
        assert_eq!(
            period_start(PeriodKind::Week, 0, today()).unwrap(),
            date(2024, 6, 17)
        );
        assert_eq!(
            period_start(PeriodKind::Week, 1, today()).unwrap(),
            date(2024, 6, 10)
        );
        // From a Monday, offset 0 is that same Monday
        assert_eq!(
            period_start(PeriodKind::Week, 0, date(2024, 6, 17)).unwrap(),
            date(2024, 6, 17)
        );
    }

    #[test]
    fn test_month_starts_cross_year() {
        assert_eq!(
            period_start(PeriodKind::Month, 0, today()).unwrap(),
            date(2024, 6, 1)
        );
        assert_eq!(
            period_start(PeriodKind::Month, 6, today()).unwrap(),
            date(2023, 12, 1)
        );
    }

    #[test]
    fn test_year_starts() {
        assert_eq!(
            period_start(PeriodKind::Year, 0, today()).unwrap(),
            date(2024, 1, 1)
        );
        assert_eq!(
            period_start(PeriodKind::Year, 2, today()).unwrap(),
            date(2022, 1, 1)
        );
    }

    #[test]
    fn test_negative_offset_is_an_error() {
        for kind in [PeriodKind::Day, PeriodKind::Week, PeriodKind::Month, PeriodKind::Year] {
            assert!(matches!(
                period_start(kind, -1, today()),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_consecutive_periods_are_one_period_apart() {
        for offset in 0..24 {
            let newer = period_start(PeriodKind::Day, offset, today()).unwrap();
            let older = period_start(PeriodKind::Day, offset + 1, today()).unwrap();
            assert_eq!(newer - older, Duration::days(1));

            let newer = period_start(PeriodKind::Week, offset, today()).unwrap();
            let older = period_start(PeriodKind::Week, offset + 1, today()).unwrap();
            assert_eq!(newer - older, Duration::days(7));

            let newer = period_start(PeriodKind::Month, offset, today()).unwrap();
            let older = period_start(PeriodKind::Month, offset + 1, today()).unwrap();
            assert_eq!(older.checked_add_months(Months::new(1)).unwrap(), newer);

            let newer = period_start(PeriodKind::Year, offset, today()).unwrap();
            let older = period_start(PeriodKind::Year, offset + 1, today()).unwrap();
            assert_eq!(newer.year() - older.year(), 1);
        }
    }

    #[test]
    fn test_month_range_covers_whole_month() {
        // Leap-year February
        let range = period_range(PeriodKind::Month, 4, today()).unwrap();
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));
        assert_eq!(range.num_days(), 29);

        let range = period_range(PeriodKind::Month, 0, today()).unwrap();
        assert_eq!(range.end, date(2024, 6, 30));
    }

    #[test]
    fn test_week_and_year_ranges() {
        let range = period_range(PeriodKind::Week, 1, today()).unwrap();
        assert_eq!(range.start, date(2024, 6, 10));
        assert_eq!(range.end, date(2024, 6, 16));

        let range = period_range(PeriodKind::Year, 0, today()).unwrap();
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 12, 31));
        assert_eq!(range.num_days(), 366);
    }

    #[test]
    fn test_period_duration_sums_the_window() {
        let series: DurationSeries = [
            (date(2024, 6, 10), 100),
            (date(2024, 6, 16), 200),
            (date(2024, 6, 17), 400),
            (date(2024, 6, 19), 800),
        ]
        .into_iter()
        .collect();

        // Last completed week: the 100 and 200 entries
        assert_eq!(
            period_duration(&series, PeriodKind::Week, 1, today()).unwrap(),
            300
        );
        // Current week so far
        assert_eq!(
            period_duration(&series, PeriodKind::Week, 0, today()).unwrap(),
            1200
        );
        assert_eq!(
            period_duration(&series, PeriodKind::Day, 0, today()).unwrap(),
            800
        );
        assert_eq!(
            period_duration(&series, PeriodKind::Month, 0, today()).unwrap(),
            1500
        );
    }

    #[test]
    fn test_period_series_shape() {
        let series: DurationSeries =
            [(date(2024, 6, 18), 60), (date(2024, 6, 19), 120)].into_iter().collect();

        let durations = period_series(&series, PeriodKind::Day, 3, today()).unwrap();
        assert_eq!(durations, vec![0, 60, 120]);

        // Last element always equals the offset-0 duration
        assert_eq!(
            *durations.last().unwrap(),
            period_duration(&series, PeriodKind::Day, 0, today()).unwrap()
        );

        assert!(period_series(&series, PeriodKind::Day, 0, today())
            .unwrap()
            .is_empty());
        assert!(matches!(
            period_series(&series, PeriodKind::Day, -2, today()),
            Err(Error::InvalidArgument(_))
        ));
    }
}
