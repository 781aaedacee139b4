//! Piecewise-constant timelines of scheduled values.
//!
//! A timeline is a sorted, non-overlapping, contiguous sequence of
//! [`ScheduleEntry`] values covering a query window. It is both the input
//! (baseline schedule) and output (overlaid schedule) shape of the overlay
//! engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A half-open `[start, end)` span of absolute time
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateInterval { start, end }
    }

    /// Half-open membership: includes `start`, excludes `end`
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// One half-open `[start_date, end_date)` interval carrying a value
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry<T> {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub value: T,
}

impl<T> ScheduleEntry<T> {
    /// Create an entry; fails when the interval is empty or inverted
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>, value: T) -> Result<Self> {
        if end_date <= start_date {
            return Err(Error::InvalidRange(format!(
                "schedule entry must end after it starts ({} >= {})",
                start_date, end_date
            )));
        }
        Ok(ScheduleEntry {
            start_date,
            end_date,
            value,
        })
    }

    pub fn interval(&self) -> DateInterval {
        DateInterval::new(self.start_date, self.end_date)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.interval().contains(at)
    }
}

/// True when entries are non-empty intervals, sorted, and contiguous
pub fn is_continuous_timeline<T>(entries: &[ScheduleEntry<T>]) -> bool {
    entries.iter().all(|e| e.start_date < e.end_date)
        && entries
            .windows(2)
            .all(|pair| pair[0].end_date == pair[1].start_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_entry_rejects_empty_interval() {
        assert!(ScheduleEntry::new(date(6), date(6), 1.0).is_err());
        assert!(ScheduleEntry::new(date(8), date(6), 1.0).is_err());
        assert!(ScheduleEntry::new(date(6), date(8), 1.0).is_ok());
    }

    #[test]
    fn test_entry_half_open_membership() {
        let entry = ScheduleEntry::new(date(6), date(8), 1.0).unwrap();
        assert!(entry.contains(date(6)));
        assert!(entry.contains(date(7)));
        assert!(!entry.contains(date(8)));
        assert!(!entry.contains(date(5)));
    }

    #[test]
    fn test_is_continuous_timeline() {
        let contiguous = vec![
            ScheduleEntry::new(date(0), date(6), 1.0).unwrap(),
            ScheduleEntry::new(date(6), date(12), 2.0).unwrap(),
        ];
        assert!(is_continuous_timeline(&contiguous));

        let gapped = vec![
            ScheduleEntry::new(date(0), date(6), 1.0).unwrap(),
            ScheduleEntry::new(date(7), date(12), 2.0).unwrap(),
        ];
        assert!(!is_continuous_timeline(&gapped));

        let empty: Vec<ScheduleEntry<f64>> = vec![];
        assert!(is_continuous_timeline(&empty));
    }
}
