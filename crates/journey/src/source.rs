use chrono::{DateTime, Days, NaiveDate, Utc};
use touchcredit_core::{TouchcreditResult, TouchpointRecord};

/// Supplies the raw touchpoint feed for one analysis run.
pub trait JourneySource {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Fetch every touchpoint whose timestamp falls inside `window`.
    fn fetch(&self, window: &DateWindow) -> TouchcreditResult<Vec<TouchpointRecord>>;
}

/// Calendar-day filter, inclusive on both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if timestamp < start.and_time(chrono::NaiveTime::MIN).and_utc() {
                return false;
            }
        }
        if let Some(end) = self.end {
            // Whole end day is included; the last representable date has no successor.
            if let Some(next) = end.checked_add_days(Days::new(1)) {
                if timestamp >= next.and_time(chrono::NaiveTime::MIN).and_utc() {
                    return false;
                }
            }
        }
        true
    }

    /// Records without a timestamp pass so validation can report them.
    pub fn admits(&self, record: &TouchpointRecord) -> bool {
        record.timestamp.map_or(true, |ts| self.contains(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    #[test]
    fn test_unbounded_window_admits_everything() {
        let window = DateWindow::default();
        assert!(window.is_unbounded());
        assert!(window.contains(Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_window_is_inclusive_of_whole_days() {
        let window = DateWindow::new(Some(day(2, 1)), Some(day(2, 28)));
        assert!(window.contains(Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap()));
        assert!(window.contains(Utc.with_ymd_and_hms(2023, 2, 28, 23, 59, 59).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2023, 1, 31, 23, 59, 59).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_records_without_timestamp_pass() {
        let window = DateWindow::new(Some(day(6, 1)), None);
        assert!(window.admits(&TouchpointRecord::default()));
    }
}
