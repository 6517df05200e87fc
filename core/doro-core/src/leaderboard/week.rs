use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// ISO week (Monday through Sunday, UTC) that leaderboard counts aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    start: NaiveDate,
}

impl WeekWindow {
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let day = instant.date_naive();
        let offset = i64::from(day.weekday().num_days_from_monday());
        Self {
            start: day - Duration::days(offset),
        }
    }

    /// Monday of the week.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The following Monday (exclusive bound).
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(7)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let day = instant.date_naive();
        day >= self.start && day < self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn week_starts_on_monday() {
        // 2026-01-08 is a Thursday.
        let thursday = Utc.with_ymd_and_hms(2026, 1, 8, 15, 30, 0).unwrap();
        let week = WeekWindow::containing(thursday);
        assert_eq!(week.start(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(week.end(), NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
    }

    #[test]
    fn sunday_night_and_monday_morning_are_different_weeks() {
        let sunday = Utc.with_ymd_and_hms(2026, 1, 11, 23, 59, 59).unwrap();
        let monday = Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap();

        let week = WeekWindow::containing(sunday);
        assert!(week.contains(sunday));
        assert!(!week.contains(monday));
        assert_eq!(WeekWindow::containing(monday).start(), week.end());
    }
}
