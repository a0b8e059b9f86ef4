//! "Today" helpers for the schedule and for new workouts.

use chrono::{Datelike, Local, NaiveDate, Utc};

use crate::model::DayKey;

impl DayKey {
    /// The weekday of the local calendar date.
    pub fn today() -> Self {
        Self::from_weekday(Local::now().weekday())
    }

    /// The weekday of a given calendar date.
    pub fn of(date: NaiveDate) -> Self {
        Self::from_weekday(date.weekday())
    }
}

/// Today's date as `YYYY-MM-DD`.
///
/// Uses the UTC date, so around midnight it can differ from the local day
/// returned by [`DayKey::today`].
pub fn today_iso() -> String {
    format_iso(Utc::now().date_naive())
}

/// Format a calendar date the way workout dates are stored.
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_of_known_dates() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();

        assert_eq!(DayKey::of(monday), DayKey::Monday);
        assert_eq!(DayKey::of(sunday), DayKey::Sunday);
    }

    #[test]
    fn iso_format_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(format_iso(date), "2026-03-07");
    }

    #[test]
    fn today_iso_parses_back() {
        let today = today_iso();
        assert_eq!(today.len(), 10);
        assert!(NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn today_is_one_of_the_week() {
        assert!(DayKey::ALL.contains(&DayKey::today()));
    }
}
