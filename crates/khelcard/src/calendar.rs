//! Date banner and file-name dates.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The calendar day a card is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Wrap a date
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today from the local wall clock
    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Build from year, month and day; `None` for impossible dates
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse "2026-10-19"
    #[must_use]
    pub fn parse_iso(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok().map(Self)
    }

    /// Underlying date
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// "October 19, 2026"
    #[must_use]
    pub fn long_date(self) -> String {
        self.0.format("%B %-d, %Y").to_string()
    }

    /// "Monday"
    #[must_use]
    pub fn weekday(self) -> String {
        self.0.format("%A").to_string()
    }

    /// "Monday, October 19, 2026"
    #[must_use]
    pub fn result_date_line(self) -> String {
        format!("{}, {}", self.weekday(), self.long_date())
    }

    /// "2026-10-19", used in export file names
    #[must_use]
    pub fn iso(self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}
