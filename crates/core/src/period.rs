use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::ReportError;

// ── Day parsing ──────────────────────────────────────────────────────────────

const DAY_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y", "%Y%m%d"];

/// Parse a date or timestamp and keep only the calendar day.
///
/// Accepts ISO dates, RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and the
/// US-style `MM/DD/YYYY` forms common in ledger exports.
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // The time of day is irrelevant, only the leading date token matters.
    let day = s.split([' ', 'T']).next().unwrap_or(s);
    DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// A window bound as supplied by the caller: text to be parsed or a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Text(String),
    Date(NaiveDate),
}

impl DateInput {
    pub fn resolve(&self) -> Result<NaiveDate, ReportError> {
        match self {
            DateInput::Date(d) => Ok(*d),
            DateInput::Text(s) => {
                parse_day(s).ok_or_else(|| ReportError::InvalidDate(s.clone()))
            }
        }
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Date(d)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        DateInput::Date(dt.date())
    }
}

// ── Date window ──────────────────────────────────────────────────────────────

/// An inclusive range of calendar days. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvertedRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Build a range from loosely typed bounds.
    pub fn parse(
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> Result<Self, ReportError> {
        let start = start.into().resolve()?;
        let end = end.into().resolve()?;
        Self::new(start, end)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// ── Fiscal period / week labels ──────────────────────────────────────────────

/// Last week of each of the first eleven periods in a 4-5-4 retail calendar.
/// The twelfth period always ends on the final week of the year.
pub const PERIOD_END_WEEKS: [u32; 11] = [4, 9, 13, 17, 22, 26, 30, 35, 39, 43, 48];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("No columns matching 'Period X- Week Y' were found")]
    NoWeekColumns,
    #[error("Week {week} exceeds the {max}-week fiscal year")]
    YearExhausted { week: u32, max: u32 },
}

/// A `Period X- Week Y` column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWeek {
    pub period: u32,
    pub week: u32,
}

fn week_label() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)Period\s*\d+\s*-\s*Week\s*(\d+)").expect("invalid regex")
    })
}

impl PeriodWeek {
    /// Week number embedded in a column label, if it looks like one.
    pub fn week_of(label: &str) -> Option<u32> {
        week_label()
            .captures(label)
            .and_then(|c| c[1].parse().ok())
    }
}

impl fmt::Display for PeriodWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period {}- Week {}", self.period, self.week)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FiscalCalendar {
    pub is_53_week: bool,
}

impl FiscalCalendar {
    pub fn new(is_53_week: bool) -> Self {
        FiscalCalendar { is_53_week }
    }

    pub fn weeks_in_year(self) -> u32 {
        if self.is_53_week {
            53
        } else {
            52
        }
    }

    /// The period (1-12) a week falls into.
    pub fn period_of_week(self, week: u32) -> Result<u32, PeriodError> {
        let max = self.weeks_in_year();
        if week == 0 || week > max {
            return Err(PeriodError::YearExhausted { week, max });
        }
        let period = PERIOD_END_WEEKS
            .iter()
            .position(|&end| week <= end)
            .map_or(12, |i| i as u32 + 1);
        Ok(period)
    }

    /// The label that follows the highest week among `labels`.
    /// Labels that do not name a week are ignored.
    pub fn next_column<'a>(
        self,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<PeriodWeek, PeriodError> {
        let last = labels
            .into_iter()
            .filter_map(PeriodWeek::week_of)
            .max()
            .ok_or(PeriodError::NoWeekColumns)?;

        let max = self.weeks_in_year();
        let week = last
            .checked_add(1)
            .ok_or(PeriodError::YearExhausted { week: last, max })?;
        let period = self.period_of_week(week)?;
        Ok(PeriodWeek { period, week })
    }
}
