use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by the filter and aggregation entry points.
///
/// Everything else that can go wrong with a row (bad amount, unknown type,
/// missing account code) is absorbed by normalization and never surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Could not parse date: {0:?}")]
    InvalidDate(String),
    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

impl ReportError {
    /// A field name the caller supplied does not exist in the table.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ReportError::MissingFields(_))
    }

    /// The date window arguments are unusable.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReportError::InvalidDate(_) | ReportError::InvertedRange { .. }
        )
    }
}
