pub mod account;
pub mod aggregate;
pub mod classify;
pub mod error;
pub mod filter;
pub mod money;
pub mod period;
pub mod table;
pub mod type_label;

pub use account::AccountCode;
pub use aggregate::{aggregate, Aggregator, ClassifiedRow, FieldMap, Summary, VendorSummary, SUMMARY_COLUMNS};
pub use classify::{AccountMatch, Class, ClassRule, RuleBook, RuleError};
pub use error::ReportError;
pub use filter::{filter, FilterSpec};
pub use money::Money;
pub use period::{parse_day, DateInput, DateRange, FiscalCalendar, PeriodError, PeriodWeek};
pub use table::{Row, Table};
pub use type_label::{TypeCanonicalizer, DEFAULT_SYNONYMS};
