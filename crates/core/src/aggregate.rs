use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::account::AccountCode;
use crate::classify::{Class, RuleBook};
use crate::error::ReportError;
use crate::money::Money;
use crate::period::{parse_day, DateInput, DateRange};
use crate::table::Table;
use crate::type_label::TypeCanonicalizer;

/// Output columns of a vendor summary, in order.
pub const SUMMARY_COLUMNS: [&str; 5] = ["Vendor", "Accrued Purchases", "Adjustments", "Bill", "Payment"];

/// Names of the extract columns the aggregation stage reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub date: String,
    pub amount: String,
    pub account: String,
    #[serde(rename = "type")]
    pub type_field: String,
    pub vendor: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            amount: "Amount".to_string(),
            account: "Account".to_string(),
            type_field: "Type".to_string(),
            vendor: "Name".to_string(),
        }
    }
}

impl FieldMap {
    /// Date, amount, account, type and vendor column names, in that order.
    pub fn names(&self) -> [&str; 5] {
        [
            self.date.as_str(),
            self.amount.as_str(),
            self.account.as_str(),
            self.type_field.as_str(),
            self.vendor.as_str(),
        ]
    }
}

/// One in-window ledger row after normalization and classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedRow {
    pub date: NaiveDate,
    pub vendor: String,
    pub amount: Money,
    pub account: Option<AccountCode>,
    pub type_label: String,
    pub class: Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSummary {
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Accrued Purchases")]
    pub accrued_purchases: Money,
    #[serde(rename = "Adjustments")]
    pub adjustments: Money,
    #[serde(rename = "Bill")]
    pub bill: Money,
    #[serde(rename = "Payment")]
    pub payment: Money,
}

impl VendorSummary {
    pub fn new(vendor: &str) -> Self {
        VendorSummary {
            vendor: vendor.to_string(),
            accrued_purchases: Money::zero(),
            adjustments: Money::zero(),
            bill: Money::zero(),
            payment: Money::zero(),
        }
    }

    /// Add `amount` to the column for `class`. Returns `false`, leaving the
    /// column unchanged, when the total would not fit in a `Decimal`.
    fn add(&mut self, class: Class, amount: Money) -> bool {
        let column = match class {
            Class::AccruedPurchases => &mut self.accrued_purchases,
            Class::Adjustments => &mut self.adjustments,
            Class::Bill => &mut self.bill,
            Class::Payment => &mut self.payment,
            Class::Other => return true,
        };
        match column.checked_add(amount) {
            Some(total) => {
                *column = total;
                true
            }
            None => false,
        }
    }

    /// The summed amount for one class; always zero for [`Class::Other`].
    pub fn total_for(&self, class: Class) -> Money {
        match class {
            Class::AccruedPurchases => self.accrued_purchases,
            Class::Adjustments => self.adjustments,
            Class::Bill => self.bill,
            Class::Payment => self.payment,
            Class::Other => Money::zero(),
        }
    }
}

/// Per-vendor totals for one date window, sorted by vendor name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Summary {
    rows: Vec<VendorSummary>,
}

impl Summary {
    pub fn columns(&self) -> &'static [&'static str] {
        &SUMMARY_COLUMNS
    }

    pub fn rows(&self) -> &[VendorSummary] {
        &self.rows
    }

    pub fn get(&self, vendor: &str) -> Option<&VendorSummary> {
        self.rows.iter().find(|r| r.vendor == vendor)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

}

/// Classifies ledger rows and rolls them up per vendor.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    fields: FieldMap,
    rules: RuleBook,
    types: TypeCanonicalizer,
}

impl Aggregator {
    pub fn new(fields: FieldMap) -> Self {
        Aggregator {
            fields,
            rules: RuleBook::standard(),
            types: TypeCanonicalizer::default(),
        }
    }

    pub fn with_rules(mut self, rules: RuleBook) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_types(mut self, types: TypeCanonicalizer) -> Self {
        self.types = types;
        self
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Normalize and classify every row dated inside `window`.
    /// Rows whose date cannot be read fall outside every window.
    pub fn classify_rows(
        &self,
        table: &Table,
        window: DateRange,
    ) -> Result<Vec<ClassifiedRow>, ReportError> {
        let idx = table.require(&self.fields.names())?;
        let (date_idx, amount_idx, account_idx, type_idx, vendor_idx) =
            (idx[0], idx[1], idx[2], idx[3], idx[4]);

        let classified: Vec<ClassifiedRow> = table
            .rows()
            .filter_map(|row| {
                let date = parse_day(row.get(date_idx)).filter(|d| window.contains(*d))?;
                let account = AccountCode::extract(row.get(account_idx));
                let type_label = self.types.canonicalize(row.get(type_idx));
                let class = self.rules.classify(account, &type_label);
                Some(ClassifiedRow {
                    date,
                    vendor: row.get(vendor_idx).to_string(),
                    amount: Money::parse_or_zero(row.get(amount_idx)),
                    account,
                    type_label,
                    class,
                })
            })
            .collect();

        debug!(
            input = table.len(),
            in_window = classified.len(),
            %window,
            "classified AP rows"
        );
        Ok(classified)
    }

    /// Sum classified amounts per vendor. Every vendor with at least one row
    /// in the window appears, even if all of its rows are [`Class::Other`].
    /// Rows with an empty vendor name are not attributed to anyone, and a row
    /// whose amount would overflow its vendor's column is left out of it.
    pub fn summarize(&self, table: &Table, window: DateRange) -> Result<Summary, ReportError> {
        let classified = self.classify_rows(table, window)?;

        let mut by_vendor: BTreeMap<&str, VendorSummary> = BTreeMap::new();
        for row in classified.iter().filter(|r| !r.vendor.is_empty()) {
            let added = by_vendor
                .entry(row.vendor.as_str())
                .or_insert_with(|| VendorSummary::new(&row.vendor))
                .add(row.class, row.amount);
            if !added {
                warn!(
                    vendor = %row.vendor,
                    amount = %row.amount,
                    class = %row.class,
                    date = %row.date,
                    "amount overflows vendor total, row skipped"
                );
            }
        }

        let summary = Summary {
            rows: by_vendor.into_values().collect(),
        };
        debug!(vendors = summary.len(), %window, "aggregated vendor totals");
        Ok(summary)
    }

    /// Validate the schema, then the window, then summarize.
    pub fn aggregate(
        &self,
        table: &Table,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> Result<Summary, ReportError> {
        table.require(&self.fields.names())?;
        let window = DateRange::parse(start, end)?;
        self.summarize(table, window)
    }
}

/// Vendor totals for `start..=end` using the standard rule book and synonym
/// table.
pub fn aggregate(
    table: &Table,
    start: impl Into<DateInput>,
    end: impl Into<DateInput>,
    fields: &FieldMap,
) -> Result<Summary, ReportError> {
    Aggregator::new(fields.clone()).aggregate(table, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const HEADERS: [&str; 5] = ["Date", "Amount", "Account", "Type", "Name"];

    fn table(rows: &[[&str; 5]]) -> Table {
        Table::with_rows(HEADERS, rows.iter().map(|r| r.to_vec()))
    }

    fn money(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    fn week(t: &Table) -> Summary {
        aggregate(t, "2025-08-18", "2025-08-24", &FieldMap::default()).unwrap()
    }

    #[test]
    fn end_to_end_accrual_and_payment() {
        let t = table(&[
            ["2025-08-20", "$500.00", "21142-AP", "Vendor Bill", "Acme"],
            ["2025-08-21", "(500.00)", "13150", "Bill Payment", "Acme"],
        ]);
        let summary = week(&t);
        assert_eq!(summary.len(), 1);
        let acme = summary.get("Acme").unwrap();
        assert_eq!(acme.accrued_purchases, money("500.00"));
        assert_eq!(acme.bill, Money::zero());
        assert_eq!(acme.payment, money("-500.00"));
        assert_eq!(acme.adjustments, Money::zero());
    }

    #[test]
    fn overflowing_amount_is_left_out_of_the_total() {
        let huge = "79,228,162,514,264,337,593,543,950,335.00";
        let t = table(&[
            ["2025-08-20", huge, "13150", "Bill Payment", "Acme"],
            ["2025-08-21", huge, "13150", "Bill Payment", "Acme"],
            ["2025-08-22", "(5)", "13150", "Bill Payment", "Acme"],
            ["2025-08-22", "12.00", "21110", "Vendor Bill", "Acme"],
        ]);
        let acme = week(&t).get("Acme").cloned().unwrap();
        assert_eq!(acme.payment, money("79228162514264337593543950330"));
        assert_eq!(acme.bill, money("12.00"));
    }

    #[test]
    fn payment_wins_over_bill() {
        let t = table(&[["2025-08-20", "100", "21110", "Bill Payment", "Acme"]]);
        let acme = week(&t).get("Acme").cloned().unwrap();
        assert_eq!(acme.payment, money("100"));
        assert_eq!(acme.bill, Money::zero());
    }

    #[test]
    fn bill_and_adjustment_columns() {
        let t = table(&[
            ["2025-08-19", "250.00", "21110", "vendor bill", "Beta"],
            ["2025-08-19", "40.00", "21117", "Journal Entry", "Beta"],
            ["2025-08-19", "(15.00)", "60000", "Journal", "Beta"],
        ]);
        let beta = week(&t).get("Beta").cloned().unwrap();
        assert_eq!(beta.bill, money("290.00"));
        assert_eq!(beta.adjustments, money("-15.00"));
        assert_eq!(beta.accrued_purchases, Money::zero());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let t = table(&[
            ["2025-08-17", "1", "13150", "Bill Payment", "Early"],
            ["2025-08-18", "2", "13150", "Bill Payment", "Start"],
            ["2025-08-24 17:30:00", "3", "13150", "Bill Payment", "End"],
            ["2025-08-25", "4", "13150", "Bill Payment", "Late"],
        ]);
        let vendors: Vec<_> = week(&t).rows().iter().map(|r| r.vendor.clone()).collect();
        assert_eq!(vendors, vec!["End", "Start"]);
    }

    #[test]
    fn vendor_with_only_other_rows_is_listed_with_zeros() {
        let t = table(&[["2025-08-20", "75.00", "40000", "Check", "Gamma"]]);
        let summary = week(&t);
        let gamma = summary.get("Gamma").unwrap();
        assert_eq!(gamma, &VendorSummary::new("Gamma"));
    }

    #[test]
    fn unparseable_amount_counts_as_zero_but_keeps_vendor() {
        let t = table(&[["2025-08-20", "TBD", "13150", "Bill Payment", "Delta"]]);
        let summary = week(&t);
        assert_eq!(summary.get("Delta").unwrap().payment, Money::zero());
    }

    #[test]
    fn unreadable_dates_are_outside_the_window() {
        let t = table(&[["someday", "5", "13150", "Bill Payment", "Echo"]]);
        assert!(week(&t).is_empty());
    }

    #[test]
    fn vendors_are_grouped_exactly_and_sorted() {
        let t = table(&[
            ["2025-08-20", "1", "13150", "Bill Payment", "acme"],
            ["2025-08-20", "2", "13150", "Bill Payment", "Acme"],
            ["2025-08-20", "3", "13150", "Bill Payment", "Acme"],
        ]);
        let summary = week(&t);
        let vendors: Vec<_> = summary.rows().iter().map(|r| r.vendor.as_str()).collect();
        assert_eq!(vendors, vec!["Acme", "acme"]);
        assert_eq!(summary.get("Acme").unwrap().payment, money("5"));
    }

    #[test]
    fn blank_vendor_rows_are_not_summarized() {
        let t = table(&[["2025-08-20", "9", "13150", "Bill Payment", ""]]);
        assert!(week(&t).is_empty());
    }

    #[test]
    fn empty_window_returns_schema_without_rows() {
        let t = table(&[["2025-01-01", "9", "13150", "Bill Payment", "Acme"]]);
        let summary = week(&t);
        assert!(summary.is_empty());
        assert_eq!(summary.columns(), &SUMMARY_COLUMNS);
    }

    #[test]
    fn each_row_lands_in_at_most_one_column() {
        let t = table(&[
            ["2025-08-20", "10", "21142", "Vendor Bill", "A"],
            ["2025-08-20", "10", "21110", "Vendor Bill", "B"],
            ["2025-08-20", "10", "21110", "Bill Payment", "C"],
            ["2025-08-20", "10", "13150", "Journal", "D"],
            ["2025-08-20", "10", "99999", "Bill Payment", "E"],
        ]);
        let agg = Aggregator::default();
        let window = DateRange::parse("2025-08-18", "2025-08-24").unwrap();
        let summary = agg.summarize(&t, window).unwrap();
        for row in summary.rows() {
            let total = [Class::AccruedPurchases, Class::Adjustments, Class::Bill, Class::Payment]
                .into_iter()
                .try_fold(Money::zero(), |acc, c| acc.checked_add(row.total_for(c)))
                .unwrap();
            assert!(row.total_for(Class::Other).is_zero());
            let expected = if row.vendor == "E" { Money::zero() } else { money("10") };
            assert_eq!(total, expected, "vendor {}", row.vendor);
        }
    }

    #[test]
    fn classify_rows_exposes_normalized_fields() {
        let t = table(&[["08/20/2025", "$1,000.00", "21109 Accrued", "ItemReceipt", "Acme"]]);
        let window = DateRange::parse("2025-08-18", "2025-08-24").unwrap();
        let rows = Aggregator::default().classify_rows(&t, window).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account, Some(AccountCode(21109)));
        assert_eq!(rows[0].type_label, "item receipt");
        assert_eq!(rows[0].amount, money("1000.00"));
        assert_eq!(rows[0].class, Class::AccruedPurchases);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let t = table(&[
            ["2025-08-20", "$500.00", "21142-AP", "Vendor Bill", "Acme"],
            ["2025-08-22", "12.34", "21110", "Vendor Credit", "Zed"],
            ["2025-08-21", "(500.00)", "13150", "Bill Payment", "Acme"],
        ]);
        assert_eq!(week(&t), week(&t));
    }

    #[test]
    fn missing_fields_reported_before_date_errors() {
        let t = Table::new(["Date", "Amount"]);
        let err = aggregate(&t, "bogus", "2025-08-24", &FieldMap::default()).unwrap_err();
        assert_eq!(
            err,
            ReportError::MissingFields(vec!["Account".into(), "Type".into(), "Name".into()])
        );
    }

    #[test]
    fn bad_or_inverted_window_is_validation_error() {
        let t = table(&[]);
        let fields = FieldMap::default();
        let err = aggregate(&t, "2025-08-18", "not a date", &fields).unwrap_err();
        assert!(err.is_validation());
        let err = aggregate(&t, "2025-08-24", "2025-08-18", &fields).unwrap_err();
        assert!(matches!(err, ReportError::InvertedRange { .. }));
    }

    #[test]
    fn custom_rules_and_synonyms() {
        let t = table(&[["2025-08-20", "8", "21142", "Vendor Invoice", "Acme"]]);
        let rules = RuleBook::standard().rules()[2..3].to_vec();
        let agg = Aggregator::default()
            .with_rules(RuleBook::new(rules))
            .with_types(TypeCanonicalizer::default().with_synonyms([("vendor invoice", "vendor bill")]));
        let summary = agg.aggregate(&t, "2025-08-18", "2025-08-24").unwrap();
        assert_eq!(summary.get("Acme").unwrap().bill, money("8"));
    }
}
