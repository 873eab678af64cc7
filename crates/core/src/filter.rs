use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReportError;
use crate::money::Money;
use crate::table::Table;

/// Which columns to read and which values to keep when narrowing a raw AP
/// extract down to the rows worth analysing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub amount_field: String,
    pub merch_field: String,
    pub category_field: String,
    /// Compared exactly.
    pub keep_merch_value: String,
    /// Compared after trimming and ignoring case.
    pub keep_category_value: String,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            amount_field: "Amount".to_string(),
            merch_field: "merchType".to_string(),
            category_field: "Category".to_string(),
            keep_merch_value: "Merch".to_string(),
            keep_category_value: "Home Services".to_string(),
        }
    }
}

/// Drop rows with an unusable or zero amount, the wrong merch type, or the
/// wrong category. Kept rows carry the normalized amount text.
pub fn filter(table: &Table, spec: &FilterSpec) -> Result<Table, ReportError> {
    let idx = table.require(&[
        spec.amount_field.as_str(),
        spec.merch_field.as_str(),
        spec.category_field.as_str(),
    ])?;
    let (amount_idx, merch_idx, category_idx) = (idx[0], idx[1], idx[2]);
    let keep_category = spec.keep_category_value.to_lowercase();

    let mut dropped_amount = 0usize;
    let mut kept = Vec::new();

    for row in table.rows() {
        let amount = match Money::parse(row.get(amount_idx)) {
            Some(m) if !m.is_zero() => m,
            _ => {
                dropped_amount += 1;
                continue;
            }
        };
        if row.get(merch_idx) != spec.keep_merch_value {
            continue;
        }
        if row.get(category_idx).trim().to_lowercase() != keep_category {
            continue;
        }

        let mut cells = row.cells().to_vec();
        cells[amount_idx] = amount.amount().to_string();
        kept.push(cells);
    }

    debug!(
        input = table.len(),
        kept = kept.len(),
        dropped_amount,
        "filtered AP extract"
    );
    Ok(table.derive(kept))
}
