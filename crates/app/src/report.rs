use anyhow::Result;
use clap::ValueEnum;
use payables_core::{ClassifiedRow, Summary, SUMMARY_COLUMNS};
use serde::Serialize;
use serde_json::{Number, Value};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

const CLASSIFIED_COLUMNS: [&str; 6] = ["date", "vendor", "amount", "account", "type_label", "class"];

/// Serialize `rows` as a JSON array, turning the decimal text under `keys`
/// into JSON numbers with the same digits.
fn with_numeric_amounts<T: Serialize>(rows: &[T], keys: &[&str]) -> Result<Value> {
    let mut value = serde_json::to_value(rows)?;
    if let Some(items) = value.as_array_mut() {
        for item in items {
            for key in keys {
                let Some(slot) = item.get_mut(*key) else {
                    continue;
                };
                let number: Number = match slot.as_str() {
                    Some(text) => serde_json::from_str(text)?,
                    None => continue,
                };
                *slot = Value::Number(number);
            }
        }
    }
    Ok(value)
}

/// Write the vendor summary. CSV output always carries the header row, so an
/// empty window still yields the five-column schema.
pub fn write_summary<W: Write>(summary: &Summary, format: OutputFormat, out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
            writer.write_record(summary.columns())?;
            for row in summary.rows() {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let mut out = out;
            let value = with_numeric_amounts(summary.rows(), &SUMMARY_COLUMNS[1..])?;
            serde_json::to_writer_pretty(&mut out, &value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write the per-row classification audit.
pub fn write_classified<W: Write>(
    rows: &[ClassifiedRow],
    format: OutputFormat,
    out: W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
            writer.write_record(CLASSIFIED_COLUMNS)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let mut out = out;
            let value = with_numeric_amounts(rows, &["amount"])?;
            serde_json::to_writer_pretty(&mut out, &value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
