use payables_core::Table;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Extract has no header row")]
    MissingHeader,
    #[error("No AP_Analysis_Report_*.csv files found in {}", .0.display())]
    NoExtracts(PathBuf),
}

/// How an AP extract is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractFormat {
    pub delimiter: u8,
}

impl Default for ExtractFormat {
    /// The AP analysis export separates fields with `^`.
    fn default() -> Self {
        Self { delimiter: b'^' }
    }
}

/// Read a headered extract into a [`Table`]. Every field stays text; rows
/// shorter than the header are padded with empty cells. Bytes that are not
/// valid UTF-8 are replaced rather than rejected.
pub fn read_extract<R: Read>(data: R, format: &ExtractFormat) -> Result<Table, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(format.delimiter)
        .from_reader(data);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::MissingHeader);
    }

    let mut table = Table::new(headers);
    for result in reader.byte_records() {
        let record = result?;
        table.push_row(
            record
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect(),
        );
    }

    Ok(table)
}

pub fn read_extract_file(path: &Path, format: &ExtractFormat) -> Result<Table, ImportError> {
    let file = File::open(path)?;
    read_extract(file, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_caret_delimited() {
        let data = b"Date^Amount^Name\n2025-08-20^$1,500.00^Acme, Inc.\n2025-08-21^(20.00)^Beta\n";
        let table = read_extract(data.as_ref(), &ExtractFormat::default()).unwrap();
        assert_eq!(table.headers(), &["Date", "Amount", "Name"]);
        assert_eq!(table.len(), 2);
        let first = table.rows().next().unwrap();
        // Commas are data, not separators.
        assert_eq!(first.get(1), "$1,500.00");
        assert_eq!(first.get(2), "Acme, Inc.");
    }

    #[test]
    fn short_rows_are_padded() {
        let data = b"Date^Amount^Name\n2025-08-20^5\n";
        let table = read_extract(data.as_ref(), &ExtractFormat::default()).unwrap();
        assert_eq!(table.rows().next().unwrap().get(2), "");
    }

    #[test]
    fn values_are_not_trimmed() {
        let data = b"Category\n Home Services \n";
        let table = read_extract(data.as_ref(), &ExtractFormat::default()).unwrap();
        assert_eq!(table.rows().next().unwrap().get(0), " Home Services ");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let data = b"Name\nCaf\xe9\n";
        let table = read_extract(data.as_ref(), &ExtractFormat::default()).unwrap();
        assert_eq!(table.rows().next().unwrap().get(0), "Caf\u{FFFD}");
    }

    #[test]
    fn header_only_is_empty_table() {
        let data = b"Date^Amount\n";
        let table = read_extract(data.as_ref(), &ExtractFormat::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn empty_input_has_no_header() {
        let result = read_extract(b"".as_ref(), &ExtractFormat::default());
        assert!(matches!(result, Err(ImportError::MissingHeader)));
    }

    #[test]
    fn comma_format() {
        let data = b"a,b\n1,2\n";
        let table = read_extract(data.as_ref(), &ExtractFormat { delimiter: b',' }).unwrap();
        assert_eq!(table.rows().next().unwrap().get(1), "2");
    }
}
