use chrono::NaiveDateTime;
use payables_core::Table;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::extract::{read_extract_file, ExtractFormat, ImportError};

fn extract_name() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"^AP_Analysis_Report_(\d{8})_(\d{6})\.csv$").expect("invalid regex")
    })
}

/// The export time encoded in an `AP_Analysis_Report_YYYYMMDD_HHMMSS.csv`
/// file name. Names that do not follow the pattern, or encode an impossible
/// time, yield `None`.
pub fn extract_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let caps = extract_name().captures(file_name)?;
    let stamp = format!("{}{}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S").ok()
}

/// The most recently stamped AP extract in `dir` (by file name, not mtime).
pub fn find_latest_extract(dir: &Path) -> Result<PathBuf, ImportError> {
    let mut latest: Option<(NaiveDateTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(stamp) = name.to_str().and_then(extract_timestamp) else {
            continue;
        };
        if latest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            latest = Some((stamp, entry.path()));
        }
    }

    match latest {
        Some((stamp, path)) => {
            debug!(%stamp, path = %path.display(), "selected newest AP extract");
            Ok(path)
        }
        None => Err(ImportError::NoExtracts(dir.to_path_buf())),
    }
}

/// Find and read the newest extract in `dir`.
pub fn load_latest_extract(
    dir: &Path,
    format: &ExtractFormat,
) -> Result<(Table, PathBuf), ImportError> {
    let path = find_latest_extract(dir)?;
    let table = read_extract_file(&path, format)?;
    info!(
        file = %path.display(),
        rows = table.len(),
        columns = table.headers().len(),
        "loaded AP analysis extract"
    );
    Ok((table, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn touch(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn timestamp_from_name() {
        let ts = extract_timestamp("AP_Analysis_Report_20250825_063000.csv").unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 8, 25)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        assert_eq!(ts, expected);
    }

    #[test]
    fn timestamp_rejects_other_names() {
        assert_eq!(extract_timestamp("AP_Analysis_Report_20250825.csv"), None);
        assert_eq!(extract_timestamp("AP_Analysis_Report_20250825_063000.csv.bak"), None);
        assert_eq!(extract_timestamp("ap_analysis_report_20250825_063000.csv"), None);
        assert_eq!(extract_timestamp("AP_Analysis_Report_20251399_063000.csv"), None);
    }

    #[test]
    fn newest_by_name_stamp_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "AP_Analysis_Report_20250818_120000.csv", "a\n");
        touch(dir.path(), "AP_Analysis_Report_20250825_063000.csv", "a\n");
        touch(dir.path(), "AP_Analysis_Report_20250825_050000.csv", "a\n");
        touch(dir.path(), "notes.txt", "");

        let latest = find_latest_extract(dir.path()).unwrap();
        assert_eq!(
            latest.file_name().unwrap(),
            "AP_Analysis_Report_20250825_063000.csv"
        );
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Vendor Payable Report.xlsx", "");
        assert!(matches!(
            find_latest_extract(dir.path()),
            Err(ImportError::NoExtracts(_))
        ));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(matches!(
            find_latest_extract(&gone),
            Err(ImportError::IoError(_))
        ));
    }

    #[test]
    fn load_latest_reads_table() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            "AP_Analysis_Report_20250825_063000.csv",
            "Date^Amount^Name\n2025-08-20^5.00^Acme\n",
        );
        let (table, path) = load_latest_extract(dir.path(), &ExtractFormat::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(path.ends_with("AP_Analysis_Report_20250825_063000.csv"));
    }
}
