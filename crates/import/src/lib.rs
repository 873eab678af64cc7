pub mod extract;
pub mod latest;

pub use extract::{read_extract, read_extract_file, ExtractFormat, ImportError};
pub use latest::{extract_timestamp, find_latest_extract, load_latest_extract};
