use crate::error::ReportError;

/// An in-memory extract: named columns, every cell kept as text.
///
/// Rows are always as wide as the header; short rows are padded with empty
/// strings on insert, extra trailing cells are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell text at `index`, or `""` when the row has no such cell.
    pub fn get(&self, index: usize) -> &'a str {
        self.cells.get(index).map(String::as_str).unwrap_or_default()
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Table {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows<S, R, C>(headers: impl IntoIterator<Item = S>, rows: R) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut table = Table::new(headers);
        for row in rows {
            table.push_row(row.into_iter().map(Into::into).collect());
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(|r| Row { cells: r })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve every name in `names` to a column index, or report all of the
    /// names that are absent (in the order given, without repeats).
    pub fn require(&self, names: &[&str]) -> Result<Vec<usize>, ReportError> {
        let mut missing: Vec<String> = Vec::new();
        let mut indices = Vec::with_capacity(names.len());

        for name in names {
            match self.column_index(name) {
                Some(idx) => indices.push(idx),
                None => {
                    if !missing.iter().any(|m| m.as_str() == *name) {
                        missing.push(name.to_string());
                    }
                }
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(ReportError::MissingFields(missing))
        }
    }

    /// A new table with the same header holding the given rows.
    pub(crate) fn derive(&self, rows: Vec<Vec<String>>) -> Table {
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }
}
