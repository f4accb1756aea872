//! Tabular import: sheet readers produce loosely typed rows, which are then
//! normalized into one card timeline per calendar day.

pub mod delimited;
pub mod tabular;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::Timeline;

pub use delimited::DelimitedReader;
pub use tabular::{ImportRecord, normalize_row, rows_to_timelines};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("delimited text: {0}")]
    Delimited(#[from] delimited::DelimitedParseError),
    #[error("sheet has no rows")]
    EmptySheet,
    #[error("no row has a usable date and time")]
    NoUsableRows,
}

/// A single spreadsheet cell as a reader hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Plain cell text, with numbers printed the way a sheet shows them.
    pub fn text(&self) -> String {
        match self {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Empty => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Empty => true,
        }
    }
}

/// One sheet row keyed by lowercase, trimmed header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: &str, cell: Cell) {
        self.cells.insert(header.trim().to_lowercase(), cell);
    }

    /// First non-blank cell among `aliases`, in the order given.
    pub fn pick(&self, aliases: &[&str]) -> Option<&Cell> {
        aliases
            .iter()
            .filter_map(|a| self.cells.get(*a))
            .find(|c| !c.is_blank())
    }
}

impl<K: AsRef<str>> FromIterator<(K, Cell)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Cell)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v);
        }
        row
    }
}

/// Source of sheet rows: the first sheet of a workbook, a CSV file, ...
pub trait SheetReader {
    fn read_rows(&self, data: &[u8]) -> Result<Vec<Row>, ImportError>;
}

/// Read `data` with `reader` and group the rows into timelines.
pub fn import_sheet(reader: &dyn SheetReader, data: &[u8]) -> Result<Vec<Timeline>, ImportError> {
    let rows = reader.read_rows(data)?;
    if rows.is_empty() {
        return Err(ImportError::EmptySheet);
    }
    let timelines = rows_to_timelines(&rows);
    if timelines.is_empty() {
        return Err(ImportError::NoUsableRows);
    }
    tracing::info!(
        rows = rows.len(),
        timelines = timelines.len(),
        "imported sheet"
    );
    Ok(timelines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let row: Row = [
            (" Datum ", Cell::Text("2024-03-01".into())),
            ("TIJD", Cell::Text("08:00".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(row.pick(&["datum", "date"]), Some(&Cell::Text("2024-03-01".into())));
        assert!(row.pick(&["tijd"]).is_some());
    }

    #[test]
    fn blank_alias_falls_through_to_next() {
        let row: Row = [
            ("status", Cell::Text("  ".into())),
            ("type", Cell::Text("STOP".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(row.pick(&["statustext", "status", "type"]), Some(&Cell::Text("STOP".into())));
    }

    #[test]
    fn empty_sheet_is_an_error() {
        struct Nothing;
        impl SheetReader for Nothing {
            fn read_rows(&self, _: &[u8]) -> Result<Vec<Row>, ImportError> {
                Ok(Vec::new())
            }
        }
        assert!(matches!(import_sheet(&Nothing, b""), Err(ImportError::EmptySheet)));
    }

    #[test]
    fn rows_without_dates_are_not_importable() {
        let csv = b"plaats;voertuig\nGent;1-ABC-123\n";
        assert!(matches!(
            import_sheet(&DelimitedReader::default(), csv),
            Err(ImportError::NoUsableRows)
        ));
    }
}
