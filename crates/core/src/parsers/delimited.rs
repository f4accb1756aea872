use csv::{ReaderBuilder, Trim};
use thiserror::Error;

use super::{Cell, ImportError, Row, SheetReader};

#[derive(Debug, Error)]
pub enum DelimitedParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Reads comma or semicolon separated text with a header row.
///
/// Spreadsheet exports in Dutch locales separate with `;`, so unless a
/// delimiter is forced the header line decides. Cells that read as plain
/// numbers become [`Cell::Number`], which lets exported date serials and
/// time fractions through the same path as a real workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedReader {
    pub delimiter: Option<u8>,
}

impl DelimitedReader {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    pub fn parse(&self, data: &[u8]) -> Result<Vec<Row>, DelimitedParseError> {
        let text = std::str::from_utf8(data)?;
        let text = text.trim_start_matches('\u{feff}');
        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(text));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h, parse_cell(v)))
                    .collect(),
            );
        }
        Ok(rows)
    }
}

impl SheetReader for DelimitedReader {
    fn read_rows(&self, data: &[u8]) -> Result<Vec<Row>, ImportError> {
        Ok(self.parse(data)?)
    }
}

/// `;` when the header line has more of them than commas.
fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

fn parse_cell(raw: &str) -> Cell {
    if raw.is_empty() {
        return Cell::Empty;
    }
    let numeric = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && raw.chars().any(|c| c.is_ascii_digit());
    match raw.parse::<f64>() {
        Ok(v) if numeric && v.is_finite() => Cell::Number(v),
        _ => Cell::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolons() {
        let rows = DelimitedReader::default()
            .parse(b"Datum;Tijd;Plaats\n2024-03-01;08:15;Gent\n")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pick(&["plaats"]), Some(&Cell::Text("Gent".into())));
    }

    #[test]
    fn quoted_fields_keep_their_delimiters() {
        let rows = DelimitedReader::default()
            .parse(b"date,time,location\n2024-03-01,08:15,\"Gent, Dok Noord\"\n")
            .unwrap();
        assert_eq!(
            rows[0].pick(&["location"]),
            Some(&Cell::Text("Gent, Dok Noord".into()))
        );
    }

    #[test]
    fn numbers_become_numeric_cells() {
        let rows = DelimitedReader::with_delimiter(b',')
            .parse(b"date,time,kenteken\n45352,0.5,1-ABC-123\n")
            .unwrap();
        assert_eq!(rows[0].pick(&["date"]), Some(&Cell::Number(45352.0)));
        assert_eq!(rows[0].pick(&["time"]), Some(&Cell::Number(0.5)));
        assert_eq!(
            rows[0].pick(&["kenteken"]),
            Some(&Cell::Text("1-ABC-123".into()))
        );
    }

    #[test]
    fn blank_records_and_bom_are_skipped() {
        let rows = DelimitedReader::default()
            .parse("\u{feff}datum;tijd\n;\n2024-03-01;09:00\n".as_bytes())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].pick(&["datum"]).is_some());
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(matches!(
            DelimitedReader::default().parse(&[0xff, 0xfe, 0x00]),
            Err(DelimitedParseError::Utf8(_))
        ));
    }
}
