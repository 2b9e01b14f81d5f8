use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::row::RawRow;
use crate::source::LedgerSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvOptions {
    pub delimiter: String,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            has_header: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {column} (index {index}, file has {width} columns)")]
    MissingColumn {
        column: &'static str,
        index: usize,
        width: usize,
    },
    #[error("No data rows")]
    NoDataRows,
}

/// UTF-8 when valid, otherwise Latin-1, which is what older bank and
/// spreadsheet exports write.
fn decode_cell(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().copied().map(char::from).collect(),
    }
}

/// Reads every movement row of a ledger export laid out as `source`.
pub fn read_ledger<R: Read>(
    data: R,
    source: LedgerSource,
    options: &CsvOptions,
) -> Result<Vec<RawRow>, ImportError> {
    let delimiter = options.delimiter.as_bytes().first().copied().unwrap_or(b';');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let layout = source.layout();
    let mut width = 0;
    let mut rows = Vec::new();

    for (index, result) in reader.byte_records().enumerate() {
        let record = result?;
        if index < layout.skip_rows {
            continue;
        }
        width = width.max(record.len());
        let decoded: Vec<String> = record.iter().map(decode_cell).collect();
        let cells: Vec<&str> = decoded.iter().map(String::as_str).collect();
        rows.push(source.extract(index - layout.skip_rows, &cells));
    }

    if rows.is_empty() {
        return Err(ImportError::NoDataRows);
    }
    if let Some(&(column, index)) = layout.missing_columns(width).first() {
        return Err(ImportError::MissingColumn { column, index, width });
    }

    tracing::info!(%source, rows = rows.len(), "ledger read");
    Ok(rows)
}

/// Opens, reads fully, and closes the file at `path`.
pub fn read_ledger_file(
    path: &Path,
    source: LedgerSource,
    options: &CsvOptions,
) -> Result<Vec<RawRow>, ImportError> {
    let file = File::open(path)?;
    read_ledger(file, source, options)
}
