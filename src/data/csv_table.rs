//! Thin header-aware wrapper over `csv::Reader`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};

use super::DataError;

/// A CSV file read fully into memory, with columns addressed by name.
pub(crate) struct CsvTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    /// Read `path`. Duplicate header names are renamed `name.1`, `name.2`, …
    /// in order of appearance so every column can be addressed by name.
    pub(crate) fn read(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            return Err(DataError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let csv_err = |source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let raw_headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        Ok(Self {
            path: path.to_path_buf(),
            headers: dedupe_headers(raw_headers),
            rows,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn headers(&self) -> &[String] {
        &self.headers
    }

    pub(crate) fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Index of the column called `name`.
    pub(crate) fn column(&self, name: &str) -> Result<usize, DataError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Trimmed cell text; short rows read as empty.
    pub(crate) fn cell<'a>(&self, row: &'a StringRecord, column: usize) -> &'a str {
        row.get(column).map(str::trim).unwrap_or("")
    }

    /// Parse a cell that must be numeric when present. Empty cells are
    /// `None`; anything else that is not a number is a `Parse` error.
    /// `row` is the zero-based data row, reported one-based after the header.
    pub(crate) fn number(&self, row_index: usize, column: usize) -> Result<Option<f64>, DataError> {
        let Some(row) = self.rows.get(row_index) else {
            return Ok(None);
        };
        let text = self.cell(row, column);
        if text.is_empty() {
            return Ok(None);
        }
        parse_number(text).map(Some).ok_or_else(|| DataError::Parse {
            path: self.path.clone(),
            row: row_index + 2,
            column: self.headers.get(column).cloned().unwrap_or_default(),
            value: text.to_string(),
        })
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 {
                h
            } else {
                format!("{}.{}", h, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Parse a number, accepting thousands separators. NaN parses as NaN.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok()
}

/// Parse a factor cell: empty, NaN or unparseable values read as 0.
pub(crate) fn parse_or_zero(text: &str) -> f64 {
    match parse_number(text) {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
