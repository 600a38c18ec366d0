use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading an input table.
///
/// Every variant carries the offending file so the message can be shown
/// as-is in the view that failed.
#[derive(Debug, Error)]
pub enum DataError {
    /// The input file does not exist.
    #[error("Data file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A required column (or GeoJSON property) is absent.
    #[error("{}: missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// The CSV reader failed.
    #[error("Failed to read CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The GeoJSON document could not be parsed.
    #[error("Failed to parse GeoJSON {}: {source}", path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    /// Reading the file failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value that must be numeric is not.
    #[error("{}: row {row}, column '{column}': cannot parse '{value}'", path.display())]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// The file parsed but does not have the expected structure.
    #[error("{}: {message}", path.display())]
    Shape { path: PathBuf, message: String },
}
