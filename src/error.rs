use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads a drop tower workbook, renders it, or emits the keyword file.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the JSON configuration file cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the workbook does not have the expected shape.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when required columns are absent from the header row.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Raised when a cell cannot be interpreted as a number.
    #[error("invalid value '{value}' in column {column} at row {row}")]
    InvalidCell {
        column: String,
        row: usize,
        value: String,
    },

    /// Raised when a table holds no samples, so no end time exists.
    #[error("{0} table contains no samples")]
    EmptyTable(&'static str),

    /// Raised when the diagnostic plot cannot be rendered.
    #[error("plotting error: {0}")]
    Plot(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
