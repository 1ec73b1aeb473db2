//! Error types for calendar extraction.

use std::path::PathBuf;

/// Errors that can occur while extracting and exporting calendar events.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Table extractor failed: {0}")]
    Extractor(String),
    #[error("No tables found in {}", .0.display())]
    NoTables(PathBuf),
    #[error("No date cells found in any of the {0} tables")]
    NoDateCells(usize),
    #[error("Malformed table grid: {0}")]
    InvalidGrid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
