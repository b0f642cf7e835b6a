// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("JSONP wrapper not found in directory response")]
    MissingJsonpWrapper,

    #[error("Malformed directory JSON: {0}")]
    Json(String),

    #[error("Element not found: {0}")]
    MissingElement(String),

    #[error("Report index script is malformed: {0}")]
    MalformedScript(String),

    #[error("Row {index} out of range (table has {rows} rows)")]
    RowOutOfRange { index: isize, rows: usize },

    #[error("Row {0} has no value cell")]
    MissingCell(usize),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template workbook not found: {0}")]
    TemplateMissing(PathBuf),

    #[error("Workbook error: {0}")]
    Workbook(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Portal interaction failed: {0}")]
    Portal(#[from] PortalError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
