//! Unified application error type.
//! All modules (params, query, warehouse, export, cli) return AppError so
//! a failed page load is reported the same way wherever it happens.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Warehouse
    // ---------------------------
    #[error("Error connecting to database: {0}")]
    Connection(String),

    #[error("Error executing query: {0}")]
    Query(String),

    #[error("Fixture database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid page URL: {0}")]
    Url(#[from] url::ParseError),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Secrets error: {0}")]
    Secrets(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    /// True for failures that belong on the inline error page rather than
    /// being reported as a plain CLI error.
    pub fn is_page_error(&self) -> bool {
        matches!(
            self,
            AppError::Connection(_) | AppError::Query(_) | AppError::Db(_) | AppError::Http(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
