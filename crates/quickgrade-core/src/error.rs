use crate::roster::UnresolvedColumns;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input file has no rows: {0}")]
    EmptyInput(String),

    #[error("{0}")]
    MissingColumns(#[from] UnresolvedColumns),

    #[error("Invalid fallback table: {0}")]
    InvalidFallback(String),
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
