use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("No price data found. Run the fetcher first. Checked: {csv:?}, {database:?}")]
    NoDataSource { csv: PathBuf, database: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Failed after {attempts} retries fetching {symbol}")]
    RetriesExhausted { symbol: String, attempts: u32 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ScreenerError>;
