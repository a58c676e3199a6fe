pub mod analysis;
pub mod analyzer;
pub mod comfy_table;
pub mod error;
pub mod export;
pub mod filter_utils;
pub mod find_tickers;
pub mod klines;
pub mod models;
pub mod price_store;
pub mod price_table;
pub mod storage_utils;
pub mod summary;
pub mod tui;

pub use error::{Result, ScreenerError};
