//! Load and save the `prices` table as a flat CSV file or a SQLite database.
//! Both carry the same columns; the ranking engine does not care which is used.

use crate::error::{Result, ScreenerError};
use crate::models::{PriceObservation, parse_date_lenient};
use crate::price_table::PriceTable;
use crate::storage_utils::PathsConfig;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{
    Pool, QueryBuilder, Row, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Csv,
    Sqlite,
}

/// Loads the price table sorted by `(coin_id, date)`.
///
/// SQLite is used when asked for and the database exists, otherwise the CSV
/// file. Having neither is the one hard failure of the analysis side.
pub async fn load_prices(paths: &PathsConfig, source: DataSource) -> Result<PriceTable> {
    let csv_path = paths.prices_csv();
    let db_path = paths.database();

    let rows = if source == DataSource::Sqlite && fs::try_exists(&db_path).await? {
        read_prices_sqlite(&db_path).await?
    } else if fs::try_exists(&csv_path).await? {
        read_prices_csv(&csv_path).await?
    } else {
        return Err(ScreenerError::NoDataSource {
            csv: csv_path,
            database: db_path,
        });
    };

    let table = PriceTable::sorted(rows);
    info!("Loaded {} rows for {} coins", table.len(), table.coin_count());
    Ok(table)
}

pub async fn read_prices_csv(path: &Path) -> Result<Vec<PriceObservation>> {
    let content = fs::read(path).await?;
    let mut reader = csv::Reader::from_reader(content.as_slice());
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<PriceObservation>, _>>()?;
    Ok(rows)
}

async fn connect(path: &Path, create: bool) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn read_prices_sqlite(path: &Path) -> Result<Vec<PriceObservation>> {
    let pool = connect(path, false).await?;

    // Casts keep integer-typed cells (e.g. a market cap of 0) decodable as f64.
    let records = sqlx::query(
        r#"
        SELECT CAST(date AS TEXT) AS date, coin_id, coin_name, symbol,
               CAST(price AS REAL) AS price,
               CAST(market_cap AS REAL) AS market_cap,
               CAST(volume AS REAL) AS volume,
               CAST(high AS REAL) AS high,
               CAST(low AS REAL) AS low
        FROM prices
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let raw_date: String = record.try_get("date")?;
        let date = parse_date_lenient(&raw_date).ok_or(ScreenerError::InvalidDate(raw_date))?;
        let coin_id: String = record.try_get("coin_id")?;
        let coin_name: Option<String> = record.try_get("coin_name")?;
        let symbol: Option<String> = record.try_get("symbol")?;
        let price: Option<f64> = record.try_get("price")?;

        rows.push(PriceObservation {
            date,
            coin_name: coin_name.unwrap_or_else(|| coin_id.clone()),
            coin_id,
            symbol: symbol.unwrap_or_default(),
            price: price.unwrap_or(f64::NAN),
            market_cap: record.try_get("market_cap")?,
            volume: record.try_get("volume")?,
            high: record.try_get("high")?,
            low: record.try_get("low")?,
        });
    }

    pool.close().await;
    Ok(rows)
}

/// Appends rows to the CSV file, writing the header only for a new or empty file.
pub async fn save_to_csv(path: &Path, rows: &[PriceObservation]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let write_header = match fs::metadata(path).await {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ScreenerError::Io(e.into_error()))?;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&bytes).await?;
    file.flush().await?;

    info!("Saved {} rows to {:?}", rows.len(), path);
    Ok(())
}

/// Appends rows to the `prices` table, creating the table and its
/// `(coin_id, date)` index when missing.
pub async fn save_to_sqlite(path: &Path, rows: &[PriceObservation]) -> Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let pool = connect(path, true).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prices (
            date TEXT NOT NULL,
            coin_id TEXT NOT NULL,
            coin_name TEXT,
            symbol TEXT,
            price REAL,
            market_cap REAL,
            volume REAL,
            high REAL,
            low REAL
        );
        "#,
    )
    .execute(&pool)
    .await?;

    // 9 binds per row, kept well under SQLite's 32k parameter limit.
    let mut inserted = 0;
    for chunk in rows.chunks(3000) {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO prices (date, coin_id, coin_name, symbol, price, market_cap, volume, high, low) ",
        );
        query_builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.date.format("%Y-%m-%d").to_string())
                .push_bind(row.coin_id.clone())
                .push_bind(row.coin_name.clone())
                .push_bind(row.symbol.clone())
                .push_bind(row.price)
                .push_bind(row.market_cap)
                .push_bind(row.volume)
                .push_bind(row.high)
                .push_bind(row.low);
        });
        inserted += query_builder.build().execute(&pool).await?.rows_affected();
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_prices_coin_date ON prices(coin_id, date)")
        .execute(&pool)
        .await?;

    pool.close().await;
    info!("Saved {} rows to SQLite: {:?}", inserted, path);
    Ok(inserted)
}

#[derive(Deserialize)]
struct StoredKey {
    coin_id: String,
    date: String,
}

/// Dates already stored per coin, for incremental fetches. Empty when the file
/// does not exist yet.
pub async fn load_existing_dates(path: &Path) -> Result<HashMap<String, HashSet<NaiveDate>>> {
    let mut fetched: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
    if !fs::try_exists(path).await? {
        return Ok(fetched);
    }

    let content = fs::read(path).await?;
    let mut reader = csv::Reader::from_reader(content.as_slice());
    for key in reader.deserialize::<StoredKey>() {
        let key = key?;
        if let Some(date) = parse_date_lenient(&key.date) {
            fetched.entry(key.coin_id).or_default().insert(date);
        }
    }
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(coin_id: &str, day: u32, price: f64) -> PriceObservation {
        PriceObservation {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            coin_id: coin_id.to_string(),
            coin_name: coin_id.to_uppercase(),
            symbol: coin_id.to_lowercase(),
            price,
            market_cap: None,
            volume: Some(price * 2.0),
            high: Some(price + 1.0),
            low: None,
        }
    }

    #[tokio::test]
    async fn blank_price_cell_does_not_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            data_dir: dir.path().to_path_buf(),
            database_path: None,
        };
        let rows: Vec<PriceObservation> = (1..=28).map(|d| obs("sol", d, 100.0 - d as f64)).collect();
        save_to_csv(&paths.prices_csv(), &rows).await.unwrap();

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(paths.prices_csv())
            .await
            .unwrap();
        file.write_all(b"2025-01-29,sol,SOL,sol,,0,1,,\n").await.unwrap();
        file.flush().await.unwrap();

        let table = load_prices(&paths, DataSource::Csv).await.unwrap();
        assert_eq!(table.len(), 29);
        assert!(table.series("sol").last().unwrap().price.is_nan());
        assert_eq!(crate::analyzer::find_peak(&table, "sol").unwrap().price, 99.0);
    }

    #[tokio::test]
    async fn csv_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");

        save_to_csv(&path, &[obs("sol", 1, 10.0)]).await.unwrap();
        save_to_csv(&path, &[obs("sol", 2, 11.0), obs("ada", 1, 0.5)]).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("coin_id").count(), 1);

        let rows = read_prices_csv(&path).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], obs("sol", 2, 11.0));
    }

    #[tokio::test]
    async fn sqlite_round_trip_keeps_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prices.db");
        let rows = vec![obs("sol", 1, 10.0), obs("sol", 2, 12.5)];

        assert_eq!(save_to_sqlite(&path, &rows).await.unwrap(), 2);
        let loaded = read_prices_sqlite(&path).await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&rows[0]));
        assert!(loaded.contains(&rows[1]));
    }

    #[tokio::test]
    async fn existing_dates_are_grouped_by_coin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        assert!(load_existing_dates(&path).await.unwrap().is_empty());

        save_to_csv(&path, &[obs("sol", 1, 1.0), obs("sol", 2, 1.0), obs("ada", 5, 1.0)])
            .await
            .unwrap();
        let existing = load_existing_dates(&path).await.unwrap();

        assert_eq!(existing["sol"].len(), 2);
        assert!(existing["ada"].contains(&NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()));
    }
}
