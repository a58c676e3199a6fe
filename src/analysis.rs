//! This module contains the fetch and analysis pipelines.

use crate::analyzer::{RankOptions, rank_by_drop_with};
use crate::error::{Result, ScreenerError};
use crate::export::{ExportFormat, export_results};
use crate::find_tickers::fetch_top_altcoins;
use crate::klines::{fetch_daily_history, validate_observations};
use crate::models::{AnalysisSummary, CoinListing, PriceObservation, RankingRow};
use crate::price_store::{DataSource, load_existing_dates, load_prices, save_to_csv, save_to_sqlite};
use crate::storage_utils::{AppConfig, AsyncStorageManager};
use crate::summary::generate_summary;
use chrono::NaiveDate;
use reqwest::Client;
use tokio::fs;
use tracing::{error, info, warn};

pub const SUMMARY_FILE: &str = "analysis_summary";

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Skip dates already present in the CSV store.
    pub update: bool,
    /// Explicit base symbols; when empty the top altcoins by volume are used.
    pub coins: Vec<String>,
    pub num_coins: Option<usize>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub coins_requested: usize,
    pub coins_failed: usize,
    pub rows_saved: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub ranking: Vec<RankingRow>,
    pub summary: AnalysisSummary,
}

async fn resolve_coins(
    client: &Client,
    config: &AppConfig,
    options: &FetchOptions,
) -> Result<Vec<CoinListing>> {
    if !options.coins.is_empty() {
        let coins: Vec<CoinListing> = options.coins.iter().map(|c| CoinListing::from_base(c)).collect();
        info!("Fetching {} specified coins", coins.len());
        return Ok(coins);
    }
    let limit = options.num_coins.unwrap_or(config.fetch.default_coin_limit);
    fetch_top_altcoins(client, &config.fetch, limit).await
}

/// Downloads daily history for the selected coins and appends it to both stores.
/// A coin that fails to download is logged and skipped.
pub async fn run_fetch(config: &AppConfig, options: &FetchOptions) -> Result<FetchReport> {
    let start = NaiveDate::parse_from_str(&config.fetch.start_date, "%Y-%m-%d")
        .map_err(|_| ScreenerError::InvalidDate(config.fetch.start_date.clone()))?;
    info!("Starting data fetch pipeline, date range: {} to now", start);

    let client = Client::builder().pool_max_idle_per_host(50).build()?;
    let coins = resolve_coins(&client, config, options).await?;

    let prices_csv = config.paths.prices_csv();
    let existing = if options.update {
        load_existing_dates(&prices_csv).await?
    } else {
        Default::default()
    };

    let mut report = FetchReport {
        coins_requested: coins.len(),
        ..FetchReport::default()
    };
    let mut all_rows: Vec<PriceObservation> = Vec::new();

    for batch in coins.chunks(config.fetch.batch_size.max(1)) {
        let tasks: Vec<_> = batch
            .iter()
            .map(|coin| fetch_daily_history(&client, &config.fetch, coin, start, options.end_date))
            .collect();
        let results = futures::future::join_all(tasks).await;

        for (coin, result) in batch.iter().zip(results) {
            let rows = match result {
                Ok(rows) => rows,
                Err(e) => {
                    error!("Failed to fetch {}: {}", coin.pair(&config.fetch.quote_asset), e);
                    report.coins_failed += 1;
                    continue;
                }
            };

            let mut rows = validate_observations(rows);
            if let Some(already) = existing.get(&coin.id) {
                rows.retain(|row| !already.contains(&row.date));
            }

            if rows.is_empty() {
                warn!("No new data for {}", coin.id);
                continue;
            }
            all_rows.extend(rows);
        }
    }

    if all_rows.is_empty() {
        info!("No new data to save");
        return Ok(report);
    }

    save_to_csv(&prices_csv, &all_rows).await?;
    save_to_sqlite(&config.paths.database(), &all_rows).await?;
    report.rows_saved = all_rows.len();
    info!("Pipeline complete. Total new rows: {}", report.rows_saved);

    Ok(report)
}

/// Loads prices, ranks decliners, writes both exports and the summary.
pub async fn run_analysis(config: &AppConfig, source: DataSource) -> Result<AnalysisOutcome> {
    info!("Starting analysis pipeline");

    let table = load_prices(&config.paths, source).await?;
    let options = RankOptions {
        top_n: config.analysis.top_n,
        min_data_days: config.analysis.min_data_days,
    };
    let ranking = rank_by_drop_with(&table, options);
    info!("Ranked {} coins by drop percentage", ranking.len());

    let summary = generate_summary(&ranking);

    if ranking.is_empty() {
        warn!("No coins with price drops found");
        return Ok(AnalysisOutcome { ranking, summary });
    }

    export_results(&ranking, ExportFormat::Csv, &config.paths.results_csv()).await?;
    export_results(&ranking, ExportFormat::Json, &config.paths.results_json()).await?;

    let storage = AsyncStorageManager::new(&config.paths.data_dir).await?;
    storage.save(SUMMARY_FILE, &summary).await?;
    info!("Summary: {:?}", summary);

    Ok(AnalysisOutcome { ranking, summary })
}

/// Fetch (optionally incremental) followed by analysis.
pub async fn run_pipeline(
    config: &AppConfig,
    options: &FetchOptions,
    source: DataSource,
) -> Result<AnalysisOutcome> {
    run_fetch(config, options).await?;
    run_analysis(config, source).await
}

async fn has_content(path: &std::path::Path) -> bool {
    fs::metadata(path).await.map(|m| m.len() > 0).unwrap_or(false)
}

/// Makes sure results exist, fetching prices first when there are none.
/// Returns whether anything had to be run.
pub async fn ensure_data(config: &AppConfig, num_coins: Option<usize>) -> Result<bool> {
    if has_content(&config.paths.results_csv()).await {
        return Ok(false);
    }

    if !has_content(&config.paths.prices_csv()).await {
        let options = FetchOptions {
            num_coins,
            ..FetchOptions::default()
        };
        run_fetch(config, &options).await?;
    }

    run_analysis(config, DataSource::Csv).await?;
    Ok(true)
}
