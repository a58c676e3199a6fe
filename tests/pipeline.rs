mod common;

use altcoin_drop_screener::ScreenerError;
use altcoin_drop_screener::analysis::{SUMMARY_FILE, ensure_data, run_analysis};
use altcoin_drop_screener::export::load_results;
use altcoin_drop_screener::models::AnalysisSummary;
use altcoin_drop_screener::price_store::{DataSource, load_prices, save_to_csv, save_to_sqlite};
use altcoin_drop_screener::storage_utils::{AppConfig, AsyncStorageManager, PathsConfig};
use common::{always_rising, sample_prices};
use tempfile::tempdir;

fn config_in(dir: &std::path::Path) -> AppConfig {
    AppConfig {
        paths: PathsConfig {
            data_dir: dir.to_path_buf(),
            database_path: None,
        },
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn analysis_writes_results_and_summary() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    save_to_csv(&config.paths.prices_csv(), &sample_prices()).await.unwrap();

    let outcome = run_analysis(&config, DataSource::Csv).await.unwrap();
    assert_eq!(outcome.ranking.len(), 4);
    assert_eq!(outcome.ranking[0].coin_id, "coin-d");

    let csv_rows = load_results(&config.paths.results_csv()).await.unwrap();
    let json_rows = load_results(&config.paths.results_json()).await.unwrap();
    assert_eq!(csv_rows, outcome.ranking);
    assert_eq!(json_rows, outcome.ranking);

    let storage = AsyncStorageManager::new(dir.path()).await.unwrap();
    let summary: AnalysisSummary = storage.load(SUMMARY_FILE).await.unwrap();
    assert_eq!(summary, outcome.summary);

    // Results exist now, so nothing has to run.
    assert!(!ensure_data(&config, None).await.unwrap());
}

#[tokio::test]
async fn sqlite_store_feeds_the_same_ranking() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let inserted = save_to_sqlite(&config.paths.database(), &sample_prices())
        .await
        .unwrap();
    assert_eq!(inserted, 240);

    let table = load_prices(&config.paths, DataSource::Sqlite).await.unwrap();
    assert_eq!(table.len(), 240);
    assert_eq!(table.coin_count(), 4);

    let outcome = run_analysis(&config, DataSource::Sqlite).await.unwrap();
    assert_eq!(outcome.ranking[3].coin_id, "coin-c");
}

#[tokio::test]
async fn nothing_to_rank_writes_no_results() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    save_to_csv(&config.paths.prices_csv(), always_rising().rows())
        .await
        .unwrap();

    let outcome = run_analysis(&config, DataSource::Csv).await.unwrap();
    assert!(outcome.ranking.is_empty());
    assert_eq!(outcome.summary.total_coins, 0);
    assert!(outcome.summary.details.is_none());
    assert!(!config.paths.results_csv().exists());
}

#[tokio::test]
async fn missing_data_is_a_hard_error() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir.path().join("nowhere"));

    let err = run_analysis(&config, DataSource::Sqlite).await.unwrap_err();
    assert!(matches!(err, ScreenerError::NoDataSource { .. }));
}
