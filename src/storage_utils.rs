use crate::analyzer::{MIN_DATA_DAYS, TOP_N_RANKING};
use crate::error::Result;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

// CONFIGURATION STRUCTS
// Every field has a default so a partial config.json is enough.

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub database_path: Option<PathBuf>, // defaults to <data_dir>/altcoins.db
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database_path: None,
        }
    }
}

impl PathsConfig {
    pub fn prices_csv(&self) -> PathBuf {
        self.data_dir.join("altcoin_prices.csv")
    }

    pub fn database(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("altcoins.db"))
    }

    pub fn results_csv(&self) -> PathBuf {
        self.data_dir.join("analysis_results.csv")
    }

    pub fn results_json(&self) -> PathBuf {
        self.data_dir.join("analysis_results.json")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,    // e.g., "https://api.binance.com"
    pub quote_asset: String, // e.g., "USDT"
    pub interval: String,    // e.g., "1d"
    pub start_date: String,  // YYYY-MM-DD
    pub candle_limit: u32,   // max candles per request
    pub max_retries: u32,
    pub retry_backoff_base: u64,
    pub retry_base_delay_secs: u64,
    pub rate_limit_delay_ms: u64,
    pub batch_size: usize, // coins fetched concurrently
    pub default_coin_limit: usize,
    pub exclude_symbols: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            quote_asset: "USDT".to_string(),
            interval: "1d".to_string(),
            start_date: "2025-01-01".to_string(),
            candle_limit: 500,
            max_retries: 3,
            retry_backoff_base: 2,
            retry_base_delay_secs: 5,
            rate_limit_delay_ms: 100,
            batch_size: 10,
            default_coin_limit: 200,
            exclude_symbols: [
                "BTC", "ETH", "USDT", "USDC", "DAI", "BUSD", "TUSD", "USDD", "FRAX", "USDP",
                "FDUSD", "USDE", "USD", "PYUSD",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_data_days: usize,
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_data_days: MIN_DATA_DAYS,
            top_n: TOP_N_RANKING,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub cache_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    // Nested structs organize the config logically
    pub paths: PathsConfig,
    pub fetch: FetchConfig,
    pub analysis: AnalysisConfig,
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Reads a JSON config file, falling back to defaults when it does not exist.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            return Ok(Self::default());
        }
        let content = fs::read(path).await?;
        let config = serde_json::from_slice(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

/// Writes through a `.tmp` sibling and renames it into place, creating parent
/// directories as needed. A crash mid-write leaves the previous file intact.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

// STORAGE MANAGER

pub struct AsyncStorageManager {
    pub base_dir: PathBuf,
}

impl AsyncStorageManager {
    /// Creates the manager and its directory up front, so saves never have to
    /// check for it.
    pub async fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir).await?;
        }
        Ok(Self { base_dir })
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", filename))
    }

    /// Saves any `Serialize` value as pretty JSON under `<base_dir>/<filename>.json`.
    pub async fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        let json_bytes = serde_json::to_vec_pretty(data)?;
        write_atomic(&self.path_for(filename), &json_bytes).await
    }

    pub async fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        // serde_json validates the bytes itself, no need for read_to_string.
        let content = fs::read(self.path_for(filename)).await?;
        Ok(serde_json::from_slice(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisSummary;

    #[test]
    fn default_paths_live_under_data_dir() {
        let paths = PathsConfig::default();
        assert_eq!(paths.prices_csv(), PathBuf::from("data/altcoin_prices.csv"));
        assert_eq!(paths.database(), PathBuf::from("data/altcoins.db"));
        assert_eq!(paths.results_csv(), PathBuf::from("data/analysis_results.csv"));
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"analysis": {"top_n": 10}, "fetch": {"quote_asset": "USDC"}}"#)
                .unwrap();
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.analysis.min_data_days, 30);
        assert_eq!(config.fetch.quote_asset, "USDC");
        assert_eq!(config.fetch.candle_limit, 500);
        assert!(config.fetch.exclude_symbols.contains(&"PYUSD".to_string()));
    }

    #[tokio::test]
    async fn missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("nope.json"))
            .await
            .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn save_then_load_through_manager() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AsyncStorageManager::new(dir.path().join("nested")).await.unwrap();
        let summary = AnalysisSummary {
            total_coins: 0,
            details: None,
        };

        storage.save("summary", &summary).await.unwrap();
        let loaded: AnalysisSummary = storage.load("summary").await.unwrap();

        assert_eq!(loaded, summary);
        assert!(!storage.base_dir.join("summary.json.tmp").exists());
    }
}
