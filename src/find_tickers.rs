use crate::error::Result;
use crate::models::{CoinListing, deserialize_f64_lenient};
use crate::storage_utils::FetchConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize, Debug, Clone)]
pub struct Ticker24h {
    pub symbol: String,
    #[serde(rename = "quoteVolume", default, deserialize_with = "deserialize_f64_lenient")]
    pub quote_volume: Option<f64>,
}

/// Top altcoins by quote volume. Pairs outside the quote asset and excluded
/// bases (BTC, ETH, stablecoins) are dropped.
pub fn select_top_altcoins(
    tickers: &[Ticker24h],
    config: &FetchConfig,
    limit: usize,
) -> Vec<CoinListing> {
    let mut candidates: Vec<(&str, f64)> = tickers
        .iter()
        .filter_map(|ticker| {
            let base = ticker.symbol.strip_suffix(config.quote_asset.as_str())?;
            if base.is_empty() || config.exclude_symbols.iter().any(|s| s == base) {
                return None;
            }
            Some((base, ticker.quote_volume.unwrap_or(0.0)))
        })
        .collect();

    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    candidates
        .into_iter()
        .take(limit)
        .map(|(base, _)| CoinListing::from_base(base))
        .collect()
}

pub async fn fetch_top_altcoins(
    client: &Client,
    config: &FetchConfig,
    limit: usize,
) -> Result<Vec<CoinListing>> {
    info!("Fetching all tickers to find top {} altcoins by volume...", limit);

    let url = format!("{}/api/v3/ticker/24hr", config.base_url.trim_end_matches('/'));
    let tickers: Vec<Ticker24h> = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let coins = select_top_altcoins(&tickers, config, limit);
    info!("Found {} altcoins", coins.len());
    Ok(coins)
}
