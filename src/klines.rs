use crate::error::{Result, ScreenerError};
use crate::models::{CoinListing, PriceObservation, deserialize_f64_lenient};
use crate::storage_utils::FetchConfig;
use chrono::{DateTime, Days, NaiveDate, Utc};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

const DAY_MS: i64 = 86_400_000;

static BAN_UNTIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"until\s+(\d+)").expect("valid ban regex"));

const KLINE_KEYS: &[&str] = &[
    "openTime",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "closeTime",
    "quoteAssetVolume",
    "numberOfTrades",
    "takerBuyBaseAssetVolume",
    "takerBuyQuoteAssetVolume",
    "ignore",
];

#[derive(Deserialize, Debug, Clone)]
pub struct InputKline {
    #[serde(rename = "openTime")]
    pub open_time: i64,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub high: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub low: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub close: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub volume: Option<f64>,
}

/// Binance returns candles as positional arrays; name the positions and drop
/// rows that do not parse.
fn parse_klines(raw_klines: Vec<Vec<Value>>) -> Vec<InputKline> {
    raw_klines
        .into_iter()
        .filter_map(|k| {
            let map: Map<String, Value> = KLINE_KEYS
                .iter()
                .zip(k)
                .map(|(&key, val)| (key.to_string(), val))
                .collect();
            serde_json::from_value(Value::Object(map)).ok()
        })
        .collect()
}

fn backoff_delay(config: &FetchConfig, attempt: u32) -> Duration {
    Duration::from_secs(
        config
            .retry_backoff_base
            .saturating_pow(attempt)
            .saturating_mul(config.retry_base_delay_secs),
    )
}

/// How long an IP ban reported as `-1003 ... until <ms>` still lasts, plus 5s.
fn ban_wait(body: &str, now_ms: i64) -> Option<Duration> {
    if !body.contains("-1003") {
        return None;
    }
    let ban_until: i64 = BAN_UNTIL.captures(body)?.get(1)?.as_str().parse().ok()?;
    if ban_until <= now_ms {
        return None;
    }
    let wait_sec = (ban_until - now_ms) as f64 / 1000.0 + 5.0;
    Some(Duration::from_secs_f64(wait_sec))
}

/// One page of daily candles starting at `since_ms`, retried on transport
/// errors, 5xx answers and rate-limit bans.
async fn fetch_kline_page(
    client: &Client,
    config: &FetchConfig,
    pair: &str,
    since_ms: i64,
) -> Result<Vec<InputKline>> {
    let url = format!("{}/api/v3/klines", config.base_url.trim_end_matches('/'));
    let query = [
        ("symbol", pair.to_string()),
        ("interval", config.interval.clone()),
        ("startTime", since_ms.to_string()),
        ("limit", config.candle_limit.to_string()),
    ];

    for attempt in 0..config.max_retries {
        let delay = backoff_delay(config, attempt);

        match client.get(&url).query(&query).send().await {
            Ok(response) => {
                let status = response.status();

                if status == StatusCode::IM_A_TEAPOT || status == StatusCode::TOO_MANY_REQUESTS {
                    let body = response.text().await.unwrap_or_default();
                    let wait = ban_wait(&body, Utc::now().timestamp_millis()).unwrap_or(delay);
                    warn!(
                        "Rate limited fetching {} ({}). Waiting {:.0}s (attempt {}/{})",
                        pair,
                        status,
                        wait.as_secs_f64(),
                        attempt + 1,
                        config.max_retries
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }

                if status.is_server_error() {
                    warn!(
                        "Exchange error fetching {}: {}. Retrying in {}s (attempt {}/{})",
                        pair,
                        status,
                        delay.as_secs(),
                        attempt + 1,
                        config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                let raw_klines: Vec<Vec<Value>> = response.error_for_status()?.json().await?;
                return Ok(parse_klines(raw_klines));
            }
            Err(e) => {
                warn!(
                    "Network error fetching {}: {}. Retrying in {}s (attempt {}/{})",
                    pair,
                    e,
                    delay.as_secs(),
                    attempt + 1,
                    config.max_retries
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(ScreenerError::RetriesExhausted {
        symbol: pair.to_string(),
        attempts: config.max_retries,
    })
}

fn day_start_ms(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(0, |dt| dt.and_utc().timestamp_millis())
}

/// Turns candles into one observation per UTC day inside `[start, end]`.
/// The first candle of a day wins; candles without a close are skipped.
pub fn to_observations(
    klines: &[InputKline],
    listing: &CoinListing,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<PriceObservation> {
    let mut seen_dates = HashSet::new();

    klines
        .iter()
        .filter_map(|k| {
            let date = DateTime::from_timestamp_millis(k.open_time)?.date_naive();
            if date < start || date > end || !seen_dates.insert(date) {
                return None;
            }
            Some(PriceObservation {
                date,
                coin_id: listing.id.clone(),
                coin_name: listing.name.clone(),
                symbol: listing.symbol.clone(),
                price: k.close?,
                market_cap: None,
                volume: k.volume,
                high: k.high,
                low: k.low,
            })
        })
        .collect()
}

/// Daily history for one coin from `start` to `end` (today when `None`),
/// paging through the candle limit.
pub async fn fetch_daily_history(
    client: &Client,
    config: &FetchConfig,
    listing: &CoinListing,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<Vec<PriceObservation>> {
    let pair = listing.pair(&config.quote_asset);
    let end = end.unwrap_or_else(|| Utc::now().date_naive());
    let end_ms = end
        .checked_add_days(Days::new(1))
        .map_or(i64::MAX, day_start_ms);

    let mut all_klines: Vec<InputKline> = Vec::new();
    let mut since = day_start_ms(start);

    while since < end_ms {
        let batch = fetch_kline_page(client, config, &pair, since).await?;
        let Some(last_ts) = batch.last().map(|k| k.open_time) else {
            break;
        };
        all_klines.extend(batch);

        // Move past the last candle we received
        if last_ts < since {
            break;
        }
        since = last_ts + DAY_MS;

        tokio::time::sleep(Duration::from_millis(config.rate_limit_delay_ms)).await;
    }

    debug!("Fetched {} candles for {}", all_klines.len(), pair);
    Ok(to_observations(&all_klines, listing, start, end))
}

/// Drops non-positive prices and repeated `(coin_id, date)` pairs, keeping the first.
pub fn validate_observations(rows: Vec<PriceObservation>) -> Vec<PriceObservation> {
    let initial_len = rows.len();
    let mut seen = HashSet::new();

    let cleaned: Vec<PriceObservation> = rows
        .into_iter()
        .filter(|row| row.price > 0.0)
        .filter(|row| seen.insert((row.coin_id.clone(), row.date)))
        .collect();

    let removed = initial_len - cleaned.len();
    if removed > 0 {
        info!("Validation removed {} invalid rows", removed);
    }
    cleaned
}
