//! Peak detection, drop percentages, per-coin statistics and the drop ranking.
//!
//! Every function here is a pure read of a [`PriceTable`]. Nothing is cached.

use crate::models::{CoinStatistics, PeakInfo, PriceObservation, RankingRow};
use crate::price_table::PriceTable;
use statrs::statistics::Statistics;
use tracing::debug;

/// Coins with fewer observations than this are left out of the ranking.
pub const MIN_DATA_DAYS: usize = 30;
/// Default length of the ranking.
pub const TOP_N_RANKING: usize = 50;
/// Observations used for the short-horizon statistics.
pub const TRAILING_WINDOW: usize = 30;

/// Cut-offs applied by [`rank_by_drop_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    pub top_n: usize,
    pub min_data_days: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: TOP_N_RANKING,
            min_data_days: MIN_DATA_DAYS,
        }
    }
}

/// Rounds half away from zero to `places` decimals.
pub fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// First row holding the maximum price, in the order given.
fn peak_row<'a>(rows: &[&'a PriceObservation]) -> Option<&'a PriceObservation> {
    rows.iter()
        .copied()
        .filter(|row| !row.price.is_nan())
        .fold(None, |best: Option<&'a PriceObservation>, row| match best {
            Some(b) if row.price <= b.price => Some(b),
            _ => Some(row),
        })
}

/// First row holding the latest date, in the order given.
fn latest_row<'a>(rows: &[&'a PriceObservation]) -> Option<&'a PriceObservation> {
    rows.iter()
        .copied()
        .fold(None, |best: Option<&'a PriceObservation>, row| match best {
            Some(b) if row.date <= b.date => Some(b),
            _ => Some(row),
        })
}

/// The highest-priced observation of a coin. Ties go to the row seen first in
/// table order, not the earliest date.
pub fn find_peak(table: &PriceTable, coin_id: &str) -> Option<PeakInfo> {
    peak_row(&table.observations(coin_id)).map(|row| PeakInfo {
        price: row.price,
        date: row.date,
    })
}

/// Price on the latest recorded day, or `0.0` when the coin has no data.
pub fn current_price(table: &PriceTable, coin_id: &str) -> f64 {
    latest_row(&table.observations(coin_id)).map_or(0.0, |row| row.price)
}

/// Signed percentage change from `peak_price` to `current_price`, rounded to
/// two decimals. Negative means a decline. A non-positive peak yields `0.0`.
pub fn drop_percentage(peak_price: f64, current_price: f64) -> f64 {
    if peak_price <= 0.0 {
        return 0.0;
    }
    round_dp(((current_price - peak_price) / peak_price) * 100.0, 2)
}

pub fn coin_stats(table: &PriceTable, coin_id: &str) -> Option<CoinStatistics> {
    let peak = peak_row(&table.observations(coin_id))?;
    let series = table.series(coin_id);
    let first = *series.first()?;
    let latest = *series.last()?;

    let trailing = &series[series.len().saturating_sub(TRAILING_WINDOW)..];

    let prices: Vec<f64> = trailing
        .iter()
        .map(|row| row.price)
        .filter(|price| !price.is_nan())
        .collect();
    let volatility = if prices.len() >= 2 {
        prices.iter().std_dev()
    } else {
        0.0
    };

    let volumes: Vec<f64> = trailing.iter().filter_map(|row| row.volume).collect();
    let avg_volume = if volumes.is_empty() {
        0.0
    } else {
        volumes.iter().mean()
    };

    let first_mc = first.market_cap.unwrap_or(0.0);
    let latest_mc = latest.market_cap.unwrap_or(0.0);
    let market_cap_change_pct = if first_mc > 0.0 {
        round_dp(((latest_mc - first_mc) / first_mc) * 100.0, 2)
    } else {
        0.0
    };

    Some(CoinStatistics {
        coin_id: coin_id.to_string(),
        coin_name: peak.coin_name.clone(),
        symbol: peak.symbol.clone(),
        peak_price: peak.price,
        peak_date: peak.date,
        current_price: latest.price,
        current_date: latest.date,
        drop_percentage: drop_percentage(peak.price, latest.price),
        volatility_30d: round_dp(volatility, 6),
        avg_volume_30d: round_dp(avg_volume, 2),
        market_cap: latest_mc,
        market_cap_change_pct,
        data_points: series.len(),
    })
}

/// Ranks coins by their drop from peak, biggest drop first, keeping `top_n`.
pub fn rank_by_drop(table: &PriceTable, top_n: usize) -> Vec<RankingRow> {
    rank_by_drop_with(
        table,
        RankOptions {
            top_n,
            ..RankOptions::default()
        },
    )
}

pub fn rank_by_drop_with(table: &PriceTable, options: RankOptions) -> Vec<RankingRow> {
    let mut results = Vec::new();

    for coin_id in table.coin_ids() {
        let rows = table.observations(coin_id);

        if rows.len() < options.min_data_days {
            debug!("Skipping {}: only {} data points", coin_id, rows.len());
            continue;
        }

        let (Some(peak), Some(latest)) = (peak_row(&rows), latest_row(&rows)) else {
            continue;
        };

        if peak.price <= 0.0 || latest.price <= 0.0 {
            debug!("Skipping {}: non-positive price", coin_id);
            continue;
        }

        let pct_change = drop_percentage(peak.price, latest.price);

        // Only coins that actually dropped are ranked.
        if pct_change >= 0.0 || pct_change.is_nan() {
            debug!("Skipping {}: no drop ({:+.2}%)", coin_id, pct_change);
            continue;
        }

        results.push(RankingRow {
            rank: 0,
            coin_id: coin_id.to_string(),
            coin_name: peak.coin_name.clone(),
            symbol: peak.symbol.clone(),
            peak_price: peak.price,
            peak_date: peak.date,
            current_price: latest.price,
            current_date: latest.date,
            pct_change,
            market_cap: latest.market_cap.unwrap_or(0.0),
            volume: latest.volume.unwrap_or(0.0),
        });
    }

    // Stable, so equal drops keep first-seen coin order.
    results.sort_by(|a, b| a.pct_change.total_cmp(&b.pct_change));
    results.truncate(options.top_n);

    for (i, row) in results.iter_mut().enumerate() {
        row.rank = i + 1;
    }

    results
}
