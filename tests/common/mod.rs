#![allow(dead_code)]

use altcoin_drop_screener::analyzer::round_dp;
use altcoin_drop_screener::models::PriceObservation;
use altcoin_drop_screener::price_table::PriceTable;
use chrono::{Days, NaiveDate};

pub fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Days::new(offset)
}

pub fn observation(coin_id: &str, date: NaiveDate, price: f64) -> PriceObservation {
    PriceObservation {
        date,
        coin_id: coin_id.to_string(),
        coin_name: coin_id.to_string(),
        symbol: coin_id.to_string(),
        price,
        market_cap: Some(round_dp(price * 1_000_000.0, 2)),
        volume: Some(round_dp(price * 500_000.0, 2)),
        high: Some(round_dp(price * 1.02, 4)),
        low: Some(round_dp(price * 0.98, 4)),
    }
}

/// Four coins over 60 days, rising linearly to a peak on day 20 and then
/// declining linearly toward the end price.
pub fn sample_prices() -> Vec<PriceObservation> {
    let coins = [
        ("coin-a", "Coin A", "ca", 100.0, 250.0, 80.0),
        ("coin-b", "Coin B", "cb", 50.0, 200.0, 50.0),
        ("coin-c", "Coin C", "cc", 10.0, 50.0, 45.0),
        ("coin-d", "Coin D", "cd", 1.0, 5.0, 0.5),
    ];

    let mut rows = Vec::new();
    for (coin_id, name, symbol, start, peak, end) in coins {
        for d in 0..60u64 {
            let t = d as f64;
            let price = if d <= 20 {
                start + (peak - start) * (t / 20.0)
            } else {
                peak - (peak - end) * ((t - 20.0) / 40.0)
            };
            let mut row = observation(coin_id, day(d), round_dp(price, 4));
            row.coin_name = name.to_string();
            row.symbol = symbol.to_string();
            rows.push(row);
        }
    }
    rows
}

pub fn sample_table() -> PriceTable {
    PriceTable::new(sample_prices())
}

pub fn single_record() -> PriceTable {
    PriceTable::new(vec![observation("test-coin", day(59), 100.0)])
}

pub fn always_rising() -> PriceTable {
    PriceTable::new((0..60).map(|d| observation("moon", day(d), 1.0 + d as f64)).collect())
}
