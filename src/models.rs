use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One coin on one calendar day, as stored in the `prices` table.
///
/// Field order matches the column order of the flat file and the SQLite table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceObservation {
    #[serde(deserialize_with = "deserialize_date_lenient")]
    pub date: NaiveDate,
    pub coin_id: String,
    pub coin_name: String,
    pub symbol: String,
    /// `NaN` when the stored cell is blank.
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub high: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_f64_lenient")]
    pub low: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PeakInfo {
    pub price: f64,
    pub date: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CoinStatistics {
    pub coin_id: String,
    pub coin_name: String,
    pub symbol: String,
    pub peak_price: f64,
    pub peak_date: NaiveDate,
    pub current_price: f64,
    pub current_date: NaiveDate,
    pub drop_percentage: f64,
    pub volatility_30d: f64,
    pub avg_volume_30d: f64,
    pub market_cap: f64,
    pub market_cap_change_pct: f64,
    pub data_points: usize,
}

/// A ranked decliner. `rank` is 1-based, rank 1 is the biggest drop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub rank: usize,
    pub coin_id: String,
    pub coin_name: String,
    pub symbol: String,
    pub peak_price: f64,
    pub peak_date: NaiveDate,
    pub current_price: f64,
    pub current_date: NaiveDate,
    pub pct_change: f64,
    pub market_cap: f64,
    pub volume: f64,
}

/// Aggregates over a ranking. An empty ranking carries only `total_coins: 0`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub total_coins: usize,
    #[serde(flatten)]
    pub details: Option<SummaryDetails>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SummaryDetails {
    pub avg_drop_pct: f64,
    pub median_drop_pct: f64,
    pub worst_drop_pct: f64,
    pub best_drop_pct: f64,
    pub total_market_cap: f64,
    pub biggest_loser: String,
    pub biggest_loser_drop: f64,
}

/// A tradable altcoin discovered on the exchange.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CoinListing {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

impl CoinListing {
    /// Listing for a bare base asset, e.g. `"sol"` -> `SOL`.
    pub fn from_base(base: &str) -> Self {
        let base = base.trim().to_uppercase();
        Self {
            id: base.clone(),
            symbol: base.clone(),
            name: base,
        }
    }

    pub fn pair(&self, quote_asset: &str) -> String {
        format!("{}{}", self.symbol, quote_asset)
    }
}

// --- Lenient Deserialization ---

struct LenientF64Visitor;

impl<'de> Visitor<'de> for LenientF64Visitor {
    type Value = Option<f64>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a float, an integer, or a string representing a number")
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let v = v.trim();
        if v.is_empty() || v.eq_ignore_ascii_case("nan") {
            Ok(None)
        } else {
            v.parse::<f64>().map(Some).map_err(E::custom)
        }
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientF64Visitor)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }
}

pub(crate) fn deserialize_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientF64Visitor)
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_f64_lenient(deserializer)?.unwrap_or(f64::NAN))
}

/// Parses `YYYY-MM-DD`, ignoring any time suffix such as ` 00:00:00` or `T00:00:00`.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn deserialize_date_lenient<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date_lenient(&raw).ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_with_time_suffix_is_accepted() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(parse_date_lenient("2025-03-01"), Some(expected));
        assert_eq!(parse_date_lenient("2025-03-01 00:00:00"), Some(expected));
        assert_eq!(parse_date_lenient("2025-03-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_date_lenient("03/01/2025"), None);
    }

    #[test]
    fn csv_row_with_blank_and_integer_cells() {
        let data = "date,coin_id,coin_name,symbol,price,market_cap,volume,high,low\n\
                    2025-01-01,SOL,SOL,SOL,100,0,,102.5,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: PriceObservation = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(row.price, 100.0);
        assert_eq!(row.market_cap, Some(0.0));
        assert_eq!(row.volume, None);
        assert_eq!(row.high, Some(102.5));
        assert_eq!(row.low, None);
    }

    #[test]
    fn blank_price_reads_as_nan() {
        let data = "date,coin_id,coin_name,symbol,price\n2025-01-29,sol,SOL,sol,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: PriceObservation = reader.deserialize().next().unwrap().unwrap();
        assert!(row.price.is_nan());
    }

    #[test]
    fn csv_row_without_optional_columns() {
        let data = "date,coin_id,coin_name,symbol,price\n2025-01-01,ADA,Cardano,ada,0.75\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: PriceObservation = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(row.coin_name, "Cardano");
        assert_eq!(row.market_cap, None);
        assert_eq!(row.high, None);
    }

    #[test]
    fn empty_summary_serializes_count_only() {
        let summary = AnalysisSummary {
            total_coins: 0,
            details: None,
        };
        assert_eq!(serde_json::to_string(&summary).unwrap(), r#"{"total_coins":0}"#);
    }

    #[test]
    fn listing_from_base_is_uppercased() {
        let listing = CoinListing::from_base("sol");
        assert_eq!(listing.id, "SOL");
        assert_eq!(listing.pair("USDT"), "SOLUSDT");
    }
}
