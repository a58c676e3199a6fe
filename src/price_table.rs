//! The observation table the ranking engine reads from.
//!
//! Rows keep the order they were given in. Each coin id maps to the positions
//! of its rows in that order, and coins are enumerated in first-seen order so
//! every scan over the table is deterministic.

use crate::models::PriceObservation;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    rows: Vec<PriceObservation>,
    coin_order: Vec<String>,
    index: HashMap<String, Vec<usize>>,
}

impl PriceTable {
    pub fn new(rows: Vec<PriceObservation>) -> Self {
        let mut coin_order = Vec::new();
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, row) in rows.iter().enumerate() {
            match index.get_mut(&row.coin_id) {
                Some(positions) => positions.push(pos),
                None => {
                    coin_order.push(row.coin_id.clone());
                    index.insert(row.coin_id.clone(), vec![pos]);
                }
            }
        }

        Self {
            rows,
            coin_order,
            index,
        }
    }

    /// Builds the table sorted by `(coin_id, date)`, the order the loaders hand out.
    pub fn sorted(mut rows: Vec<PriceObservation>) -> Self {
        rows.sort_by(|a, b| a.coin_id.cmp(&b.coin_id).then(a.date.cmp(&b.date)));
        Self::new(rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[PriceObservation] {
        &self.rows
    }

    pub fn coin_count(&self) -> usize {
        self.coin_order.len()
    }

    /// Distinct coin ids in first-seen order.
    pub fn coin_ids(&self) -> impl Iterator<Item = &str> {
        self.coin_order.iter().map(String::as_str)
    }

    pub fn observation_count(&self, coin_id: &str) -> usize {
        self.index.get(coin_id).map_or(0, Vec::len)
    }

    /// A coin's observations in table order. Empty for unknown coins.
    pub fn observations(&self, coin_id: &str) -> Vec<&PriceObservation> {
        self.index
            .get(coin_id)
            .map(|positions| positions.iter().map(|&pos| &self.rows[pos]).collect())
            .unwrap_or_default()
    }

    /// A coin's observations ordered by date ascending.
    pub fn series(&self, coin_id: &str) -> Vec<&PriceObservation> {
        let mut series = self.observations(coin_id);
        series.sort_by_key(|row| row.date);
        series
    }
}

impl From<Vec<PriceObservation>> for PriceTable {
    fn from(rows: Vec<PriceObservation>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(coin_id: &str, day: u32, price: f64) -> PriceObservation {
        PriceObservation {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            coin_id: coin_id.to_string(),
            coin_name: coin_id.to_uppercase(),
            symbol: coin_id.to_string(),
            price,
            market_cap: None,
            volume: None,
            high: None,
            low: None,
        }
    }

    #[test]
    fn coins_are_listed_in_first_seen_order() {
        let table = PriceTable::new(vec![
            obs("zeta", 1, 1.0),
            obs("alpha", 1, 2.0),
            obs("zeta", 2, 3.0),
        ]);
        let ids: Vec<&str> = table.coin_ids().collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        assert_eq!(table.observation_count("zeta"), 2);
        assert_eq!(table.observation_count("missing"), 0);
    }

    #[test]
    fn series_is_date_ordered_while_observations_keep_table_order() {
        let table = PriceTable::new(vec![obs("a", 3, 3.0), obs("a", 1, 1.0), obs("a", 2, 2.0)]);

        let table_order: Vec<f64> = table.observations("a").iter().map(|r| r.price).collect();
        let date_order: Vec<f64> = table.series("a").iter().map(|r| r.price).collect();

        assert_eq!(table_order, vec![3.0, 1.0, 2.0]);
        assert_eq!(date_order, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sorted_orders_by_coin_then_date() {
        let table = PriceTable::sorted(vec![obs("b", 2, 1.0), obs("a", 2, 1.0), obs("a", 1, 1.0)]);
        let keys: Vec<(String, u32)> = table
            .rows()
            .iter()
            .map(|r| (r.coin_id.clone(), chrono::Datelike::day(&r.date)))
            .collect();
        assert_eq!(
            keys,
            vec![("a".to_string(), 1), ("a".to_string(), 2), ("b".to_string(), 2)]
        );
    }
}
