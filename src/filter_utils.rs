use crate::models::RankingRow;

/// Dashboard-side narrowing of a ranking. Ranks are left untouched so a
/// filtered row still shows its place in the full ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingFilter {
    /// Case-insensitive substring of the coin name or symbol.
    pub search: String,
    pub min_market_cap: Option<f64>,
    /// Inclusive `(low, high)` bounds on `pct_change`.
    pub drop_range: Option<(f64, f64)>,
}

impl RankingFilter {
    pub fn matches(&self, row: &RankingRow) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty()
            && !row.coin_name.to_lowercase().contains(&needle)
            && !row.symbol.to_lowercase().contains(&needle)
        {
            return false;
        }

        if let Some(min) = self.min_market_cap {
            if row.market_cap < min {
                return false;
            }
        }

        if let Some((low, high)) = self.drop_range {
            if row.pct_change < low || row.pct_change > high {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, rows: &'a [RankingRow]) -> Vec<&'a RankingRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.min_market_cap.is_some() || self.drop_range.is_some()
    }
}
