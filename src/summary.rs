use crate::analyzer::round_dp;
use crate::models::{AnalysisSummary, RankingRow, SummaryDetails};
use statrs::statistics::{Data, Median, Statistics};

/// Aggregates a ranking. Percentages are rounded to two decimals; the biggest
/// loser is the first row, so the input is expected in rank order.
pub fn generate_summary(ranking: &[RankingRow]) -> AnalysisSummary {
    let Some(leader) = ranking.first() else {
        return AnalysisSummary {
            total_coins: 0,
            details: None,
        };
    };

    let changes: Vec<f64> = ranking.iter().map(|row| row.pct_change).collect();
    let worst = changes.iter().copied().fold(f64::INFINITY, f64::min);
    let best = changes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let total_market_cap: f64 = ranking.iter().map(|row| row.market_cap).sum();

    AnalysisSummary {
        total_coins: ranking.len(),
        details: Some(SummaryDetails {
            avg_drop_pct: round_dp(changes.iter().mean(), 2),
            median_drop_pct: round_dp(Data::new(changes.clone()).median(), 2),
            worst_drop_pct: round_dp(worst, 2),
            best_drop_pct: round_dp(best, 2),
            total_market_cap: round_dp(total_market_cap, 2),
            biggest_loser: leader.coin_name.clone(),
            biggest_loser_drop: round_dp(leader.pct_change, 2),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(rank: usize, name: &str, pct_change: f64, market_cap: f64) -> RankingRow {
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        RankingRow {
            rank,
            coin_id: name.to_lowercase(),
            coin_name: name.to_string(),
            symbol: name.to_lowercase(),
            peak_price: 10.0,
            peak_date: day,
            current_price: 5.0,
            current_date: day,
            pct_change,
            market_cap,
            volume: 0.0,
        }
    }

    #[test]
    fn empty_ranking_reports_zero_count_only() {
        let summary = generate_summary(&[]);
        assert_eq!(summary.total_coins, 0);
        assert!(summary.details.is_none());
    }

    #[test]
    fn aggregates_over_ranked_rows() {
        let ranking = vec![
            row(1, "Deep", -80.0, 100.0),
            row(2, "Mid", -50.0, 200.5),
            row(3, "Mild", -20.0, 300.0),
            row(4, "Tiny", -10.0, 0.0),
        ];
        let summary = generate_summary(&ranking);
        let details = summary.details.unwrap();

        assert_eq!(summary.total_coins, 4);
        assert_eq!(details.avg_drop_pct, -40.0);
        assert_eq!(details.median_drop_pct, -35.0);
        assert_eq!(details.worst_drop_pct, -80.0);
        assert_eq!(details.best_drop_pct, -10.0);
        assert_eq!(details.total_market_cap, 600.5);
        assert_eq!(details.biggest_loser, "Deep");
        assert_eq!(details.biggest_loser_drop, -80.0);
    }

    #[test]
    fn single_row_summary() {
        let details = generate_summary(&[row(1, "Solo", -12.345, 1.0)]).details.unwrap();
        assert_eq!(details.median_drop_pct, details.avg_drop_pct);
        assert_eq!(details.worst_drop_pct, details.best_drop_pct);
    }
}
