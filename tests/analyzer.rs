mod common;

use altcoin_drop_screener::analyzer::{coin_stats, find_peak, rank_by_drop};
use altcoin_drop_screener::price_table::PriceTable;
use altcoin_drop_screener::summary::generate_summary;
use common::{always_rising, day, sample_prices, sample_table, single_record};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn sample_coins_rank_by_severity_of_drop() {
    let ranking = rank_by_drop(&sample_table(), 50);
    let ids: Vec<&str> = ranking.iter().map(|r| r.coin_id.as_str()).collect();
    assert_eq!(ids, vec!["coin-d", "coin-b", "coin-a", "coin-c"]);

    assert!(approx(ranking[0].pct_change, -87.75));
    assert!(approx(ranking[3].pct_change, -9.75));
    assert!(ranking.windows(2).all(|w| w[0].pct_change <= w[1].pct_change));
    assert!(ranking.iter().all(|r| r.pct_change < 0.0));
}

#[test]
fn ranks_are_one_based_and_contiguous() {
    let ranking = rank_by_drop(&sample_table(), 50);
    let ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, (1..=ranking.len()).collect::<Vec<_>>());
}

#[test]
fn ranking_truncates_to_top_n() {
    let table = sample_table();
    for k in 0..6 {
        assert!(rank_by_drop(&table, k).len() <= k);
    }
    let top_two = rank_by_drop(&table, 2);
    assert_eq!(top_two[1].coin_id, "coin-b");
}

#[test]
fn ranking_is_idempotent() {
    let table = sample_table();
    assert_eq!(rank_by_drop(&table, 50), rank_by_drop(&table, 50));
}

#[test]
fn rising_coin_and_short_history_are_not_ranked() {
    assert!(rank_by_drop(&always_rising(), 50).is_empty());
    assert!(rank_by_drop(&single_record(), 50).is_empty());
    assert!(rank_by_drop(&PriceTable::default(), 50).is_empty());
}

#[test]
fn input_order_does_not_change_peak_of_sample() {
    let mut rows = sample_prices();
    rows.reverse();
    let peak = find_peak(&PriceTable::new(rows), "coin-a").unwrap();
    assert_eq!(peak.price, 250.0);
    assert_eq!(peak.date, day(20));
}

#[test]
fn coin_stats_cover_the_whole_series() {
    let stats = coin_stats(&sample_table(), "coin-a").unwrap();
    assert_eq!(stats.peak_price, 250.0);
    assert_eq!(stats.peak_date, day(20));
    assert!(approx(stats.current_price, 84.25));
    assert_eq!(stats.current_date, day(59));
    assert!(approx(stats.drop_percentage, -66.3));
    assert_eq!(stats.data_points, 60);
    assert!(stats.volatility_30d > 0.0);
    assert!(stats.market_cap_change_pct < 0.0);

    assert!(coin_stats(&sample_table(), "missing").is_none());
}

#[test]
fn summary_of_sample_ranking() {
    let ranking = rank_by_drop(&sample_table(), 50);
    let summary = generate_summary(&ranking);
    assert_eq!(summary.total_coins, 4);

    let details = summary.details.unwrap();
    assert_eq!(details.biggest_loser, "Coin D");
    assert!(approx(details.worst_drop_pct, -87.75));
    assert!(approx(details.best_drop_pct, -9.75));
}
