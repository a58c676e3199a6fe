use crate::models::{AnalysisSummary, CoinStatistics, RankingRow};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_BORDERS_ONLY,
};

/// Rows shown in the printed ranking.
pub const PRINTED_ROWS: usize = 20;

/// Dims rows as their drop gets milder relative to the biggest one.
fn get_visibility_ratio(current_pct: f64, top_pct: f64) -> f64 {
    if top_pct >= 0.0 {
        1.0
    } else {
        (0.4 + 0.6 * (current_pct / top_pct)).max(0.4)
    }
}

fn bold(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

pub fn ranking_table(ranking: &[RankingRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            bold("Rank"),
            bold("Symbol"),
            bold("Change (%)").set_alignment(CellAlignment::Right),
            bold("Peak").set_alignment(CellAlignment::Right),
            bold("Now").set_alignment(CellAlignment::Right),
            bold("Peak Date"),
        ]);

    let top_pct = ranking.first().map_or(-1.0, |row| row.pct_change);

    for row in ranking.iter().take(PRINTED_ROWS) {
        let ratio = get_visibility_ratio(row.pct_change, top_pct);
        let red_val = (255.0 * ratio) as u8;
        let cyan_val = (255.0 * ratio) as u8;

        table.add_row(vec![
            Cell::new(row.rank).fg(Color::DarkGrey),
            Cell::new(row.symbol.to_uppercase()).fg(Color::Rgb {
                r: 0,
                g: cyan_val,
                b: cyan_val,
            }),
            Cell::new(format!("{:+.1}%", row.pct_change))
                .fg(Color::Rgb {
                    r: red_val,
                    g: 0,
                    b: 0,
                })
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("${:.4}", row.peak_price)).set_alignment(CellAlignment::Right),
            Cell::new(format!("${:.4}", row.current_price)).set_alignment(CellAlignment::Right),
            Cell::new(row.peak_date.format("%Y-%m-%d")),
        ]);
    }

    table
}

pub fn summary_lines(summary: &AnalysisSummary) -> Vec<String> {
    let Some(details) = &summary.details else {
        return vec!["No coins with price drops found.".to_string()];
    };
    vec![
        format!("Coins ranked:      {}", summary.total_coins),
        format!("Average drop:      {:.2}%", details.avg_drop_pct),
        format!("Median drop:       {:.2}%", details.median_drop_pct),
        format!("Worst / best drop: {:.2}% / {:.2}%", details.worst_drop_pct, details.best_drop_pct),
        format!("Total market cap:  ${:.0}", details.total_market_cap),
        format!(
            "Biggest loser:     {} ({:.2}%)",
            details.biggest_loser, details.biggest_loser_drop
        ),
    ]
}

pub fn stats_table(stats: &CoinStatistics) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![bold(&stats.coin_name), bold(&stats.symbol.to_uppercase())]);

    let rows = [
        ("Peak price", format!("${:.4} on {}", stats.peak_price, stats.peak_date)),
        ("Current price", format!("${:.4} on {}", stats.current_price, stats.current_date)),
        ("Drop from peak", format!("{:+.2}%", stats.drop_percentage)),
        ("Volatility (30d)", format!("{:.6}", stats.volatility_30d)),
        ("Avg volume (30d)", format!("{:.2}", stats.avg_volume_30d)),
        ("Market cap", format!("${:.0}", stats.market_cap)),
        ("Market cap change", format!("{:+.2}%", stats.market_cap_change_pct)),
        ("Data points", stats.data_points.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value).set_alignment(CellAlignment::Right)]);
    }
    table
}

pub fn print_ranking(ranking: &[RankingRow], summary: &AnalysisSummary) {
    if ranking.is_empty() {
        println!("No data found.");
        return;
    }
    println!(
        "\nTop {} biggest drops from peak:\n{}",
        ranking.len().min(PRINTED_ROWS),
        ranking_table(ranking)
    );
    for line in summary_lines(summary) {
        println!("  {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::generate_summary;
    use chrono::NaiveDate;

    fn row(rank: usize, pct_change: f64) -> RankingRow {
        let day = NaiveDate::from_ymd_opt(2025, 1, 21).unwrap();
        RankingRow {
            rank,
            coin_id: format!("coin-{}", rank),
            coin_name: format!("Coin {}", rank),
            symbol: format!("c{}", rank),
            peak_price: 5.0,
            peak_date: day,
            current_price: 1.0,
            current_date: day,
            pct_change,
            market_cap: 0.0,
            volume: 0.0,
        }
    }

    #[test]
    fn milder_drops_are_dimmed_but_floored() {
        assert!((get_visibility_ratio(-90.0, -90.0) - 1.0).abs() < 1e-12);
        assert!((get_visibility_ratio(-45.0, -90.0) - 0.7).abs() < 1e-12);
        assert_eq!(get_visibility_ratio(0.0, -90.0), 0.4);
    }

    #[test]
    fn table_caps_printed_rows() {
        let ranking: Vec<RankingRow> = (1..=30).map(|i| row(i, -(100.0 - i as f64))).collect();
        let rendered = ranking_table(&ranking).to_string();
        assert!(rendered.contains("C20"));
        assert!(!rendered.contains("C21"));
    }

    #[test]
    fn summary_lines_handle_empty_ranking() {
        assert_eq!(summary_lines(&generate_summary(&[])).len(), 1);
        let lines = summary_lines(&generate_summary(&[row(1, -50.0)]));
        assert!(lines.last().unwrap().contains("Coin 1 (-50.00%)"));
    }
}
