use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row, Sparkline,
        Table, TableState, Wrap,
    },
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::analysis::{FetchOptions, run_pipeline};
use crate::analyzer::{RankOptions, coin_stats, rank_by_drop_with};
use crate::export::{ExportFormat, export_results};
use crate::filter_utils::RankingFilter;
use crate::models::{AnalysisSummary, RankingRow};
use crate::price_store::{DataSource, load_prices};
use crate::price_table::PriceTable;
use crate::storage_utils::{AnalysisConfig, AppConfig};
use crate::summary::generate_summary;

const MARKET_CAP_STEPS: [Option<f64>; 4] = [None, Some(1e6), Some(1e8), Some(1e9)];
const DROP_RANGE_STEPS: [Option<(f64, f64)>; 5] = [
    None,
    Some((-100.0, -75.0)),
    Some((-75.0, -50.0)),
    Some((-50.0, -25.0)),
    Some((-25.0, 0.0)),
];

// --- Cached Rankings ---

/// Everything the dashboard renders, computed once per load.
#[derive(Debug)]
pub struct Snapshot {
    pub table: PriceTable,
    /// Top-N ranking as configured.
    pub top: Vec<RankingRow>,
    /// Every decliner, no top-N cut.
    pub all: Vec<RankingRow>,
    pub summary: AnalysisSummary,
    pub built_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn build(table: PriceTable, analysis: &AnalysisConfig) -> Self {
        let top = rank_by_drop_with(
            &table,
            RankOptions {
                top_n: analysis.top_n,
                min_data_days: analysis.min_data_days,
            },
        );
        let all = rank_by_drop_with(
            &table,
            RankOptions {
                top_n: table.coin_count(),
                min_data_days: analysis.min_data_days,
            },
        );
        let summary = generate_summary(&top);
        Self {
            table,
            top,
            all,
            summary,
            built_at: Utc::now(),
        }
    }
}

/// Time-bounded cache of the dashboard snapshot. The ranking engine itself is
/// never cached; only this presentation-side copy is.
pub struct RankingCache {
    ttl: Duration,
    entry: Option<(Instant, Arc<Snapshot>)>,
}

impl RankingCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// The cached snapshot if it is younger than the TTL at `now`.
    pub fn get(&self, now: Instant) -> Option<Arc<Snapshot>> {
        self.entry
            .as_ref()
            .filter(|(stored_at, _)| now.saturating_duration_since(*stored_at) < self.ttl)
            .map(|(_, snapshot)| Arc::clone(snapshot))
    }

    pub fn put(&mut self, snapshot: Snapshot, now: Instant) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.entry = Some((now, Arc::clone(&snapshot)));
        snapshot
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        self.entry.is_some() && self.get(now).is_none()
    }

    pub async fn get_or_load(&mut self, config: &AppConfig) -> Result<Arc<Snapshot>> {
        let now = Instant::now();
        if let Some(snapshot) = self.get(now) {
            return Ok(snapshot);
        }
        let table = load_prices(&config.paths, DataSource::Csv).await?;
        Ok(self.put(Snapshot::build(table, &config.analysis), now))
    }
}

// --- App State ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    TopN,
    CoinDetails,
    AllCoins,
    About,
}

const VIEWS: [View; 5] = [View::Home, View::TopN, View::CoinDetails, View::AllCoins, View::About];

impl View {
    fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::TopN => "Top N",
            View::CoinDetails => "Coin Details",
            View::AllCoins => "All Coins",
            View::About => "About",
        }
    }

    fn index(self) -> usize {
        VIEWS.iter().position(|v| *v == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    Export(ExportFormat),
}

pub struct App {
    config: AppConfig,
    cache: RankingCache,
    snapshot: Option<Arc<Snapshot>>,
    view: View,
    selected: usize,
    filter: RankingFilter,
    market_cap_step: usize,
    drop_range_step: usize,
    editing_search: bool,
    detail_coin: Option<String>,
    is_refreshing: bool,
    status: String,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let ttl = Duration::from_secs(config.dashboard.cache_ttl_secs);
        Self {
            config,
            cache: RankingCache::new(ttl),
            snapshot: None,
            view: View::Home,
            selected: 0,
            filter: RankingFilter::default(),
            market_cap_step: 0,
            drop_range_step: 0,
            editing_search: false,
            detail_coin: None,
            is_refreshing: false,
            status: String::new(),
        }
    }

    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(self.cache.put(snapshot, Instant::now()));
        self
    }

    async fn reload(&mut self) {
        match self.cache.get_or_load(&self.config).await {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.clamp_selection();
            }
            Err(e) => {
                warn!("Dashboard could not load data: {}", e);
                self.cache.invalidate();
                self.snapshot = None;
                self.status = format!("{} (press F5 to fetch)", e);
            }
        }
    }

    /// Filter for the current view. Drop ranges only apply to All Coins and
    /// market-cap floors only to Top N.
    fn active_filter(&self) -> RankingFilter {
        let mut filter = RankingFilter {
            search: self.filter.search.clone(),
            ..RankingFilter::default()
        };
        match self.view {
            View::TopN => filter.min_market_cap = MARKET_CAP_STEPS[self.market_cap_step],
            View::AllCoins => filter.drop_range = DROP_RANGE_STEPS[self.drop_range_step],
            _ => {}
        }
        filter
    }

    fn visible_rows(&self) -> Vec<&RankingRow> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        match self.view {
            View::TopN => self.active_filter().apply(&snapshot.top),
            View::AllCoins => self.active_filter().apply(&snapshot.all),
            View::Home => snapshot.top.iter().take(10).collect(),
            _ => Vec::new(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.selected = 0;
        self.editing_search = false;
    }

    fn detail_coin_id(&self) -> Option<String> {
        self.detail_coin.clone().or_else(|| {
            self.snapshot
                .as_ref()
                .and_then(|s| s.top.first().map(|row| row.coin_id.clone()))
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.editing_search {
            match key.code {
                KeyCode::Char(c) => self.filter.search.push(c),
                KeyCode::Backspace => {
                    self.filter.search.pop();
                }
                KeyCode::Enter | KeyCode::Esc => self.editing_search = false,
                _ => {}
            }
            self.clamp_selection();
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::F(5) if !self.is_refreshing => return Action::Refresh,
            KeyCode::Char('c') => return Action::Export(ExportFormat::Csv),
            KeyCode::Char('j') => return Action::Export(ExportFormat::Json),
            KeyCode::Tab => self.switch_view(VIEWS[(self.view.index() + 1) % VIEWS.len()]),
            KeyCode::BackTab => {
                self.switch_view(VIEWS[(self.view.index() + VIEWS.len() - 1) % VIEWS.len()])
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let digit = c.to_digit(10).unwrap_or(0) as usize;
                if (1..=VIEWS.len()).contains(&digit) {
                    self.switch_view(VIEWS[digit - 1]);
                }
            }
            KeyCode::Char('/') if matches!(self.view, View::TopN | View::AllCoins) => {
                self.editing_search = true;
            }
            KeyCode::Char('m') if self.view == View::TopN => {
                self.market_cap_step = (self.market_cap_step + 1) % MARKET_CAP_STEPS.len();
                self.clamp_selection();
            }
            KeyCode::Char('r') if self.view == View::AllCoins => {
                self.drop_range_step = (self.drop_range_step + 1) % DROP_RANGE_STEPS.len();
                self.clamp_selection();
            }
            KeyCode::Esc => {
                self.filter.search.clear();
                self.clamp_selection();
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let len = self.visible_rows().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(row) = self.visible_rows().get(self.selected) {
                    self.detail_coin = Some(row.coin_id.clone());
                    self.switch_view(View::CoinDetails);
                }
            }
            _ => {}
        }
        Action::None
    }

    async fn export(&mut self, format: ExportFormat) {
        let rows: Vec<RankingRow> = match self.view {
            View::TopN | View::AllCoins | View::Home => {
                self.visible_rows().into_iter().cloned().collect()
            }
            _ => self
                .snapshot
                .as_ref()
                .map(|s| s.top.clone())
                .unwrap_or_default(),
        };
        let path = self
            .config
            .paths
            .data_dir
            .join(format!("dashboard_export.{}", format.extension()));

        self.status = match export_results(&rows, format, &path).await {
            Ok(path) => format!("Exported {} rows to {}", rows.len(), path.display()),
            Err(e) => format!("Export failed: {}", e),
        };
    }
}

// --- TUI ---

pub async fn run_tui(config: AppConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, config).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, config: AppConfig) -> Result<()> {
    let (refresh_tx, mut refresh_rx) = mpsc::channel::<std::result::Result<(), String>>(1);
    let mut app = App::new(config);
    app.reload().await;

    loop {
        if app.cache.is_stale(Instant::now()) {
            app.reload().await;
        }

        terminal.draw(|f| ui(f, &app))?;

        if let Ok(result) = refresh_rx.try_recv() {
            app.is_refreshing = false;
            match result {
                Ok(()) => {
                    app.cache.invalidate();
                    app.reload().await;
                    app.status = "Data refreshed".to_string();
                }
                Err(e) => app.status = format!("Refresh failed: {}", e),
            }
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        // Resize events need no handling, the next draw picks up the new size.
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::Quit => return Ok(()),
            Action::Refresh => {
                app.is_refreshing = true;
                let config = app.config.clone();
                let tx = refresh_tx.clone();
                tokio::spawn(async move {
                    info!("Dashboard refresh started");
                    let options = FetchOptions {
                        update: true,
                        ..FetchOptions::default()
                    };
                    let result = run_pipeline(&config, &options, DataSource::Csv)
                        .await
                        .map(|_| ())
                        .map_err(|e| e.to_string());
                    let _ = tx.send(result).await;
                });
            }
            Action::Export(format) => app.export(format).await,
            Action::None => {}
        }
    }
}

fn drop_color(pct: f64) -> Color {
    if pct <= -80.0 {
        Color::Red
    } else if pct <= -50.0 {
        Color::LightRed
    } else if pct <= -25.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn ui(f: &mut Frame, app: &App) {
    let main_layout = Layout::horizontal([Constraint::Percentage(18), Constraint::Percentage(82)])
        .split(f.size());
    let right_chunks =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(main_layout[1]);

    render_sidebar(f, app, main_layout[0]);

    let updated = app
        .snapshot
        .as_ref()
        .map(|s| s.built_at.format("%d-%m-%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| "Never".to_string());
    let mut title = format!("Last Updated: {} UTC", updated);
    if !app.status.is_empty() {
        title = format!("{}  |  {}", title, app.status);
    }
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title_alignment(Alignment::Center)
            .title(title),
        right_chunks[0],
    );

    let body = right_chunks[1];
    match (&app.snapshot, app.view) {
        (_, View::About) => render_about(f, body),
        (None, _) => f.render_widget(
            Paragraph::new("No data available. Press F5 to fetch and analyze.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            body,
        ),
        (Some(snapshot), View::Home) => render_home(f, app, snapshot, body),
        (Some(_), View::TopN) | (Some(_), View::AllCoins) => render_ranking_view(f, app, body),
        (Some(snapshot), View::CoinDetails) => render_details(f, app, snapshot, body),
    }

    if app.is_refreshing {
        let area = centered_rect(60, 20, main_layout[1]);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new("Fetching prices and running analysis...\nPlease wait.")
                .block(Block::default().title("Refreshing").borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let sidebar_block = Block::default().borders(Borders::ALL).title("Altcoin Drops");
    let inner = sidebar_block.inner(area);
    f.render_widget(sidebar_block, area);

    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(8)]).split(inner);

    let view_lines: Vec<Line> = VIEWS
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let label = format!("{} {}", i + 1, view.title());
            if *view == app.view {
                Line::from(Span::styled(
                    label,
                    Style::default().fg(Color::Yellow).bg(Color::DarkGray),
                ))
            } else {
                Line::from(label)
            }
        })
        .collect();
    f.render_widget(Paragraph::new(view_lines), chunks[0]);

    let hints = vec![
        Line::from("Tab/1-5 views"),
        Line::from("Enter details"),
        Line::from("/ search  Esc clear"),
        Line::from("m mcap  r range"),
        Line::from("c csv  j json"),
        Line::from("F5 refresh  q quit"),
    ];
    f.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
}

fn ranking_table<'a>(rows: &[&'a RankingRow], title: String) -> Table<'a> {
    let header = Row::new(vec![
        Cell::from("Rank"),
        Cell::from("Coin"),
        Cell::from("Symbol"),
        Cell::from("Change (%)"),
        Cell::from("Peak"),
        Cell::from("Peak Date"),
        Cell::from("Now"),
        Cell::from("Market Cap"),
    ])
    .style(Style::default().bg(Color::DarkGray));

    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.rank.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(row.coin_name.clone()),
                Cell::from(row.symbol.to_uppercase()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format!("{:+.2}%", row.pct_change))
                    .style(Style::default().fg(drop_color(row.pct_change))),
                Cell::from(format!("${:.4}", row.peak_price)),
                Cell::from(row.peak_date.format("%Y-%m-%d").to_string()),
                Cell::from(format!("${:.4}", row.current_price)),
                Cell::from(format!("${:.0}", row.market_cap)),
            ])
            .height(1)
        })
        .collect();

    Table::new(
        body,
        [
            Constraint::Length(6),
            Constraint::Percentage(18),
            Constraint::Percentage(10),
            Constraint::Percentage(12),
            Constraint::Percentage(14),
            Constraint::Percentage(12),
            Constraint::Percentage(14),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(Block::default().borders(Borders::ALL).title(title))
}

fn render_home(f: &mut Frame, app: &App, snapshot: &Snapshot, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(8), Constraint::Min(0)]).split(area);

    let summary_text: Vec<Line> = crate::comfy_table::summary_lines(&snapshot.summary)
        .into_iter()
        .map(Line::from)
        .collect();
    f.render_widget(
        Paragraph::new(summary_text).block(Block::default().borders(Borders::ALL).title(format!(
            "Summary ({} coins tracked)",
            snapshot.table.coin_count()
        ))),
        chunks[0],
    );

    let rows = app.visible_rows();
    let mut state = TableState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(
        ranking_table(&rows, "Top 10 Biggest Drops".to_string()),
        chunks[1],
        &mut state,
    );
}

fn render_ranking_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);
    let filter = app.active_filter();

    let mut parts = vec![format!(
        "Search: {}{}",
        filter.search,
        if app.editing_search { "_" } else { "" }
    )];
    if let Some(min) = filter.min_market_cap {
        parts.push(format!("Min market cap: ${:.0}", min));
    }
    if let Some((low, high)) = filter.drop_range {
        parts.push(format!("Drop range: {:.0}% to {:.0}%", low, high));
    }
    f.render_widget(Paragraph::new(parts.join("   ")), chunks[0]);

    let rows = app.visible_rows();
    let mut title = match app.view {
        View::TopN => format!("Top {} - showing {} coins", app.config.analysis.top_n, rows.len()),
        _ => format!("All Coins - showing {} coins", rows.len()),
    };
    if filter.is_active() {
        title.push_str(" (filtered)");
    }
    let mut state = TableState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(ranking_table(&rows, title), chunks[1], &mut state);
}

fn render_details(f: &mut Frame, app: &App, snapshot: &Snapshot, area: Rect) {
    let Some(coin_id) = app.detail_coin_id() else {
        f.render_widget(Paragraph::new("No coin selected."), area);
        return;
    };
    let Some(stats) = coin_stats(&snapshot.table, &coin_id) else {
        f.render_widget(Paragraph::new(format!("No data for {}.", coin_id)), area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(7),
        Constraint::Min(8),
        Constraint::Length(6),
    ])
    .split(area);

    let metrics = vec![
        Line::from(format!(
            "Peak ${:.4} on {}    Now ${:.4} on {}",
            stats.peak_price, stats.peak_date, stats.current_price, stats.current_date
        )),
        Line::from(Span::styled(
            format!("Drop from peak: {:+.2}%", stats.drop_percentage),
            Style::default().fg(drop_color(stats.drop_percentage)),
        )),
        Line::from(format!(
            "Volatility (30d): {:.6}    Avg volume (30d): {:.2}",
            stats.volatility_30d, stats.avg_volume_30d
        )),
        Line::from(format!(
            "Market cap: ${:.0} ({:+.2}%)    Data points: {}",
            stats.market_cap, stats.market_cap_change_pct, stats.data_points
        )),
    ];
    f.render_widget(
        Paragraph::new(metrics).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ({})", stats.coin_name, stats.symbol.to_uppercase())),
        ),
        chunks[0],
    );

    let series = snapshot.table.series(&coin_id);
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.price))
        .collect();
    let peak_point: Vec<(f64, f64)> = series
        .iter()
        .position(|row| row.date == stats.peak_date)
        .map(|i| vec![(i as f64, stats.peak_price)])
        .unwrap_or_default();

    let min_price = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_price = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let first_date = series.first().map(|r| r.date.to_string()).unwrap_or_default();
    let last_date = series.last().map(|r| r.date.to_string()).unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .name("Price")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points),
        Dataset::default()
            .name("Peak")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&peak_point),
    ];
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Price History"))
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len().max(2) - 1) as f64])
                .labels(vec![Span::raw(first_date), Span::raw(last_date)]),
        )
        .y_axis(
            Axis::default()
                .bounds([min_price.min(max_price), max_price.max(min_price)])
                .labels(vec![
                    Span::raw(format!("{:.4}", min_price)),
                    Span::raw(format!("{:.4}", max_price)),
                ]),
        );
    f.render_widget(chart, chunks[1]);

    let volumes: Vec<u64> = series
        .iter()
        .rev()
        .take(60)
        .rev()
        .map(|row| row.volume.unwrap_or(0.0).max(0.0) as u64)
        .collect();
    f.render_widget(
        Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title("Trading Volume (last 60 days)"))
            .data(&volumes)
            .style(Style::default().fg(Color::Magenta)),
        chunks[2],
    );
}

fn render_about(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from("Ranks altcoins by their percentage drop from the peak daily close."),
        Line::from(""),
        Line::from("Data: daily candles of the top altcoins by quote volume on Binance,"),
        Line::from("excluding BTC, ETH and stablecoins."),
        Line::from(""),
        Line::from("Drop = (current - peak) / peak * 100, rounded to 2 decimals."),
        Line::from("Coins with fewer than the minimum days of history, non-positive"),
        Line::from("prices, or no drop from their peak are not ranked."),
        Line::from(""),
        Line::from("Not financial advice."),
    ];
    f.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("About")),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
