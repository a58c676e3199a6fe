use altcoin_drop_screener::analysis::{self, FetchOptions};
use altcoin_drop_screener::analyzer::coin_stats;
use altcoin_drop_screener::comfy_table::{print_ranking, stats_table};
use altcoin_drop_screener::price_store::{DataSource, load_prices};
use altcoin_drop_screener::storage_utils::AppConfig;
use altcoin_drop_screener::tui;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "altcoin-drop-screener")]
#[command(about = "Ranks altcoins by how far they have fallen from their peak", long_about = None)]
struct Cli {
    /// JSON config file; defaults are used when it does not exist
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Directory holding prices and results
    #[arg(long, global = true, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "DATABASE_PATH")]
    database_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    Csv,
    Sqlite,
}

impl From<Source> for DataSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Csv => DataSource::Csv,
            Source::Sqlite => DataSource::Sqlite,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily prices into the CSV and SQLite stores
    Fetch {
        /// Only fetch dates not already stored
        #[arg(short, long)]
        update: bool,
        /// Base symbols to fetch instead of the top altcoins by volume
        #[arg(long, num_args = 1..)]
        coins: Vec<String>,
        /// How many top altcoins to fetch
        #[arg(short, long)]
        num_coins: Option<usize>,
    },
    /// Rank stored prices and write the results
    Analyze {
        #[arg(short, long, value_enum, default_value = "csv")]
        source: Source,
        /// Override the configured ranking length
        #[arg(short, long)]
        top_n: Option<usize>,
    },
    /// Show detailed statistics for one coin
    Stats {
        coin_id: String,
        #[arg(short, long, value_enum, default_value = "csv")]
        source: Source,
    },
    /// Interactive terminal dashboard
    Dashboard {
        /// Write logs to this file (logging is off otherwise)
        #[arg(long)]
        log_file: Option<PathBuf>,
        /// Fetch and analyze first if no results exist yet
        #[arg(long)]
        auto_fetch: bool,
    },
}

fn init_logging(command: &Option<Commands>) -> anyhow::Result<()> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match command {
        Some(Commands::Dashboard {
            log_file: Some(path),
            ..
        }) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        // Anything written to the terminal would corrupt the dashboard.
        Some(Commands::Dashboard { .. }) => {}
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter()).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.command)?;

    let mut config = AppConfig::load_or_default(&cli.config)
        .await
        .with_context(|| format!("Failed to read config {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir {
        config.paths.data_dir = dir;
    }
    if cli.database_path.is_some() {
        config.paths.database_path = cli.database_path;
    }

    match cli.command {
        Some(Commands::Fetch {
            update,
            coins,
            num_coins,
        }) => {
            let options = FetchOptions {
                update,
                coins,
                num_coins,
                ..FetchOptions::default()
            };
            let report = analysis::run_fetch(&config, &options).await?;
            println!(
                "Fetched {} coins ({} failed), saved {} rows",
                report.coins_requested, report.coins_failed, report.rows_saved
            );
        }
        Some(Commands::Analyze { source, top_n }) => {
            if let Some(top_n) = top_n {
                config.analysis.top_n = top_n;
            }
            let outcome = analysis::run_analysis(&config, source.into()).await?;
            print_ranking(&outcome.ranking, &outcome.summary);
        }
        Some(Commands::Stats { coin_id, source }) => {
            let table = load_prices(&config.paths, source.into()).await?;
            let Some(stats) = coin_stats(&table, &coin_id) else {
                bail!("No price data for {}", coin_id);
            };
            println!("{}", stats_table(&stats));
        }
        Some(Commands::Dashboard { auto_fetch, .. }) => {
            if auto_fetch {
                println!("Preparing data...");
                analysis::ensure_data(&config, None).await?;
            }
            tui::run_tui(config).await?;
        }
        None => {
            println!("\n--- Fetching new prices ---");
            let options = FetchOptions {
                update: true,
                ..FetchOptions::default()
            };
            if let Err(e) = analysis::run_fetch(&config, &options).await {
                eprintln!("Error fetching prices: {}", e);
            }

            println!("\n--- Ranking drops from peak ---");
            let outcome = analysis::run_analysis(&config, DataSource::Csv).await?;
            print_ranking(&outcome.ranking, &outcome.summary);
        }
    }

    Ok(())
}
