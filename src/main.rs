use analytics::{
    AnalyticsEngine, GroupAggregate, JournalQuery, Period, PeriodBucket, PerformanceReport,
    ReportOptions, SortField, breakdown_by_coin, breakdown_by_mood, build_equity_curve,
    calendar_month, filter_by_range, normalize_setup_name, period_performance, query_journal,
    setup_breakdown,
};
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, LoggingConfig, load_config};
use core_types::{Outcome, TradeEntry, structs::DATE_FORMAT};
use database::{DbRepository, TradeReader, connect, run_migrations};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// The main entry point for the trading journal.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(&config.logging)?;

    // DATABASE_URL wins over the config file, mirroring the other secrets in .env.
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| config.store.database_url.clone());
    let db_pool = connect(&database_url)
        .await
        .context("Failed to connect to the trade store")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    let repo = DbRepository::new(db_pool);

    // Execute the appropriate command
    match cli.command {
        Commands::Add(args) => handle_add(args, &repo).await,
        Commands::List(args) => handle_list(args, &repo, &config).await,
        Commands::Delete(args) => handle_delete(args, &repo).await,
        Commands::Report(args) => handle_report(args, &repo, &config).await,
        Commands::Equity(args) => handle_equity(args, &repo, &config).await,
        Commands::Calendar(args) => handle_calendar(args, &repo, &config).await,
        Commands::Performance(args) => handle_performance(args, &repo, &config).await,
        Commands::Breakdown(args) => handle_breakdown(args, &repo, &config).await,
        Commands::Tags => handle_tags(&repo, &config).await,
    }
}

/// Installs the global subscriber. The returned guard flushes the log file on drop.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid logging level")?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "journal.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A personal trading journal: record trades and review their analytics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "journal.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new trade.
    Add(AddArgs),
    /// Show the journal table.
    List(ListArgs),
    /// Delete one trade, or every trade with --all.
    Delete(DeleteArgs),
    /// Dashboard summary: win rate, drawdown, streaks, most traded setup.
    Report(ReportArgs),
    /// Equity curve, one row per trade.
    Equity(PeriodArgs),
    /// Daily pnl for one month.
    Calendar(CalendarArgs),
    /// Performance grouped into days, weeks, months or years.
    Performance(PerformanceArgs),
    /// Performance grouped by setup, coin or mood.
    Breakdown(BreakdownArgs),
    /// Known setup tags and coins.
    Tags,
}

#[derive(Parser)]
struct AddArgs {
    /// Trade date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Realized profit or loss.
    #[arg(long, allow_hyphen_values = true)]
    pnl: Decimal,

    /// win or loss. Defaults to the sign of --pnl.
    #[arg(long)]
    outcome: Option<Outcome>,

    /// Setup tag; repeat for several.
    #[arg(long = "setup")]
    setups: Vec<String>,

    #[arg(long)]
    coin: Option<String>,

    #[arg(long)]
    mood: Option<String>,

    #[arg(long)]
    position_size: Option<Decimal>,

    #[arg(long)]
    leverage: Option<Decimal>,

    /// How long the position was held, in minutes.
    #[arg(long)]
    holding_minutes: Option<u64>,

    #[arg(long)]
    notes: Option<String>,

    #[arg(long)]
    lessons: Option<String>,

    #[arg(long)]
    link: Option<String>,
}

#[derive(Parser)]
struct ListArgs {
    #[arg(long)]
    outcome: Option<Outcome>,
    #[arg(long)]
    setup: Option<String>,
    #[arg(long)]
    coin: Option<String>,
    /// First date to include (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last date to include (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Text to look for in coin, notes, lessons and tags.
    #[arg(long)]
    search: Option<String>,
    /// date, pnl, coin or outcome.
    #[arg(long, default_value = "date")]
    sort: SortField,
    /// Sort ascending instead of descending.
    #[arg(long)]
    asc: bool,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = analytics::journal::DEFAULT_PAGE_SIZE)]
    limit: usize,
}

#[derive(Parser)]
struct DeleteArgs {
    /// Id of the trade to delete.
    #[arg(required_unless_present = "all")]
    id: Option<Uuid>,
    /// Delete every trade in the journal.
    #[arg(long, conflicts_with = "id")]
    all: bool,
}

#[derive(Parser)]
struct PeriodArgs {
    /// Restrict to the day, week, month or year containing --on.
    #[arg(long)]
    period: Option<Period>,
    /// Reference date for --period (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    on: Option<NaiveDate>,
}

impl PeriodArgs {
    fn selection(&self) -> Option<(Period, NaiveDate)> {
        self.period
            .map(|period| (period, self.on.unwrap_or_else(today)))
    }
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    period: PeriodArgs,
    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct CalendarArgs {
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    month: Option<u32>,
}

#[derive(Parser)]
struct PerformanceArgs {
    /// Bucket size: day, week, month or year.
    #[arg(long, default_value = "month")]
    by: Period,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupBy {
    Setup,
    Coin,
    Mood,
}

#[derive(Parser)]
struct BreakdownArgs {
    #[arg(long, value_enum, default_value = "setup")]
    by: GroupBy,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn load_snapshot<R: TradeReader>(reader: &R) -> Result<Vec<TradeEntry>> {
    let trades = reader.list_trades().await.context("Failed to read trades")?;
    tracing::debug!(trades = trades.len(), "Loaded journal snapshot.");
    Ok(trades)
}

async fn handle_add(args: AddArgs, repo: &DbRepository) -> Result<()> {
    let date = args.date.unwrap_or_else(today);
    let outcome = args.outcome.unwrap_or(if args.pnl.is_sign_negative() {
        Outcome::Loss
    } else {
        Outcome::Win
    });

    let mut trade = TradeEntry::new(date.format(DATE_FORMAT).to_string(), args.pnl, outcome)
        .with_setup(args.setups);
    trade.coin = args.coin;
    trade.mood = args.mood;
    trade.position_size = args.position_size;
    trade.leverage = args.leverage;
    trade.holding_time = args.holding_minutes.map(|m| Duration::from_secs(m.saturating_mul(60)));
    trade.notes = args.notes;
    trade.lessons = args.lessons;
    trade.link = args.link;

    repo.insert_trade(&trade).await?;
    println!("Recorded trade {}", trade.id);
    Ok(())
}

async fn handle_list(args: ListArgs, repo: &DbRepository, config: &Config) -> Result<()> {
    let trades = load_snapshot(repo).await?;
    let query = JournalQuery {
        outcome: args.outcome,
        setup: args.setup,
        coin: args.coin,
        from: args.from,
        to: args.to,
        search: args.search,
        sort_field: args.sort,
        descending: !args.asc,
        page: args.page,
        page_size: args.limit,
    };
    let page = query_journal(&trades, &query);

    let mut table = new_table(&["Id", "Date", "Coin", "Setup", "Outcome", "PnL", "Mood"]);
    for trade in &page.entries {
        table.add_row(vec![
            trade.id.to_string(),
            trade_date(trade, &config.settings.date_format),
            trade.coin.clone().unwrap_or_default(),
            trade.setup.join(", "),
            trade.outcome.to_string(),
            money(trade.pnl, &config.settings.currency),
            trade.mood.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    println!(
        "Page {} of {} ({} matching trades)",
        page.page,
        page.page_count.max(1),
        page.total
    );
    Ok(())
}

async fn handle_delete(args: DeleteArgs, repo: &DbRepository) -> Result<()> {
    if args.all {
        let deleted = repo.delete_all_trades().await?;
        println!("Deleted {deleted} trades");
        return Ok(());
    }
    if let Some(id) = args.id {
        repo.delete_trade(id)
            .await
            .with_context(|| format!("Could not delete trade {id}"))?;
        println!("Deleted trade {id}");
    }
    Ok(())
}

async fn handle_report(args: ReportArgs, repo: &DbRepository, config: &Config) -> Result<()> {
    let trades = load_snapshot(repo).await?;
    let options = ReportOptions {
        initial_capital: config.settings.initial_capital,
        risk_free_rate: config.settings.risk_free_rate,
        period: args.period.selection(),
        chronological_streaks: config.settings.chronological_streaks,
    };
    let report = AnalyticsEngine::new().report(&trades, &options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_report(&report, config);
    Ok(())
}

fn print_report(report: &PerformanceReport, config: &Config) {
    let currency = &config.settings.currency;
    let summary = &report.summary;
    let optional = |value: Option<Decimal>| {
        value
            .map(|v| v.round_dp(2).to_string())
            .unwrap_or_else(|| "n/a".to_string())
    };

    if let Some(range) = report.range {
        println!(
            "Period: {} to {}",
            format_date(range.start, &config.settings.date_format),
            format_date(range.end, &config.settings.date_format)
        );
    }

    let mut table = new_table(&["Metric", "Value"]);
    table.add_row(vec!["Trades".to_string(), summary.total_trades.to_string()]);
    table.add_row(vec!["Wins / Losses".to_string(), format!("{} / {}", summary.wins, summary.losses)]);
    table.add_row(vec!["Win rate".to_string(), format!("{}%", summary.win_rate.round_dp(2))]);
    table.add_row(vec!["Total PnL".to_string(), money(summary.total_pnl, currency)]);
    table.add_row(vec!["Average PnL".to_string(), money(summary.avg_pnl, currency)]);
    table.add_row(vec!["Average win".to_string(), money(summary.avg_win, currency)]);
    table.add_row(vec!["Average loss".to_string(), money(summary.avg_loss, currency)]);
    table.add_row(vec!["Risk/reward".to_string(), summary.risk_reward_ratio.round_dp(2).to_string()]);
    table.add_row(vec!["Max drawdown".to_string(), money(report.drawdown.max_drawdown, currency)]);
    table.add_row(vec![
        "Max drawdown %".to_string(),
        format!("{}%", report.drawdown.max_drawdown_percent.round_dp(2)),
    ]);
    table.add_row(vec!["Peak equity".to_string(), money(report.drawdown.peak_equity, currency)]);
    table.add_row(vec!["Current streak".to_string(), report.streaks.current_streak.to_string()]);
    table.add_row(vec!["Longest streak".to_string(), report.streaks.longest_streak.to_string()]);
    table.add_row(vec!["Sharpe ratio".to_string(), optional(report.sharpe_ratio)]);
    table.add_row(vec!["Expectancy".to_string(), optional(report.expectancy)]);
    table.add_row(vec!["Volatility".to_string(), optional(report.volatility)]);
    table.add_row(vec![
        "Avg holding time".to_string(),
        report
            .avg_holding_time
            .map(|d| format!("{} min", d.as_secs() / 60))
            .unwrap_or_else(|| "n/a".to_string()),
    ]);
    table.add_row(vec![
        "Most traded setup".to_string(),
        report
            .most_traded_setup
            .as_ref()
            .map(|s| format!("{} ({} trades, {})", s.display_name, s.count, money(s.total_pnl, currency)))
            .unwrap_or_else(|| "n/a".to_string()),
    ]);
    table.add_row(vec![
        "Best return".to_string(),
        report
            .best_trade
            .as_ref()
            .map(|b| format!("{}% on {}", b.return_pct().round_dp(2), b.trade.date))
            .unwrap_or_else(|| "n/a".to_string()),
    ]);
    println!("{table}");
}

async fn handle_equity(args: PeriodArgs, repo: &DbRepository, config: &Config) -> Result<()> {
    let trades = load_snapshot(repo).await?;
    let selected = match args.selection() {
        Some((period, date)) => filter_by_range(&trades, analytics::PeriodRange::containing(period, date)),
        None => trades,
    };
    let curve = build_equity_curve(&selected, config.settings.initial_capital);

    let currency = &config.settings.currency;
    let mut table = new_table(&["Date", "Equity", "Peak", "Drawdown"]);
    for point in &curve {
        table.add_row(vec![
            format_date(point.date, &config.settings.date_format),
            money(point.equity, currency),
            money(point.peak, currency),
            money(point.equity - point.peak, currency),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn handle_calendar(args: CalendarArgs, repo: &DbRepository, config: &Config) -> Result<()> {
    let now = today();
    let year = args.year.unwrap_or(now.year());
    let month = args.month.unwrap_or(now.month());
    if !(1..=12).contains(&month) {
        anyhow::bail!("--month must be between 1 and 12, got {month}");
    }

    let trades = load_snapshot(repo).await?;
    let days = calendar_month(&trades, year, month);
    println!("{}", bucket_table(&days, config));
    Ok(())
}

async fn handle_performance(args: PerformanceArgs, repo: &DbRepository, config: &Config) -> Result<()> {
    let trades = load_snapshot(repo).await?;
    let buckets = period_performance(&trades, args.by);
    println!("{}", bucket_table(&buckets, config));
    Ok(())
}

async fn handle_breakdown(args: BreakdownArgs, repo: &DbRepository, config: &Config) -> Result<()> {
    let trades = load_snapshot(repo).await?;
    let currency = &config.settings.currency;

    let groups: Vec<GroupAggregate> = match args.by {
        GroupBy::Setup => setup_breakdown(&trades)
            .iter()
            .map(GroupAggregate::from)
            .collect(),
        GroupBy::Coin => breakdown_by_coin(&trades),
        GroupBy::Mood => breakdown_by_mood(&trades),
    };

    let mut table = new_table(&["Group", "Trades", "Wins", "Losses", "Win rate", "PnL"]);
    for group in &groups {
        table.add_row(vec![
            group.key.clone(),
            group.count.to_string(),
            group.wins.to_string(),
            group.losses.to_string(),
            format!("{}%", group.win_rate.round_dp(2)),
            money(group.total_pnl, currency),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn handle_tags(repo: &DbRepository, config: &Config) -> Result<()> {
    let trades = load_snapshot(repo).await?;

    let mut tags: Vec<String> = setup_breakdown(&trades)
        .into_iter()
        .map(|setup| setup.display_name)
        .collect();
    for custom in &config.settings.custom_tags {
        let key = normalize_setup_name(custom);
        if !key.is_empty() && !tags.iter().any(|t| normalize_setup_name(t) == key) {
            tags.push(custom.trim().to_string());
        }
    }

    let mut coins: Vec<String> = breakdown_by_coin(&trades).into_iter().map(|g| g.key).collect();
    for custom in &config.settings.custom_coins {
        let custom = custom.trim();
        if !custom.is_empty() && !coins.iter().any(|c| c.eq_ignore_ascii_case(custom)) {
            coins.push(custom.to_string());
        }
    }

    println!("Setups: {}", tags.join(", "));
    println!("Coins:  {}", coins.join(", "));
    Ok(())
}

// ==============================================================================
// Rendering helpers
// ==============================================================================

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn bucket_table(buckets: &[PeriodBucket], config: &Config) -> Table {
    let format = &config.settings.date_format;
    let mut table = new_table(&["From", "To", "Trades", "Wins", "Losses", "Win rate", "PnL"]);
    for bucket in buckets {
        table.add_row(vec![
            format_date(bucket.start, format),
            format_date(bucket.end, format),
            bucket.trade_count.to_string(),
            bucket.wins.to_string(),
            bucket.losses.to_string(),
            format!("{}%", bucket.win_rate.round_dp(2)),
            money(bucket.total_pnl, &config.settings.currency),
        ]);
    }
    table
}

fn money(amount: Decimal, currency: &str) -> String {
    format!("{} {}", amount.round_dp(2), currency)
}

/// Formats with the user's pattern, falling back to ISO when the pattern is invalid.
fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format(DATE_FORMAT).to_string();
    }
    out
}

fn trade_date(trade: &TradeEntry, pattern: &str) -> String {
    trade
        .parsed_date()
        .map(|date| format_date(date, pattern))
        .unwrap_or_else(|| trade.date.clone())
}
