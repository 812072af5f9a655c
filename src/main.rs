mod auth;
mod cache;
mod engine;
mod models;
mod procedures;
mod reporting;
mod storage;
mod types;

use std::io::{stderr, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::auth::Caller;
use crate::cache::CacheEvent;
use crate::engine::ReportEngine;
use crate::procedures::{InMemoryProcedures, Portfolio};
use crate::reporting::{DateBucket, ReportSummary, StatusBucket};
use crate::storage::{CsvLoader, RecordStorage};
use crate::types::{DateRange, UserId};

/// Identity used for decisions and reports issued from the command line.
const OPERATOR_ID: UserId = 0;

#[derive(Parser, Debug)]
#[command(name = "bullion-ledger", version, about = "Deposit and withdrawal reports for a bullion brokerage")]
struct Cli {
    /// Deposits CSV (id,user_id,amount,status,created_at)
    #[arg(long)]
    deposits: PathBuf,

    /// Withdrawals CSV (id,user_id,amount,net_amount,status,created_at)
    #[arg(long)]
    withdrawals: PathBuf,

    /// Open and closed metal positions (id,user_id,metal,grams,buy_price,opened_at,closed,sell_price)
    #[arg(long)]
    positions: Option<PathBuf>,

    /// Admin decisions to apply before reporting (action,id,net_amount,user_id,sell_price)
    #[arg(long)]
    actions: Option<PathBuf>,

    /// First day (or RFC 3339 instant) of the report window, requires --to
    #[arg(long)]
    from: Option<String>,

    /// Last day (or RFC 3339 instant) of the report window, requires --from
    #[arg(long)]
    to: Option<String>,

    /// Report on a single user's settled records instead of the whole platform
    #[arg(long, conflicts_with = "portfolio")]
    user: Option<UserId>,

    /// Print this user's open positions grouped by metal instead of a report
    #[arg(long)]
    portfolio: Option<UserId>,

    /// Maximum number of cached reports
    #[arg(long, default_value_t = 1024)]
    cache_capacity: u64,

    /// Seconds a cached report stays valid
    #[arg(long, default_value_t = 300)]
    cache_ttl: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// error, warn, info, debug or trace
    #[arg(long, default_value = "error")]
    log_level: String
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
enum OutputFormat {
    Json,
    Csv
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(parse_log_level(&cli.log_level));

    let range = DateRange::from_bounds(cli.from.as_deref(), cli.to.as_deref())?;

    let storage = Arc::new(RecordStorage::new());
    let stats = CsvLoader::new(storage.clone())
        .load(cli.deposits, cli.withdrawals, cli.positions)
        .await?;

    if stats.deposits == 0 && stats.withdrawals == 0 {
        warn!("No deposits or withdrawals were loaded, the report will be empty");
    }

    let engine = ReportEngine::new(storage.clone(), InMemoryProcedures::new(storage))
        .with_cache_capacity(cli.cache_capacity)
        .with_cache_timeout(Duration::from_secs(cli.cache_ttl));
    let operator = Caller::admin(OPERATOR_ID);

    spawn_cache_watcher(engine.cache().subscribe());

    let timer = Instant::now();

    if let Some(actions) = cli.actions {
        engine.replay_actions(&operator, actions).await?;
    }

    if let Some(user_id) = cli.portfolio {
        let portfolio = engine.portfolio(&operator, user_id).await?;

        match cli.format {
            OutputFormat::Json => write_json_to_stdout(&portfolio)?,
            OutputFormat::Csv => write_portfolio_csv_to_stdout(&portfolio)?
        }

        return Ok(());
    }

    let report = match cli.user {
        Some(user_id) => engine.own_report(&Caller::user(user_id), range).await?,
        None => engine.admin_report(&operator, range).await?
    };

    info!("Generated report in: {:?}", timer.elapsed());

    match cli.format {
        OutputFormat::Json => write_json_to_stdout(&*report)?,
        OutputFormat::Csv => write_csv_to_stdout(&report)?
    }

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: The report goes to stdout, so logs go to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

/// Logs cache invalidations for as long as the engine lives.
fn spawn_cache_watcher(mut events: broadcast::Receiver<CacheEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CacheEvent::InvalidatedAll) => debug!("Cached reports invalidated"),
                Ok(CacheEvent::Invalidated(key)) => debug!("Cached report invalidated: {key:?}"),
                Err(RecvError::Lagged(skipped)) => debug!("Cache watcher skipped {skipped} events"),
                Err(RecvError::Closed) => break
            }
        }
    });
}

fn write_json_to_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    serde_json::to_writer_pretty(&mut output, value)?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}

fn write_csv_to_stdout(report: &ReportSummary) -> Result<()> {
    let mut output = csv::Writer::from_writer(BufWriter::new(stdout().lock()));

    output.write_record(["section", "key", "amount", "count"])?;

    let amounts = [
        ("total_deposits", report.total_deposits),
        ("total_withdrawals", report.total_withdrawals),
        ("net_profit", report.net_profit),
    ];

    for (key, amount) in amounts {
        output.write_record(["summary", key, amount.to_string().as_str(), ""])?;
    }

    let counts = [
        ("pending_deposits", report.pending_deposits),
        ("pending_withdrawals", report.pending_withdrawals),
        ("approved_deposits", report.approved_deposits),
        ("completed_withdrawals", report.completed_withdrawals),
    ];

    for (key, count) in counts {
        output.write_record(["summary", key, "", count.to_string().as_str()])?;
    }

    write_date_buckets(&mut output, "deposits_by_date", &report.deposits_by_date)?;
    write_date_buckets(&mut output, "withdrawals_by_date", &report.withdrawals_by_date)?;
    write_status_buckets(&mut output, "deposits_by_status", &report.deposits_by_status)?;
    write_status_buckets(&mut output, "withdrawals_by_status", &report.withdrawals_by_status)?;

    output.flush()?;

    Ok(())
}

fn write_date_buckets<W: Write>(output: &mut csv::Writer<W>, section: &str, buckets: &[DateBucket]) -> Result<()> {
    for bucket in buckets {
        output.write_record([section, bucket.date.as_str(), bucket.amount.to_string().as_str(), bucket.count.to_string().as_str()])?;
    }

    Ok(())
}

fn write_status_buckets<W: Write>(output: &mut csv::Writer<W>, section: &str, buckets: &[StatusBucket]) -> Result<()> {
    for bucket in buckets {
        output.write_record([section, bucket.status.as_str(), bucket.total.to_string().as_str(), bucket.count.to_string().as_str()])?;
    }

    Ok(())
}

fn write_portfolio_csv_to_stdout(portfolio: &Portfolio) -> Result<()> {
    let mut output = csv::Writer::from_writer(BufWriter::new(stdout().lock()));

    output.write_record(["metal", "grams", "positions"])?;

    for holding in &portfolio.holdings {
        output.write_record([
            holding.metal.as_str(),
            holding.grams.to_string().as_str(),
            holding.positions.to_string().as_str()
        ])?;
    }

    output.flush()?;

    Ok(())
}
