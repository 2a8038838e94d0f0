//! sigtrack CLI — replay a day's signal log and inspect the position ledger.
//!
//! Commands:
//! - `replay` — run the daily backtest over a signal log directory and print
//!   a P&L report, optionally exporting the trade tape as CSV
//! - `positions` — summarize the persisted position ledger

mod export;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::info;

use sigtrack_core::domain::{BacktestResult, PositionSummary};
use sigtrack_core::store::{PositionStore, SignalLog};
use sigtrack_core::{run_daily_replay, EngineConfig};

#[derive(Parser)]
#[command(name = "sigtrack", about = "sigtrack CLI — signal replay and ledger tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay one day's logged signal cycles against closing prices.
    Replay {
        /// Directory holding signals_YYYYMMDD_HHMMSS.json cycle files.
        #[arg(long, default_value = "data/signals")]
        signals_dir: PathBuf,

        /// JSON file mapping ticker -> closing price.
        #[arg(long)]
        prices: PathBuf,

        /// Date to replay (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        date: Option<String>,

        /// Optional TOML file overriding engine thresholds.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the trade tape to this CSV path.
        #[arg(long)]
        trades_csv: Option<PathBuf>,
    },
    /// Summarize the persisted position ledger.
    Positions {
        /// Path to the positions snapshot file.
        #[arg(long, default_value = "data/signals/positions.json")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            signals_dir,
            prices,
            date,
            config,
            trades_csv,
        } => cmd_replay(signals_dir, prices, date, config, trades_csv),
        Commands::Positions { file } => cmd_positions(file),
    }
}

fn cmd_replay(
    signals_dir: PathBuf,
    prices_path: PathBuf,
    date: Option<String>,
    config_path: Option<PathBuf>,
    trades_csv: Option<PathBuf>,
) -> Result<()> {
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("invalid date {s}, expected YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    };

    let config = match config_path {
        Some(path) => EngineConfig::from_toml_file(&path)?,
        None => EngineConfig::default(),
    };

    let text = std::fs::read_to_string(&prices_path)
        .with_context(|| format!("failed to read prices file {}", prices_path.display()))?;
    let closing_prices: BTreeMap<String, f64> =
        serde_json::from_str(&text).context("prices file must map ticker -> price")?;

    info!(
        "replaying {date} with {} closing prices",
        closing_prices.len()
    );
    let log = SignalLog::new(signals_dir);
    let Some(result) = run_daily_replay(&log, &closing_prices, date, &config)? else {
        bail!("no signal log entries for {date}");
    };
    info!(
        "replay produced {} trades ({} closed)",
        result.trades.len(),
        result.closed_trade_count()
    );

    print_report(date, &result);

    if let Some(path) = trades_csv {
        export::write_trades_csv(&path, &result.trades)?;
        info!("exported {} trades to {}", result.trades.len(), path.display());
        println!("\ntrade tape written to {}", path.display());
    }

    Ok(())
}

fn print_report(date: NaiveDate, result: &BacktestResult) {
    println!("Daily replay — {date}");
    println!("  invested:        ${:.2}", result.total_invested);
    println!("  proceeds:        ${:.2}", result.total_proceeds);
    println!("  closing value:   ${:.2}", result.total_value);
    println!(
        "  return:          ${:+.2} ({:+.2}%)",
        result.total_return_usd, result.total_return_pct
    );
    println!(
        "  trades:          {} ({} closed, {} won, {} lost, win rate {:.1}%)",
        result.trades.len(),
        result.closed_trade_count(),
        result.winning_trades,
        result.losing_trades,
        result.win_rate
    );
    println!("  unrealized pnl:  ${:+.2}", result.unrealized_pnl);

    if let Some(best) = &result.best_trade {
        println!(
            "  best trade:      {} {:+.2} ({:+.2}%)",
            best.ticker, best.pnl, best.pnl_pct
        );
    }
    if let Some(worst) = &result.worst_trade {
        println!(
            "  worst trade:     {} {:+.2} ({:+.2}%)",
            worst.ticker, worst.pnl, worst.pnl_pct
        );
    }

    if !result.positions_at_close.is_empty() {
        println!("  open at close:");
        for (ticker, position) in &result.positions_at_close {
            println!(
                "    {ticker}: {:.4} shares @ ${:.2}, value ${:.2}, pnl {:+.2} ({:+.2}%)",
                position.shares,
                position.closing_price,
                position.market_value,
                position.pnl,
                position.pnl_pct
            );
        }
    }
}

fn cmd_positions(file: PathBuf) -> Result<()> {
    let store = PositionStore::new(file);
    let positions = store.load();
    let summary = PositionSummary::from_positions(&positions);

    println!(
        "Positions: {} total (buy: {}, sell: {}, hold: {})",
        summary.total, summary.buy, summary.sell, summary.hold
    );
    for (ticker, position) in &positions {
        println!(
            "  {ticker}: {} since {} (confidence {:.2}, seen {}x)",
            position.action,
            position.entry_date.format("%Y-%m-%d"),
            position.current_confidence,
            position.signal_count
        );
    }

    Ok(())
}
