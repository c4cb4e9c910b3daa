//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::table_report_adapter::TableReportAdapter;
use crate::domain::backtest;
use crate::domain::config_validation::{build_run_config, RunConfig};
use crate::domain::error::TradesimError;
use crate::domain::signal::SignalKind;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [backtest] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Override [strategy] name
        #[arg(long)]
        strategy: Option<String>,
        /// Write a per-bar report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the built-in strategies
    Strategies,
    /// Show available data ranges
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            output,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            strategy.as_deref(),
            output.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Strategies => run_strategies(),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradesimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn data_dir(config: &dyn ConfigPort) -> Result<PathBuf, TradesimError> {
    match config.get_string("data", "dir") {
        Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => Err(TradesimError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        }),
    }
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match build_run_config(&adapter, symbol_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: resolve strategy
    let strategy = match resolve_strategy(&adapter, strategy_override) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Strategy: {}", strategy.describe());

    // Stage 3: fetch data
    let dir = match data_dir(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = CsvAdapter::new(dir);

    let bars = match data_port.fetch_ohlcv(
        &run_config.symbol,
        run_config.start_date,
        run_config.end_date,
    ) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Fetched {} bars for {} ({} to {})",
        bars.len(),
        run_config.symbol,
        run_config.start_date,
        run_config.end_date,
    );
    if bars.len() < strategy.min_bars() {
        eprintln!(
            "warning: only {} bars; {} needs at least {} before a signal can fire",
            bars.len(),
            strategy.name(),
            strategy.min_bars(),
        );
    }

    // Stage 4: run the engine
    let run = match backtest::run(&bars, &strategy, run_config.starting_capital) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: print summary
    print_summary(&run_config, &run);

    // Stage 6: optional per-bar report
    if let Some(output) = output_path {
        let report = TableReportAdapter::default();
        if let Err(e) = report.write(&run, &bars, &output.display().to_string()) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("\nReport written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

fn resolve_strategy(
    config: &dyn ConfigPort,
    strategy_override: Option<&str>,
) -> Result<StrategyKind, TradesimError> {
    match strategy_override {
        Some(name) => StrategyKind::from_name(name, config),
        None => StrategyKind::from_config(config),
    }
}

fn print_summary(run_config: &RunConfig, run: &backtest::BacktestRun) {
    let result = &run.result;

    eprintln!("\n=== Backtest Results ===");
    eprintln!("Symbol:         {}", run_config.symbol);
    eprintln!("Strategy:       {}", run.strategy.describe());
    eprintln!("Capital:        {:.2}", result.starting_capital);
    eprintln!("Final Value:    {:.2}", result.final_value);
    eprintln!("Total Return:   {:.2}%", result.return_pct);
    eprintln!("Trades:         {}", result.trades.len());

    if !result.trades.is_empty() {
        eprintln!("\nTrade log:");
        for fill in &result.trades {
            let kind = match fill.kind {
                SignalKind::Buy => "buy",
                SignalKind::Sell => "sell",
            };
            eprintln!(
                "  {}  {:<4} @ {:.4}  cash {:.2}  units {:.4}",
                fill.date, kind, fill.price, fill.cash, fill.units,
            );
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match build_run_config(&adapter, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let strategy = match StrategyKind::from_config(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = data_dir(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!(
        "Configuration valid: {} from {} to {}, {}",
        run_config.symbol,
        run_config.start_date,
        run_config.end_date,
        strategy.describe(),
    );
    ExitCode::SUCCESS
}

fn run_strategies() -> ExitCode {
    println!("sma-cross   SMA crossover: buy when the fast SMA crosses above the slow");
    println!("ema-cross   EMA crossover: buy when the fast EMA crosses above the slow");
    println!("macd        MACD line crossing its signal line");
    println!("rsi         RSI mean reversion: buy crossing below lower, sell above upper");
    println!("bollinger   Bollinger reversion: buy below the lower band, sell above the upper");
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let dir = match data_dir(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = CsvAdapter::new(dir);

    let symbols = match symbol {
        Some(s) => vec![s.to_string()],
        None => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
        return ExitCode::SUCCESS;
    }

    for symbol in &symbols {
        match data_port.get_data_range(symbol) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} to {} ({} bars)", symbol, first, last, count);
            }
            Ok(None) => println!("{}: no data", symbol),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }
    ExitCode::SUCCESS
}
