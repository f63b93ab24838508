use backtest_engine::commands::{
    backtest::{self, parse_parameter_override, BacktestRequest},
    compare::{self, CompareRequest},
    list_strategies,
};
use backtest_engine::config::BacktestSettings;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backtest-engine")]
#[command(about = "Single-symbol strategy backtester over daily price bars")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the strategy catalog with parameter bounds and defaults
    Strategies,
    /// Backtest one strategy and print the JSON report
    Backtest {
        /// Strategy id (sma_crossover, rsi, macd, bollinger_bands, momentum)
        strategy: String,
        /// JSON array of daily bars {date, open, high, low, close, volume}
        #[arg(long = "data-file", value_name = "PATH")]
        data_file: PathBuf,
        /// Ticker symbol (defaults to the data file name)
        #[arg(long)]
        symbol: Option<String>,
        /// Starting cash (defaults to BACKTEST_INITIAL_CAPITAL or 100000)
        #[arg(long)]
        capital: Option<f64>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Strategy parameter override, repeatable
        #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_parameter_override)]
        params: Vec<(String, f64)>,
        /// Write the report here instead of stdout
        #[arg(short, long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Run every strategy with default parameters and rank the results
    Compare {
        /// JSON array of daily bars {date, open, high, low, close, volume}
        #[arg(long = "data-file", value_name = "PATH")]
        data_file: PathBuf,
        /// Ticker symbol (defaults to the data file name)
        #[arg(long)]
        symbol: Option<String>,
        /// Starting cash (defaults to BACKTEST_INITIAL_CAPITAL or 100000)
        #[arg(long)]
        capital: Option<f64>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Also write the ranked summaries as JSON
        #[arg(short, long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let Cli { command } = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = BacktestSettings::from_env()?;
    info!(
        "Starting backtest engine (default capital {:.2})",
        settings.initial_capital
    );

    match command {
        Commands::Strategies => {
            list_strategies::run()?;
        }
        Commands::Backtest {
            strategy,
            data_file,
            symbol,
            capital,
            start,
            end,
            params,
            output,
        } => {
            let request = BacktestRequest {
                strategy,
                data_file,
                symbol,
                initial_capital: capital,
                start_date: start,
                end_date: end,
                parameters: params,
                output,
            };
            backtest::run(&request, &settings)?;
        }
        Commands::Compare {
            data_file,
            symbol,
            capital,
            start,
            end,
            output,
        } => {
            let request = CompareRequest {
                data_file,
                symbol,
                initial_capital: capital,
                start_date: start,
                end_date: end,
                output,
            };
            compare::run(&request, &settings)?;
        }
    }

    Ok(())
}
