// src/main.rs
// scalplab - scalping strategy lab with a throttled AI signal advisor

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use scalplab::advisor::{ScanOutcome, StrategyAdvisor, TradeSignal};
use scalplab::config::EnvConfig;
use scalplab::governor;
use scalplab::http::create_shared_client;
use scalplab::llm::{GeminiClient, TextGenerator};
use scalplab::strategy::{self, Strategy};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scalplab")]
#[command(about = "BTC scalping strategy lab with an AI signal advisor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the strategy leaderboard
    Strategies {
        /// Number of strategies to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Ask the AI to critique a strategy
    Analyze {
        /// Strategy id (strat-N) or name
        strategy: String,
    },

    /// Ask the AI for a new strategy concept
    Idea,

    /// Request one live trade signal
    Signal {
        /// Strategy id (strat-N) or name
        strategy: String,
        /// Current BTC price
        #[arg(long)]
        price: f64,
        /// Recent 1m candles, one per line
        #[arg(long, default_value = "")]
        history: String,
    },

    /// Auto-scan loop, waiting out cooldowns between rounds
    Scan {
        /// Strategy id (strat-N) or name
        strategy: String,
        /// Current BTC price
        #[arg(long)]
        price: f64,
        /// Recent 1m candles, one per line
        #[arg(long, default_value = "")]
        history: String,
        /// Number of signal rounds to run
        #[arg(long, default_value = "3")]
        rounds: u32,
    },

    /// Validate environment configuration
    Config,
}

fn build_advisor(config: &EnvConfig) -> StrategyAdvisor {
    let governor = governor::install_global(config.governor);
    let generator = config.api_keys.gemini.clone().map(|key| {
        Arc::new(GeminiClient::with_http_client(key, create_shared_client()))
            as Arc<dyn TextGenerator>
    });
    StrategyAdvisor::new(governor, generator, config.models.clone())
}

fn print_signal(signal: &TradeSignal) {
    let marker = if signal.opens_position() { ">>" } else { "  " };
    println!(
        "{} [{}] {} ({}) TP:{}% SL:{}% - {}",
        marker,
        Local::now().format("%H:%M:%S"),
        signal.signal,
        signal.confidence,
        signal.tp_percent,
        signal.sl_percent,
        signal.reasoning
    );
}

async fn run_scan(
    advisor: &StrategyAdvisor,
    strategy: &Strategy,
    price: f64,
    history: &str,
    rounds: u32,
    interval: Duration,
) {
    let mut completed = 0;
    while completed < rounds {
        match advisor.scan(strategy, price, history).await {
            ScanOutcome::CoolingDown(secs) => {
                println!("[{}] COOLING DOWN {}s", Local::now().format("%H:%M:%S"), secs);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            ScanOutcome::Signal(signal) => {
                completed += 1;
                if signal.opens_position() {
                    info!(signal = %signal.signal, confidence = %signal.confidence, "Entry signal");
                }
                print_signal(&signal);
                if completed < rounds {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EnvConfig::load();
    let strategies = strategy::catalog();

    match cli.command {
        Commands::Strategies { limit } => {
            for (rank, s) in strategies.iter().take(limit).enumerate() {
                println!(
                    "{:>2}. {:<26} {:>5.1}%  {:<18} [{}] {}",
                    rank + 1,
                    s.name,
                    s.win_rate,
                    s.author,
                    s.id,
                    s.indicator_list()
                );
            }
        }
        Commands::Analyze { strategy } => {
            let strategy = strategy::lookup(&strategies, &strategy)?.clone();
            let advisor = build_advisor(&config);
            println!("{}", advisor.analyze_strategy(&strategy).await);
        }
        Commands::Idea => {
            let advisor = build_advisor(&config);
            println!("{}", advisor.generate_strategy_idea().await);
        }
        Commands::Signal {
            strategy,
            price,
            history,
        } => {
            let strategy = strategy::lookup(&strategies, &strategy)?.clone();
            let advisor = build_advisor(&config);
            print_signal(&advisor.live_trade_signal(&strategy, price, &history).await);
        }
        Commands::Scan {
            strategy,
            price,
            history,
            rounds,
        } => {
            let strategy = strategy::lookup(&strategies, &strategy)?.clone();
            let advisor = build_advisor(&config);
            info!(strategy = %strategy.name, rounds, "Starting auto-scan");
            run_scan(
                &advisor,
                &strategy,
                price,
                &history,
                rounds,
                config.scan_interval,
            )
            .await;
        }
        Commands::Config => {
            let validation = config.validate();
            println!("{}", validation.report());
            validation.into_result()?;
        }
    }

    Ok(())
}
