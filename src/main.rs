use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, Level};
use std::path::PathBuf;
use std::sync::Arc;

use bounce_scanner::analysis::{AnalysisResult, ResultSummary};
use bounce_scanner::api::{MarketDataCollector, RateLimitedFetcher};
use bounce_scanner::calls::track_calls;
use bounce_scanner::cli::{Cli, Command};
use bounce_scanner::config::{Config, DEFAULT_CONFIG_PATH};
use bounce_scanner::scanner::Scanner;
use bounce_scanner::validation::validate_address;
use bounce_scanner::{logging, metrics};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    config.validate().context("Invalid configuration")?;
    info!("Configuration loaded from {}", config_path.display());

    if let Err(e) = metrics::init() {
        warn!("Metrics registry not initialised: {}", e);
    }

    let fetcher = Arc::new(RateLimitedFetcher::new(
        config.api.request_timeout(),
        config.scanner.cache_ttl(),
        config.scanner.request_spacing(),
    )?);
    let collector = MarketDataCollector::from_config(&config.api, fetcher.clone());
    let scanner = Scanner::new(collector, config.scanner.clone());

    match cli.command {
        Command::Scan { addresses, json } => {
            for address in &addresses {
                validate_address(address)?;
            }
            let scans = scanner.scan(&addresses).await;
            let mut results = Vec::new();
            for scan in scans {
                match scan.outcome {
                    Ok(result) => results.push(result),
                    Err(e) => eprintln!("{}: {}", scan.address, e),
                }
            }
            print_results(&results, json)?;
        }
        Command::Top { limit, json } => {
            let limit = limit.unwrap_or(config.scanner.token_list_limit);
            let results = scanner.scan_top(limit).await?;
            info!("{} tokens passed the score filter", results.len());
            print_results(&results, json)?;
        }
        Command::Calls => {
            if config.calls.is_empty() {
                println!("No calls configured");
            }
            for performance in track_calls(scanner.provider(), &config.calls).await {
                println!("{}", performance.display_row());
            }
        }
    }

    info!(
        "Done: {} API calls, {} cache hits, {} responses still cached",
        metrics::API_CALLS.get(),
        metrics::CACHE_HITS.get(),
        fetcher.cache().purge_expired().await
    );
    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.debug { Level::Debug } else { Level::Info };
    match &cli.log_file {
        Some(path) => logging::init(path, level)?,
        None => env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
        )
        .init(),
    }
    Ok(())
}

fn print_results(results: &[AnalysisResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }
    for result in results {
        print_summary(&result.summary());
        for reason in &result.reasons {
            println!("      - {}", reason);
        }
    }
    Ok(())
}

fn print_summary(summary: &ResultSummary) {
    let (symbol, market_cap, score, potential, trend, main_reason) = summary.as_tuple();
    println!(
        "{:<12} {:>10}  {:>7}  {:<6} {:<2}  {}",
        symbol, market_cap, score, potential, trend, main_reason
    );
}
