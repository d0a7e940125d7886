use std::sync::Arc;

use analysis_orchestrator::{AnalysisSession, SearchOutcome};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use market_data_client::{FinnhubClient, MsnClient, PeRatioProvider};
use valuation_core::{Assumptions, WatchlistRepository};
use watchlist::{SqliteWatchlistRepository, Watchlist};

mod cli;
mod config;
mod report;

use cli::{AssumptionArgs, Cli, Commands, WatchlistAction};
use config::AppConfig;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr so stdout stays clean for reports and --json output.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn finnhub_client(config: &AppConfig) -> Result<FinnhubClient> {
    let mut client = FinnhubClient::new(config.finnhub_api_key()?.to_string())?
        .with_rate_limit(config.finnhub_rate_limit);
    if let Some(base_url) = &config.finnhub_base_url {
        client = client.with_base_url(base_url.clone());
    }
    Ok(client)
}

fn analysis_session(config: &AppConfig) -> Result<AnalysisSession> {
    let finnhub = Arc::new(finnhub_client(config)?);

    let pe_provider: Arc<dyn PeRatioProvider> = if config.msn_api_key.is_some() {
        Arc::new(MsnClient::new(config.msn_api_key.clone()))
    } else {
        tracing::warn!("MSN_API_KEY not set, supplementary P/E lookup disabled; using Finnhub P/E only");
        Arc::new(())
    };

    Ok(AnalysisSession::new(finnhub.clone(), pe_provider).with_symbol_search(finnhub))
}

async fn open_watchlist(config: &AppConfig) -> Result<Watchlist> {
    let repository: Arc<dyn WatchlistRepository> = Arc::new(
        SqliteWatchlistRepository::new(&config.watchlist_database_url)
            .await
            .with_context(|| format!("Failed to open watchlist at {}", config.watchlist_database_url))?,
    );
    Ok(Watchlist::load(repository).await?)
}

async fn run_analysis(
    config: &AppConfig,
    ticker: &str,
    seed: Assumptions,
    overrides: AssumptionArgs,
    save: bool,
    json: bool,
) -> Result<()> {
    let session = analysis_session(config)?;

    match session.search_with_assumptions(ticker, seed).await {
        SearchOutcome::Loaded { .. } => {}
        SearchOutcome::Failed { message } => anyhow::bail!(message),
        SearchOutcome::Ignored => anyhow::bail!("Ticker must not be empty"),
        SearchOutcome::Superseded => return Ok(()),
    }

    let overrides = overrides.to_assumptions();
    if let Some(v) = overrides.expected_cagr {
        session.set_expected_cagr(v).await;
    }
    if let Some(v) = overrides.expected_pe {
        session.set_expected_pe(v).await;
    }
    if let Some(v) = overrides.expected_bvps_cagr {
        session.set_expected_bvps_cagr(v).await;
    }
    if let Some(v) = overrides.expected_roe {
        session.set_expected_roe(v).await;
    }
    if let Some(v) = overrides.expected_pe_bv {
        session.set_expected_pe_bv(v).await;
    }

    let state = session.state().await;
    let projections = session.projections().await;
    let supplementary_pe = config.msn_api_key.is_some();

    if json {
        let payload = serde_json::json!({
            "state": state,
            "projections": projections,
            "supplementaryPe": supplementary_pe,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", report::render_analysis(&state, &projections, supplementary_pe));
    }

    if save {
        let item = session
            .watchlist_entry(Utc::now())
            .await
            .context("Nothing to save: analysis is not loaded")?;
        let mut watchlist = open_watchlist(config).await?;
        watchlist.add_or_update(item).await?;
        eprintln!("Saved {} to watchlist ({} items)", state.ticker, watchlist.len());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    tracing::debug!("Configuration: {}", serde_json::to_string(&config)?);

    match cli.command {
        Commands::Analyze { ticker, assumptions, save } => {
            run_analysis(&config, &ticker, Assumptions::default(), assumptions, save, cli.json).await?;
        }

        Commands::Search { query } => {
            let session = analysis_session(&config)?;
            let suggestions = session.suggest(&query).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else if suggestions.is_empty() {
                println!("No matches for '{query}'");
            } else {
                for s in suggestions {
                    println!("{:<8} {}", s.ticker, s.name);
                }
            }
        }

        Commands::Watchlist { action } => match action {
            WatchlistAction::List => {
                let watchlist = open_watchlist(&config).await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(watchlist.items())?);
                } else {
                    print!("{}", report::render_watchlist(watchlist.items()));
                }
            }

            WatchlistAction::Open { ticker } => {
                let watchlist = open_watchlist(&config).await?;
                let saved = watchlist
                    .get(&ticker)
                    .with_context(|| format!("{ticker} is not in the watchlist"))?;
                run_analysis(
                    &config,
                    &saved.ticker,
                    saved.assumptions,
                    AssumptionArgs::default(),
                    false,
                    cli.json,
                )
                .await?;
            }

            WatchlistAction::Remove { ticker } => {
                let mut watchlist = open_watchlist(&config).await?;
                if !watchlist.contains(&ticker) {
                    anyhow::bail!("{ticker} is not in the watchlist");
                }
                watchlist.remove(&ticker).await?;
                println!("Removed {ticker} ({} items left)", watchlist.len());
            }
        },
    }

    Ok(())
}
