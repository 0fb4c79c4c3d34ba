//! Agora CLI
//!
//! Command-line access to the rate-limited geocoder used by the Agora app.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agora_core::types::Location;
use agora_geocode::{build_geocoder, GeocodeConfig, Geocoder};

/// Agora - campus event geocoding tools
#[derive(Parser)]
#[command(name = "agora")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode one or more free-form queries
    Search {
        /// Queries to look up, searched in order
        #[arg(required = true)]
        queries: Vec<String>,
        /// Geocoding service base URL
        #[arg(long, env = "AGORA_GEOCODE_URL")]
        base_url: Option<String>,
        /// User-Agent sent to the service
        #[arg(long, env = "AGORA_USER_AGENT")]
        user_agent: Option<String>,
        /// Minimum spacing between requests in milliseconds
        #[arg(long, env = "AGORA_MIN_INTERVAL_MS")]
        min_interval_ms: Option<u64>,
        /// Cache results by query for the given number of seconds
        #[arg(long, value_name = "TTL_SECONDS")]
        cache: Option<u64>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "agora=debug,info"
    } else {
        "agora=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Search {
            queries,
            base_url,
            user_agent,
            min_interval_ms,
            cache,
            json,
        } => {
            let mut config = GeocodeConfig::from_env().context("Invalid geocoder configuration")?;
            if let Some(url) = base_url {
                config.base_url = url;
            }
            if let Some(agent) = user_agent {
                config = config.with_user_agent(agent);
            }
            if let Some(ms) = min_interval_ms {
                config = config.with_min_interval(Duration::from_millis(ms));
            }
            if let Some(ttl) = cache {
                config = config.with_cache(ttl);
            }
            cmd_search(&queries, config, json).await
        }
    }
}

/// Search each query in turn through one geocoder
async fn cmd_search(queries: &[String], config: GeocodeConfig, json: bool) -> Result<()> {
    debug!(?config, "Building geocoder");
    let geocoder = build_geocoder(config).context("Failed to create geocoder")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut results = Vec::with_capacity(queries.len());
    for query in queries {
        spinner.set_message(format!("Searching {:?}...", query));
        let found = geocoder
            .search(query)
            .await
            .with_context(|| format!("Search failed for {:?}", query))?;
        results.push((query.as_str(), found));
    }
    spinner.finish_and_clear();

    if json {
        let mut out = serde_json::Map::new();
        for (query, found) in &results {
            out.insert(query.to_string(), serde_json::to_value(found)?);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (query, found) in &results {
            print_results(query, found);
        }
    }

    Ok(())
}

fn print_results(query: &str, found: &[Location]) {
    println!("{} {}", "🔍".cyan(), query.bold());

    if found.is_empty() {
        println!("   {}", "No results.".yellow());
        return;
    }

    for (idx, loc) in found.iter().enumerate() {
        println!(
            "   {} {}",
            format!("{}.", idx + 1).dimmed(),
            loc.name.green()
        );
        println!(
            "      {} {:.6}, {:.6}",
            "lat/lon:".dimmed(),
            loc.latitude,
            loc.longitude
        );
    }
}
