//! kvcache CLI
//!
//! Loads the cache configuration, connects lazily and runs one command.

use anyhow::{Context, Result};
use clap::Parser;
use kvcache_cli::{Args, Outcome, execute};
use kvcache_client::CacheManager;
use kvcache_config::{Config, get_config, load_config};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::from_default_env().add_directive("kvcache=info".parse()?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Error loading config");
            return Err(e);
        }
    };

    let settings = config.redis().clone();
    info!(
        clustered = settings.is_clustered(),
        tls = settings.tls.enabled,
        "Cache manager configured"
    );

    let manager = CacheManager::connect_lazy(settings);
    match execute(&manager, &args.command).await? {
        Outcome::Output(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Missing(key) => {
            eprintln!("(nil) {key}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(get_config().context("loading default configuration")?.clone()),
    }
}
