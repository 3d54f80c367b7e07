//! `spdwatch` - CLI for speedwatch
//!
//! This binary watches a stream of location samples, estimates the current
//! speed, and warns when it exceeds the configured limit.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use speedwatch::cli::{Cli, Command, ConfigCommand, LimitCommand, WatchCommand};
use speedwatch::{
    init_logging, Config, ConsoleDisplay, ReplayLocationSource, WatchSession, DEFAULT_LIMIT_KMH,
};
use speedwatch_replay::Pacing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Watch(watch_cmd) => handle_watch(&config, &watch_cmd).await,
        Command::Limit(limit_cmd) => handle_limit(&config, &limit_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_watch(config: &Config, cmd: &WatchCommand) -> anyhow::Result<()> {
    let mut options = config.watch_options();
    if let Some(ms) = cmd.timeout_ms {
        options.timeout = Duration::from_millis(ms);
    }

    let mut limit = config.speed_limit()?;
    if let Some(kmh) = cmd.limit {
        limit.set(kmh)?;
    }

    let pacing = if cmd.realtime {
        Pacing::Recorded
    } else {
        Pacing::Immediate
    };
    let source = ReplayLocationSource::from_path(&cmd.trace, pacing)
        .with_context(|| format!("cannot open trace {}", cmd.trace.display()))?;

    // Ctrl-C cancels the subscription; the session then drains and returns.
    let stop = source.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    let mut session = WatchSession::new(limit, ConsoleDisplay::new());
    session.watch(source, options).await?;
    Ok(())
}

fn handle_limit(config: &Config, cmd: &LimitCommand) -> anyhow::Result<()> {
    let mut limit = config.speed_limit()?;

    match cmd {
        LimitCommand::Set { kmh } => {
            limit.set(*kmh)?;
            println!("Speed limit set to {} km/h.", limit.kmh());
        }
        LimitCommand::Reset => {
            limit.reset();
            println!(
                "Speed limit reset to the default of {DEFAULT_LIMIT_KMH} km/h."
            );
        }
        LimitCommand::Show => {
            println!("Speed limit: {} km/h", limit.kmh());
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Watch]");
                println!("  High accuracy:      {}", config.watch.high_accuracy);
                println!("  Max sample age:     {} ms", config.watch.max_sample_age_ms);
                println!("  Timeout:            {} ms", config.watch.timeout_ms);
                println!();
                println!("[Limit]");
                println!("  Speed limit:        {} km/h", config.limit.speed_kmh);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
