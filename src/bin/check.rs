//! alone_check - single-instance check from the command line
//!
//! Runs the instance check for an application identity and, when this
//! process wins, holds the lock until Enter is pressed. Launch it twice
//! with the same identity to see the second one refused and the peer
//! process reported.
//!
//! Exit code 0: ran as the single instance. Exit code 1: another instance
//! is running.

use alone::config::{self, CheckConfig};
use alone::{InstanceGuard, LockScope};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command line overrides applied on top of the config file
#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    package_id: Option<String>,
    app_name: Option<String>,
    suffix: Option<String>,
    lock_file: Option<PathBuf>,
    window_title: Option<String>,
    session: bool,
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    tracing::debug!("Arguments: {:?}", args);

    let config = build_config(&args)?;
    tracing::info!("Checking instance lock {}", config.identity());

    let mut guard = InstanceGuard::new();
    if !guard.check_and_run(&config) {
        if let Some(result) = guard.last_result() {
            if let Some(ref peer) = result.peer {
                tracing::info!(
                    "Running instance: pid {}, window activated: {}",
                    peer.process_id,
                    result.activated_window
                );
            }
        }
        std::process::exit(1);
    }

    println!("Running as the single instance. Press Enter to exit.");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    guard.dispose();
    Ok(())
}

/// Parse command line arguments
fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config_path = Some(PathBuf::from(value_for(&arg, iter.next())?)),
            "--package-id" => args.package_id = Some(value_for(&arg, iter.next())?),
            "--app-name" => args.app_name = Some(value_for(&arg, iter.next())?),
            "--suffix" => args.suffix = Some(value_for(&arg, iter.next())?),
            "--lock-file" => args.lock_file = Some(PathBuf::from(value_for(&arg, iter.next())?)),
            "--window-title" => args.window_title = Some(value_for(&arg, iter.next())?),
            "--session" => args.session = true,
            "--quiet" => args.quiet = true,
            other => bail!("Unknown argument: {}", other),
        }
    }

    Ok(args)
}

fn value_for(flag: &str, value: Option<String>) -> Result<String> {
    value.with_context(|| format!("{} requires a value", flag))
}

fn build_config(args: &Args) -> Result<CheckConfig> {
    let mut config = match args.config_path {
        Some(ref path) => config::load_config_file(path)?,
        None => {
            let path = config::default_config_path()?;
            if path.exists() {
                tracing::info!("Using config file {:?}", path);
                config::load_config_file(&path)?
            } else {
                CheckConfig::default()
            }
        }
    };

    if let Some(ref id) = args.package_id {
        config.package_id = id.clone();
    }
    if let Some(ref name) = args.app_name {
        config.app_name = name.clone();
    }
    if args.suffix.is_some() {
        config.suffix = args.suffix.clone();
    }
    if args.lock_file.is_some() {
        config.lock_file_path = args.lock_file.clone();
    }
    if args.window_title.is_some() {
        config.window_title = args.window_title.clone();
    }
    if args.session {
        config.scope = LockScope::Session;
    }
    if args.quiet {
        config.show_message_box = false;
    }

    Ok(config)
}
