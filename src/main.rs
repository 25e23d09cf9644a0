use std::{fs::OpenOptions, path::Path};

use anyhow::Context;
use clap::Parser;

mod commands;

/// name of the environment variable that hold the log file path
const LOG_ENV: &str = "DVPK_LOG";

fn main() -> anyhow::Result<()> {
    if let Some(path) = std::env::var_os(LOG_ENV) {
        init_logger(Path::new(&path))?;
    }

    commands::Commands::parse().start()
}

/// append every log record to the given file, nothing is logged when it's not set
fn init_logger(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file '{}'", path.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to initialize logger")?;

    log::info!("dvpk-tool {} started", env!("CARGO_PKG_VERSION"));

    Ok(())
}
