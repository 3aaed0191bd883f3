//! vigil-replay: replay a scripted source through a price feed.
//!
//! Reads a JSON script describing a source and a sequence of steps, drives a
//! price feed with it, and prints a JSON report of every step to stdout.
//! Logs go to stderr.
//!
//! Usage:
//!   vigil-replay <script.json> [config.toml]

mod script;

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use vigil_oracle::config::FeedConfig;

use crate::script::Script;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("vigil=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(script_path) = args.next().map(PathBuf::from) else {
        anyhow::bail!("usage: vigil-replay <script.json> [config.toml]");
    };
    let config = match args.next() {
        Some(path) => FeedConfig::load(&PathBuf::from(path))?,
        None => FeedConfig::default(),
    };

    let content = std::fs::read_to_string(&script_path)
        .with_context(|| format!("reading {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", script_path.display()))?;

    info!(steps = script.steps.len(), "replay starting");
    let report = script::run(&script, &config)?;
    info!(
        accepted = report.accepted(),
        rejected = report.steps.len() - report.accepted(),
        "replay finished"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
