use anyhow::{Context, Result};
use covidsnap::{
    config::{Config, RunContext},
    fetch, pipeline,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_CONFIG: &str = "covidsnap.yaml";

fn load_config() -> Result<Config> {
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    match explicit {
        Some(path) => Config::from_yaml_file(&path)
            .with_context(|| format!("reading config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::from_yaml_file(DEFAULT_CONFIG)
            .with_context(|| format!("reading config {}", DEFAULT_CONFIG)),
        None => {
            info!("no config file, using defaults");
            Ok(Config::default())
        }
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,covidsnap=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) config & run context ─────────────────────────────────────
    let config = load_config()?;
    let client = fetch::build_client(config.http_timeout_secs)?;
    let ctx = RunContext::from_local_clock(config);

    // ─── 3) build the snapshot ───────────────────────────────────────
    let summary = pipeline::run(&ctx, &client)?;
    info!(
        counties = summary.counties,
        states = summary.states,
        "done"
    );
    Ok(())
}
