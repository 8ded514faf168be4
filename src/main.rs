//! CloudScope — GPU cloud instance availability monitor.
//!
//! Polls the Lambda Labs inventory API on a bounded interval, diffs
//! each snapshot against the previous one, alerts on meaningful
//! transitions (instance became available, launch started, new region
//! seen), and writes a timestamped record of every poll to console and
//! a per-run log file.
//!
//! Usage: `cloudscope <config.toml> <namespace>`
//!
//! Only a configuration failure exits non-zero; once the poll loop is
//! running, transient fetch errors are logged and survived.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod monitor;
mod notify;
mod report;

use api::LambdaApiFetcher;
use config::MonitorConfig;
use monitor::Monitor;
use notify::{Notifier, NullNotifier, VoiceNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (config_file, namespace) = match (args.next(), args.next()) {
        (Some(c), Some(n)) => (c, n),
        _ => bail!("usage: cloudscope <config.toml> <namespace>"),
    };

    // Config failures are fatal before any polling starts.
    let config = MonitorConfig::load(Path::new(&config_file), &namespace)
        .with_context(|| format!("failed to load config namespace '{namespace}'"))?;

    let log_file = init_logging(&config.log_dir).context("failed to set up logging")?;

    info!("📡 CloudScope v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(namespace = %namespace, log_file = %log_file.display(), "Monitoring run starting");
    info!(
        requested_delay_ms = config.min_poll_delay_ms,
        effective_delay_ms = config.effective_poll_delay().as_millis() as u64,
        voice = config.enable_voice_notifications,
        "Poll interval (clamped to the API rate-limit floor)"
    );

    let fetcher = Arc::new(LambdaApiFetcher::new(
        config.api_endpoint(),
        config.api_key.clone(),
    ));
    let notifier: Arc<dyn Notifier> = if config.enable_voice_notifications {
        Arc::new(VoiceNotifier)
    } else {
        Arc::new(NullNotifier)
    };

    let mut monitor = Monitor::new(fetcher, notifier);
    let poll_delay = config.effective_poll_delay();

    tokio::select! {
        _ = monitor.run(poll_delay) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received — stopping monitor");
        }
    }

    Ok(())
}

/// Console + per-run log file, named after the run's start timestamp.
/// The log directory is created on demand.
fn init_logging(log_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join(format!("{}.log", Utc::now().format("%Y%m%d_%H%M%S")));
    let file = std::fs::File::create(&log_path)
        .with_context(|| format!("cannot create log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cloudscope=info".into()))
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();

    println!("Logging to: {}", log_path.display());
    Ok(log_path)
}
