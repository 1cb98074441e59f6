//! upwatch - URL uptime monitor
//!
//! Probes a fixed list of URLs, tracks UP/DOWN/slow transitions per URL and
//! sends a notification when something changes.

mod config;
mod logsink;
mod monitor;
mod notify;
mod probe;
mod scheduler;

use config::MonitorConfig;
use notify::TelegramNotifier;
use probe::HttpProber;
use scheduler::Monitor;

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_UNHEALTHY: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "upwatch")]
#[command(about = "Monitor URLs for uptime and latency")]
#[command(version)]
struct Cli {
    /// Run one check of every URL and exit (no notifications).
    /// Exits 0 when all URLs are up, 1 otherwise.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("upwatch=info")))
        .init();

    let cfg = match MonitorConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    tracing::info!("Monitoring {} URLs", cfg.targets.len());
    tracing::info!("Writing uptime log to {}", cfg.log_path.display());

    let prober = match HttpProber::new(cfg.failure_status_threshold) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut notifier =
        TelegramNotifier::new(cfg.telegram_bot_token.clone(), cfg.telegram_chat_id.clone());
    if let Some(api_base) = &cfg.telegram_api_base {
        notifier = notifier.with_api_base(api_base.as_str());
    }
    if !cli.check && !notifier.has_credentials() {
        tracing::warn!("Telegram credentials missing, notifications will only be logged");
    }

    let mut monitor = Monitor::new(&cfg, prober, Arc::new(notifier));

    if cli.check {
        return if monitor.check_once(false).await {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(EXIT_UNHEALTHY)
        };
    }

    monitor.run_forever().await;
    ExitCode::SUCCESS
}
