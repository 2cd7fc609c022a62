use anyhow::{Context, Result};
use clap::Parser;
use cv_latex::app_log;
use cv_latex::{core::ConfigManager, start_web_server};
use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "cv-latex")]
#[command(about = "HTTP API compiling the CV stored in Supabase to PDF")]
struct Cli {
    /// YAML configuration file (defaults to CONFIG_PATH or ./config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding configuration
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cv_latex=info,rocket::server=off"));

    match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Clear file on startup
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    let mut config = ConfigManager::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }

    app_log!(info, "Parsed port: {}", config.server.port);

    start_web_server(config).await
}
