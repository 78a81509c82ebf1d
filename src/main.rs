use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use config::Config;
use services::report_service::{self, RunContext};

const DEFAULT_LOG_FILTER: &str = "cme_settle_board=info,reqwest=warn";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting CME settlement board v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = match RunContext::new(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let today = chrono::Local::now().date_naive();
    match report_service::run(&ctx, today).await {
        Ok(report) => {
            info!(
                "Settlements for {} ready: {} rows, dashboard at {}",
                report.trading_day,
                report.rows,
                report.dashboard_path.display()
            );
            if let Some(png) = report.chart_png_path {
                info!("Chart image at {}", png.display());
            }
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
