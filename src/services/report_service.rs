//! One end-to-end run: resolve the day, pull, render, write
//!
//! Every run owns its own [`RunContext`]; nothing here is shared between
//! runs, so concurrent dashboard sessions stay independent.

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::api::cme::CmeClient;
use crate::config::Config;
use crate::models::{CombinedDataset, Instrument, TradingDay};
use crate::services::calendar_service::{FixedCalendar, HolidayCalendar, LayeredCalendar, NyseCalendar};
use crate::services::{chart_service, dashboard_service, settlement_service, trading_day_service};
use crate::utils::{AppError, Table};

/// NYSE rules plus any closures listed in `SETTLE_EXTRA_CLOSURES`
pub type RunCalendar = LayeredCalendar<NyseCalendar>;

/// Request-scoped collaborators for a single run
pub struct RunContext<C: HolidayCalendar = RunCalendar> {
    pub config: Config,
    pub client: CmeClient,
    pub calendar: C,
}

impl RunContext<RunCalendar> {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = CmeClient::new(&config)?;
        let calendar = LayeredCalendar::new(NyseCalendar, FixedCalendar::new(config.extra_closures.iter().copied()));
        Ok(Self {
            config,
            client,
            calendar,
        })
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub trading_day: TradingDay,
    pub rows: usize,
    pub dashboard_path: PathBuf,
    pub chart_png_path: Option<PathBuf>,
}

/// Pick the trade date: an explicit override wins, otherwise the last
/// trading day before `reference_date`
pub fn select_trading_day<C: HolidayCalendar>(
    config: &Config,
    calendar: &C,
    reference_date: NaiveDate,
) -> Result<TradingDay, AppError> {
    match config.trade_date {
        Some(date) => {
            if !trading_day_service::is_trading_day(date, calendar) {
                warn!("Configured trade date {} is not a trading day; the feed may be empty", date);
            }
            Ok(TradingDay::new(date))
        }
        None => Ok(trading_day_service::resolve_last_trading_day(reference_date, calendar)?),
    }
}

/// Console summary of the combined dataset
pub fn summary_table(dataset: &CombinedDataset) -> Table {
    let mut table = Table::new(vec!["Product", "Month", "Settle", "Unit"]);
    for row in &dataset.rows {
        let month = row.contract_month.to_string();
        let settle = row
            .settlement_price
            .map(|p| format!("{:.3}", p))
            .unwrap_or_else(|| "n/a".to_string());
        table.add_row(vec![
            row.instrument.label(),
            month.as_str(),
            settle.as_str(),
            row.instrument.unit().symbol(),
        ]);
    }
    table
}

pub async fn run<C: HolidayCalendar>(
    ctx: &RunContext<C>,
    reference_date: NaiveDate,
) -> Result<RunReport, AppError> {
    let trading_day = select_trading_day(&ctx.config, &ctx.calendar, reference_date)?;
    info!("Pulling settlements for trade date {}", trading_day);

    let snapshot = settlement_service::fetch_settlements(&ctx.client, trading_day).await?;
    for instrument in Instrument::ALL {
        if snapshot.table(instrument).map_or(true, |t| t.priced_rows() == 0) {
            warn!("{} has no priced contract months for {}; it is left off the chart", instrument, snapshot.label());
        }
    }

    let combined = snapshot.combine();
    let summary = summary_table(&combined);
    if summary.is_empty() {
        warn!("Combined dataset for {} has no rows", trading_day);
    } else {
        info!(
            "Combined dataset: {} rows, {} priced\n{}",
            summary.len(),
            combined.priced_points(),
            summary.render()
        );
    }

    let chart = chart_service::render_svg(&combined, ctx.config.chart_width, ctx.config.chart_height)?;
    let html = dashboard_service::render_dashboard(&combined, &chart);
    dashboard_service::write_dashboard(&ctx.config.dashboard_path, &html)?;

    if let Some(png_path) = &ctx.config.chart_png_path {
        chart_service::render_png(&combined, png_path, ctx.config.chart_width, ctx.config.chart_height)?;
        info!("Chart image written to {}", png_path.display());
    }

    Ok(RunReport {
        trading_day,
        rows: combined.len(),
        dashboard_path: ctx.config.dashboard_path.clone(),
        chart_png_path: ctx.config.chart_png_path.clone(),
    })
}
