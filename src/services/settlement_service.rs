use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::cme::{ApiError, CmeClient, RawSettlement, SettlementsResponse};
use crate::models::{ContractMonth, Instrument, InstrumentTable, SettlementRow, SettlementSnapshot, TradingDay};

/// Why one instrument's pull failed
#[derive(Debug, Error)]
pub enum SettlementErrorKind {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("response has no `settlements` field")]
    MissingSettlements,
    #[error("feed published no settlements for this date")]
    EmptyFeed,
    #[error("unexpected feed shape: {0}")]
    SchemaDrift(String),
}

/// A failed pull, tagged with the instrument it belongs to
#[derive(Debug, Error)]
#[error("{instrument} settlements unavailable: {kind}")]
pub struct SettlementError {
    pub instrument: Instrument,
    pub kind: SettlementErrorKind,
}

impl SettlementError {
    fn new(instrument: Instrument, kind: impl Into<SettlementErrorKind>) -> Self {
        Self {
            instrument,
            kind: kind.into(),
        }
    }
}

/// Rewrite the feed's July spelling to the standard abbreviation
///
/// Idempotent: already-standard labels come back unchanged apart from
/// whitespace and case.
pub fn normalize_month_label(raw: &str) -> String {
    raw.trim().to_uppercase().replace("JLY", "JUL")
}

/// Parse a normalized `MON YY` label; the year is always taken as 20YY
pub fn parse_contract_month(label: &str) -> Option<ContractMonth> {
    let mut parts = label.split_whitespace();
    let (abbrev, year) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || abbrev.len() != 3 || year.len() != 2 {
        return None;
    }

    let month = abbrev.parse::<chrono::Month>().ok()?;
    let yy: i32 = year.parse().ok()?;
    ContractMonth::new(2000 + yy, month.number_from_month())
}

/// Parse a settle string; blanks, dashes and anything non-numeric give `None`
pub fn parse_settle(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Turn one raw settlement sheet into a normalized table
///
/// The feed always appends a summary record after the contract rows. It is
/// dropped here, but only after checking it is not itself a contract month,
/// so a format change fails the pull instead of losing the last contract.
pub fn normalize_settlements(
    instrument: Instrument,
    raw_rows: &[RawSettlement],
) -> Result<InstrumentTable, SettlementError> {
    let (summary, data_rows) = raw_rows
        .split_last()
        .ok_or_else(|| SettlementError::new(instrument, SettlementErrorKind::EmptyFeed))?;

    if parse_contract_month(&normalize_month_label(&summary.month)).is_some() {
        return Err(SettlementError::new(
            instrument,
            SettlementErrorKind::SchemaDrift(format!(
                "trailing row '{}' is a contract month, not a summary record",
                summary.month
            )),
        ));
    }
    debug!(
        "{}: dropping summary row '{}' (volume {:?}, open interest {:?})",
        instrument, summary.month, summary.volume, summary.open_interest
    );

    let mut seen = HashSet::with_capacity(data_rows.len());
    let mut rows = Vec::with_capacity(data_rows.len());

    for raw in data_rows {
        let label = normalize_month_label(&raw.month);
        let contract_month = parse_contract_month(&label).ok_or_else(|| {
            SettlementError::new(
                instrument,
                SettlementErrorKind::SchemaDrift(format!("unparseable contract month '{}'", raw.month)),
            )
        })?;

        if !seen.insert(contract_month) {
            return Err(SettlementError::new(
                instrument,
                SettlementErrorKind::SchemaDrift(format!("duplicate contract month '{}'", raw.month)),
            ));
        }

        let settlement_price = raw.settle.as_deref().and_then(parse_settle);
        if settlement_price.is_none() {
            debug!("{}: no usable settle for {} ({:?})", instrument, contract_month, raw.settle);
        }

        rows.push(SettlementRow {
            contract_month,
            settlement_price,
        });
    }

    Ok(InstrumentTable { instrument, rows })
}

fn rows_from_response(
    instrument: Instrument,
    response: SettlementsResponse,
) -> Result<Vec<RawSettlement>, SettlementError> {
    match response.settlements {
        Some(rows) if rows.is_empty() => Err(SettlementError::new(instrument, SettlementErrorKind::EmptyFeed)),
        Some(rows) => Ok(rows),
        None if response.empty => Err(SettlementError::new(instrument, SettlementErrorKind::EmptyFeed)),
        None => Err(SettlementError::new(instrument, SettlementErrorKind::MissingSettlements)),
    }
}

/// Pull and normalize a single instrument
pub async fn fetch_instrument(
    client: &CmeClient,
    instrument: Instrument,
    trading_day: TradingDay,
) -> Result<InstrumentTable, SettlementError> {
    debug!(
        "Fetching {} settlements (product {}) for {}",
        instrument,
        instrument.product_id(),
        trading_day
    );

    let response = client
        .get_settlements(instrument.product_id(), trading_day)
        .await
        .map_err(|e| SettlementError::new(instrument, e))?;

    if let Some(echoed) = response.trade_date.as_deref() {
        let same_day = NaiveDate::parse_from_str(echoed.trim(), "%m/%d/%Y")
            .map(|date| date == trading_day.date())
            .unwrap_or(false);
        if !same_day {
            warn!("{}: requested {} but feed answered for {}", instrument, trading_day.query_format(), echoed);
        }
    }

    let raw_rows = rows_from_response(instrument, response)?;
    let table = normalize_settlements(instrument, &raw_rows)?;

    info!(
        "{}: {} contract months ({} priced) for {}",
        instrument,
        table.rows.len(),
        table.priced_rows(),
        trading_day
    );
    Ok(table)
}

/// Pull every tracked instrument for `trading_day`, one after another
///
/// The first failure aborts the pull; no partial snapshot is returned.
pub async fn fetch_settlements(
    client: &CmeClient,
    trading_day: TradingDay,
) -> Result<SettlementSnapshot, SettlementError> {
    let mut tables = Vec::with_capacity(Instrument::ALL.len());
    for instrument in Instrument::ALL {
        tables.push(fetch_instrument(client, instrument, trading_day).await?);
    }

    Ok(SettlementSnapshot { trading_day, tables })
}
