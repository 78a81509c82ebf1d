use thiserror::Error;

use crate::api::cme::ApiError;
use crate::config::ConfigError;
use crate::services::chart_service::ChartError;
use crate::services::settlement_service::SettlementError;
use crate::services::trading_day_service::CalendarError;

/// Anything that can stop a run, one variant per layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("could not build HTTP client: {0}")]
    Client(#[from] ApiError),
    #[error("date resolution failed: {0}")]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error("chart rendering failed: {0}")]
    Chart(#[from] ChartError),
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Instrument;
    use crate::services::settlement_service::SettlementErrorKind;

    #[test]
    fn test_settlement_error_names_instrument() {
        let err: AppError = SettlementError {
            instrument: Instrument::Brent,
            kind: SettlementErrorKind::MissingSettlements,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Brent settlements unavailable: response has no `settlements` field"
        );
    }
}
