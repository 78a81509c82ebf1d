use serde::Deserialize;
use thiserror::Error;

/// Body of the futures settlements endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementsResponse {
    /// Absent when the upstream schema changes; callers must treat that as fatal
    pub settlements: Option<Vec<RawSettlement>>,
    pub trade_date: Option<String>,
    #[serde(default)]
    pub empty: bool,
}

/// One row exactly as published, every value still a string
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettlement {
    pub month: String,
    #[serde(default)]
    pub settle: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub open_interest: Option<String>,
}

/// Transport-level failures talking to the settlements endpoint
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes_with_extra_fields() {
        let body = r#"{
            "settlements": [
                {"month": "FEB 24", "open": "72.10", "settle": "73.81", "volume": "301,542", "openInterest": "301,411"},
                {"month": "Total", "settle": "", "volume": "1,088,110", "openInterest": "1,724,012"}
            ],
            "updateTime": "Friday, 05 Jan 2024 06:00 PM CT",
            "tradeDate": "01/05/2024",
            "empty": false
        }"#;
        let parsed: SettlementsResponse = serde_json::from_str(body).unwrap();
        let rows = parsed.settlements.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].settle.as_deref(), Some("73.81"));
        assert_eq!(rows[1].open_interest.as_deref(), Some("1,724,012"));
        assert_eq!(parsed.trade_date.as_deref(), Some("01/05/2024"));
    }

    #[test]
    fn test_missing_settlements_field_is_none() {
        let parsed: SettlementsResponse = serde_json::from_str(r#"{"tradeDate": "01/05/2024"}"#).unwrap();
        assert!(parsed.settlements.is_none());
        assert!(!parsed.empty);
    }
}
