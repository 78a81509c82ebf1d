use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use super::models::{ApiError, SettlementsResponse};
use crate::config::Config;
use crate::models::TradingDay;
use tracing::{debug, warn};

/// Client for the CME futures settlements feed
pub struct CmeClient {
    http_client: HttpClient,
    base_url: String,
    page_size: u32,
    timeout_secs: u64,
}

impl CmeClient {
    /// Create a client from the run configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let headers = Self::create_headers(&config.user_agent)?;
        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            page_size: config.page_size,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    fn create_headers(user_agent: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let agent = HeaderValue::from_str(user_agent)
            .map_err(|e| ApiError::RequestError(format!("Invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        Ok(headers)
    }

    fn settlements_url(&self, product_id: u32) -> String {
        format!("{}/{}/FUT", self.base_url, product_id)
    }

    /// Millisecond timestamp so intermediate caches never serve a stale day
    fn cache_buster() -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }

    /// Map a non-success response onto an error by status class
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            403 => ApiError::Forbidden(body_text),
            404 => ApiError::NotFound(body_text),
            429 => {
                warn!("Settlements feed is rate limiting requests");
                ApiError::RateLimited(body_text)
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    /// GET {base}/{product_id}/FUT
    ///
    /// Retrieves the settlement sheet of one futures product for `trading_day`.
    ///
    /// # Returns
    /// * `Ok(SettlementsResponse)` - Decoded body; `settlements` may still be absent
    /// * `Err(ApiError)` - Transport, status or decoding failure
    pub async fn get_settlements(
        &self,
        product_id: u32,
        trading_day: TradingDay,
    ) -> Result<SettlementsResponse, ApiError> {
        let url = self.settlements_url(product_id);
        let trade_date = trading_day.query_format();
        let page_size = self.page_size.to_string();
        let cache_buster = Self::cache_buster();
        debug!("GET {} tradeDate={}", url, trade_date);

        let response = self.http_client
            .get(&url)
            .query(&[
                ("strategy", "DEFAULT"),
                ("tradeDate", trade_date.as_str()),
                ("pageSize", page_size.as_str()),
                ("isProtected", ""),
                ("_t", cache_buster.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(self.timeout_secs)
                } else {
                    ApiError::RequestError(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<SettlementsResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(self.timeout_secs)
                } else {
                    ApiError::DeserializationError(format!("Failed to parse response: {}", e))
                }
            })
    }
}
