pub mod types;

use crate::credentials::Credentials;
use reqwest::StatusCode;
use serde_json::Value;
use types::{BatchGetRequest, ErrorEnvelope};

pub const DEFAULT_MANAGEMENT_API: &str = "https://www.googleapis.com/analytics/v3";
pub const DEFAULT_REPORTING_API: &str = "https://analyticsreporting.googleapis.com/v4";

/// Base URLs of the two Google APIs, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub management: String,
    pub reporting: String,
}

impl GoogleEndpoints {
    pub fn new(management: &str, reporting: &str) -> Self {
        Self {
            management: management.trim().trim_end_matches('/').to_string(),
            reporting: reporting.trim().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_MANAGEMENT_API, DEFAULT_REPORTING_API)
    }
}

/// Failure of an outbound Google API call.
#[derive(Debug)]
pub enum GoogleError {
    Transport(reqwest::Error),
    Status { status: StatusCode, message: String },
    Decode(String),
}

// Rendered like a JavaScript `String(err)`, since clients match on it.
impl std::fmt::Display for GoogleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Error: {e}"),
            Self::Status { message, .. } => write!(f, "Error: {message}"),
            Self::Decode(msg) => write!(f, "Error: invalid response body: {msg}"),
        }
    }
}

impl std::error::Error for GoogleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GoogleError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

/// Analytics client bound to a single request's credentials.
///
/// Built per request from the shared connection pool, so concurrent requests
/// with different tokens never observe each other's credentials.
pub struct AnalyticsClient<'a> {
    http: &'a reqwest::Client,
    endpoints: &'a GoogleEndpoints,
    credentials: Credentials,
}

impl<'a> AnalyticsClient<'a> {
    pub const fn new(
        http: &'a reqwest::Client,
        endpoints: &'a GoogleEndpoints,
        credentials: Credentials,
    ) -> Self {
        Self {
            http,
            endpoints,
            credentials,
        }
    }

    /// List view profiles. `~all` selects every account or web property.
    ///
    /// Returns the raw API payload.
    pub async fn list_profiles(
        &self,
        account_id: &str,
        web_property_id: &str,
    ) -> Result<Value, GoogleError> {
        let url = format!(
            "{}/management/accounts/{}/webproperties/{}/profiles",
            self.endpoints.management,
            urlencoding::encode(account_id),
            urlencoding::encode(web_property_id),
        );
        tracing::debug!(url = %url, "Listing GA profiles");
        self.send(self.http.get(&url)).await
    }

    /// Run `reports:batchGet`. Returns the raw API payload.
    pub async fn batch_get(&self, body: &BatchGetRequest) -> Result<Value, GoogleError> {
        let url = format!("{}/reports:batchGet", self.endpoints.reporting);
        tracing::debug!(url = %url, reports = body.report_requests.len(), "Requesting GA reports");
        self.send(self.http.post(&url).json(body)).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, GoogleError> {
        let response = request
            .bearer_auth(&self.credentials.access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::debug!(status = status.as_u16(), message = %message, "Google API call failed");
            return Err(GoogleError::Status { status, message });
        }

        serde_json::from_str(&body).map_err(|e| GoogleError::Decode(e.to_string()))
    }
}

/// Pull the human-readable message out of a Google error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with status code {}", status.as_u16())
    } else {
        trimmed.to_string()
    }
}
