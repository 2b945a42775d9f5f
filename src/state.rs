use crate::config::Config;
use crate::credentials::Credentials;
use crate::google::{AnalyticsClient, GoogleEndpoints};
use crate::report::fields::QueryField;
use std::time::Duration;

/// Shared application state. Immutable once the server starts.
pub struct AppState {
    /// Connection pool shared by every request-scoped [`AnalyticsClient`].
    pub http: reqwest::Client,
    pub endpoints: GoogleEndpoints,
    pub token_cookie: String,
    pub base_path: String,
    pub dashboard_origin: Option<String>,
    pub query_fields: Vec<QueryField>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            endpoints: GoogleEndpoints::new(&config.management_api_base, &config.reporting_api_base),
            token_cookie: config.token_cookie.clone(),
            base_path: config.base_path.clone(),
            dashboard_origin: config.dashboard_origin.clone(),
            query_fields: config.query_fields.clone(),
        })
    }

    /// Analytics client authenticated as the caller of the current request.
    pub const fn analytics(&self, credentials: Credentials) -> AnalyticsClient<'_> {
        AnalyticsClient::new(&self.http, &self.endpoints, credentials)
    }
}
