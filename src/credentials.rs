use crate::api::errors::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// OAuth token set produced by the login flow and carried in the `tokens` cookie.
///
/// Only `access_token` is needed to call the APIs. Freshness is not checked
/// here; an expired token surfaces as an upstream error.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Expiry as Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Tokens must never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .field("expiry_date", &self.expiry_date)
            .finish_non_exhaustive()
    }
}

/// Why the credential cookie could not be turned into [`Credentials`].
#[derive(Debug)]
pub enum CredentialError {
    Missing(String),
    Malformed(serde_json::Error),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing '{name}' cookie, sign in first"),
            Self::Malformed(e) => write!(f, "credential cookie is not a valid token object: {e}"),
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl Credentials {
    /// Parse an already percent-decoded cookie value.
    ///
    /// A leading `j:` marks an Express JSON cookie and is stripped before
    /// parsing. No further decoding happens here, so a literal `%xx` inside
    /// the token JSON is kept as is.
    pub fn from_cookie_value(value: &str) -> Result<Self, CredentialError> {
        let json = value.strip_prefix("j:").unwrap_or(value);
        serde_json::from_str(json).map_err(CredentialError::Malformed)
    }

    /// Read and parse the named cookie from a request's cookie jar.
    ///
    /// The jar percent-decodes cookie values once while parsing the header.
    pub fn from_jar(jar: &CookieJar, cookie_name: &str) -> Result<Self, CredentialError> {
        let cookie = jar
            .get(cookie_name)
            .ok_or_else(|| CredentialError::Missing(cookie_name.to_string()))?;
        Self::from_cookie_value(cookie.value())
    }
}

impl FromRequestParts<Arc<AppState>> for Credentials {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Self::from_jar(&jar, &state.token_cookie).map_err(ApiError::from)
    }
}
