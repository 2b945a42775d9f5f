use crate::api::errors::ApiError;
use crate::credentials::Credentials;
use crate::google::types::{Profile, ProfileList};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Wildcard selecting every account / web property the token can see.
const ALL: &str = "~all";

const USAGE_HINT: &str =
    "Use a viewId as a request's query parameter to fetch Google Analytics data";

/// Entry of the view selector shown by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewOption {
    pub name: String,
    pub id: String,
}

/// Body of a successful `GET /view`.
#[derive(Debug, Serialize)]
pub struct ViewListResponse {
    pub success: u8,
    pub message: &'static str,
    pub views: Vec<ViewOption>,
    /// Raw profile listing, passed through as returned by the API.
    pub profiles: Value,
}

/// Selector label: `<webPropertyId> - <name> (<websiteUrl>)`.
pub fn view_label(profile: &Profile) -> String {
    format!(
        "{} - {} ({})",
        profile.web_property_id, profile.name, profile.website_url
    )
}

/// One selector entry per profile, in API order.
pub fn view_options(profiles: &ProfileList) -> Vec<ViewOption> {
    profiles
        .items
        .iter()
        .map(|profile| ViewOption {
            name: view_label(profile),
            id: profile.id.clone(),
        })
        .collect()
}

/// GET /view: list the GA views the signed-in account can report on.
pub async fn get_views(
    State(state): State<Arc<AppState>>,
    credentials: Credentials,
) -> Result<Json<ViewListResponse>, ApiError> {
    let profiles = state.analytics(credentials).list_profiles(ALL, ALL).await?;

    let list = ProfileList::deserialize(&profiles)
        .map_err(|e| ApiError::InvalidResponse(format!("profile list: {e}")))?;
    let views = view_options(&list);
    tracing::info!(views = views.len(), "Listed GA views");

    Ok(Json(ViewListResponse {
        success: 1,
        message: USAGE_HINT,
        views,
        profiles,
    }))
}
