use crate::api::errors::ApiError;
use crate::credentials::Credentials;
use crate::google::types::BatchGetResponse;
use crate::report::{self, csv, fields};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for `GET /data`.
///
/// Dates use `YYYY-MM-DD` or GA relative syntax (`7daysago`, `yesterday`)
/// and are forwarded without validation, as is `viewId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataParams {
    pub view_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Export format: "csv" (default) or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

/// GET /data: fetch a GA report for one view and send it as a CSV download.
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    credentials: Credentials,
    WithRejection(Query(params), _): WithRejection<Query<DataParams>, ApiError>,
) -> Result<Response, ApiError> {
    let as_json = match params.format.as_str() {
        "csv" => false,
        "json" => true,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Invalid format: '{other}'. Use 'csv' or 'json'."
            )))
        }
    };

    let request = report::build_report_request(
        params.view_id.clone(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        &state.query_fields,
    );
    let payload = state.analytics(credentials).batch_get(&request).await?;

    if as_json {
        return Ok(Json(serde_json::json!({ "success": 1, "payload": payload })).into_response());
    }

    let response: BatchGetResponse = serde_json::from_value(payload)
        .map_err(|e| ApiError::InvalidResponse(format!("report payload: {e}")))?;
    let report = response
        .reports
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::InvalidResponse("no report in response".to_string()))?;

    let columns = fields::data_fields(&state.query_fields);
    let body = csv::render_csv(&columns, &report.data.rows);
    let filename = csv::report_filename(chrono::Utc::now().timestamp_millis());

    tracing::info!(
        view_id = params.view_id.as_deref().unwrap_or(""),
        rows = report.data.rows.len(),
        filename = %filename,
        "Exported GA report"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
