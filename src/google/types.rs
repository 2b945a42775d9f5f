//! Wire types for the Analytics Management v3 and Reporting v4 APIs.
//!
//! Only the fields this service reads are modelled. Report rows stay as raw
//! JSON so they reach the CSV writer exactly as the API returned them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /v4/reports:batchGet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetRequest {
    pub report_requests: Vec<ReportRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
}

/// Response of `reports:batchGet`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchGetResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub data: ReportData,
}

/// `rows` is absent when the report is empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<Value>,
}

/// Response of `management/accounts/{a}/webproperties/{w}/profiles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileList {
    #[serde(default)]
    pub items: Vec<Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub web_property_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub website_url: String,
}

/// Google's JSON error envelope: `{"error": {"code": 401, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
