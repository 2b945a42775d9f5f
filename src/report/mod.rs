pub mod csv;
pub mod fields;

use crate::google::types::{BatchGetRequest, DateRange, Metric, ReportRequest};
use fields::QueryField;

/// Start of the report window when the caller gives none (GA relative-date syntax).
pub const DEFAULT_START_DATE: &str = "7daysago";
/// End of the report window when the caller gives none.
pub const DEFAULT_END_DATE: &str = "yesterday";
/// The single metric every report requests: total user count.
pub const USERS_METRIC: &str = "ga:users";

/// Build the `reports:batchGet` body for one view and date window.
///
/// Empty or missing dates fall back to the defaults independently. The view
/// id is forwarded untouched; when absent it is left out of the body.
pub fn build_report_request(
    view_id: Option<String>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    fields: &[QueryField],
) -> BatchGetRequest {
    let start_date = start_date.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_START_DATE);
    let end_date = end_date.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_END_DATE);

    BatchGetRequest {
        report_requests: vec![ReportRequest {
            view_id,
            date_ranges: vec![DateRange {
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
            }],
            metrics: vec![Metric {
                expression: USERS_METRIC.to_string(),
            }],
            dimensions: fields::dimension_list(fields),
        }],
    }
}
