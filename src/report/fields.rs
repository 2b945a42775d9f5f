use crate::google::types::Dimension;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of dimensions the Reporting API v4 accepts per report request.
pub const MAX_DIMENSIONS: usize = 7;

/// One requested Google Analytics dimension and the CSV column it feeds.
///
/// The position of a field in the configured list is its dimension slot:
/// the first field reads `dimensions[0]` of every returned row, the second
/// reads `dimensions[1]`, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryField {
    /// CSV column header.
    pub label: String,
    /// Human-readable description of the dimension. Defaults to the label.
    #[serde(default)]
    pub value: String,
    /// API dimension name, e.g. `ga:city`.
    pub dimension_name: String,
}

impl QueryField {
    pub fn new(label: &str, value: &str, dimension_name: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            dimension_name: dimension_name.to_string(),
        }
    }

    /// Description shown in logs; falls back to the label when unset.
    pub fn description(&self) -> &str {
        if self.value.is_empty() {
            &self.label
        } else {
            &self.value
        }
    }
}

/// A CSV column: header label plus the row path its cells are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    pub label: String,
    pub value: String,
}

/// The fields requested when no configuration overrides them.
///
/// Session ID (`ga:dimension2`), Client ID (`ga:dimension3`), gender and age
/// bracket are left out: GA drops every row where any requested dimension is
/// null, and those are rarely populated together with the ones below.
pub fn default_query_fields() -> Vec<QueryField> {
    vec![
        QueryField::new("Timestamp", "Timestamp", "ga:dimension1"),
        QueryField::new("Location", "City", "ga:city"),
        QueryField::new("Referral Path", "Referral Path", "ga:referralPath"),
        QueryField::new("URL", "URL", "ga:pagePath"),
    ]
}

/// Map each field to the positional row path `dimensions[i]`.
pub fn data_fields(fields: &[QueryField]) -> Vec<DataField> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| DataField {
            label: field.label.clone(),
            value: format!("dimensions[{index}]"),
        })
        .collect()
}

/// API dimension list, in field order.
pub fn dimension_list(fields: &[QueryField]) -> Vec<Dimension> {
    fields
        .iter()
        .map(|field| Dimension {
            name: field.dimension_name.clone(),
        })
        .collect()
}

/// Reasons a configured field list is rejected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Empty,
    TooMany(usize),
    EmptyLabel(usize),
    InvalidDimension(String),
    DuplicateDimension(String),
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "at least one query field must be configured"),
            Self::TooMany(n) => write!(
                f,
                "{n} query fields configured, the Reporting API accepts at most {MAX_DIMENSIONS}"
            ),
            Self::EmptyLabel(i) => write!(f, "query field #{i} has an empty label"),
            Self::InvalidDimension(name) => {
                write!(f, "dimension '{name}' must be of the form 'ga:<name>'")
            }
            Self::DuplicateDimension(name) => write!(f, "dimension '{name}' is listed twice"),
        }
    }
}

impl std::error::Error for FieldError {}

/// Check a field list before it is used to build report requests.
pub fn validate_fields(fields: &[QueryField]) -> Result<(), FieldError> {
    if fields.is_empty() {
        return Err(FieldError::Empty);
    }
    if fields.len() > MAX_DIMENSIONS {
        return Err(FieldError::TooMany(fields.len()));
    }

    let mut seen = HashSet::new();
    for (index, field) in fields.iter().enumerate() {
        if field.label.trim().is_empty() {
            return Err(FieldError::EmptyLabel(index));
        }
        let valid_name = field
            .dimension_name
            .strip_prefix("ga:")
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()));
        if !valid_name {
            return Err(FieldError::InvalidDimension(field.dimension_name.clone()));
        }
        if !seen.insert(field.dimension_name.as_str()) {
            return Err(FieldError::DuplicateDimension(field.dimension_name.clone()));
        }
    }
    Ok(())
}

/// Parse `Label=ga:name,Label=ga:name` into a field list.
///
/// Used for the `GA_GATEWAY_QUERY_FIELDS` override. Returns `None` if any
/// entry lacks the `=` separator.
pub fn parse_field_list(spec: &str) -> Option<Vec<QueryField>> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (label, dimension) = entry.split_once('=')?;
            let label = label.trim();
            Some(QueryField::new(label, label, dimension.trim()))
        })
        .collect()
}
