use crate::report::fields::DataField;
use serde_json::Value;

/// Attachment name for a report exported at the given Unix time in milliseconds.
pub fn report_filename(epoch_millis: i64) -> String {
    format!("GAreport_{epoch_millis}.csv")
}

/// Render report rows as CSV.
///
/// The header row holds the field labels. Each cell is looked up in the row
/// by the field's path (`dimensions[2]`, `metrics[0].values[0]`, ...); a path
/// that does not resolve yields an empty cell.
///
/// Every cell goes through [`escape_csv_field`]. That includes the formula
/// guard, so a GA value starting with `=`, `+`, `-` or `@` is written with a
/// leading `'` (`-1` becomes `'-1`). The export targets spreadsheets, and a
/// referral path or page title from the open web must not run as a formula
/// there. Consumers that need the raw values can ask for `format=json`.
pub fn render_csv(fields: &[DataField], rows: &[Value]) -> String {
    let mut csv = String::with_capacity(64 * (rows.len() + 1));

    let header: Vec<String> = fields.iter().map(|f| escape_csv_field(&f.label)).collect();
    csv.push_str(&header.join(","));
    csv.push('\n');

    for row in rows {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                csv.push(',');
            }
            let cell = resolve_path(row, &field.value).map(cell_text).unwrap_or_default();
            csv.push_str(&escape_csv_field(&cell));
        }
        csv.push('\n');
    }
    csv
}

/// Follow a dotted/indexed path such as `metrics[0].values[1]` into a JSON value.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        let (key, mut rest) = segment
            .find('[')
            .map_or((segment, ""), |pos| (&segment[..pos], &segment[pos..]));
        if !key.is_empty() {
            current = current.get(key)?;
        }
        while let Some(inner) = rest.strip_prefix('[') {
            let end = inner.find(']')?;
            let index: usize = inner[..end].trim().parse().ok()?;
            current = current.get(index)?;
            rest = &inner[end + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(current)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

/// Escape a CSV field to prevent CSV injection attacks.
///
/// Wraps the field in double quotes and escapes internal double quotes.
/// Prefixes fields starting with formula-triggering characters (`=`, `+`, `-`, `@`)
/// with a single quote to neutralize them in spreadsheet applications.
pub fn escape_csv_field(field: &str) -> String {
    let escaped = field.replace('"', "\"\"");
    if escaped.starts_with(['=', '+', '-', '@']) {
        format!("\"'{escaped}\"")
    } else {
        format!("\"{escaped}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fields::{data_fields, default_query_fields};
    use serde_json::json;

    fn sample_rows() -> Vec<Value> {
        vec![
            json!({
                "dimensions": ["1718000000000", "Hanoi", "/blog", "/pricing"],
                "metrics": [{ "values": ["3"] }]
            }),
            json!({
                "dimensions": ["1718000000500", "Berlin", "(not set)", "/"],
                "metrics": [{ "values": ["1"] }]
            }),
        ]
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename(1_718_000_000_000), "GAreport_1718000000000.csv");
    }

    #[test]
    fn test_render_csv_header_and_rows() {
        let fields = data_fields(&default_query_fields());
        let csv = render_csv(&fields, &sample_rows());
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "\"Timestamp\",\"Location\",\"Referral Path\",\"URL\"");
        assert_eq!(lines[1], "\"1718000000000\",\"Hanoi\",\"/blog\",\"/pricing\"");
        assert_eq!(lines[2], "\"1718000000500\",\"Berlin\",\"(not set)\",\"/\"");
    }

    #[test]
    fn test_render_csv_no_rows_writes_header_only() {
        let fields = data_fields(&default_query_fields());
        let csv = render_csv(&fields, &[]);
        assert_eq!(csv, "\"Timestamp\",\"Location\",\"Referral Path\",\"URL\"\n");
    }

    #[test]
    fn test_render_csv_short_row_leaves_blank_cells() {
        let fields = data_fields(&default_query_fields());
        let csv = render_csv(&fields, &[json!({ "dimensions": ["t", "Paris"] })]);
        assert_eq!(csv.lines().nth(1), Some("\"t\",\"Paris\",\"\",\"\""));
    }

    #[test]
    fn test_resolve_path() {
        let rows = sample_rows();
        let row = &rows[0];
        assert_eq!(resolve_path(row, "dimensions[1]"), Some(&json!("Hanoi")));
        assert_eq!(resolve_path(row, "metrics[0].values[0]"), Some(&json!("3")));
        assert_eq!(resolve_path(row, "dimensions[9]"), None);
        assert_eq!(resolve_path(row, "dimensions[x]"), None);
        assert_eq!(resolve_path(row, "missing"), None);
    }

    #[test]
    fn test_cell_text_non_strings() {
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn test_escape_csv_field_plain() {
        assert_eq!(escape_csv_field("/about"), "\"/about\"");
    }

    #[test]
    fn test_escape_csv_field_with_quotes() {
        assert_eq!(escape_csv_field("it's \"great\""), "\"it's \"\"great\"\"\"");
    }

    #[test]
    fn test_escape_csv_field_formula_injection() {
        assert_eq!(escape_csv_field("=CMD|'/c calc'"), "\"'=CMD|'/c calc'\"");
        assert_eq!(escape_csv_field("+1+2"), "\"'+1+2\"");
        assert_eq!(escape_csv_field("@SUM(A1)"), "\"'@SUM(A1)\"");
    }

    #[test]
    fn test_render_csv_guards_formula_like_values() {
        let fields = data_fields(&default_query_fields());
        let row = json!({ "dimensions": ["-1", "=HYPERLINK(\"x\")", "+ref", "@home"] });
        let csv = render_csv(&fields, &[row]);
        assert_eq!(
            csv.lines().nth(1),
            Some("\"'-1\",\"'=HYPERLINK(\"\"x\"\")\",\"'+ref\",\"'@home\"")
        );
    }
}
