pub mod csv_out;
pub mod file;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value as plain text.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// A serialized `ReturnTable` has exactly an `assets` list and a `rows` list.
pub(crate) fn as_return_table(value: &Value) -> Option<(&Vec<Value>, &Vec<Value>)> {
    let map = value.as_object()?;
    let assets = map.get("assets")?.as_array()?;
    let rows = map.get("rows")?.as_array()?;
    Some((assets, rows))
}
