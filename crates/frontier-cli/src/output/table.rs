use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{as_return_table, plain};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go into one Field/Value table; nested records and
/// lists of records (the optimal portfolio, per-asset summaries, the return
/// table itself) each get a titled table of their own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_fields(map),
        },
        Value::Array(arr) => print_records(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested: Vec<(&String, &Value)> = Vec::new();
    for (key, val) in result {
        if is_nested(val) {
            nested.push((key, val));
        } else {
            builder.push_record([key.as_str(), cell(val).as_str()]);
        }
    }
    println!("{}", Table::from(builder));

    for (key, val) in nested {
        println!("\n{}:", key);
        if let Some((assets, rows)) = as_return_table(val) {
            print_return_table(assets, rows);
        } else {
            match val {
                Value::Array(arr) => print_records(arr),
                Value::Object(map) => print_fields(map),
                _ => {}
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), cell(val).as_str()]);
    }
    println!("{}", Table::from(builder));
}

fn print_records(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in arr {
        if let Value::Object(map) = item {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_return_table(assets: &[Value], rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(std::iter::once("date".to_string()).chain(assets.iter().map(plain)));
    for row in rows {
        let date = row.get("date").map(plain).unwrap_or_default();
        let values = row
            .get("returns")
            .and_then(Value::as_array)
            .map(|v| v.iter().map(plain).collect::<Vec<_>>())
            .unwrap_or_default();
        builder.push_record(std::iter::once(date).chain(values));
    }
    println!("{}", Table::from(builder));
}

/// Lists of scalars (e.g. dropped dates) stay inline.
fn is_nested(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(arr) => arr.iter().any(|v| v.is_object() || v.is_array()),
        _ => false,
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Array(arr) => arr.iter().map(cell).collect::<Vec<_>>().join(", "),
        other => plain(other),
    }
}
