use serde_json::Value;
use std::io::{self, Write};

use super::{as_return_table, plain};

/// Write output as CSV to stdout.
///
/// A result holding a return table is written as that table
/// (`date,<assets>`); anything else becomes `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let written = match result.get("returns").and_then(as_return_table) {
        Some((assets, rows)) => write_return_rows(&mut wtr, assets, rows),
        None => write_fields(&mut wtr, result),
    };
    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_return_rows<W: Write>(
    wtr: &mut csv::Writer<W>,
    assets: &[Value],
    rows: &[Value],
) -> Result<(), csv::Error> {
    let mut header = vec!["date".to_string()];
    header.extend(assets.iter().map(plain));
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.get("date").map(plain).unwrap_or_default()];
        if let Some(Value::Array(values)) = row.get("returns") {
            record.extend(values.iter().map(plain));
        }
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_fields<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> Result<(), csv::Error> {
    wtr.write_record(["field", "value"])?;
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                wtr.write_record([key.as_str(), plain(val).as_str()])?;
            }
        }
        other => wtr.write_record(["value", plain(other).as_str()])?,
    }
    Ok(())
}
