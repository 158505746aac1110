use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

use frontier_core::returns::ReturnTable;

/// Write a return table as CSV: `date` first, then one column per asset in
/// table order, dates ascending.
pub fn write_returns_csv(path: &str, table: &ReturnTable) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    write_returns(BufWriter::new(file), table)
}

pub fn write_returns<W: Write>(writer: W, table: &ReturnTable) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.assets().len() + 1);
    header.push("date");
    header.extend(table.assets().iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.returns.len() + 1);
        record.push(row.date.to_string());
        record.extend(row.returns.iter().map(|r| r.normalize().to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
