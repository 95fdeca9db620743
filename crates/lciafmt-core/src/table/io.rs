//! CSV and JSON encodings of characterization tables

use super::{
    COLUMNS, CharacterizationRow, CharacterizationTable, STATUS_COLUMN, missing_columns,
};
use crate::{LciaError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Read a table from CSV, validating the header first
pub fn read_csv<R: Read>(reader: R) -> Result<CharacterizationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let missing = missing_columns(&names);
    if !missing.is_empty() {
        return Err(LciaError::missing_columns(missing));
    }

    let mut rows = Vec::new();
    for (idx, record) in rdr.deserialize::<CharacterizationRow>().enumerate() {
        let mut row =
            record.map_err(|e| LciaError::invalid_table(format!("row {}: {}", idx + 1, e)))?;
        row.normalize();
        rows.push(row);
    }
    Ok(CharacterizationTable::new(rows))
}

/// Read a table from a JSON array of row objects
pub fn read_json<R: Read>(reader: R) -> Result<CharacterizationTable> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;

    let mut missing: Vec<String> = Vec::new();
    for value in &values {
        let keys: Vec<&str> = match value.as_object() {
            Some(obj) => obj.keys().map(String::as_str).collect(),
            None => return Err(LciaError::invalid_table("expected an array of objects")),
        };
        for column in missing_columns(&keys) {
            if !missing.contains(&column) {
                missing.push(column);
            }
        }
    }
    if !missing.is_empty() {
        return Err(LciaError::missing_columns(missing));
    }

    let mut rows = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        let mut row: CharacterizationRow = serde_json::from_value(value)
            .map_err(|e| LciaError::invalid_table(format!("row {}: {}", idx + 1, e)))?;
        row.normalize();
        rows.push(row);
    }
    Ok(CharacterizationTable::new(rows))
}

/// Write a table as CSV in the canonical column order.
///
/// The mapping status column is only written when some row carries one.
pub fn write_csv<W: Write>(table: &CharacterizationTable, writer: W) -> Result<()> {
    let with_status = table.has_status();
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = COLUMNS.to_vec();
    if with_status {
        header.push(STATUS_COLUMN);
    }
    wtr.write_record(&header)?;

    for row in table {
        let mut cells = row.cells();
        if with_status {
            cells.push(row.status.as_str().to_string());
        }
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(table: &CharacterizationTable, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, table)?;
    Ok(())
}

#[derive(Clone, Copy)]
enum TableFormat {
    Csv,
    Json,
}

fn format_of(path: &Path) -> Result<TableFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(TableFormat::Csv),
        Some("json") => Ok(TableFormat::Json),
        _ => Err(LciaError::invalid_table(format!(
            "unsupported table format for '{}' (expected .csv or .json)",
            path.display()
        ))),
    }
}

/// Read a table, choosing the format by file extension
pub fn read_path(path: &Path) -> Result<CharacterizationTable> {
    let format = format_of(path)?;
    let file = File::open(path).map_err(|e| LciaError::io_error(path, e))?;
    let reader = BufReader::new(file);
    let table = match format {
        TableFormat::Csv => read_csv(reader)?,
        TableFormat::Json => read_json(reader)?,
    };
    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Write a table, choosing the format by file extension
pub fn write_path(table: &CharacterizationTable, path: &Path) -> Result<()> {
    let format = format_of(path)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| LciaError::io_error(parent, e))?;
    }
    let file = File::create(path).map_err(|e| LciaError::io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    match format {
        TableFormat::Csv => write_csv(table, &mut writer)?,
        TableFormat::Json => write_json(table, &mut writer)?,
    }
    writer.flush().map_err(|e| LciaError::io_error(path, e))?;
    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
