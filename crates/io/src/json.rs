// JSON import/export as an array of records.
//
// Import first expects the flat records shape: an array of objects whose
// values are all scalars. Anything else goes through the flattening path, where
// nested objects become dotted keys and a lone top-level object is one record.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gridedit_engine::Table;
use log::warn;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};

use crate::coerce::{coerce, Scalar};
use crate::csv::read_file_as_utf8;
use crate::{build_table, FileError, Result};

pub fn import(path: &Path) -> Result<Table> {
    let text = read_file_as_utf8(path)?;
    let value: Value = serde_json::from_str(&text)?;
    if let Some(table) = records(&value)? {
        return Ok(table);
    }
    warn!("{}: not an array of flat records, flattening", path.display());
    flatten(&value)
}

/// Flat records: `[{"k": scalar, ...}, ...]`. `None` when the shape differs.
fn records(value: &Value) -> Result<Option<Table>> {
    let Value::Array(items) = value else { return Ok(None) };
    let mut objects = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(map) if map.values().all(is_scalar) => objects.push(map.clone()),
            _ => return Ok(None),
        }
    }
    table_from_objects(objects).map(Some)
}

fn flatten(value: &Value) -> Result<Table> {
    let objects = match value {
        Value::Object(map) => vec![flatten_object(map)],
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => Ok(flatten_object(map)),
                other => Err(FileError::Malformed(format!("expected an object, found {}", kind(other)))),
            })
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(FileError::Malformed(format!(
                "expected an array of objects or an object, found {}",
                kind(other)
            )))
        }
    };
    table_from_objects(objects)
}

fn flatten_object(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, "", map);
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        let key = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
        match value {
            Value::Object(inner) => flatten_into(out, &key, inner),
            other => {
                out.insert(key, other.clone());
            }
        }
    }
}

/// Column set is the union of keys in first-seen order.
fn table_from_objects(objects: Vec<Map<String, Value>>) -> Result<Table> {
    let mut columns: Vec<String> = Vec::new();
    for map in &objects {
        for key in map.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    let rows = objects
        .iter()
        .map(|map| columns.iter().map(|c| map.get(c).map(cell_text).unwrap_or_default()).collect())
        .collect();
    build_table(columns, rows)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Arrays stay as their JSON text
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Write records with 4-space indentation, one object per row.
pub fn export(table: &Table, path: &Path, coerce_numbers: bool) -> Result<()> {
    let records: Vec<Map<String, Value>> = table
        .rows()
        .map(|(_, cells)| {
            table
                .columns()
                .iter()
                .zip(cells)
                .map(|(name, cell)| (name.clone(), json_value(cell, coerce_numbers)))
                .collect()
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn json_value(cell: &str, coerce_numbers: bool) -> Value {
    if !coerce_numbers {
        return Value::String(cell.to_string());
    }
    match coerce(cell) {
        Scalar::Int(n) => Value::Number(n.into()),
        Scalar::Float(f) => Number::from_f64(f).map_or_else(|| Value::String(cell.to_string()), Value::Number),
        Scalar::Text(s) => Value::String(s.to_string()),
    }
}
