// Spreadsheet import (xlsx, xlsm, xls, xlsb, ods via calamine) and xlsx export
// (rust_xlsxwriter). Only the first sheet is read; its first row is the header.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use gridedit_engine::Table;
use rust_xlsxwriter::Workbook;

use crate::coerce::{coerce, Scalar};
use crate::{build_table, FileError, Result};

pub fn import(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| FileError::Malformed("workbook contains no sheets".to_string()))?;
    let range = workbook.worksheet_range(&first)?;

    let mut rows = range.rows().map(|row| row.iter().map(data_to_string).collect::<Vec<String>>());
    let Some(headers) = rows.next() else {
        return Ok(Table::new());
    };
    build_table(headers, rows.collect())
}

fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integers without decimals
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => format!("{}", n),
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        // Serial date number; the table has no date type
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Integer part wider than Excel's 15 significant digits.
fn exceeds_excel_precision(n: f64) -> bool {
    n.is_finite() && n.trunc().abs() >= 1e15
}

pub fn export(table: &Table, path: &Path, coerce_numbers: bool) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (r, (_, cells)) in table.rows().enumerate() {
        let row = (r + 1) as u32;
        for (col, value) in cells.iter().enumerate() {
            let col = col as u16;
            if value.is_empty() {
                continue;
            }
            let number = match coerce(value) {
                _ if !coerce_numbers => None,
                Scalar::Int(n) => Some(n as f64),
                Scalar::Float(f) => Some(f),
                Scalar::Text(_) => None,
            };
            match number {
                Some(n) if !exceeds_excel_precision(n) => {
                    worksheet.write_number(row, col, n)?;
                }
                _ => {
                    worksheet.write_string(row, col, value)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
