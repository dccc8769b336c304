// Pipe text tables:
//
//   | Name  | Qty |
//   | ----- | --- |
//   | apple | 3   |
//
// Cells are padded to the widest value by display width. A literal `|` in a
// cell is written as `\|`; line breaks become spaces.

use std::fs;
use std::path::Path;

use gridedit_engine::Table;
use unicode_width::UnicodeWidthStr;

use crate::csv::read_file_as_utf8;
use crate::{build_table, Result};

pub fn import(path: &Path) -> Result<Table> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content)
}

pub fn import_from_string(content: &str) -> Result<Table> {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(split_row)
        .peekable();

    let Some(headers) = lines.next() else {
        return Ok(Table::new());
    };
    // Only the line under the header is a divider; later dash rows are data
    lines.next_if(|cells| is_separator(cells));
    build_table(headers, lines.collect())
}

fn split_row(line: &str) -> Vec<String> {
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = match line.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => line,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => current.push('|'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// `| --- | :-: |` style divider row.
fn is_separator(cells: &[String]) -> bool {
    cells.iter().all(|c| !c.is_empty() && c.contains('-') && c.chars().all(|ch| ch == '-' || ch == ':'))
}

pub fn export(table: &Table, path: &Path) -> Result<()> {
    fs::write(path, render(table))?;
    Ok(())
}

/// Render the table as pipe rows with a dashed separator under the header.
pub fn render(table: &Table) -> String {
    if table.column_count() == 0 {
        return String::new();
    }
    let header: Vec<String> = table.columns().iter().map(|c| escape(c)).collect();
    let body: Vec<Vec<String>> = table.rows().map(|(_, cells)| cells.iter().map(|c| escape(c)).collect()).collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(header[i].width()))
                .max()
                .unwrap_or(0)
                .max(3)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let dashes: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_row(&mut out, &dashes, &widths);
    for row in &body {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, &width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(width.saturating_sub(cell.width())));
        out.push_str(" |");
    }
    out.push('\n');
}

fn escape(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}
