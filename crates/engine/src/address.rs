//! Address resolution: UI selection -> validated coordinate.
//!
//! A selection is a row token (the row id as the view shows it) plus a 1-based
//! visual column index. Resolution never guesses. A token that does not parse,
//! an id that no longer exists, a column outside `1..=column_count`, or a
//! selection captured against an older layout all fail.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoordinateFault, Result};
use crate::table::{RowId, Table};

/// A resolved `(row id, column name)` pair, valid against one table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: RowId,
    pub column: String,
}

impl Coordinate {
    pub fn new(row: RowId, column: impl Into<String>) -> Self {
        Self { row, column: column.into() }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.column, self.row)
    }
}

/// What the view reports as the current cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub row: String,
    /// 1-based visual column index
    pub column: usize,
    /// Layout the selection was captured against, if any
    layout: Option<u64>,
}

impl Selection {
    /// An unbound selection, checked only against current bounds.
    pub fn new(row: impl Into<String>, column: usize) -> Self {
        Self { row: row.into(), column, layout: None }
    }

    /// A selection bound to `table`'s current layout. It stops resolving once
    /// a structural mutation replaces that layout.
    pub fn capture(table: &Table, row: impl Into<String>, column: usize) -> Self {
        Self { row: row.into(), column, layout: Some(table.layout_token()) }
    }

    /// Selection pointing at a known coordinate of `table`.
    pub fn at(table: &Table, coord: &Coordinate) -> Result<Self> {
        let col = table
            .column_position(&coord.column)
            .ok_or_else(|| CoordinateFault::MissingColumn(coord.column.clone()))?;
        if table.row_position(coord.row).is_none() {
            return Err(CoordinateFault::RowNotFound(coord.row).into());
        }
        Ok(Self::capture(table, coord.row.to_string(), col + 1))
    }

    pub fn is_bound(&self) -> bool {
        self.layout.is_some()
    }
}

/// Resolve a selection to a coordinate of `table`.
pub fn resolve(table: &Table, selection: &Selection) -> Result<Coordinate> {
    let row = resolve_row(table, selection)?;
    let count = table.column_count();
    if selection.column == 0 || selection.column > count {
        return Err(CoordinateFault::ColumnOutOfRange { index: selection.column, count }.into());
    }
    Ok(Coordinate::new(row, table.columns()[selection.column - 1].clone()))
}

/// Resolve only the row part of a selection (row-level operations).
pub fn resolve_row(table: &Table, selection: &Selection) -> Result<RowId> {
    check_layout(table, selection)?;
    let row: RowId = selection
        .row
        .parse()
        .map_err(|_| CoordinateFault::BadRowToken(selection.row.clone()))?;
    if table.row_position(row).is_none() {
        return Err(CoordinateFault::RowNotFound(row).into());
    }
    Ok(row)
}

/// Resolve only the column part of a selection, as a 0-based position.
pub fn resolve_column(table: &Table, selection: &Selection) -> Result<usize> {
    check_layout(table, selection)?;
    let count = table.column_count();
    if selection.column == 0 || selection.column > count {
        return Err(CoordinateFault::ColumnOutOfRange { index: selection.column, count }.into());
    }
    Ok(selection.column - 1)
}

/// Display position `(row, col)` of a coordinate.
pub fn position(table: &Table, coord: &Coordinate) -> Result<(usize, usize)> {
    let r = table.row_position(coord.row).ok_or(CoordinateFault::RowNotFound(coord.row))?;
    let c = table
        .column_position(&coord.column)
        .ok_or_else(|| CoordinateFault::MissingColumn(coord.column.clone()))?;
    Ok((r, c))
}

fn check_layout(table: &Table, selection: &Selection) -> Result<()> {
    match selection.layout {
        Some(token) if token != table.layout_token() => Err(CoordinateFault::StaleSelection.into()),
        _ => Ok(()),
    }
}
