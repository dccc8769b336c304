use serde::{Deserialize, Serialize};

use crate::error::{CoordinateFault, EditError, Result};
use crate::normalize::column_name;

/// Row identifier. Dense `0..N-1` after any structural mutation.
pub type RowId = usize;

/// An ordered 2-D grid of string cells with named columns and integer row ids.
///
/// Every row holds exactly one value per column. Column names and row ids are
/// unique. Structure only: mutation policy (history, normalization, layout
/// tokens) lives in [`crate::session::EditSession`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    row_ids: Vec<RowId>,
    /// Row-major cell storage
    cells: Vec<Vec<String>>,
    /// Identity of the current row/column layout. Assigned by the session.
    #[serde(skip)]
    layout: u64,
}

// Equality is over content only; the layout token is bookkeeping.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.row_ids == other.row_ids && self.cells == other.cells
    }
}

impl Eq for Table {}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `rows` x `cols` grid of empty strings with canonical headers.
    pub fn blank(rows: usize, cols: usize) -> Self {
        Self {
            columns: (0..cols).map(column_name).collect(),
            row_ids: (0..rows).collect(),
            cells: vec![vec![String::new(); cols]; rows],
            layout: 0,
        }
    }

    /// Build a table from headers and row values. Row ids are `0..N-1`.
    /// Short rows are padded with empty strings.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let row_ids = (0..rows.len()).collect();
        Self::from_parts(columns, row_ids, rows)
    }

    /// Build a table with explicit row ids.
    pub fn from_parts(columns: Vec<String>, row_ids: Vec<RowId>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(EditError::DuplicateName(name.clone()));
            }
        }
        if row_ids.len() != rows.len() {
            return Err(EditError::validation(format!(
                "{} row ids for {} rows",
                row_ids.len(),
                rows.len()
            )));
        }
        for (i, id) in row_ids.iter().enumerate() {
            if row_ids[..i].contains(id) {
                return Err(EditError::validation(format!("duplicate row id {}", id)));
            }
        }

        let width = columns.len();
        let mut cells = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(EditError::validation(format!(
                    "row {} has {} values but the table has {} columns",
                    i,
                    row.len(),
                    width
                )));
            }
            row.resize(width, String::new());
            cells.push(row);
        }

        Ok(Self { columns, row_ids, cells, layout: 0 })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_ids(&self) -> &[RowId] {
        &self.row_ids
    }

    pub fn row_count(&self) -> usize {
        self.row_ids.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty() || self.columns.is_empty()
    }

    /// Rows in display order, paired with their id.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &[String])> {
        self.row_ids.iter().copied().zip(self.cells.iter().map(|r| r.as_slice()))
    }

    pub fn row_position(&self, id: RowId) -> Option<usize> {
        self.row_ids.iter().position(|&r| r == id)
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn layout_token(&self) -> u64 {
        self.layout
    }

    pub(crate) fn set_layout_token(&mut self, token: u64) {
        self.layout = token;
    }

    // =========================================================================
    // Cell access
    // =========================================================================

    pub fn get(&self, row: RowId, column: &str) -> Result<&str> {
        let (r, c) = self.locate(row, column)?;
        Ok(&self.cells[r][c])
    }

    /// Value at a display position, if in bounds.
    pub fn cell_at(&self, row_pos: usize, col_pos: usize) -> Option<&str> {
        self.cells.get(row_pos).and_then(|r| r.get(col_pos)).map(|s| s.as_str())
    }

    /// Overwrite one cell, returning the previous value.
    pub fn set(&mut self, row: RowId, column: &str, value: impl Into<String>) -> Result<String> {
        let (r, c) = self.locate(row, column)?;
        Ok(std::mem::replace(&mut self.cells[r][c], value.into()))
    }

    pub(crate) fn set_at(&mut self, row_pos: usize, col_pos: usize, value: String) -> String {
        std::mem::replace(&mut self.cells[row_pos][col_pos], value)
    }

    fn locate(&self, row: RowId, column: &str) -> Result<(usize, usize)> {
        let r = self.row_position(row).ok_or(CoordinateFault::RowNotFound(row))?;
        let c = self
            .column_position(column)
            .ok_or_else(|| CoordinateFault::MissingColumn(column.to_string()))?;
        Ok((r, c))
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Insert a blank row before display position `position` (`row_count()` appends).
    /// The new row gets an id one past the current maximum.
    pub fn insert_row(&mut self, position: usize) -> Result<RowId> {
        if position > self.row_count() {
            return Err(CoordinateFault::OutOfBounds { position, limit: self.row_count() }.into());
        }
        let id = self.row_ids.iter().max().map_or(0, |m| m + 1);
        self.row_ids.insert(position, id);
        self.cells.insert(position, vec![String::new(); self.columns.len()]);
        Ok(id)
    }

    /// Remove a row, returning its values.
    pub fn delete_row(&mut self, row: RowId) -> Result<Vec<String>> {
        let r = self.row_position(row).ok_or(CoordinateFault::RowNotFound(row))?;
        self.row_ids.remove(r);
        Ok(self.cells.remove(r))
    }

    /// Insert a blank column named `name` before display position `position`.
    pub fn insert_column(&mut self, position: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.columns.contains(&name) {
            return Err(EditError::DuplicateName(name));
        }
        if position > self.column_count() {
            return Err(CoordinateFault::OutOfBounds { position, limit: self.column_count() }.into());
        }
        self.columns.insert(position, name);
        for row in &mut self.cells {
            row.insert(position, String::new());
        }
        Ok(())
    }

    /// Remove a column, returning its values top to bottom.
    pub fn delete_column(&mut self, name: &str) -> Result<Vec<String>> {
        let c = self
            .column_position(name)
            .ok_or_else(|| EditError::ColumnNotFound(name.to_string()))?;
        self.columns.remove(c);
        Ok(self.cells.iter_mut().map(|row| row.remove(c)).collect())
    }

    pub fn append_rows(&mut self, count: usize) {
        for _ in 0..count {
            // Appending at the end is always in bounds.
            let _ = self.insert_row(self.row_count());
        }
    }

    /// Append blank columns with generated names that do not collide.
    pub fn append_columns(&mut self, count: usize) {
        let mut next = self.column_count();
        for _ in 0..count {
            let mut name = column_name(next);
            while self.columns.contains(&name) {
                next += 1;
                name = column_name(next);
            }
            next += 1;
            self.columns.push(name);
            for row in &mut self.cells {
                row.push(String::new());
            }
        }
    }

    /// Replace headers and row ids wholesale, keeping cell content and order.
    pub(crate) fn relabel(&mut self, columns: Vec<String>, row_ids: Vec<RowId>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        debug_assert_eq!(row_ids.len(), self.row_ids.len());
        self.columns = columns;
        self.row_ids = row_ids;
    }
}
