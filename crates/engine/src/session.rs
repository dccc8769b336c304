//! Edit session: one live table, its undo/redo history, and a clipboard slot.
//!
//! Every mutation runs against a scratch copy of the live table. Only when it
//! succeeds is the copy normalized (for structural ops), swapped in, and the
//! previous table pushed onto the undo stack. A failed operation leaves the
//! table, both stacks and the clipboard exactly as they were.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::address::{self, Coordinate, Selection};
use crate::error::{CoordinateFault, EditError, Result};
use crate::events::{ChangeEvent, EventCollector, SessionEvent};
use crate::fuzzy::{FuzzyScorer, IndelRatio};
use crate::history::{History, OpKind};
use crate::normalize::{column_name, normalize};
use crate::pattern_fill::{self, Direction, FillMode};
use crate::search::{FindCursor, HeaderCursor};
use crate::table::{RowId, Table};

/// Where a new row goes relative to the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPlacement {
    Above,
    Below,
}

/// Where a new column goes relative to the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPlacement {
    Left,
    Right,
}

pub struct EditSession {
    table: Table,
    history: History,
    clipboard: Option<String>,
    pub(crate) find: FindCursor,
    pub(crate) header_find: HeaderCursor,
    pub(crate) scorer: Box<dyn FuzzyScorer>,
    events: EventCollector,
    /// Source of layout tokens; never reused within a session
    next_layout: u64,
    revision: u64,
    saved_revision: u64,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("rows", &self.table.row_count())
            .field("cols", &self.table.column_count())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl EditSession {
    /// A session over an empty table.
    pub fn new() -> Self {
        let mut session = Self {
            table: Table::new(),
            history: History::new(),
            clipboard: None,
            find: FindCursor::default(),
            header_find: HeaderCursor::default(),
            scorer: Box::new(IndelRatio),
            events: EventCollector::new(),
            next_layout: 0,
            revision: 0,
            saved_revision: 0,
        };
        let token = session.fresh_layout();
        session.table.set_layout_token(token);
        session
    }

    /// A session over a blank `rows` x `cols` grid ("new document").
    pub fn blank(rows: usize, cols: usize) -> Self {
        let mut session = Self::new();
        session.open(Table::blank(rows, cols));
        session
    }

    /// Bound the undo stack; `None` or `Some(0)` is unbounded.
    pub fn with_history_limit(mut self, max_entries: Option<usize>) -> Self {
        self.history = History::with_limit(max_entries);
        self
    }

    /// Replace the fuzzy scorer used by header search.
    pub fn with_scorer(mut self, scorer: impl FuzzyScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    // =========================================================================
    // Document lifecycle
    // =========================================================================

    /// Replace the live table wholesale and start a fresh edit session.
    pub fn open(&mut self, mut table: Table) {
        table.set_layout_token(self.fresh_layout());
        let (rows, cols) = (table.row_count(), table.column_count());
        self.table = table;
        self.history.clear();
        self.find = FindCursor::default();
        self.header_find = HeaderCursor::default();
        self.revision += 1;
        self.saved_revision = self.revision;
        self.events.push(SessionEvent::Opened { rows, cols });
        debug!("opened table {}x{}", rows, cols);
    }

    /// Run `loader`; on success open its table, on failure change nothing.
    pub fn load<E>(&mut self, loader: impl FnOnce() -> std::result::Result<Table, E>) -> std::result::Result<(), E> {
        let table = loader()?;
        self.open(table);
        Ok(())
    }

    /// Discard the document.
    pub fn close(&mut self) {
        self.open(Table::new());
        self.events.drain();
        self.events.push(SessionEvent::Closed);
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Independent copy of the live table for read-only collaborators.
    pub fn snapshot(&self) -> Table {
        self.table.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Any change since the last open or [`mark_saved`](Self::mark_saved).
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn mark_saved(&mut self) {
        self.saved_revision = self.revision;
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    /// Resolve a view selection against the live table.
    pub fn resolve(&self, selection: &Selection) -> Result<Coordinate> {
        address::resolve(&self.table, selection)
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn undo(&mut self) -> Option<OpKind> {
        let op = self.history.undo(&mut self.table)?;
        self.revision += 1;
        self.events.push(SessionEvent::Undone(self.change_event(op)));
        debug!("undo: {}", op);
        Some(op)
    }

    pub fn redo(&mut self) -> Option<OpKind> {
        let op = self.history.redo(&mut self.table)?;
        self.revision += 1;
        self.events.push(SessionEvent::Redone(self.change_event(op)));
        debug!("redo: {}", op);
        Some(op)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    pub fn undo_label(&self) -> Option<OpKind> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<OpKind> {
        self.history.redo_label()
    }

    // =========================================================================
    // Cell edits
    // =========================================================================

    pub fn edit_cell(&mut self, selection: &Selection, value: impl Into<String>) -> Result<Coordinate> {
        let coord = self.resolve(selection)?;
        self.write_cell(OpKind::EditCell, &coord, value.into())?;
        Ok(coord)
    }

    /// Store the selected cell's value in the clipboard. No history entry.
    pub fn copy(&mut self, selection: &Selection) -> Result<Coordinate> {
        let coord = self.resolve(selection)?;
        let value = self.table.get(coord.row, &coord.column)?.to_string();
        self.clipboard = Some(value);
        Ok(coord)
    }

    /// Copy, then clear the cell.
    pub fn cut(&mut self, selection: &Selection) -> Result<Coordinate> {
        let coord = self.resolve(selection)?;
        let value = self.table.get(coord.row, &coord.column)?.to_string();
        self.write_cell(OpKind::Cut, &coord, String::new())?;
        self.clipboard = Some(value);
        Ok(coord)
    }

    /// Write the clipboard into the selected cell. Returns `false` (and does
    /// nothing) when the clipboard is empty.
    pub fn paste(&mut self, selection: &Selection) -> Result<bool> {
        let coord = self.resolve(selection)?;
        let Some(value) = self.clipboard.clone() else {
            return Ok(false);
        };
        self.write_cell(OpKind::Paste, &coord, value)?;
        Ok(true)
    }

    pub(crate) fn write_cell(&mut self, op: OpKind, coord: &Coordinate, value: String) -> Result<()> {
        self.commit(op, |t| t.set(coord.row, &coord.column, value).map(|_| ()))
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Insert a blank row next to the selected one. Returns the new row's id.
    pub fn insert_row(&mut self, selection: &Selection, placement: RowPlacement) -> Result<RowId> {
        let row = address::resolve_row(&self.table, selection)?;
        let pos = self.position_of_row(row)?;
        let at = match placement {
            RowPlacement::Above => pos,
            RowPlacement::Below => pos + 1,
        };
        self.commit(OpKind::InsertRow, |t| t.insert_row(at).map(|_| ()))?;
        // Normalized: ids equal positions
        Ok(at)
    }

    pub fn delete_row(&mut self, selection: &Selection) -> Result<Vec<String>> {
        let row = address::resolve_row(&self.table, selection)?;
        self.commit(OpKind::DeleteRow, |t| t.delete_row(row))
    }

    /// Insert a blank column next to the selected one. The new column is named
    /// canonically by position; returns that name.
    pub fn insert_column(&mut self, selection: &Selection, placement: ColumnPlacement) -> Result<String> {
        let pos = address::resolve_column(&self.table, selection)?;
        let at = match placement {
            ColumnPlacement::Left => pos,
            ColumnPlacement::Right => pos + 1,
        };
        let placeholder = self.unused_column_name();
        self.commit(OpKind::InsertColumn, |t| t.insert_column(at, placeholder))?;
        Ok(column_name(at))
    }

    /// Remove a column by name. Confirming with the user is the caller's job.
    pub fn delete_column(&mut self, name: &str) -> Result<Vec<String>> {
        self.commit(OpKind::DeleteColumn, |t| t.delete_column(name))
    }

    /// Append `count` blank rows or columns.
    pub fn extend(&mut self, count: usize, direction: Direction) -> Result<()> {
        if count == 0 {
            return Err(EditError::validation("extend count must be at least 1"));
        }
        self.commit(OpKind::ExtendTable, |t| {
            match direction {
                Direction::Down => t.append_rows(count),
                Direction::Right => t.append_columns(count),
            }
            Ok(())
        })
    }

    // =========================================================================
    // Pattern fill
    // =========================================================================

    /// Write `count` generated values starting at the selected cell.
    /// Returns the coordinates written, in order.
    pub fn pattern_fill(
        &mut self,
        anchor: &Selection,
        seed: &str,
        direction: Direction,
        mode: FillMode,
        count: usize,
    ) -> Result<Vec<Coordinate>> {
        let coord = self.resolve(anchor)?;
        let (row0, col0) = address::position(&self.table, &coord)?;

        // Bounds before generation: `count` sizes the value buffer
        let (limit, start) = match direction {
            Direction::Down => (self.table.row_count(), row0),
            Direction::Right => (self.table.column_count(), col0),
        };
        if start.checked_add(count).map_or(true, |end| end > limit) {
            let position = start.saturating_add(count.saturating_sub(1));
            return Err(CoordinateFault::OutOfBounds { position, limit }.into());
        }
        let values = pattern_fill::generate(seed, &mode, count)?;

        let targets: Vec<(usize, usize)> = (0..count)
            .map(|i| match direction {
                Direction::Down => (row0 + i, col0),
                Direction::Right => (row0, col0 + i),
            })
            .collect();
        let coords: Vec<Coordinate> = targets
            .iter()
            .map(|&(r, c)| Coordinate::new(self.table.row_ids()[r], self.table.columns()[c].clone()))
            .collect();

        self.commit(OpKind::PatternFill, |t| {
            for (&(r, c), value) in targets.iter().zip(values) {
                t.set_at(r, c, value);
            }
            Ok(())
        })?;
        Ok(coords)
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Apply `edit` to a scratch copy and swap it in on success.
    ///
    /// Structural ops are normalized and get a fresh layout token. Edits that
    /// leave the table unchanged record nothing.
    pub(crate) fn commit<T>(&mut self, op: OpKind, edit: impl FnOnce(&mut Table) -> Result<T>) -> Result<T> {
        let mut next = self.table.clone();
        let out = edit(&mut next)?;

        let structural = op.is_structural();
        if structural {
            normalize(&mut next);
            next.set_layout_token(self.fresh_layout());
        } else if next == self.table {
            debug!("{}: no change", op);
            return Ok(out);
        }

        let before = std::mem::replace(&mut self.table, next);
        self.history.record(op, before);
        self.revision += 1;
        self.events.push(SessionEvent::Changed(self.change_event(op)));
        debug!("{} -> revision {}", op, self.revision);
        Ok(out)
    }

    fn change_event(&self, op: OpKind) -> ChangeEvent {
        ChangeEvent { revision: self.revision, op, structural: op.is_structural() }
    }

    fn fresh_layout(&mut self) -> u64 {
        self.next_layout += 1;
        self.next_layout
    }

    fn position_of_row(&self, row: RowId) -> Result<usize> {
        self.table
            .row_position(row)
            .ok_or_else(|| CoordinateFault::RowNotFound(row).into())
    }

    /// A header name not present in the live table, replaced by normalization.
    fn unused_column_name(&self) -> String {
        let mut n = self.table.column_count();
        loop {
            let name = column_name(n);
            if self.table.column_position(&name).is_none() {
                return name;
            }
            n += 1;
        }
    }
}
