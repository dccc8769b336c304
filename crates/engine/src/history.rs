/// Undo/Redo history for table edits.
///
/// Each entry holds a full, independent snapshot of the table taken just
/// before the operation ran.
use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Kind of mutation recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    EditCell,
    InsertRow,
    DeleteRow,
    InsertColumn,
    DeleteColumn,
    Cut,
    Paste,
    ReplaceCurrent,
    ReplaceAll,
    PatternFill,
    ExtendTable,
}

impl OpKind {
    /// Structural ops change row/column cardinality and trigger normalization.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            OpKind::InsertRow
                | OpKind::DeleteRow
                | OpKind::InsertColumn
                | OpKind::DeleteColumn
                | OpKind::ExtendTable
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            OpKind::EditCell => "Edit cell",
            OpKind::InsertRow => "Insert row",
            OpKind::DeleteRow => "Delete row",
            OpKind::InsertColumn => "Insert column",
            OpKind::DeleteColumn => "Delete column",
            OpKind::Cut => "Cut",
            OpKind::Paste => "Paste",
            OpKind::ReplaceCurrent => "Replace",
            OpKind::ReplaceAll => "Replace all",
            OpKind::PatternFill => "Fill",
            OpKind::ExtendTable => "Extend table",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub label: OpKind,
    pub snapshot: Table,
}

#[derive(Debug, Default)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    /// `None` = unbounded. When bounded, the oldest undo entry is evicted.
    max_entries: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_entries: Option<usize>) -> Self {
        Self { max_entries: max_entries.filter(|&n| n > 0), ..Self::default() }
    }

    /// Record the table as it was before `label` ran. Clears redo.
    pub fn record(&mut self, label: OpKind, before: Table) {
        self.undo_stack.push_back(HistoryEntry { label, snapshot: before });
        self.redo_stack.clear();

        if let Some(max) = self.max_entries {
            while self.undo_stack.len() > max {
                self.undo_stack.pop_front();
            }
        }
    }

    /// Swap `live` with the most recent snapshot. Returns the undone op.
    pub fn undo(&mut self, live: &mut Table) -> Option<OpKind> {
        let entry = self.undo_stack.pop_back()?;
        let current = std::mem::replace(live, entry.snapshot);
        self.redo_stack.push(HistoryEntry { label: entry.label, snapshot: current });
        Some(entry.label)
    }

    /// Swap `live` with the most recently undone state. Returns the redone op.
    pub fn redo(&mut self, live: &mut Table) -> Option<OpKind> {
        let entry = self.redo_stack.pop()?;
        let current = std::mem::replace(live, entry.snapshot);
        // Redo never evicts: the entry came off the undo stack moments ago.
        self.undo_stack.push_back(HistoryEntry { label: entry.label, snapshot: current });
        Some(entry.label)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_label(&self) -> Option<OpKind> {
        self.undo_stack.back().map(|e| e.label)
    }

    pub fn redo_label(&self) -> Option<OpKind> {
        self.redo_stack.last().map(|e| e.label)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
