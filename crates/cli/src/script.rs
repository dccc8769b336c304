// Edit scripts for `gridedit apply`: one JSON operation per line (or a JSON
// array), run in order against an EditSession.
//
//   {"op": "edit", "row": 0, "col": 2, "value": "42"}
//   {"op": "insert_row", "row": 0, "placement": "below"}
//   {"op": "fill", "row": 0, "col": 1, "seed": "R5", "direction": "down", "mode": "arithmetic", "step": 2, "count": 3}
//   {"op": "undo"}
//
// `row` is the row id shown by `gridedit show`; `col` is the 1-based column.

use serde::{Deserialize, Serialize};

use gridedit_engine::{
    ColumnPlacement, Direction, EditError, EditSession, FillMode, ReplaceOutcome, RowId, RowPlacement, Selection,
};

use crate::prompt::Prompter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    Edit { row: RowId, col: usize, value: String },
    Copy { row: RowId, col: usize },
    Cut { row: RowId, col: usize },
    Paste { row: RowId, col: usize },
    InsertRow { row: RowId, placement: RowPlacement },
    DeleteRow { row: RowId },
    InsertColumn { col: usize, placement: ColumnPlacement },
    DeleteColumn { name: String },
    Extend { count: usize, direction: Direction },
    Fill {
        row: RowId,
        col: usize,
        seed: String,
        direction: Direction,
        mode: FillKind,
        #[serde(default)]
        step: Option<i64>,
        #[serde(default)]
        lower: Option<i64>,
        #[serde(default)]
        upper: Option<i64>,
        count: usize,
    },
    Find { find: String },
    Replace { find: String, replace: String },
    ReplaceAll { find: String, replace: String },
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    Copy,
    Arithmetic,
    Cyclic,
}

/// Parse JSONL (blank lines skipped) or a JSON array. Errors carry the line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptOp>, String> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).map_err(|e| format!("failed to parse ops JSON: {}", e));
    }
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| serde_json::from_str(line).map_err(|e| format!("line {}: {}", i + 1, e)))
        .collect()
}

pub fn fill_mode(kind: FillKind, step: Option<i64>, lower: Option<i64>, upper: Option<i64>) -> Result<FillMode, EditError> {
    let need = |v: Option<i64>, name: &str| v.ok_or_else(|| EditError::validation(format!("{:?} fill needs '{}'", kind, name)));
    Ok(match kind {
        FillKind::Copy => FillMode::Copy,
        FillKind::Arithmetic => FillMode::Arithmetic { step: need(step, "step")? },
        FillKind::Cyclic => FillMode::Cyclic {
            step: need(step, "step")?,
            lower: need(lower, "lower")?,
            upper: need(upper, "upper")?,
        },
    })
}

/// Result of one op, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done(String),
    /// Declined at a confirmation prompt
    Skipped(String),
}

/// Why a script stopped.
#[derive(Debug)]
pub enum ScriptError {
    Edit(EditError),
    /// Needs `--yes` (no terminal to ask on)
    Unconfirmed(String),
}

impl From<EditError> for ScriptError {
    fn from(e: EditError) -> Self {
        ScriptError::Edit(e)
    }
}

fn at(row: RowId, col: usize) -> Selection {
    Selection::new(row.to_string(), col)
}

pub fn run_op(session: &mut EditSession, op: &ScriptOp, prompter: &mut Prompter) -> Result<Outcome, ScriptError> {
    let done = |msg: String| Ok(Outcome::Done(msg));
    match op {
        ScriptOp::Edit { row, col, value } => {
            let coord = session.edit_cell(&at(*row, *col), value.as_str())?;
            done(format!("set {}", coord))
        }
        ScriptOp::Copy { row, col } => {
            let coord = session.copy(&at(*row, *col))?;
            done(format!("copied {}", coord))
        }
        ScriptOp::Cut { row, col } => {
            let coord = session.cut(&at(*row, *col))?;
            done(format!("cut {}", coord))
        }
        ScriptOp::Paste { row, col } => {
            let sel = at(*row, *col);
            if session.paste(&sel)? {
                done(format!("pasted into {}", session.resolve(&sel)?))
            } else {
                Ok(Outcome::Skipped("clipboard is empty".to_string()))
            }
        }
        ScriptOp::InsertRow { row, placement } => {
            let id = session.insert_row(&at(*row, 1), *placement)?;
            done(format!("inserted row {}", id))
        }
        ScriptOp::DeleteRow { row } => {
            session.delete_row(&at(*row, 1))?;
            done(format!("deleted row {}", row))
        }
        ScriptOp::InsertColumn { col, placement } => {
            let sel = Selection::new(first_row_token(session), *col);
            let name = session.insert_column(&sel, *placement)?;
            done(format!("inserted column {}", name))
        }
        ScriptOp::DeleteColumn { name } => {
            if session.table().column_position(name).is_none() {
                return Err(EditError::ColumnNotFound(name.clone()).into());
            }
            match prompter.confirm_delete_column(name) {
                None => Err(ScriptError::Unconfirmed(format!("delete_column '{}' needs confirmation", name))),
                Some(false) => Ok(Outcome::Skipped(format!("kept column {}", name))),
                Some(true) => {
                    session.delete_column(name)?;
                    done(format!("deleted column {}", name))
                }
            }
        }
        ScriptOp::Extend { count, direction } => {
            session.extend(*count, *direction)?;
            done(format!("extended by {}", count))
        }
        ScriptOp::Fill { row, col, seed, direction, mode, step, lower, upper, count } => {
            let mode = fill_mode(*mode, *step, *lower, *upper)?;
            let written = session.pattern_fill(&at(*row, *col), seed, *direction, mode, *count)?;
            done(format!("filled {} cells", written.len()))
        }
        ScriptOp::Find { find } => {
            let coord = session.find_next(find, prompter)?;
            done(format!("found at {}", coord))
        }
        ScriptOp::Replace { find, replace } => match session.replace_current(find, replace, prompter)? {
            ReplaceOutcome::Located(coord) => done(format!("found at {}", coord)),
            ReplaceOutcome::Replaced { at, next: Some(next) } => done(format!("replaced {}, next at {}", at, next)),
            ReplaceOutcome::Replaced { at, next: None } => done(format!("replaced {}", at)),
        },
        ScriptOp::ReplaceAll { find, replace } => {
            let n = session.replace_all(find, replace)?;
            done(format!("replaced {} cells", n))
        }
        ScriptOp::Undo => match session.undo() {
            Some(kind) => done(format!("undo: {}", kind)),
            None => Ok(Outcome::Skipped("nothing to undo".to_string())),
        },
        ScriptOp::Redo => match session.redo() {
            Some(kind) => done(format!("redo: {}", kind)),
            None => Ok(Outcome::Skipped("nothing to redo".to_string())),
        },
    }
}

/// Any existing row token; column ops only need the column part to resolve.
fn first_row_token(session: &EditSession) -> String {
    session.table().row_ids().first().map(|id| id.to_string()).unwrap_or_default()
}
