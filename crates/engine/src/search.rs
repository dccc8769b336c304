//! Find, replace and header search for [`EditSession`].
//!
//! Cell search walks every cell in row-major order starting just past the
//! last reported match. Reaching the end asks the caller once whether to wrap
//! to the top; a full pass with no hit is `NotFound`. Header search works the
//! same way over column names or row ids, with its cursor keyed by
//! `(term, scope)`.

use serde::{Deserialize, Serialize};

use crate::address::Coordinate;
use crate::error::{EditError, Result};
use crate::fuzzy::{FuzzyScorer, FUZZY_THRESHOLD};
use crate::history::OpKind;
use crate::session::EditSession;
use crate::table::Table;

/// Question put to the user during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Cell search hit the end of the table; continue from the top?
    WrapFind,
    /// Header search hit the last header; continue from the first?
    WrapHeaderSearch,
}

/// Boundary confirmation (a dialog in the desktop view).
pub trait Confirm {
    fn confirm(&mut self, prompt: Prompt) -> bool;
}

impl<F: FnMut(Prompt) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: Prompt) -> bool {
        self(prompt)
    }
}

/// Fixed answer to every prompt.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: Prompt) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderScope {
    #[default]
    Columns,
    Rows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-insensitive substring
    #[default]
    Exact,
    /// Similarity score at or above [`FUZZY_THRESHOLD`]
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderHit {
    pub scope: HeaderScope,
    /// 0-based display position of the header
    pub position: usize,
    pub label: String,
}

/// Result of [`EditSession::replace_current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The remembered match was stale or missing; nothing was replaced, the
    /// cursor moved to this match instead.
    Located(Coordinate),
    /// Replaced one occurrence at `at`; `next` is the following match, if any.
    Replaced { at: Coordinate, next: Option<Coordinate> },
}

#[derive(Debug, Clone)]
struct LastMatch {
    coord: Coordinate,
    /// Row-major cell index
    index: usize,
    layout: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FindCursor {
    term: String,
    last: Option<LastMatch>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct HeaderCursor {
    term: String,
    scope: HeaderScope,
    last: Option<usize>,
}

impl EditSession {
    /// Next cell containing `term` (case-sensitive substring).
    pub fn find_next(&mut self, term: &str, confirm: &mut dyn Confirm) -> Result<Coordinate> {
        check_term(term)?;
        if self.find.term != term {
            self.find = FindCursor { term: term.to_string(), last: None };
        }

        let table = self.table();
        let total = table.row_count() * table.column_count();
        let start = match &self.find.last {
            Some(m) if m.layout == table.layout_token() => (m.index + 1).min(total),
            _ => 0,
        };

        let mut hit = scan_cells(table, term, start..total);
        if hit.is_none() && start > 0 && confirm.confirm(Prompt::WrapFind) {
            hit = scan_cells(table, term, 0..start);
        }
        let index = hit.ok_or_else(|| EditError::NotFound(term.to_string()))?;

        let cols = table.column_count();
        let (r, c) = (index / cols, index % cols);
        let coord = Coordinate::new(table.row_ids()[r], table.columns()[c].clone());
        let layout = table.layout_token();
        self.find.last = Some(LastMatch { coord: coord.clone(), index, layout });
        Ok(coord)
    }

    /// Replace the first occurrence of `term` in the last reported match, then
    /// advance. If that match no longer holds `term` (an edit, undo or
    /// structural change intervened) this runs [`find_next`](Self::find_next)
    /// instead and replaces nothing.
    pub fn replace_current(
        &mut self,
        term: &str,
        replacement: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<ReplaceOutcome> {
        check_term(term)?;
        let table = self.table();
        let current = match &self.find.last {
            Some(m)
                if self.find.term == term
                    && m.layout == table.layout_token()
                    && table.get(m.coord.row, &m.coord.column).is_ok_and(|v| v.contains(term)) =>
            {
                Some(m.coord.clone())
            }
            _ => None,
        };

        let Some(at) = current else {
            return self.find_next(term, confirm).map(ReplaceOutcome::Located);
        };

        let value = self.table().get(at.row, &at.column)?.replacen(term, replacement, 1);
        self.write_cell(OpKind::ReplaceCurrent, &at, value)?;

        let next = match self.find_next(term, confirm) {
            Ok(coord) => Some(coord),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        Ok(ReplaceOutcome::Replaced { at, next })
    }

    /// Replace every occurrence of `term` in every cell. Returns the number of
    /// cells whose value changed; zero changes record no history.
    pub fn replace_all(&mut self, term: &str, replacement: &str) -> Result<usize> {
        check_term(term)?;
        self.commit(OpKind::ReplaceAll, |t| {
            let mut changed = 0;
            for r in 0..t.row_count() {
                for c in 0..t.column_count() {
                    let Some(old) = t.cell_at(r, c) else { continue };
                    if !old.contains(term) {
                        continue;
                    }
                    let new = old.replace(term, replacement);
                    if new != old {
                        t.set_at(r, c, new);
                        changed += 1;
                    }
                }
            }
            Ok(changed)
        })
    }

    /// Next column name or row id matching `term`.
    pub fn find_header(
        &mut self,
        term: &str,
        scope: HeaderScope,
        mode: MatchMode,
        confirm: &mut dyn Confirm,
    ) -> Result<HeaderHit> {
        check_term(term)?;
        if self.header_find.term != term || self.header_find.scope != scope {
            self.header_find = HeaderCursor { term: term.to_string(), scope, last: None };
        }

        let labels: Vec<String> = match scope {
            HeaderScope::Columns => self.table().columns().to_vec(),
            HeaderScope::Rows => self.table().row_ids().iter().map(|id| id.to_string()).collect(),
        };
        let start = self.header_find.last.map_or(0, |i| i + 1).min(labels.len());

        let scorer = self.scorer.as_ref();
        let matches = |label: &String| header_matches(scorer, term, label, mode);
        let mut hit = (start..labels.len()).find(|&i| matches(&labels[i]));
        if hit.is_none() && start > 0 && confirm.confirm(Prompt::WrapHeaderSearch) {
            hit = (0..start).find(|&i| matches(&labels[i]));
        }
        let position = hit.ok_or_else(|| EditError::NotFound(term.to_string()))?;

        self.header_find.last = Some(position);
        Ok(HeaderHit { scope, position, label: labels[position].clone() })
    }
}

fn check_term(term: &str) -> Result<()> {
    if term.is_empty() {
        return Err(EditError::validation("search term is empty"));
    }
    Ok(())
}

fn scan_cells(table: &Table, term: &str, range: std::ops::Range<usize>) -> Option<usize> {
    let cols = table.column_count();
    if cols == 0 {
        return None;
    }
    range
        .into_iter()
        .find(|&i| table.cell_at(i / cols, i % cols).is_some_and(|v| v.contains(term)))
}

fn header_matches(scorer: &dyn FuzzyScorer, term: &str, label: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => label.to_lowercase().contains(&term.to_lowercase()),
        MatchMode::Fuzzy => scorer.score(term, label) >= FUZZY_THRESHOLD,
    }
}
