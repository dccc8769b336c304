//! Error types shared by every table mutation.
//!
//! A failing operation never leaves a partial effect behind: validation runs
//! against a scratch copy and the live table is only swapped on success.

use thiserror::Error;

use crate::table::RowId;

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The target does not resolve against the current table.
    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] CoordinateFault),

    #[error("column name {0:?} already exists")]
    DuplicateName(String),

    #[error("column {0:?} not found")]
    ColumnNotFound(String),

    /// Malformed operation parameters (pattern fill, extend, search terms).
    #[error("{0}")]
    Validation(String),

    /// Search exhausted without a hit. Not fatal; callers usually show "no match".
    #[error("no match for {0:?}")]
    NotFound(String),
}

impl EditError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EditError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EditError::NotFound(_))
    }
}

/// Why a coordinate failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateFault {
    #[error("row {0} does not exist")]
    RowNotFound(RowId),

    #[error("row token {0:?} is not a row id")]
    BadRowToken(String),

    #[error("column {index} is outside 1..={count}")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("column {0:?} does not exist")]
    MissingColumn(String),

    #[error("selection was captured before a structural change")]
    StaleSelection,

    #[error("position {position} is past the table edge ({limit})")]
    OutOfBounds { position: usize, limit: usize },
}
