pub mod address;
pub mod analysis;
pub mod error;
pub mod events;
pub mod fuzzy;
pub mod history;
pub mod normalize;
pub mod pattern_fill;
pub mod search;
pub mod session;
pub mod table;

pub use address::{Coordinate, Selection};
pub use error::{CoordinateFault, EditError, Result};
pub use history::OpKind;
pub use pattern_fill::{Direction, FillMode};
pub use search::{AutoConfirm, Confirm, HeaderScope, MatchMode, Prompt, ReplaceOutcome};
pub use session::{ColumnPlacement, EditSession, RowPlacement};
pub use table::{RowId, Table};
