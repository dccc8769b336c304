// Property-based tests for undo/redo history.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::collection::vec;
use proptest::prelude::*;

use gridedit_engine::normalize::is_normalized;
use gridedit_engine::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Edit { row: usize, col: usize, value: String },
    InsertRow { row: usize, below: bool },
    DeleteRow { row: usize },
    InsertColumn { col: usize, right: bool },
    DeleteColumn { col: usize },
    ReplaceAll { term: String, with: String },
    Fill { row: usize, col: usize, step: i64, count: usize },
    Extend { count: usize, down: bool },
    Undo,
    Redo,
}

/// Short values over a small alphabet so Replace All finds something.
fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[ab1]{0,4}",
        1 => Just("".to_string()),
    ]
}

/// Indices run a little past the table so some ops fail.
fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..6usize, 0..4usize, arb_value()).prop_map(|(row, col, value)| Op::Edit { row, col, value }),
        2 => (0..6usize, any::<bool>()).prop_map(|(row, below)| Op::InsertRow { row, below }),
        2 => (0..6usize).prop_map(|row| Op::DeleteRow { row }),
        1 => (0..4usize, any::<bool>()).prop_map(|(col, right)| Op::InsertColumn { col, right }),
        1 => (0..4usize).prop_map(|col| Op::DeleteColumn { col }),
        1 => (r"[ab]{0,2}", arb_value()).prop_map(|(term, with)| Op::ReplaceAll { term, with }),
        1 => (0..6usize, 0..4usize, -3..3i64, 0..4usize)
            .prop_map(|(row, col, step, count)| Op::Fill { row, col, step, count }),
        1 => (0..3usize, any::<bool>()).prop_map(|(count, down)| Op::Extend { count, down }),
        2 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

fn session() -> EditSession {
    let table = Table::from_rows(
        vec!["Name".into(), "Qty".into(), "Note".into()],
        vec![
            vec!["a".into(), "1".into(), "".into()],
            vec!["b".into(), "2".into(), "ab".into()],
            vec!["ab".into(), "11".into(), "b".into()],
        ],
    )
    .unwrap();
    let mut s = EditSession::new();
    s.open(table);
    s
}

/// Selection at display row `row`; a row past the end gets a token that
/// does not exist.
fn sel(t: &Table, row: usize, col: usize) -> Selection {
    let token = t.row_ids().get(row).map_or_else(|| "999".to_string(), |id| id.to_string());
    Selection::new(token, col + 1)
}

fn apply(s: &mut EditSession, op: &Op) -> Result<()> {
    match op {
        Op::Edit { row, col, value } => {
            let at = sel(s.table(), *row, *col);
            s.edit_cell(&at, value.as_str()).map(|_| ())
        }
        Op::InsertRow { row, below } => {
            let at = sel(s.table(), *row, 0);
            let placement = if *below { RowPlacement::Below } else { RowPlacement::Above };
            s.insert_row(&at, placement).map(|_| ())
        }
        Op::DeleteRow { row } => {
            let at = sel(s.table(), *row, 0);
            s.delete_row(&at).map(|_| ())
        }
        Op::InsertColumn { col, right } => {
            let at = sel(s.table(), 0, *col);
            let placement = if *right { ColumnPlacement::Right } else { ColumnPlacement::Left };
            s.insert_column(&at, placement).map(|_| ())
        }
        Op::DeleteColumn { col } => {
            let name = s.table().columns().get(*col).cloned().unwrap_or_else(|| "missing".into());
            s.delete_column(&name).map(|_| ())
        }
        Op::ReplaceAll { term, with } => s.replace_all(term, with).map(|_| ()),
        Op::Fill { row, col, step, count } => {
            let at = sel(s.table(), *row, *col);
            s.pattern_fill(&at, "R1", Direction::Down, FillMode::Arithmetic { step: *step }, *count)
                .map(|_| ())
        }
        Op::Extend { count, down } => {
            let direction = if *down { Direction::Down } else { Direction::Right };
            s.extend(*count, direction)
        }
        Op::Undo => {
            s.undo();
            Ok(())
        }
        Op::Redo => {
            s.redo();
            Ok(())
        }
    }
}

// ===========================================================================
// Laws
// ===========================================================================

// Undoing everything restores the opened table; redoing everything returns
// to where the sequence ended.
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn undo_redo_round_trip(ops in vec(arb_op(), 0..24)) {
        let mut s = session();
        let initial = s.snapshot();
        for op in &ops {
            let _ = apply(&mut s, op);
        }
        // Drop the redo tail so the round trip covers the whole undo stack
        while s.can_redo() {
            s.redo();
        }
        let last = s.snapshot();

        let n = s.undo_len();
        for _ in 0..n {
            prop_assert!(s.undo().is_some());
        }
        prop_assert_eq!(s.table(), &initial);
        prop_assert!(s.undo().is_none());

        for _ in 0..n {
            prop_assert!(s.redo().is_some());
        }
        prop_assert_eq!(s.table(), &last);
        prop_assert!(s.redo().is_none());
    }
}

// A failed operation changes neither the table, the stacks nor the revision.
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn failed_ops_are_atomic(ops in vec(arb_op(), 1..24)) {
        let mut s = session();
        for op in &ops {
            let before = s.snapshot();
            let stacks = (s.undo_len(), s.redo_len());
            let revision = s.revision();
            if apply(&mut s, op).is_err() {
                prop_assert_eq!(s.table(), &before, "{:?} changed the table", op);
                prop_assert_eq!((s.undo_len(), s.redo_len()), stacks);
                prop_assert_eq!(s.revision(), revision);
            }
        }
    }
}

// Structural mutations always leave canonical headers and row ids.
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn structural_ops_normalize(ops in vec(arb_op(), 1..24)) {
        let mut s = session();
        for op in &ops {
            if matches!(op, Op::Undo | Op::Redo) {
                continue;
            }
            let recorded = s.undo_len();
            if apply(&mut s, op).is_ok() && s.undo_len() > recorded {
                let structural = s.undo_label().is_some_and(|k| k.is_structural());
                if structural {
                    prop_assert!(is_normalized(s.table()), "{:?} left {:?}", op, s.table());
                }
            }
        }
    }
}

// A recorded mutation after undo discards the redo branch.
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn new_branch_clears_redo(ops in vec(arb_op(), 1..24)) {
        let mut s = session();
        for op in &ops {
            let _ = apply(&mut s, op);
        }
        prop_assume!(s.can_undo());
        s.undo();
        prop_assert!(s.can_redo());

        let t = s.table();
        prop_assume!(t.row_count() > 0 && t.column_count() > 0);
        let at = sel(t, 0, 0);
        s.edit_cell(&at, "branch-marker").unwrap();
        prop_assert_eq!(s.redo_len(), 0);
    }
}

// A bounded history never holds more than its limit.
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn bounded_history_respects_limit(ops in vec(arb_op(), 1..32), limit in 1..6usize) {
        let mut s = session().with_history_limit(Some(limit));
        for op in &ops {
            let _ = apply(&mut s, op);
            prop_assert!(s.undo_len() <= limit);
        }
    }
}
