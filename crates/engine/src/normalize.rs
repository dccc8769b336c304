//! Header normalization.
//!
//! After any change to row or column cardinality or order, row ids become
//! `0..N-1` and column names become `A, B, ..., Z, AA, AB, ...` by position.
//! Cell content and relative order are untouched; header text chosen by the
//! user is discarded. Names are derived from position only, never content.

use crate::table::Table;

/// Convert a 0-based column position to its canonical name: 0=A, 25=Z, 26=AA.
pub fn column_name(index: usize) -> String {
    let mut result = String::new();
    let mut n = index;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Inverse of [`column_name`]. Uppercase letters only.
pub fn column_index(name: &str) -> Option<usize> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let mut n: usize = 0;
    for b in name.bytes() {
        n = n.checked_mul(26)?.checked_add((b - b'A') as usize + 1)?;
    }
    Some(n - 1)
}

/// Reassign row ids and column names to the canonical dense scheme.
pub fn normalize(table: &mut Table) {
    if is_normalized(table) {
        return;
    }
    let columns = (0..table.column_count()).map(column_name).collect();
    let row_ids = (0..table.row_count()).collect();
    table.relabel(columns, row_ids);
}

pub fn is_normalized(table: &Table) -> bool {
    table.row_ids().iter().enumerate().all(|(i, &id)| i == id)
        && table
            .columns()
            .iter()
            .enumerate()
            .all(|(i, name)| *name == column_name(i))
}
