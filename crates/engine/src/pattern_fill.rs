//! Pattern Fill: derive a run of values from a seed.
//!
//! A seed decomposes into an optional non-digit prefix and a maximal trailing
//! digit run (`"R5"` -> `("R", 5)`, `"Item"` -> `("Item", none)`):
//! - Copy: the seed repeated unchanged
//! - Arithmetic: `prefix + (number + i*step)`
//! - Bounded-cyclic: like arithmetic, but the number wraps back into
//!   `[lower, upper]` whenever a step carries it outside

use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};

/// Progression rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FillMode {
    Copy,
    Arithmetic { step: i64 },
    Cyclic { step: i64, lower: i64, upper: i64 },
}

/// Direction a fill runs from its anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Down,
    Right,
}

/// A seed split into prefix and trailing integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub prefix: String,
    /// `None` when there are no trailing digits (or they overflow `i64`)
    pub number: Option<i64>,
}

/// Split `text` into prefix + maximal trailing digit run.
pub fn decompose(text: &str) -> Seed {
    let digits_start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_start {
        Some(i) => Seed {
            prefix: text[..i].to_string(),
            number: text[i..].parse().ok(),
        },
        None => Seed { prefix: text.to_string(), number: None },
    }
}

/// Generate `count` values from `seed` under `mode`.
pub fn generate(seed: &str, mode: &FillMode, count: usize) -> Result<Vec<String>> {
    if count == 0 {
        return Err(EditError::validation("fill count must be at least 1"));
    }

    let (step, bounds) = match *mode {
        FillMode::Copy => return Ok(vec![seed.to_string(); count]),
        FillMode::Arithmetic { step } => (step, None),
        FillMode::Cyclic { step, lower, upper } => (step, Some((lower, upper))),
    };

    let Seed { prefix, number } = decompose(seed);
    let start = number.ok_or_else(|| {
        EditError::validation(format!("seed {:?} does not end in an integer", seed))
    })?;

    if let Some((lower, upper)) = bounds {
        validate_bounds(start, step, lower, upper)?;
    }

    let overflow = || EditError::validation("fill progression overflows");
    let mut values = Vec::with_capacity(count);
    let mut n = start;
    for i in 0..count {
        if i > 0 {
            n = n.checked_add(step).ok_or_else(overflow)?;
            if let Some((lower, upper)) = bounds {
                n = wrap(n, lower, upper);
            }
        }
        values.push(format!("{}{}", prefix, n));
    }
    Ok(values)
}

fn validate_bounds(start: i64, step: i64, lower: i64, upper: i64) -> Result<()> {
    if lower > upper {
        return Err(EditError::validation(format!(
            "cyclic bounds are inverted: lower {} > upper {}",
            lower, upper
        )));
    }
    if start < lower || start > upper {
        return Err(EditError::validation(format!(
            "seed number {} lies outside [{}, {}]",
            start, lower, upper
        )));
    }
    let span = (upper as i128) - (lower as i128);
    if span <= (step as i128).abs() {
        return Err(EditError::validation(format!(
            "cyclic span {} must be greater than step magnitude {}",
            span,
            (step as i128).abs()
        )));
    }
    Ok(())
}

/// Wrap `n` into `[lower, upper]` modulo the interval width.
fn wrap(n: i64, lower: i64, upper: i64) -> i64 {
    let width = (upper as i128) - (lower as i128) + 1;
    let offset = ((n as i128) - (lower as i128)).rem_euclid(width);
    (lower as i128 + offset) as i64
}
