// Two-column numeric analysis: Pearson/Spearman correlation, linear and
// exponential least-squares fits. Works on a read-only table snapshot.

use serde::Serialize;

use crate::error::{EditError, Result};
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitKind {
    /// `y = a*x + b`
    Linear,
    /// `y = a*e^(b*x)`
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fit {
    pub kind: FitKind,
    pub a: f64,
    pub b: f64,
    pub r_squared: f64,
}

impl Fit {
    pub fn predict(&self, x: f64) -> f64 {
        match self.kind {
            FitKind::Linear => self.a * x + self.b,
            FitKind::Exponential => self.a * (self.b * x).exp(),
        }
    }

    pub fn equation(&self) -> String {
        match self.kind {
            FitKind::Linear if self.b < 0.0 => format!("y = {:.4}*x - {:.4}", self.a, -self.b),
            FitKind::Linear => format!("y = {:.4}*x + {:.4}", self.a, self.b),
            FitKind::Exponential => format!("y = {:.4}*e^({:.4}*x)", self.a, self.b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub x: String,
    pub y: String,
    /// Rows where both cells parsed as numbers
    pub points: usize,
    pub pearson: Option<f64>,
    pub spearman: Option<f64>,
    pub linear: Option<Fit>,
    /// Absent when fewer than two points have y > 0
    pub exponential: Option<Fit>,
}

/// Correlate column `y` against column `x`.
pub fn analyze(table: &Table, x: &str, y: &str) -> Result<Analysis> {
    let pairs = numeric_pairs(table, x, y)?;
    if pairs.len() < 2 {
        return Err(EditError::Validation(format!(
            "need at least 2 numeric rows in {} and {}, found {}",
            x,
            y,
            pairs.len()
        )));
    }
    Ok(Analysis {
        x: x.to_string(),
        y: y.to_string(),
        points: pairs.len(),
        pearson: pearson(&pairs),
        spearman: spearman(&pairs),
        linear: linear_fit(&pairs),
        exponential: exponential_fit(&pairs),
    })
}

/// `(x, y)` for every row where both cells are finite numbers.
pub fn numeric_pairs(table: &Table, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    let xi = table.column_position(x).ok_or_else(|| EditError::ColumnNotFound(x.to_string()))?;
    let yi = table.column_position(y).ok_or_else(|| EditError::ColumnNotFound(y.to_string()))?;
    Ok(table
        .rows()
        .filter_map(|(_, cells)| Some((parse_number(&cells[xi])?, parse_number(&cells[yi])?)))
        .collect())
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let m = Moments::of(pairs)?;
    if m.sxx == 0.0 || m.syy == 0.0 {
        return None;
    }
    Some(m.sxy / (m.sxx * m.syy).sqrt())
}

/// Pearson over ranks; ties share their average rank.
pub fn spearman(pairs: &[(f64, f64)]) -> Option<f64> {
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let ranked: Vec<(f64, f64)> = ranks(&xs).into_iter().zip(ranks(&ys)).collect();
    pearson(&ranked)
}

pub fn linear_fit(pairs: &[(f64, f64)]) -> Option<Fit> {
    let m = Moments::of(pairs)?;
    if m.sxx == 0.0 {
        return None;
    }
    let a = m.sxy / m.sxx;
    let b = m.mean_y - a * m.mean_x;
    let mut fit = Fit { kind: FitKind::Linear, a, b, r_squared: 0.0 };
    fit.r_squared = r_squared(pairs, &fit);
    Some(fit)
}

/// Least squares on `ln(y)`, rows with `y <= 0` skipped. R² is measured on `y`.
pub fn exponential_fit(pairs: &[(f64, f64)]) -> Option<Fit> {
    let positive: Vec<(f64, f64)> = pairs.iter().copied().filter(|&(_, y)| y > 0.0).collect();
    let logged: Vec<(f64, f64)> = positive.iter().map(|&(x, y)| (x, y.ln())).collect();
    let line = linear_fit(&logged)?;
    let mut fit = Fit { kind: FitKind::Exponential, a: line.b.exp(), b: line.a, r_squared: 0.0 };
    fit.r_squared = r_squared(&positive, &fit);
    Some(fit)
}

fn r_squared(pairs: &[(f64, f64)], fit: &Fit) -> f64 {
    let n = pairs.len() as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let ss_tot: f64 = pairs.iter().map(|&(_, y)| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = pairs.iter().map(|&(x, y)| (y - fit.predict(x)).powi(2)).sum();
    if ss_tot == 0.0 {
        // Constant y: exact when the fit reproduces it
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // 1-based average rank of the tie group i..=j
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            out[k] = rank;
        }
        i = j + 1;
    }
    out
}

struct Moments {
    mean_x: f64,
    mean_y: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl Moments {
    fn of(pairs: &[(f64, f64)]) -> Option<Self> {
        if pairs.len() < 2 {
            return None;
        }
        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for &(x, y) in pairs {
            let (dx, dy) = (x - mean_x, y - mean_y);
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        Some(Self { mean_x, mean_y, sxx, syy, sxy })
    }
}
