//! Spearman rank correlation across the numeric columns.
//!
//! Rank correlation suits the heavily skewed, censored `ColiVal`
//! distribution: it depends only on order, so censored values sitting at a
//! detection limit do not distort it beyond their ties.

use crate::model::{NumericColumn, SampleTable};
use serde::Serialize;

/// Columns in the correlation matrix, in display order.
pub const CORRELATION_COLUMNS: [NumericColumn; 5] = [
    NumericColumn::Coli,
    NumericColumn::Temp,
    NumericColumn::Sal,
    NumericColumn::Doy,
    NumericColumn::Year,
];

/// Minimum number of complete pairs for a coefficient to be reported.
pub const MIN_PAIRS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    /// `coefficients[i][j]` is `None` when too few pairs or a constant column.
    pub coefficients: Vec<Vec<Option<f64>>>,
    /// Number of rows where both columns are present.
    pub pair_counts: Vec<Vec<usize>>,
}

/// Ranks starting at 1, ties receiving the average of their positions.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end (0-based) share rank mean(start+1 ..= end)
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Spearman's rho for paired observations. `None` for fewer than
/// `MIN_PAIRS` pairs, mismatched lengths, or a constant input.
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < MIN_PAIRS {
        return None;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Pairwise-complete Spearman matrix over `CORRELATION_COLUMNS`.
pub fn spearman_matrix(table: &SampleTable) -> CorrelationMatrix {
    let k = CORRELATION_COLUMNS.len();
    let mut coefficients = vec![vec![None; k]; k];
    let mut pair_counts = vec![vec![0; k]; k];

    for i in 0..k {
        for j in i..k {
            let (xs, ys): (Vec<f64>, Vec<f64>) = table
                .samples
                .iter()
                .filter_map(|s| {
                    Some((CORRELATION_COLUMNS[i].value(s)?, CORRELATION_COLUMNS[j].value(s)?))
                })
                .unzip();
            let rho = spearman(&xs, &ys);
            coefficients[i][j] = rho;
            coefficients[j][i] = rho;
            pair_counts[i][j] = xs.len();
            pair_counts[j][i] = xs.len();
        }
    }

    CorrelationMatrix {
        columns: CORRELATION_COLUMNS.iter().map(|c| c.label()).collect(),
        coefficients,
        pair_counts,
    }
}
