// Benjamini-Hochberg false discovery rate control across per-player tests.

use std::cmp::Ordering;

use crate::compare::ComparisonRow;

/// Target false discovery rate for the dashboard's significance flags.
pub const FDR_ALPHA: f64 = 0.05;

/// Benjamini-Hochberg step-up procedure.
///
/// Sorts the p-values ascending, finds the largest rank k with
/// `p(k) <= k / m * alpha` and rejects every hypothesis ranked at or below k.
/// Flags are returned in input order. NaN p-values count towards m and are
/// never rejected.
pub fn benjamini_hochberg(p_values: &[f64], alpha: f64) -> Vec<bool> {
    let m = p_values.len();
    let mut flags = vec![false; m];
    if m == 0 {
        return flags;
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        let (pa, pb) = (p_values[a], p_values[b]);
        match (pa.is_nan(), pb.is_nan()) {
            (false, false) => pa.partial_cmp(&pb).unwrap_or(Ordering::Equal),
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => Ordering::Equal,
        }
    });

    let cutoff = order
        .iter()
        .enumerate()
        .filter(|&(rank, &idx)| p_values[idx] <= (rank + 1) as f64 / m as f64 * alpha)
        .map(|(rank, _)| rank + 1)
        .last();

    if let Some(k) = cutoff {
        for &idx in &order[..k] {
            flags[idx] = true;
        }
    }
    flags
}

/// Set each row's significance flag from a BH pass over the whole table.
pub fn flag_significant(rows: &mut [ComparisonRow], alpha: f64) {
    let p_values: Vec<f64> = rows.iter().map(|r| r.p_value).collect();
    for (row, flag) in rows.iter_mut().zip(benjamini_hochberg(&p_values, alpha)) {
        row.significant = flag;
    }
}
