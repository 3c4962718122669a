// Baseline vs current-period comparison: effect size, t statistic, p-value
// and the categorical effect-size label.

use std::collections::HashMap;

use serde::Serialize;

use crate::baseline::BaselineSummary;
use crate::current::CurrentAggregate;
use crate::position::Position;
use crate::stats::t_sf;

// ---------------------------------------------------------------------------
// Effect size labels
// ---------------------------------------------------------------------------

/// Upper bounds (inclusive) of the first six |effect size| bins.
pub const EFFECT_SIZE_BREAKPOINTS: [f64; 6] = [0.01, 0.2, 0.5, 0.8, 1.20, 2.0];

/// Ordinal magnitude of a standardised change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EffectSizeLabel {
    #[serde(rename = "None")]
    Negligible,
    #[serde(rename = "Very small")]
    VerySmall,
    Small,
    Medium,
    Large,
    #[serde(rename = "Very large")]
    VeryLarge,
    Huge,
}

impl EffectSizeLabel {
    pub const ALL: [EffectSizeLabel; 7] = [
        EffectSizeLabel::Negligible,
        EffectSizeLabel::VerySmall,
        EffectSizeLabel::Small,
        EffectSizeLabel::Medium,
        EffectSizeLabel::Large,
        EffectSizeLabel::VeryLarge,
        EffectSizeLabel::Huge,
    ];

    /// Bin `|effect_size|` against [`EFFECT_SIZE_BREAKPOINTS`]. A value equal
    /// to a breakpoint lands in the lower bin. Undefined effect sizes have no
    /// label.
    pub fn from_effect_size(effect_size: f64) -> Option<Self> {
        if effect_size.is_nan() {
            return None;
        }
        let magnitude = effect_size.abs();
        let bin = EFFECT_SIZE_BREAKPOINTS
            .iter()
            .filter(|&&edge| magnitude > edge)
            .count();
        Some(Self::ALL[bin])
    }

    pub fn label(&self) -> &'static str {
        match self {
            EffectSizeLabel::Negligible => "None",
            EffectSizeLabel::VerySmall => "Very small",
            EffectSizeLabel::Small => "Small",
            EffectSizeLabel::Medium => "Medium",
            EffectSizeLabel::Large => "Large",
            EffectSizeLabel::VeryLarge => "Very large",
            EffectSizeLabel::Huge => "Huge",
        }
    }

    /// Position in the ordinal scale, 0 (None) through 6 (Huge).
    pub fn rank(&self) -> usize {
        *self as usize
    }
}

// ---------------------------------------------------------------------------
// Per-player test statistics
// ---------------------------------------------------------------------------

/// Statistics comparing one player's current mean against their baseline.
/// Every field is NaN when it cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestStatistics {
    pub effect_size: f64,
    pub standard_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
}

/// Compare a current-period mean against a baseline summary.
///
/// - effect size: `(current - baseline) / baseline_std`, NaN when the
///   baseline spread is zero or undefined
/// - standard error: `baseline_std / sqrt(n)`, NaN when `n < 2`
/// - t: `(current - baseline) / SE`
/// - p-value: survival function of Student's t at `|t|` with `n - 1` degrees
///   of freedom. The direction of the change is read from the sign of the
///   effect size, not from the p-value.
pub fn test_statistics(
    baseline: &BaselineSummary,
    current_mean: f64,
    current_appearances: u32,
) -> TestStatistics {
    let diff = current_mean - baseline.mean;
    let std = baseline.stdev;

    let effect_size = if std.is_finite() && std > 0.0 {
        diff / std
    } else {
        f64::NAN
    };

    if current_appearances < 2 {
        return TestStatistics {
            effect_size,
            standard_error: f64::NAN,
            t_statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }

    let n = f64::from(current_appearances);
    let standard_error = std / n.sqrt();
    let t_statistic = if standard_error.is_finite() && standard_error > 0.0 {
        diff / standard_error
    } else {
        f64::NAN
    };
    let p_value = t_sf(t_statistic.abs(), n - 1.0);

    TestStatistics {
        effect_size,
        standard_error,
        t_statistic,
        p_value,
    }
}

// ---------------------------------------------------------------------------
// Comparison table
// ---------------------------------------------------------------------------

/// One row of the finished dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub name: String,
    pub baseline_appearances: u32,
    pub baseline_mean: f64,
    pub baseline_stdev: f64,
    /// `None` when the player has not appeared in the current period.
    pub current_appearances: Option<u32>,
    pub current_mean: f64,
    pub effect_size: f64,
    pub standard_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    /// Set by the Benjamini-Hochberg pass.
    pub significant: bool,
    pub effect_label: Option<EffectSizeLabel>,
    /// Latest price in millions.
    pub current_price: Option<f64>,
    pub avg_opponent_strength: Option<f64>,
}

/// The comparison rows for one position, in baseline rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTable {
    pub position: Position,
    pub rows: Vec<ComparisonRow>,
}

impl DashboardTable {
    pub fn p_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.p_value).collect()
    }

    pub fn significant_count(&self) -> usize {
        self.rows.iter().filter(|r| r.significant).count()
    }
}

/// Left-join current aggregates onto the baseline and compute the test
/// columns. Every baseline player yields exactly one row, in baseline order.
/// Significance and context columns are left unset.
pub fn compare(
    baseline: &[BaselineSummary],
    current: &HashMap<String, CurrentAggregate>,
) -> Vec<ComparisonRow> {
    baseline
        .iter()
        .map(|b| {
            let agg = current.get(&b.name);
            let current_mean = agg.map_or(f64::NAN, |a| a.mean);
            let current_appearances = agg.map(|a| a.appearances);
            let stats = test_statistics(b, current_mean, current_appearances.unwrap_or(0));

            ComparisonRow {
                name: b.name.clone(),
                baseline_appearances: b.appearances,
                baseline_mean: b.mean,
                baseline_stdev: b.stdev,
                current_appearances,
                current_mean,
                effect_size: stats.effect_size,
                standard_error: stats.standard_error,
                t_statistic: stats.t_statistic,
                p_value: stats.p_value,
                significant: false,
                effect_label: EffectSizeLabel::from_effect_size(stats.effect_size),
                current_price: None,
                avg_opponent_strength: None,
            }
        })
        .collect()
}
