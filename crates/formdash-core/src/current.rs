// Current-period aggregation over the fixed baseline player set.

use std::collections::{HashMap, HashSet};

use crate::baseline::BaselineSummary;
use crate::events::EventRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentAggregate {
    pub appearances: u32,
    pub mean: f64,
}

/// Mean recorded points-minus-bonus and appearance count for each baseline
/// player who has appeared this period. Never cached.
pub fn aggregate_current(
    events: &[EventRecord],
    baseline: &[BaselineSummary],
) -> HashMap<String, CurrentAggregate> {
    let tracked: HashSet<&str> = baseline.iter().map(|b| b.name.as_str()).collect();

    let mut totals: HashMap<&str, (u32, f64)> = HashMap::new();
    for e in events
        .iter()
        .filter(|e| e.is_appearance() && tracked.contains(e.name.as_str()))
    {
        let entry = totals.entry(e.name.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += e.points_minus_bonus();
    }

    totals
        .into_iter()
        .map(|(name, (appearances, sum))| {
            (
                name.to_string(),
                CurrentAggregate {
                    appearances,
                    mean: sum / f64::from(appearances),
                },
            )
        })
        .collect()
}
