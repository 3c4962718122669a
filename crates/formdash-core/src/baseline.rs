// Baseline ranking: picks the top-N players by mean per-appearance score over
// the historical window and memoises the result per position.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::error::DashboardError;
use crate::events::EventRecord;
use crate::position::Position;
use crate::scoring::PointsRemapper;
use crate::stats::{mean, sample_stdev};
use crate::store::BaselineStore;

/// Seasons compared against the current one unless configured otherwise.
pub const DEFAULT_BASELINE_SEASONS: [&str; 2] = ["2021-22", "2022-23"];

/// Historical performance of one top-N player.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineSummary {
    pub name: String,
    pub appearances: u32,
    pub mean: f64,
    /// Sample standard deviation; NaN with a single appearance.
    pub stdev: f64,
}

// ---------------------------------------------------------------------------
// Pure ranking
// ---------------------------------------------------------------------------

/// Historical rows eligible for the baseline: inside the season window, an
/// appearance, and belonging to a player on the current roster.
pub fn baseline_rows<'a>(
    historical: &'a [EventRecord],
    seasons: &[String],
    roster: &BTreeSet<String>,
) -> Vec<&'a EventRecord> {
    historical
        .iter()
        .filter(|e| {
            e.season
                .as_ref()
                .is_some_and(|s| seasons.iter().any(|w| w == s))
        })
        .filter(|e| e.is_appearance())
        .filter(|e| roster.contains(&e.name))
        .collect()
}

/// Rank players by mean remapped score and summarise the best `top_n`.
///
/// Players are grouped in ascending name order and the descending sort by
/// mean is stable, so equal means keep alphabetical order.
pub fn rank_baseline<R: PointsRemapper + ?Sized>(
    remapper: &R,
    position: Position,
    rows: &[&EventRecord],
    top_n: usize,
) -> Vec<BaselineSummary> {
    let mut scores: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        scores
            .entry(row.name.as_str())
            .or_default()
            .push(remapper.score(position, row));
    }

    let mut ranked: Vec<(&str, &Vec<f64>, f64)> = scores
        .iter()
        .map(|(name, values)| (*name, values, mean(values)))
        .collect();
    ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_n);

    ranked
        .into_iter()
        .map(|(name, values, mean_score)| BaselineSummary {
            name: name.to_string(),
            appearances: values.len() as u32,
            mean: mean_score,
            stdev: sample_stdev(values),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Memoising ranker
// ---------------------------------------------------------------------------

/// Ranks baselines through an injected store: the first request for a
/// position computes and saves, every later one reads the stored set back.
///
/// The check-then-create sequence is not atomic; callers must not run two
/// rankers for the same position against one store concurrently.
pub struct BaselineRanker<S, R> {
    store: S,
    remapper: R,
    seasons: Vec<String>,
}

impl<S: BaselineStore, R: PointsRemapper> BaselineRanker<S, R> {
    pub fn new(store: S, remapper: R, seasons: Vec<String>) -> Self {
        Self {
            store,
            remapper,
            seasons,
        }
    }

    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Return the cached baseline for `position`, computing and persisting it
    /// first if the store has none.
    ///
    /// A cached set is returned as-is even when `top_n` differs from the size
    /// it was built with; delete the cache to re-rank.
    pub fn load_or_rank(
        &mut self,
        position: Position,
        historical: &[EventRecord],
        roster: &BTreeSet<String>,
        top_n: usize,
    ) -> Result<Vec<BaselineSummary>, DashboardError> {
        if let Some(cached) = self.store.load(position)? {
            debug!(
                "baseline cache hit for {}: {} players",
                position,
                cached.len()
            );
            return Ok(cached);
        }

        let rows = baseline_rows(historical, &self.seasons, roster);
        let summaries = rank_baseline(&self.remapper, position, &rows, top_n);
        info!(
            "ranked {} baseline players for {} from {} appearances",
            summaries.len(),
            position,
            rows.len()
        );
        self.store.save(position, &summaries)?;
        Ok(summaries)
    }
}
