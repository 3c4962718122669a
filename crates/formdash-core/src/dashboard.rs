// Pipeline entry point: baseline ranking -> current aggregation ->
// comparison -> FDR flags -> context enrichment -> optional persistence.

use tracing::info;

use crate::baseline::BaselineRanker;
use crate::compare::{compare, DashboardTable};
use crate::current::aggregate_current;
use crate::enrich::{average_opponent_strength, enrich, latest_prices};
use crate::error::DashboardError;
use crate::events::{price_snapshots, roster_for, EventRecord, PriceSnapshot, TeamStrengths};
use crate::fdr::{flag_significant, FDR_ALPHA};
use crate::position::Position;
use crate::scoring::PointsRemapper;
use crate::store::{BaselineStore, DashboardSink};

/// Parameters accepted by [`Dashboard::build`].
#[derive(Debug, Clone, Copy)]
pub struct DashboardRequest<'a> {
    /// One of "GK", "DEF", "MID", "FWD".
    pub position: &'a str,
    /// Number of baseline players to rank when no cached baseline exists.
    pub top_n: usize,
    /// Write the finished table to the sink.
    pub persist: bool,
}

/// Every dataset the pipeline reads. Loaded once and shared across positions.
#[derive(Debug, Clone, Default)]
pub struct SeasonData {
    /// Current-season gameweek rows, appearances and non-appearances.
    pub current: Vec<EventRecord>,
    /// Multi-season historical rows.
    pub historical: Vec<EventRecord>,
    pub team_strengths: TeamStrengths,
    pub prices: Vec<PriceSnapshot>,
}

impl SeasonData {
    /// Assemble the inputs, deriving the price snapshot table from the
    /// current-season rows.
    pub fn new(
        current: Vec<EventRecord>,
        historical: Vec<EventRecord>,
        team_strengths: TeamStrengths,
    ) -> Self {
        let prices = price_snapshots(&current);
        Self {
            current,
            historical,
            team_strengths,
            prices,
        }
    }
}

/// Builds dashboard tables against an injected store and points remapper.
pub struct Dashboard<S, R> {
    ranker: BaselineRanker<S, R>,
}

impl<S, R> Dashboard<S, R>
where
    S: BaselineStore + DashboardSink,
    R: PointsRemapper,
{
    pub fn new(store: S, remapper: R, baseline_seasons: Vec<String>) -> Self {
        Self {
            ranker: BaselineRanker::new(store, remapper, baseline_seasons),
        }
    }

    pub fn store(&self) -> &S {
        self.ranker.store()
    }

    pub fn into_store(self) -> S {
        self.ranker.into_store()
    }

    /// Build the comparison table for one position.
    ///
    /// Fails with `InvalidPosition` before touching any data when the tag is
    /// not recognised. Undefined statistics never fail; they come back as NaN
    /// or `None` in the rows.
    pub fn build(
        &mut self,
        request: &DashboardRequest<'_>,
        data: &SeasonData,
    ) -> Result<DashboardTable, DashboardError> {
        let position = Position::from_tag(request.position)
            .ok_or_else(|| DashboardError::InvalidPosition(request.position.to_string()))?;
        if request.top_n == 0 {
            return Err(DashboardError::InvalidTopN);
        }

        let roster = roster_for(&data.current, position);
        let baseline =
            self.ranker
                .load_or_rank(position, &data.historical, &roster, request.top_n)?;

        let current = aggregate_current(&data.current, &baseline);
        let mut rows = compare(&baseline, &current);
        flag_significant(&mut rows, FDR_ALPHA);

        let prices = latest_prices(&data.prices);
        let opponents = average_opponent_strength(&data.current, &data.team_strengths);
        enrich(&mut rows, &prices, &opponents);

        let table = DashboardTable { position, rows };
        info!(
            "{} dashboard: {} players, {} with a significant change",
            position,
            table.rows.len(),
            table.significant_count()
        );

        if request.persist {
            self.ranker.store_mut().write(&table)?;
        }
        Ok(table)
    }
}
