// Multi-position run: load the datasets once, then build one dashboard table
// per requested position against a shared baseline store.

use std::path::Path;

use anyhow::Context;
use formdash_core::scoring::{FplScoring, PointsRemapper};
use formdash_core::store::{BaselineStore, CsvStore, DashboardSink};
use formdash_core::{Dashboard, DashboardError, DashboardRequest, DashboardTable, Position, SeasonData};
use tracing::info;

use crate::config::{Config, TopN};
use crate::data;

/// What to build, as chosen on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Position tags in output order. Empty means all four.
    pub positions: Vec<String>,
    /// Overrides the configured per-position result size.
    pub top_n: Option<usize>,
    /// Write each finished table to `{POS}_dashboard.csv`.
    pub save_csv: bool,
}

impl RunOptions {
    /// Requested tags, defaulting to GK, DEF, MID, FWD.
    pub fn position_tags(&self) -> Vec<String> {
        if self.positions.is_empty() {
            Position::ALL
                .iter()
                .map(|p| p.display_str().to_string())
                .collect()
        } else {
            self.positions.clone()
        }
    }
}

/// Load every dataset named in `config` and build the requested tables with a
/// CSV-backed baseline cache under the configured results directory.
pub fn run_positions(
    config: &Config,
    base_dir: &Path,
    options: &RunOptions,
) -> anyhow::Result<Vec<DashboardTable>> {
    let data = data::load_season_data(config, base_dir).context("failed to load datasets")?;

    let results_dir = config.resolve(base_dir, &config.data_paths.results_dir);
    let store = CsvStore::new(results_dir, config.baseline.label.clone());
    let mut dashboard = Dashboard::new(store, FplScoring, config.baseline.seasons.clone());

    let tables = build_tables(&mut dashboard, &data, &config.top_n, options)?;
    info!("built {} dashboard tables", tables.len());
    Ok(tables)
}

/// Build one table per requested position, in request order.
pub fn build_tables<S, R>(
    dashboard: &mut Dashboard<S, R>,
    data: &SeasonData,
    top_n: &TopN,
    options: &RunOptions,
) -> anyhow::Result<Vec<DashboardTable>>
where
    S: BaselineStore + DashboardSink,
    R: PointsRemapper,
{
    let mut tables = Vec::new();
    for tag in options.position_tags() {
        // Unrecognised tags fall through to the pipeline, which rejects them.
        let size = options
            .top_n
            .or_else(|| Position::from_tag(&tag).map(|p| top_n.for_position(p)))
            .unwrap_or(1);
        let request = DashboardRequest {
            position: &tag,
            top_n: size,
            persist: options.save_csv,
        };
        let table = dashboard
            .build(&request, data)
            .with_context(|| format!("failed to build {tag} dashboard"))?;
        tables.push(table);
    }
    Ok(tables)
}

/// True when `err` (or anything it wraps) is an invalid-position rejection.
pub fn is_invalid_position(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<DashboardError>(),
            Some(DashboardError::InvalidPosition(_))
        )
    })
}
