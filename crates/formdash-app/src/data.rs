// Dataset loading for the dashboard pipeline.
//
// Reads the Fantasy-Premier-League community CSV layout: a merged gameweek
// table for the current season, a cleaned multi-season table (same columns
// plus `season_x`), and a teams table carrying a strength rating per team id.

use crate::config::{Config, DataPaths};
use formdash_core::events::{EventRecord, TeamStrengths};
use formdash_core::{Position, SeasonData};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// One gameweek row. The current-season and historical tables share these
/// columns; only the historical one carries `season_x`. Columns not listed
/// here are ignored, including `round`, which the published files carry
/// next to `GW`. Each field maps to exactly one header: a serde alias would
/// collide with its primary name on those files and fail every row.
#[derive(Debug, Deserialize)]
struct RawGameweekRow {
    name: String,
    #[serde(default)]
    position: Option<String>,
    #[serde(default, rename = "season_x")]
    season: Option<String>,
    #[serde(rename = "GW")]
    gameweek: u32,
    minutes: u32,
    #[serde(default)]
    goals_scored: u32,
    #[serde(default)]
    assists: u32,
    #[serde(default)]
    clean_sheets: u32,
    #[serde(default)]
    saves: u32,
    #[serde(default)]
    penalties_saved: u32,
    #[serde(default)]
    penalties_missed: u32,
    #[serde(default)]
    goals_conceded: u32,
    #[serde(default)]
    yellow_cards: u32,
    #[serde(default)]
    red_cards: u32,
    #[serde(default)]
    own_goals: u32,
    total_points: i32,
    #[serde(default)]
    bonus: i32,
    #[serde(default)]
    opponent_team: Option<u32>,
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: u32,
    strength: f64,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_events_from_reader<R: Read>(rdr: R) -> Result<Vec<EventRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut events = Vec::new();
    let mut unknown_positions = 0usize;
    for result in reader.deserialize::<RawGameweekRow>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                if name.is_empty() {
                    warn!("skipping gameweek row with empty player name");
                    continue;
                }
                if let Some(v) = raw.value {
                    if !v.is_finite() {
                        warn!("skipping gameweek row for '{}': non-finite value", name);
                        continue;
                    }
                }
                let position = match raw.position.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(label) => {
                        let parsed = Position::from_str_pos(label);
                        if parsed.is_none() {
                            unknown_positions += 1;
                        }
                        parsed
                    }
                };
                events.push(EventRecord {
                    name,
                    position,
                    season: raw
                        .season
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty()),
                    gameweek: raw.gameweek,
                    minutes: raw.minutes,
                    goals_scored: raw.goals_scored,
                    assists: raw.assists,
                    clean_sheets: raw.clean_sheets,
                    saves: raw.saves,
                    penalties_saved: raw.penalties_saved,
                    penalties_missed: raw.penalties_missed,
                    goals_conceded: raw.goals_conceded,
                    yellow_cards: raw.yellow_cards,
                    red_cards: raw.red_cards,
                    own_goals: raw.own_goals,
                    total_points: raw.total_points,
                    bonus: raw.bonus,
                    opponent_team: raw.opponent_team,
                    value: raw.value,
                });
            }
            Err(e) => {
                warn!("skipping malformed gameweek row: {}", e);
            }
        }
    }
    if unknown_positions > 0 {
        debug!("{} rows carried an unrecognised position label", unknown_positions);
    }
    Ok(events)
}

fn load_teams_from_reader<R: Read>(rdr: R) -> Result<TeamStrengths, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut map = TeamStrengths::new();
    for result in reader.deserialize::<RawTeam>() {
        match result {
            Ok(raw) => {
                if !raw.strength.is_finite() {
                    warn!("skipping team {}: non-finite strength", raw.id);
                    continue;
                }
                if map.contains_key(&raw.id) {
                    warn!("duplicate team id {}, using latest strength", raw.id);
                }
                map.insert(raw.id, raw.strength);
            }
            Err(e) => {
                warn!("skipping malformed team row: {}", e);
            }
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load gameweek rows (current-season or historical layout) from a CSV file.
pub fn load_gameweeks(path: &Path) -> Result<Vec<EventRecord>, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_events_from_reader(file).map_err(|e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the team id -> strength table.
pub fn load_team_strengths(path: &Path) -> Result<TeamStrengths, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_teams_from_reader(file).map_err(|e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load every dataset named in the config, resolving paths against `base_dir`.
pub fn load_season_data(config: &Config, base_dir: &Path) -> Result<SeasonData, DataError> {
    load_from_paths(&config.data_paths, base_dir)
}

/// Load all datasets from explicit paths. Exposed for testing and flexibility.
pub fn load_from_paths(paths: &DataPaths, base_dir: &Path) -> Result<SeasonData, DataError> {
    let current = load_gameweeks(&base_dir.join(&paths.current_gameweeks))?;
    let historical = load_gameweeks(&base_dir.join(&paths.historical_seasons))?;
    let team_strengths = load_team_strengths(&base_dir.join(&paths.teams))?;

    if current.is_empty() {
        return Err(DataError::Validation(
            "current gameweek CSV produced zero valid rows".into(),
        ));
    }
    if historical.is_empty() {
        return Err(DataError::Validation(
            "historical seasons CSV produced zero valid rows".into(),
        ));
    }

    info!(
        "loaded {} current rows, {} historical rows, {} teams",
        current.len(),
        historical.len(),
        team_strengths.len()
    );
    Ok(SeasonData::new(current, historical, team_strengths))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
