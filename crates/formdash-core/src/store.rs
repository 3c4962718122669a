// Persistence seams for the pipeline: the per-position baseline cache and the
// optional per-position dashboard artifact.
//
// `MemoryStore` backs tests; `CsvStore` writes one flat file per position.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::baseline::BaselineSummary;
use crate::compare::DashboardTable;
use crate::error::StoreError;
use crate::position::Position;

/// Durable memo of baseline rankings, keyed by position.
pub trait BaselineStore {
    fn load(&self, position: Position) -> Result<Option<Vec<BaselineSummary>>, StoreError>;

    fn save(&mut self, position: Position, summaries: &[BaselineSummary])
        -> Result<(), StoreError>;
}

/// Destination for finished dashboard tables.
pub trait DashboardSink {
    fn write(&mut self, table: &DashboardTable) -> Result<(), StoreError>;
}

impl<T: BaselineStore + ?Sized> BaselineStore for &mut T {
    fn load(&self, position: Position) -> Result<Option<Vec<BaselineSummary>>, StoreError> {
        (**self).load(position)
    }

    fn save(
        &mut self,
        position: Position,
        summaries: &[BaselineSummary],
    ) -> Result<(), StoreError> {
        (**self).save(position, summaries)
    }
}

impl<T: DashboardSink + ?Sized> DashboardSink for &mut T {
    fn write(&mut self, table: &DashboardTable) -> Result<(), StoreError> {
        (**self).write(table)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    baselines: HashMap<Position, Vec<BaselineSummary>>,
    tables: HashMap<Position, DashboardTable>,
    baseline_writes: usize,
}

impl MemoryStore {
    /// Seed a cached baseline, as if an earlier run had ranked it.
    pub fn with_baseline(mut self, position: Position, summaries: Vec<BaselineSummary>) -> Self {
        self.baselines.insert(position, summaries);
        self
    }

    pub fn baseline(&self, position: Position) -> Option<&[BaselineSummary]> {
        self.baselines.get(&position).map(Vec::as_slice)
    }

    pub fn remove_baseline(&mut self, position: Position) -> Option<Vec<BaselineSummary>> {
        self.baselines.remove(&position)
    }

    pub fn table(&self, position: Position) -> Option<&DashboardTable> {
        self.tables.get(&position)
    }

    /// How many times a baseline has been saved (seeding excluded).
    pub fn baseline_writes(&self) -> usize {
        self.baseline_writes
    }
}

impl BaselineStore for MemoryStore {
    fn load(&self, position: Position) -> Result<Option<Vec<BaselineSummary>>, StoreError> {
        Ok(self.baselines.get(&position).cloned())
    }

    fn save(
        &mut self,
        position: Position,
        summaries: &[BaselineSummary],
    ) -> Result<(), StoreError> {
        self.baselines.insert(position, summaries.to_vec());
        self.baseline_writes += 1;
        Ok(())
    }
}

impl DashboardSink for MemoryStore {
    fn write(&mut self, table: &DashboardTable) -> Result<(), StoreError> {
        self.tables.insert(table.position, table.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CSV file store
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct BaselineCsvRow {
    name: String,
    appearances: u32,
    mean_score: f64,
    std_score: Option<f64>,
}

#[derive(Debug, Serialize)]
struct DashboardCsvRow<'a> {
    name: &'a str,
    baseline_appearances: u32,
    baseline_mean: f64,
    baseline_std: Option<f64>,
    current_appearances: Option<u32>,
    current_mean: Option<f64>,
    effect_size: Option<f64>,
    standard_error: Option<f64>,
    t: Option<f64>,
    p_value: Option<f64>,
    bh_significant: bool,
    effect_size_label: Option<&'static str>,
    current_price_m: Option<f64>,
    avg_opponent_strength: Option<f64>,
}

/// Undefined statistics are written as empty cells.
fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// One CSV file per position under `dir`. The baseline file name carries a
/// label describing the season window so different windows never collide.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
    baseline_label: String,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>, baseline_label: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            baseline_label: baseline_label.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn baseline_file_name(&self, position: Position) -> String {
        if self.baseline_label.is_empty() {
            format!("{position}_baseline.csv")
        } else {
            format!("{position}_baseline_{}.csv", self.baseline_label)
        }
    }

    pub fn baseline_path(&self, position: Position) -> PathBuf {
        self.dir.join(self.baseline_file_name(position))
    }

    /// Hidden sibling of the baseline file that rows are written to before
    /// being renamed into place.
    fn staging_path(&self, position: Position) -> PathBuf {
        self.dir
            .join(format!(".{}.partial", self.baseline_file_name(position)))
    }

    pub fn dashboard_path(&self, position: Position) -> PathBuf {
        self.dir.join(format!("{position}_dashboard.csv"))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io {
            path: self.dir.display().to_string(),
            source: e,
        })
    }
}

impl BaselineStore for CsvStore {
    fn load(&self, position: Position) -> Result<Option<Vec<BaselineSummary>>, StoreError> {
        let path = self.baseline_path(position);
        if !path.exists() {
            return Ok(None);
        }
        let csv_err = |e: csv::Error| StoreError::Csv {
            path: path.display().to_string(),
            source: e,
        };
        let mut reader = csv::Reader::from_path(&path).map_err(csv_err)?;
        let mut summaries = Vec::new();
        for result in reader.deserialize::<BaselineCsvRow>() {
            let row = result.map_err(csv_err)?;
            summaries.push(BaselineSummary {
                name: row.name,
                appearances: row.appearances,
                mean: row.mean_score,
                stdev: row.std_score.unwrap_or(f64::NAN),
            });
        }
        debug!("loaded {} baseline rows from {}", summaries.len(), path.display());
        Ok(Some(summaries))
    }

    fn save(
        &mut self,
        position: Position,
        summaries: &[BaselineSummary],
    ) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.baseline_path(position);
        if path.exists() {
            warn!(
                "baseline cache {} appeared while ranking; keeping the existing file",
                path.display()
            );
            return Ok(());
        }

        // The final name only ever holds a complete file.
        let staging = self.staging_path(position);
        let placed = write_baseline_rows(&staging, summaries).and_then(|()| {
            fs::rename(&staging, &path).map_err(|e| StoreError::Io {
                path: path.display().to_string(),
                source: e,
            })
        });
        if placed.is_err() {
            let _ = fs::remove_file(&staging);
        }
        placed?;

        debug!("wrote {} baseline rows to {}", summaries.len(), path.display());
        Ok(())
    }
}

fn write_baseline_rows(path: &Path, summaries: &[BaselineSummary]) -> Result<(), StoreError> {
    let csv_err = |e: csv::Error| StoreError::Csv {
        path: path.display().to_string(),
        source: e,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for s in summaries {
        writer
            .serialize(BaselineCsvRow {
                name: s.name.clone(),
                appearances: s.appearances,
                mean_score: s.mean,
                std_score: defined(s.stdev),
            })
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e: io::Error| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

impl DashboardSink for CsvStore {
    fn write(&mut self, table: &DashboardTable) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.dashboard_path(table.position);
        let csv_err = |e: csv::Error| StoreError::Csv {
            path: path.display().to_string(),
            source: e,
        };

        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        for row in &table.rows {
            writer
                .serialize(DashboardCsvRow {
                    name: &row.name,
                    baseline_appearances: row.baseline_appearances,
                    baseline_mean: row.baseline_mean,
                    baseline_std: defined(row.baseline_stdev),
                    current_appearances: row.current_appearances,
                    current_mean: defined(row.current_mean),
                    effect_size: defined(row.effect_size),
                    standard_error: defined(row.standard_error),
                    t: defined(row.t_statistic),
                    p_value: defined(row.p_value),
                    bh_significant: row.significant,
                    effect_size_label: row.effect_label.map(|l| l.label()),
                    current_price_m: row.current_price,
                    avg_opponent_strength: row.avg_opponent_strength,
                })
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!("wrote {} dashboard rows to {}", table.rows.len(), path.display());
        Ok(())
    }
}
