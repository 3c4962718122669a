// Configuration loading and parsing (dashboard.toml).

use formdash_core::Position;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the single configuration file under `config/`.
pub const CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data_paths: DataPaths,
    pub baseline: BaselineConfig,
    pub top_n: TopN,
}

/// Input datasets and output locations, relative to the base directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub current_gameweeks: String,
    pub historical_seasons: String,
    pub teams: String,
    pub results_dir: String,
    pub workbook: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaselineConfig {
    pub seasons: Vec<String>,
    /// Tag embedded in baseline cache file names, e.g. "2021_2023".
    #[serde(default)]
    pub label: String,
}

/// Result-set size per position. Field names match the TOML keys.
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct TopN {
    pub GK: usize,
    pub DEF: usize,
    pub MID: usize,
    pub FWD: usize,
}

impl TopN {
    pub fn for_position(&self, position: Position) -> usize {
        match position {
            Position::Goalkeeper => self.GK,
            Position::Defender => self.DEF,
            Position::Midfielder => self.MID,
            Position::Forward => self.FWD,
        }
    }
}

impl Config {
    pub fn resolve(&self, base_dir: &Path, relative: &str) -> PathBuf {
        base_dir.join(relative)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/dashboard.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Create `config/dashboard.toml` from `defaults/dashboard.toml` when it is
/// missing. Returns the path written, or `None` when a config already exists.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let content = std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "no {} and cannot read {}: {e}",
            target.display(),
            source.display()
        ),
    })?;

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    };
    std::fs::create_dir_all(base_dir.join("config")).map_err(copy_err)?;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, &content).map_err(copy_err)?;
            Ok(Some(target))
        }
        // Never clobber a user's edited config.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(copy_err(e)),
    }
}

/// Copy the default config into `base_dir/config` if needed, then load.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let paths = &config.data_paths;
    let path_fields: &[(&str, &str)] = &[
        ("data_paths.current_gameweeks", &paths.current_gameweeks),
        ("data_paths.historical_seasons", &paths.historical_seasons),
        ("data_paths.teams", &paths.teams),
        ("data_paths.results_dir", &paths.results_dir),
        ("data_paths.workbook", &paths.workbook),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if config.baseline.seasons.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "baseline.seasons".into(),
            message: "must list at least one season".into(),
        });
    }

    let top_n = &config.top_n;
    let top_n_fields: &[(&str, usize)] = &[
        ("top_n.GK", top_n.GK),
        ("top_n.DEF", top_n.DEF),
        ("top_n.MID", top_n.MID),
        ("top_n.FWD", top_n.FWD),
    ];
    for (name, val) in top_n_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    fn defaults_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE))
            .expect("defaults/dashboard.toml should exist")
    }

    /// Fresh `<tmp>/config/` holding the given dashboard.toml text.
    fn temp_config(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), text).unwrap();
        tmp
    }

    #[test]
    fn load_default_config() {
        let tmp = temp_config("formdash_config_defaults", &defaults_text());
        let config = load_config_from(&tmp).expect("defaults should load");

        assert_eq!(config.baseline.seasons, vec!["2021-22", "2022-23"]);
        assert_eq!(config.baseline.label, "2021_2023");
        assert_eq!(config.top_n.for_position(Position::Goalkeeper), 15);
        assert_eq!(config.top_n.for_position(Position::Defender), 30);
        assert_eq!(config.top_n.for_position(Position::Midfielder), 30);
        assert_eq!(config.top_n.for_position(Position::Forward), 30);
        assert_eq!(config.data_paths.results_dir, "results");
        assert!(config.data_paths.current_gameweeks.ends_with("merged_gw.csv"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_copies_defaults_once() {
        let tmp = std::env::temp_dir().join("formdash_config_copy");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), defaults_text()).unwrap();

        let target = tmp.join("config").join(CONFIG_FILE);
        assert_eq!(ensure_config_file(&tmp).unwrap(), Some(target.clone()));
        assert_eq!(fs::read_to_string(&target).unwrap(), defaults_text());

        // Second call leaves the existing (possibly edited) file alone.
        fs::write(&target, "edited").unwrap();
        assert_eq!(ensure_config_file(&tmp).unwrap(), None);
        assert_eq!(fs::read_to_string(&target).unwrap(), "edited");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_config_needs_no_defaults() {
        let tmp = temp_config("formdash_config_no_defaults", &defaults_text());
        assert!(!tmp.join("defaults").exists());

        assert_eq!(ensure_config_file(&tmp).unwrap(), None);
        assert!(load_config(&tmp).is_ok());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_directories_is_an_error() {
        let tmp = std::env::temp_dir().join("formdash_config_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = load_config(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_top_n() {
        let text = defaults_text().replace("MID = 30", "MID = 0");
        let tmp = temp_config("formdash_config_zero_top_n", &text);

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "top_n.MID"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_season_window() {
        let text = defaults_text().replace(r#"seasons = ["2021-22", "2022-23"]"#, "seasons = []");
        let tmp = temp_config("formdash_config_no_seasons", &text);

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "baseline.seasons"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = temp_config("formdash_config_malformed", "[data_paths\n");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }
}
