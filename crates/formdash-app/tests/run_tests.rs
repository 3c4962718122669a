// End-to-end runs over small on-disk datasets: config bootstrap, CSV loading,
// baseline caching, dashboard export and workbook rendering.

use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use formdash_app::config::load_config;
use formdash_app::render::{HtmlWorkbook, ReportRenderer};
use formdash_app::run::{is_invalid_position, run_positions, RunOptions};
use formdash_core::{EffectSizeLabel, Position};

const TOL: f64 = 1e-9;

const CONFIG: &str = r#"
[data_paths]
current_gameweeks = "data/gw.csv"
historical_seasons = "data/hist.csv"
teams = "data/teams.csv"
results_dir = "results"
workbook = "results/book.html"

[baseline]
seasons = ["2021-22", "2022-23"]
label = "test"

[top_n]
GK = 1
DEF = 2
MID = 2
FWD = 2
"#;

const CURRENT: &str = "\
name,position,GW,minutes,goals_scored,assists,clean_sheets,total_points,bonus,opponent_team,value
Alpha,DEF,1,90,0,0,1,6,0,1,50
Alpha,DEF,2,90,0,0,0,2,0,2,51
Alpha,DEF,3,90,1,0,1,15,3,1,52
Beta,DEF,1,90,0,0,0,2,0,2,45
Beta,DEF,2,45,0,0,0,1,0,1,45
Keeper,GKP,1,90,0,0,0,2,0,2,40
Mid,MID,1,90,0,0,0,2,0,2,60
Fwd,FWD,1,90,0,0,0,2,0,2,70
";

// DEF scores under the current rules: Alpha 6, 1, 8 (mean 5, var 13);
// Beta 2, 2. The 2020-21 row is outside the window.
const HISTORICAL: &str = "\
season_x,name,position,GW,minutes,goals_scored,assists,clean_sheets,saves,goals_conceded,total_points,bonus
2022-23,Alpha,DEF,1,90,0,0,1,0,0,7,1
2022-23,Alpha,DEF,2,90,0,0,0,0,2,1,0
2021-22,Alpha,DEF,3,90,1,0,0,0,0,8,0
2020-21,Alpha,DEF,4,90,3,0,0,0,0,20,3
2022-23,Beta,DEF,1,90,0,0,0,0,0,2,0
2022-23,Beta,DEF,2,90,0,0,0,0,0,2,0
2022-23,Keeper,GK,1,90,0,0,0,0,0,2,0
2022-23,Mid,MID,1,60,0,0,0,0,0,2,0
2022-23,Fwd,FWD,1,30,0,0,0,0,0,1,0
";

const TEAMS: &str = "id,name,strength\n1,Alpha FC,2\n2,Beta United,4\n";

fn setup(name: &str) -> PathBuf {
    let base = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(base.join("defaults")).unwrap();
    fs::create_dir_all(base.join("data")).unwrap();
    fs::write(base.join("defaults").join("dashboard.toml"), CONFIG).unwrap();
    fs::write(base.join("data").join("gw.csv"), CURRENT).unwrap();
    fs::write(base.join("data").join("hist.csv"), HISTORICAL).unwrap();
    fs::write(base.join("data").join("teams.csv"), TEAMS).unwrap();
    base
}

fn results(base: &Path) -> PathBuf {
    base.join("results")
}

/// Closed-form survival function of Student's t with 2 degrees of freedom.
fn sf_df2(t: f64) -> f64 {
    0.5 - t / (2.0 * (t * t + 2.0).sqrt())
}

#[test]
fn full_run_over_all_positions() {
    let base = setup("formdash_run_full");
    let config = load_config(&base).unwrap();
    assert!(base.join("config").join("dashboard.toml").exists());

    let tables = run_positions(&config, &base, &RunOptions::default()).unwrap();
    let order: Vec<Position> = tables.iter().map(|t| t.position).collect();
    assert_eq!(order, Position::ALL.to_vec());

    let def = &tables[1];
    let names: Vec<&str> = def.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    let alpha = &def.rows[0];
    assert_eq!(alpha.baseline_appearances, 3);
    assert_abs_diff_eq!(alpha.baseline_mean, 5.0, epsilon = TOL);
    assert_abs_diff_eq!(alpha.baseline_stdev, 13f64.sqrt(), epsilon = TOL);
    assert_eq!(alpha.current_appearances, Some(3));
    assert_abs_diff_eq!(alpha.current_mean, 20.0 / 3.0, epsilon = TOL);

    let effect = (20.0 / 3.0 - 5.0) / 13f64.sqrt();
    let t = (20.0 / 3.0 - 5.0) / (13f64.sqrt() / 3f64.sqrt());
    assert_abs_diff_eq!(alpha.effect_size, effect, epsilon = TOL);
    assert_abs_diff_eq!(alpha.t_statistic, t, epsilon = TOL);
    assert_abs_diff_eq!(alpha.p_value, sf_df2(t), epsilon = TOL);
    assert_eq!(alpha.effect_label, Some(EffectSizeLabel::Small));
    assert!(!alpha.significant);

    // Latest gameweek is 3; only Alpha has a row there.
    assert_abs_diff_eq!(alpha.current_price.unwrap(), 5.2, epsilon = TOL);
    assert_abs_diff_eq!(alpha.avg_opponent_strength.unwrap(), 8.0 / 3.0, epsilon = TOL);

    let beta = &def.rows[1];
    assert!(beta.effect_size.is_nan());
    assert!(beta.p_value.is_nan());
    assert_eq!(beta.effect_label, None);
    assert_eq!(beta.current_price, None);
    assert_abs_diff_eq!(beta.avg_opponent_strength.unwrap(), 3.0, epsilon = TOL);

    // Baseline caches written, dashboard exports not requested.
    for position in Position::ALL {
        let tag = position.display_str();
        assert!(results(&base).join(format!("{tag}_baseline_test.csv")).exists());
        assert!(!results(&base).join(format!("{tag}_dashboard.csv")).exists());
    }

    let _ = fs::remove_dir_all(&base);
}

#[test]
fn second_run_reuses_cache_and_exports() {
    let base = setup("formdash_run_cache");
    let config = load_config(&base).unwrap();

    let first = run_positions(&config, &base, &RunOptions::default()).unwrap();

    // Replacing the historical data has no effect once baselines are cached.
    fs::write(
        base.join("data").join("hist.csv"),
        "season_x,name,position,GW,minutes,total_points\n2022-23,Beta,DEF,1,90,2\n",
    )
    .unwrap();

    let options = RunOptions {
        positions: vec!["DEF".into()],
        top_n: None,
        save_csv: true,
    };
    let second = run_positions(&config, &base, &options).unwrap();
    assert_eq!(second.len(), 1);

    let before: Vec<(&str, f64)> = first[1]
        .rows
        .iter()
        .map(|r| (r.name.as_str(), r.baseline_mean))
        .collect();
    let after: Vec<(&str, f64)> = second[0]
        .rows
        .iter()
        .map(|r| (r.name.as_str(), r.baseline_mean))
        .collect();
    assert_eq!(before, after);

    let export = results(&base).join("DEF_dashboard.csv");
    let text = fs::read_to_string(&export).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("name,"));
    assert!(lines[1].starts_with("Alpha,"));
    assert!(lines[2].starts_with("Beta,"));

    let _ = fs::remove_dir_all(&base);
}

#[test]
fn workbook_renders_every_sheet() {
    let base = setup("formdash_run_workbook");
    let config = load_config(&base).unwrap();
    let tables = run_positions(&config, &base, &RunOptions::default()).unwrap();

    let path = base.join(&config.data_paths.workbook);
    HtmlWorkbook::new(&path).render(&tables).unwrap();

    let html = fs::read_to_string(&path).unwrap();
    for tag in ["GK", "DEF", "MID", "FWD"] {
        assert!(html.contains(&format!("<h2 id=\"{tag}\">{tag}</h2>")));
    }
    assert!(html.contains("Alpha"));

    let _ = fs::remove_dir_all(&base);
}

#[test]
fn unknown_position_fails_without_writing() {
    let base = setup("formdash_run_invalid");
    let config = load_config(&base).unwrap();

    let options = RunOptions {
        positions: vec!["GOALIE".into()],
        top_n: Some(3),
        save_csv: true,
    };
    let err = run_positions(&config, &base, &options).unwrap_err();
    assert!(is_invalid_position(&err));
    assert!(!results(&base).exists());

    let _ = fs::remove_dir_all(&base);
}
