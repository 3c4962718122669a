// formdash entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config, copying defaults on first run
// 4. Build the requested dashboard tables
// 5. Print tables to stdout and write the HTML workbook

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use formdash_app::config;
use formdash_app::render::{HtmlWorkbook, JsonReport, ReportRenderer, TextTable};
use formdash_app::run;
use formdash_cli::{Cli, OutputFormat};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing (log to file, not terminal)
    init_tracing(&cli.base_dir)?;
    info!("formdash starting up");

    if let Err(e) = execute(&cli) {
        error!("run failed: {e:#}");
        return Err(e);
    }
    info!("formdash finished");
    Ok(())
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    // 3. Load config
    let config = config::load_config(&cli.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: baseline seasons {:?}, results in {}",
        config.baseline.seasons, config.data_paths.results_dir
    );

    // 4. Build tables
    let options = cli.run_options();
    let tables = run::run_positions(&config, &cli.base_dir, &options)?;

    // 5. Output
    match cli.format {
        OutputFormat::Text => TextTable::stdout().render(&tables)?,
        OutputFormat::Json => JsonReport::stdout().render(&tables)?,
        OutputFormat::None => {}
    }

    if !cli.no_workbook {
        let path = config.resolve(&cli.base_dir, &config.data_paths.workbook);
        HtmlWorkbook::new(&path)
            .render(&tables)
            .with_context(|| format!("failed to write workbook {}", path.display()))?;
        eprintln!("Workbook written to {}", path.display());
    }

    Ok(())
}

fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("formdash.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("formdash=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
