// Configuration, dataset loading, report rendering and run orchestration
// around the formdash-core pipeline.

pub mod config;
pub mod data;
pub mod render;
pub mod run;

pub use config::{Config, ConfigError};
pub use data::DataError;
pub use render::{HtmlWorkbook, JsonReport, RenderError, ReportRenderer, TextTable};
pub use run::{run_positions, RunOptions};
