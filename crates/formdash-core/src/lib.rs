// Library root for the player form comparison pipeline.

pub mod baseline;
pub mod compare;
pub mod current;
pub mod dashboard;
pub mod enrich;
pub mod error;
pub mod events;
pub mod fdr;
pub mod position;
pub mod scoring;
pub mod stats;
pub mod store;

pub use compare::{ComparisonRow, DashboardTable, EffectSizeLabel};
pub use dashboard::{Dashboard, DashboardRequest, SeasonData};
pub use error::{DashboardError, StoreError};
pub use position::Position;
