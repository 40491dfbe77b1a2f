mod backfill;
mod error;
mod grid;
mod snapshot;
mod types;
mod utils;
mod weather_store;

pub use error::WeatherStoreError;
pub use weather_store::*;

pub use backfill::collector::*;
pub use backfill::coordinator::*;
pub use grid::bucket::Bucket;
pub use grid::coverage_set::CoverageSet;
pub use grid::grid_index::*;
pub use grid::point_selector::PointSelector;

pub use types::coordinate::*;
pub use types::into_instant_trait::IntoInstant;
pub use types::store_config::*;
pub use types::time_area::*;
pub use types::time_point::WeatherTimePoint;
pub use types::time_span::TimeSpan;
pub use types::weather_collection::WeatherCollection;
pub use types::weather_quantity::*;

pub use snapshot::store_snapshot::{
    load as load_snapshot, load_file as load_snapshot_file, save as save_snapshot,
    save_file as save_snapshot_file,
};
pub use utils::get_cache_dir;

pub use backfill::error::CollectorError;
pub use snapshot::error::SnapshotError;
