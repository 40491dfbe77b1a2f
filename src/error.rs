use crate::backfill::error::CollectorError;
use crate::snapshot::error::SnapshotError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherStoreError {
    #[error("Invalid coordinate ({latitude_deg}, {longitude_deg})")]
    InvalidCoordinate { latitude_deg: f64, longitude_deg: f64 },

    #[error("Timestamp '{0}' has no timezone or offset")]
    NaiveTimestamp(String),

    #[error("Failed to parse timestamp '{0}'")]
    UnparseableTimestamp(String),

    #[error("Time span start {start} is not before end {end}")]
    InvalidTimeSpan {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid store configuration: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("Query region resolved to no coordinates")]
    EmptyQueryRegion,

    // The whole query fails; nothing fetched was registered
    #[error("Backfill collector failed")]
    CollectorFailure(#[from] CollectorError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Failed to determine cache directory")]
    CacheDirResolution,

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),
}
