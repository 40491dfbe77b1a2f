use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("No collector configured for backfill")]
    NotConfigured,

    #[error("Collector request failed")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Collector unavailable: {0}")]
    Unavailable(String),

    #[error("Collector returned a malformed point at ({latitude_deg}, {longitude_deg}): {reason}")]
    MalformedPoint {
        latitude_deg: f64,
        longitude_deg: f64,
        reason: String,
    },

    #[error("Collector returned a point at ({latitude_deg}, {longitude_deg}) outside the requested cells")]
    UnrequestedCoordinate { latitude_deg: f64, longitude_deg: f64 },
}
