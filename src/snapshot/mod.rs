pub mod error;
pub mod store_snapshot;
