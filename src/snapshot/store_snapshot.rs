//! Whole-store snapshots: bincode over serde, wrapped in a small versioned envelope.

use crate::grid::grid_index::GridIndex;
use crate::snapshot::error::SnapshotError;
use crate::types::store_config::StoreConfig;
use crate::weather_store::WeatherStore;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SNAPSHOT_VERSION: u32 = 1;
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    config: &'a StoreConfig,
    grid: &'a GridIndex,
}

// Field order must match SnapshotRef
#[derive(Deserialize)]
struct SnapshotOwned {
    version: u32,
    config: StoreConfig,
    grid: GridIndex,
}

/// Encodes the grid and configuration of `store`. The collector is not part of a snapshot.
pub fn save(store: &WeatherStore) -> Result<Vec<u8>, SnapshotError> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        config: store.config(),
        grid: store.grid(),
    };
    bincode::serde::encode_to_vec(&snapshot, BINCODE_CONFIG)
        .map_err(|e| SnapshotError::Encode(Box::new(e)))
}

/// Rebuilds a store from [`save`] output. The configuration and every stored coordinate are
/// re-validated.
pub fn load(bytes: &[u8]) -> Result<WeatherStore, SnapshotError> {
    let (snapshot, _) = bincode::serde::decode_from_slice::<SnapshotOwned, _>(bytes, BINCODE_CONFIG)
        .map_err(|e| SnapshotError::Decode(Box::new(e)))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    snapshot
        .config
        .validate()
        .map_err(|e| SnapshotError::InvalidRecord(e.to_string()))?;
    if let Some(bad) = snapshot
        .grid
        .points()
        .find(|p| p.coordinate().validate().is_err())
    {
        return Err(SnapshotError::InvalidRecord(format!(
            "coordinate {} at {}",
            bad.coordinate(),
            bad.time()
        )));
    }
    Ok(WeatherStore::from_parts(snapshot.config, snapshot.grid))
}

pub async fn save_file(store: &WeatherStore, path: &Path) -> Result<(), SnapshotError> {
    let save_start = std::time::Instant::now();
    let bytes = save(store)?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| SnapshotError::Write(path.to_path_buf(), e))?;
    info!(
        "Wrote snapshot ({} bytes, {} buckets) to {} in {:?}",
        bytes.len(),
        store.bucket_count(),
        path.display(),
        save_start.elapsed()
    );
    Ok(())
}

pub async fn load_file(path: &Path) -> Result<WeatherStore, SnapshotError> {
    let load_start = std::time::Instant::now();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SnapshotError::Read(path.to_path_buf(), e))?;
    let store = tokio::task::spawn_blocking(move || load(&bytes)).await??;
    info!(
        "Loaded snapshot with {} buckets from {} in {:?}",
        store.bucket_count(),
        path.display(),
        load_start.elapsed()
    );
    Ok(store)
}
