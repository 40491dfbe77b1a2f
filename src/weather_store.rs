//! This module provides the main entry point: a spatiotemporal store of weather time points.
//! Points are bucketed into grid cells, each cell tracks which hours it already covers, and
//! queries can backfill gaps from an external [`WeatherCollector`].

use crate::backfill::collector::WeatherCollector;
use crate::backfill::coordinator::BackfillCoordinator;
use crate::backfill::error::CollectorError;
use crate::error::WeatherStoreError;
use crate::grid::grid_index::{BucketKey, GridIndex};
use crate::grid::point_selector::PointSelector;
use crate::snapshot::error::SnapshotError;
use crate::snapshot::store_snapshot::{load_file, save_file};
use crate::types::coordinate::GeographicCoordinate;
use crate::types::store_config::StoreConfig;
use crate::types::time_area::{WeatherTimeArea, WeatherTimespanArea};
use crate::types::time_point::WeatherTimePoint;
use crate::types::time_span::TimeSpan;
use crate::types::weather_collection::WeatherCollection;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::{info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the snapshot kept inside a cache folder.
pub const SNAPSHOT_FILE_NAME: &str = "store.bin";

/// Anything that can be registered: a single point or a batch of them.
///
/// Batches are registered point by point through the same insertion path.
pub trait Registrable {
    fn into_time_points(self) -> Vec<WeatherTimePoint>;
}

impl Registrable for WeatherTimePoint {
    fn into_time_points(self) -> Vec<WeatherTimePoint> {
        vec![self]
    }
}

impl Registrable for Vec<WeatherTimePoint> {
    fn into_time_points(self) -> Vec<WeatherTimePoint> {
        self
    }
}

impl Registrable for WeatherTimeArea {
    fn into_time_points(self) -> Vec<WeatherTimePoint> {
        self.points
    }
}

impl Registrable for WeatherTimespanArea {
    fn into_time_points(self) -> Vec<WeatherTimePoint> {
        self.areas.into_iter().flat_map(|area| area.points).collect()
    }
}

impl Registrable for WeatherCollection {
    fn into_time_points(self) -> Vec<WeatherTimePoint> {
        self.into_points()
    }
}

/// Local cache of geolocated weather time points.
///
/// The store owns a grid of buckets keyed by discretised latitude/longitude. It never deletes
/// points; it only grows through [`WeatherStore::register`], [`WeatherStore::combine`] and
/// backfill during queries.
///
/// # Examples
///
/// ```rust
/// # use meteogrid::{GeographicCoordinate, StoreConfig, TimeSpan, WeatherStore, WeatherTimePoint};
/// # use meteogrid::WeatherStoreError;
/// # #[tokio::main]
/// # async fn main() -> Result<(), WeatherStoreError> {
/// let mut store = WeatherStore::new(StoreConfig::default());
/// let las_vegas = GeographicCoordinate::new(36.17, -115.14)?;
///
/// for hour in 0..6 {
///     let time = format!("2021-01-01T{:02}:00:00Z", hour);
///     store.register(WeatherTimePoint::parse(time.as_str(), las_vegas, vec![])?)?;
/// }
///
/// let result = store
///     .query()
///     .coordinates(&[las_vegas])
///     .span(TimeSpan::new("2021-01-01T02:00:00Z", "2021-01-01T04:00:00Z")?)
///     .pull_missing(false)
///     .call()
///     .await?;
/// assert_eq!(result.point_count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WeatherStore {
    config: StoreConfig,
    grid: GridIndex,
    coordinator: BackfillCoordinator,
    collector: Option<Arc<dyn WeatherCollector>>,
}

impl fmt::Debug for WeatherStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherStore")
            .field("config", &self.config)
            .field("buckets", &self.grid.len())
            .field("has_collector", &self.collector.is_some())
            .finish()
    }
}

#[bon]
impl WeatherStore {
    /// Creates an empty store without a collector.
    pub fn new(config: StoreConfig) -> Self {
        let grid = GridIndex::new(config.degrees_per_bucket(), config.time_epsilon_secs());
        Self::from_parts(config, grid)
    }

    pub(crate) fn from_parts(config: StoreConfig, grid: GridIndex) -> Self {
        Self {
            coordinator: BackfillCoordinator::new(config.quantities().to_vec()),
            config,
            grid,
            collector: None,
        }
    }

    /// Attaches the collector used to backfill missing data.
    pub fn with_collector(mut self, collector: Arc<dyn WeatherCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn set_collector(&mut self, collector: Arc<dyn WeatherCollector>) {
        self.collector = Some(collector);
    }

    /// Restores the store saved in `cache_folder`, or creates an empty one with `config` when
    /// the folder holds no snapshot yet. The folder is created if needed.
    ///
    /// A restored store keeps the configuration it was saved with.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherStoreError::CacheDirCreation`] if the folder cannot be created and
    /// [`WeatherStoreError::Snapshot`] if the snapshot cannot be checked for, read or decoded.
    pub async fn with_cache_folder(
        cache_folder: PathBuf,
        config: StoreConfig,
    ) -> Result<Self, WeatherStoreError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| WeatherStoreError::CacheDirCreation(cache_folder.clone(), e))?;
        let snapshot_path = cache_folder.join(SNAPSHOT_FILE_NAME);
        let snapshot_exists = tokio::fs::try_exists(&snapshot_path)
            .await
            .map_err(|e| SnapshotError::Read(snapshot_path.clone(), e))?;
        if snapshot_exists {
            let store = load_file(&snapshot_path).await?;
            if store.config != config {
                info!("Using configuration stored in {}", snapshot_path.display());
            }
            Ok(store)
        } else {
            info!(
                "No snapshot at {}, starting empty",
                snapshot_path.display()
            );
            Ok(Self::new(config))
        }
    }

    /// Same as [`WeatherStore::with_cache_folder`] using the platform cache directory.
    pub async fn from_default_cache(config: StoreConfig) -> Result<Self, WeatherStoreError> {
        let cache_folder = get_cache_dir()?;
        Self::with_cache_folder(cache_folder, config).await
    }

    /// Writes a snapshot into `cache_folder`, where [`WeatherStore::with_cache_folder`] finds it.
    pub async fn save_to_cache_folder(&self, cache_folder: &Path) -> Result<(), WeatherStoreError> {
        ensure_cache_dir_exists(cache_folder)
            .await
            .map_err(|e| WeatherStoreError::CacheDirCreation(cache_folder.to_path_buf(), e))?;
        save_file(self, &cache_folder.join(SNAPSHOT_FILE_NAME)).await?;
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn bucket_key(&self, coordinate: &GeographicCoordinate) -> BucketKey {
        self.grid.bucket_key(coordinate)
    }

    pub fn bucket_count(&self) -> usize {
        self.grid.len()
    }

    pub fn point_count(&self) -> usize {
        self.grid.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    /// Every stored point, bucket by bucket, each bucket in time order.
    pub fn points(&self) -> impl Iterator<Item = &WeatherTimePoint> {
        self.grid.points()
    }

    /// Registers `data`, replacing stored points at the same coordinate and time.
    /// Returns the number of points stored.
    pub fn register(&mut self, data: impl Registrable) -> Result<usize, WeatherStoreError> {
        self.register_with(data, true)
    }

    /// Registers `data`. With `overwrite` unset, points whose hour is already covered in their
    /// bucket are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherStoreError::InvalidCoordinate`] if any point has an invalid coordinate.
    /// The batch is checked up front, so nothing is stored in that case.
    pub fn register_with(
        &mut self,
        data: impl Registrable,
        overwrite: bool,
    ) -> Result<usize, WeatherStoreError> {
        let points = data.into_time_points();
        for point in &points {
            point.coordinate().validate()?;
        }
        Ok(points
            .into_iter()
            .map(|point| self.insert_point(point, overwrite))
            .filter(|stored| *stored)
            .count())
    }

    /// Registers every point of `other` with overwrite. Combining the same store twice leaves
    /// the result unchanged. Returns the number of points written.
    pub fn combine(&mut self, other: &WeatherStore) -> usize {
        let mut written = 0;
        for point in other.points() {
            if self.insert_point(point.clone(), true) {
                written += 1;
            }
        }
        written
    }

    /// Queries the given coordinates over a time span, optionally backfilling gaps first.
    ///
    /// For each coordinate the covering bucket is checked. When `pull_missing` is set, the
    /// collector is asked once for every coordinate whose bucket does not cover the span; the
    /// returned points are registered without overwriting and coverage is checked again.
    /// Coordinates that are still incomplete are listed in
    /// [`WeatherTimespanArea::incomplete`].
    ///
    /// The result holds one [`WeatherTimeArea`] per hour of the span, ascending, each reading
    /// the hour from its label onwards; the last one stops at the span end. Within an hour
    /// points follow the order of `coordinates`; coordinates without a record for that hour
    /// are left out.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.coordinates(&[GeographicCoordinate])`: **Required.** Must not be empty.
    /// * `.span(TimeSpan)`: **Required.** The half-open span to read.
    /// * `.pull_missing(bool)`: Optional. Backfill from the collector. Defaults to `true`.
    ///
    /// # Errors
    ///
    /// * [`WeatherStoreError::EmptyQueryRegion`] for an empty coordinate list.
    /// * [`WeatherStoreError::InvalidCoordinate`] for an invalid coordinate.
    /// * [`WeatherStoreError::CollectorFailure`] if the collector fails, returns malformed
    ///   points, or is missing while a backfill is needed. The store is left unchanged.
    #[builder]
    pub async fn query(
        &mut self,
        coordinates: &[GeographicCoordinate],
        span: TimeSpan,
        #[builder(default = true)] pull_missing: bool,
    ) -> Result<WeatherTimespanArea, WeatherStoreError> {
        self.run_query(coordinates, span, pull_missing).await
    }

    /// Queries every grid cell touched by the disc of `radius_miles` around `center`.
    ///
    /// The disc is turned into cell-center coordinates through a [`PointSelector`] and then
    /// handled like [`WeatherStore::query`].
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.center(GeographicCoordinate)`: **Required.**
    /// * `.radius_miles(f64)`: **Required.**
    /// * `.span(TimeSpan)`: **Required.**
    /// * `.pull_missing(bool)`: Optional. Defaults to `true`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherStoreError::EmptyQueryRegion`] when the disc selects no cell (for
    /// example a negative radius), plus everything [`WeatherStore::query`] returns.
    #[builder]
    pub async fn query_region(
        &mut self,
        center: GeographicCoordinate,
        radius_miles: f64,
        span: TimeSpan,
        #[builder(default = true)] pull_missing: bool,
    ) -> Result<WeatherTimespanArea, WeatherStoreError> {
        let coordinates = self
            .selector(center, radius_miles)
            .cell_centers(self.grid.degrees_per_bucket());
        self.run_query(&coordinates, span, pull_missing).await
    }

    /// Selector for a disc using this store's miles-per-degree.
    pub fn selector(&self, center: GeographicCoordinate, radius_miles: f64) -> PointSelector {
        PointSelector::circle(center, radius_miles, self.config.miles_per_degree())
    }

    /// Reads every stored point inside the disc and span without contacting the collector.
    ///
    /// Only latitude rows inside the disc are visited, and within a row only buckets in that
    /// row's longitude bounds.
    pub fn stored_in_region(
        &self,
        center: GeographicCoordinate,
        radius_miles: f64,
        span: &TimeSpan,
    ) -> Result<WeatherTimespanArea, WeatherStoreError> {
        let selector = self.selector(center, radius_miles);
        let degrees_per_bucket = self.grid.degrees_per_bucket();
        let rows = selector
            .row_range(degrees_per_bucket)
            .ok_or(WeatherStoreError::EmptyQueryRegion)?;

        let mut result = WeatherTimespanArea::empty(*span);
        for lat_index in rows {
            let Some(columns) = selector.lon_index_range(lat_index, degrees_per_bucket) else {
                continue;
            };
            for (_, bucket) in self.grid.buckets_in_row_range(lat_index, columns) {
                for point in bucket.records_in(span) {
                    if !selector.contains(point.coordinate()) {
                        continue;
                    }
                    let hour = (point.time() - span.start()).num_seconds().div_euclid(3600);
                    let slot = usize::try_from(hour.max(0)).ok();
                    if let Some(area) = slot.and_then(|i| result.areas.get_mut(i)) {
                        area.points.push(point.clone());
                    }
                }
            }
        }
        Ok(result)
    }

    /// Fetches `coordinates` over `span` from the collector regardless of coverage and
    /// registers the result with overwrite. Returns the number of points stored.
    pub async fn pull_data(
        &mut self,
        coordinates: &[GeographicCoordinate],
        span: TimeSpan,
    ) -> Result<usize, WeatherStoreError> {
        if coordinates.is_empty() {
            return Err(WeatherStoreError::EmptyQueryRegion);
        }
        for coordinate in coordinates {
            coordinate.validate()?;
        }
        let collector = self
            .collector
            .clone()
            .ok_or(CollectorError::NotConfigured)?;
        let mut unique: Vec<GeographicCoordinate> = Vec::with_capacity(coordinates.len());
        for coordinate in coordinates {
            if !unique.contains(coordinate) {
                unique.push(*coordinate);
            }
        }
        let fetched = self
            .coordinator
            .fetch(collector.as_ref(), &self.grid, &unique, &span)
            .await?;
        Ok(fetched
            .into_iter()
            .map(|point| self.insert_point(point, true))
            .filter(|stored| *stored)
            .count())
    }

    fn insert_point(&mut self, point: WeatherTimePoint, overwrite: bool) -> bool {
        let key = self.grid.bucket_key(point.coordinate());
        self.grid.get_or_create(key).insert(point, overwrite)
    }

    async fn run_query(
        &mut self,
        coordinates: &[GeographicCoordinate],
        span: TimeSpan,
        pull_missing: bool,
    ) -> Result<WeatherTimespanArea, WeatherStoreError> {
        if coordinates.is_empty() {
            return Err(WeatherStoreError::EmptyQueryRegion);
        }
        for coordinate in coordinates {
            coordinate.validate()?;
        }

        let plan = self.coordinator.plan(&self.grid, coordinates, &span);
        let mut incomplete = plan.missing.clone();

        if pull_missing && !plan.is_complete() {
            let collector = self
                .collector
                .clone()
                .ok_or(CollectorError::NotConfigured)?;
            let fetched = self
                .coordinator
                .fetch(collector.as_ref(), &self.grid, &plan.missing, &span)
                .await?;
            let fetched_count = fetched.len();
            let mut stored = 0;
            for point in fetched {
                if self.insert_point(point, false) {
                    stored += 1;
                }
            }
            info!(
                "Backfill stored {} of {} fetched points for {}",
                stored, fetched_count, span
            );

            incomplete = self.coordinator.plan(&self.grid, &plan.missing, &span).missing;
            if !incomplete.is_empty() {
                warn!(
                    "{} coordinates still incomplete over {} after backfill",
                    incomplete.len(),
                    span
                );
            }
        }

        let mut result = self.assemble(coordinates, &span);
        result.incomplete = incomplete;
        Ok(result)
    }

    fn assemble(&self, coordinates: &[GeographicCoordinate], span: &TimeSpan) -> WeatherTimespanArea {
        let buckets: Vec<_> = coordinates
            .iter()
            .map(|c| (c, self.grid.get(&self.grid.bucket_key(c))))
            .collect();
        let mut result = WeatherTimespanArea::empty(*span);
        for area in result.areas.iter_mut() {
            // the last hour of an unaligned span is cut at the span end
            let Some(window) = span.hour_within(area.time) else {
                continue;
            };
            for (coordinate, bucket) in &buckets {
                if let Some(point) = bucket.and_then(|b| b.record_at(&window, coordinate)) {
                    area.points.push(point.clone());
                }
            }
        }
        result
    }
}
