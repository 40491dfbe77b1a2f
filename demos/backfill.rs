use chrono::{TimeDelta, TimeZone, Utc};
use meteogrid::{
    CollectionCollector, GeographicCoordinate, StoreConfig, TimeSpan, WeatherCollection,
    WeatherEntry, WeatherQuantity, WeatherStore, WeatherStoreError, WeatherTimePoint,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), WeatherStoreError> {
    let las_vegas = GeographicCoordinate::new(36.17, -115.14)?;
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

    // stand-in for a remote source: a day of hourly temperatures
    let remote: WeatherCollection = (0..24)
        .map(|hour| {
            WeatherTimePoint::new(
                start + TimeDelta::hours(hour),
                las_vegas,
                vec![WeatherEntry::new(
                    WeatherQuantity::new("temperature_2m"),
                    5.0 + hour as f64 * 0.5,
                )],
            )
        })
        .collect();

    let cache_folder = std::env::temp_dir().join("meteogrid_demo");
    let mut store = WeatherStore::with_cache_folder(cache_folder.clone(), StoreConfig::default())
        .await?
        .with_collector(Arc::new(CollectionCollector::new(remote)));

    let data = store
        .query()
        .coordinates(&[las_vegas])
        .span(TimeSpan::new("2021-01-01T06:00:00Z", "2021-01-01T12:00:00Z")?)
        .call()
        .await?;

    for area in &data {
        for point in area.iter() {
            println!("{} {:?}", point.time(), point.entries());
        }
    }
    println!("Stored points: {}", store.point_count());

    store.save_to_cache_folder(&cache_folder).await?;
    Ok(())
}
