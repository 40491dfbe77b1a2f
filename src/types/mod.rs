pub mod coordinate;
pub mod into_instant_trait;
pub mod store_config;
pub mod time_area;
pub mod time_point;
pub mod time_span;
pub mod weather_collection;
pub mod weather_quantity;
