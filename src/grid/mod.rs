pub mod bucket;
pub mod coverage_set;
pub mod grid_index;
pub mod point_selector;
