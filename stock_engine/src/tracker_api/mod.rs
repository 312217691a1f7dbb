pub mod errors;
pub mod product_tracker;
pub mod tracker_objects;
