pub mod edge_detector;
pub mod unit;
