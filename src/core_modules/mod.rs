pub mod cluster;
pub mod cluster_detector;
pub mod cluster_engine;
pub mod geo_point;
pub mod marker;
pub mod surface;
pub mod viewport_fitter;
pub mod zoom;
