// THEORY:
// This file is the main entry point for the `geo_cluster` library crate. It
// defines the public API for keeping a map of geolocated points legible at every
// zoom level.
//
// The core lives in `core_modules`: the `ClusterEngine`, which partitions markers
// into individual pins and aggregate cluster pins for the current zoom, and the
// `ViewportFitter`, which picks a camera that frames a batch of points. Around the
// core sit the pieces a real map view needs: geolocation lookups on a background
// worker, wheel-zoom debouncing, configuration, and the `MapSession` that ties
// them together.

pub mod config;
pub mod core_modules;
pub mod debounce;
pub mod error;
pub mod geolocation;
pub mod lookup_worker;
pub mod session;

pub use crate::config::{LookupConfig, SessionConfig};
pub use crate::core_modules::cluster::Cluster;
pub use crate::core_modules::cluster_engine::{ClusterEngine, EngineConfig, Partition};
pub use crate::core_modules::geo_point::{GeoBounds, GeoPoint};
pub use crate::core_modules::marker::{MarkerId, MarkerRecord, Payload};
pub use crate::core_modules::surface::{
    Activation, ActivationFn, MarkerHandle, MarkerSurface, RecordingSurface, SurfaceOp,
};
pub use crate::core_modules::viewport_fitter::{Viewport, fit_bounds};
pub use crate::error::{FitError, InputError, LookupError};
pub use crate::session::{MapSession, SessionUpdate};
