// THEORY:
// A `MarkerRecord` is one geolocated point owned by the cluster engine. It is the
// stateful counterpart of a `GeoPoint`: besides its position it remembers whether
// it is currently drawn on its own, and which surface handle draws it.
//
// Records are created by ingestion, never edited afterwards except for their
// visibility, and disappear only when the engine is cleared.

use crate::core_modules::geo_point::GeoPoint;
use crate::core_modules::surface::MarkerHandle;
use std::fmt;
use std::sync::Arc;

/// Opaque key/value data carried with a marker, typically the full geolocation
/// record. The engine never inspects it.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Stable identifier of a marker, unique for the lifetime of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One ingested point.
#[derive(Debug, Clone)]
pub struct MarkerRecord {
    /// Assigned at ingestion from a monotonically increasing counter.
    pub id: MarkerId,
    /// Where the point sits. Not validated against the lat/lon ranges.
    pub position: GeoPoint,
    /// Text shown next to the pin when it is drawn individually.
    pub label: String,
    /// Shared with every `Activation` handed to the surface for this marker.
    pub payload: Arc<Payload>,
    /// The surface handle while the marker is individually visible.
    pub(crate) handle: Option<MarkerHandle>,
}

impl MarkerRecord {
    pub(crate) fn new(id: MarkerId, position: GeoPoint, label: String, payload: Payload) -> Self {
        Self {
            id,
            position,
            label,
            payload: Arc::new(payload),
            handle: None,
        }
    }

    /// True iff the marker is rendered on its own rather than absorbed into a cluster.
    pub fn visible(&self) -> bool {
        self.handle.is_some()
    }
}
