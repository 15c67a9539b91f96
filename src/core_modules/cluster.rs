// THEORY:
// A `Cluster` is the spatial-grouping output of one recompute pass: two or more
// markers close enough at the current zoom to be drawn as a single aggregate pin.
//
// Key architectural principles:
// 1.  **Ephemeral**: Clusters have no identity across passes. Every recompute
//     tears down the previous generation and builds a fresh list, even when the
//     grouping comes out identical.
// 2.  **Seed First**: `members` keeps the order in which markers joined. The first
//     member is always the seed the group was anchored on.
// 3.  **Dumb Data Container**: Like `MarkerRecord`, the struct only summarizes. The
//     grouping decision itself lives in `cluster_detector`.

use crate::core_modules::geo_point::GeoPoint;
use crate::core_modules::marker::MarkerId;
use crate::core_modules::surface::MarkerHandle;

/// An aggregate of two or more markers currently drawn as one pin.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Member ids in join order. The seed comes first. Never empty.
    pub members: Vec<MarkerId>,
    /// The unweighted mean of the member coordinates.
    pub centroid: GeoPoint,
    /// The member count rendered as text, e.g. `"2"`.
    pub label: String,
    /// The surface handle of the aggregate pin.
    pub handle: MarkerHandle,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.members.contains(&id)
    }
}
