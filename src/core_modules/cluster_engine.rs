// THEORY:
// The `ClusterEngine` owns the authoritative set of markers and keeps a map
// surface's pins consistent with a zoom-dependent clustering of that set. It is
// to the map what the `GridManager` is to a frame: the orchestrator that feeds
// raw data to a stateless analyzer (`cluster_detector`) and turns the result into
// concrete side effects.
//
// Key architectural principles:
// 1.  **Single Owner of Truth**: Marker positions, labels and payloads live here.
//     The surface only ever holds opaque handles it was given.
// 2.  **Generational Clusters**: Every recompute removes the previous generation
//     of cluster pins before anything else happens, then builds a new one. No
//     cluster pin is reused, even when the grouping is unchanged.
// 3.  **Reconciliation**: Individual pins are only placed or removed when their
//     visibility actually flips, so a recompute that absorbs or releases a marker
//     leaves nothing stale on screen.
// 4.  **Partition**: Once `recompute` returns, every marker is on the surface
//     exactly once, either as its own pin or inside exactly one cluster pin.
// 5.  **Replayable**: No randomness and no clock. The state after any sequence of
//     `ingest`/`set_zoom`/`clear_all` calls is fully determined by that sequence.

use crate::core_modules::cluster::Cluster;
use crate::core_modules::cluster_detector::cluster_detector;
use crate::core_modules::geo_point::{GeoPoint, centroid};
use crate::core_modules::marker::{MarkerId, MarkerRecord, Payload};
use crate::core_modules::surface::{Activation, ActivationFn, MarkerSurface};
use crate::core_modules::zoom::{CLUSTERING_CUTOFF_ZOOM, DEFAULT_ZOOM, clamp_zoom};
use std::sync::Arc;
use tracing::debug;

/// Tunable behavior of the cluster engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Merge radius in degrees at zoom 0. Halves with every zoom level.
    pub cluster_radius_base: f64,
    /// Zoom level at and above which clustering is switched off.
    pub clustering_cutoff_zoom: u8,
    /// Zoom level used at construction and restored by `clear_all`.
    pub default_zoom: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster_radius_base: 5.0,
            clustering_cutoff_zoom: CLUSTERING_CUTOFF_ZOOM,
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

/// A snapshot of how markers are currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    /// Markers drawn on their own, in ingestion order.
    pub individual: Vec<MarkerId>,
    /// Member lists of every active cluster, in seed order.
    pub clusters: Vec<Vec<MarkerId>>,
}

pub struct ClusterEngine<S: MarkerSurface> {
    surface: S,
    config: EngineConfig,
    zoom: u8,
    markers: Vec<MarkerRecord>,
    active_clusters: Vec<Cluster>,
    next_id: u64,
    on_activate: Option<ActivationFn>,
}

impl<S: MarkerSurface> ClusterEngine<S> {
    pub fn new(surface: S, config: EngineConfig) -> Self {
        let zoom = clamp_zoom(config.default_zoom as i64);
        Self {
            surface,
            config,
            zoom,
            markers: Vec::new(),
            active_clusters: Vec::new(),
            next_id: 0,
            on_activate: None,
        }
    }

    /// Registers the callback handed to the surface with every individual pin.
    /// Only pins placed after this call carry it. A marker ingested earlier
    /// picks it up the next time its pin is placed, which happens when it is
    /// released from a cluster. Register before the first `ingest` so that
    /// every pin behaves the same.
    pub fn with_activation(mut self, callback: ActivationFn) -> Self {
        self.on_activate = Some(callback);
        self
    }

    /// Adds a marker and draws it individually right away. Coordinates are not
    /// range-checked.
    pub fn ingest(
        &mut self,
        lat: f64,
        lon: f64,
        label: impl Into<String>,
        payload: Payload,
    ) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;

        let mut record = MarkerRecord::new(id, GeoPoint::new(lat, lon), label.into(), payload);
        set_visibility(&mut self.surface, self.on_activate.as_ref(), &mut record, true);
        self.markers.push(record);
        id
    }

    /// Clamps and stores the zoom level, then always recomputes the partition.
    pub fn set_zoom(&mut self, zoom: i32) {
        self.zoom = clamp_zoom(zoom as i64);
        self.recompute();
    }

    /// Rebuilds the cluster generation for the current zoom and reconciles the
    /// surface with it.
    pub fn recompute(&mut self) {
        // --- 1. Teardown ---
        // The previous generation goes before anything else is decided.
        for cluster in self.active_clusters.drain(..) {
            self.surface.remove_marker(cluster.handle);
        }

        // --- 2. Grouping ---
        let groups: Vec<Vec<usize>> = match self.threshold() {
            Some(threshold) => {
                let positions: Vec<GeoPoint> = self.markers.iter().map(|m| m.position).collect();
                cluster_detector::find_groups(&positions, threshold)
            }
            None => (0..self.markers.len()).map(|i| vec![i]).collect(),
        };

        // --- 3. Visibility Decision ---
        let mut show_individually = vec![true; self.markers.len()];
        for group in groups.iter().filter(|g| g.len() > 1) {
            for &index in group {
                show_individually[index] = false;
            }
        }

        // --- 4. Reconciliation ---
        for (record, show) in self.markers.iter_mut().zip(show_individually) {
            set_visibility(&mut self.surface, self.on_activate.as_ref(), record, show);
        }

        // --- 5. Aggregate Pins ---
        for group in groups.into_iter().filter(|g| g.len() > 1) {
            let members: Vec<MarkerId> = group.iter().map(|&i| self.markers[i].id).collect();
            let center = centroid(group.iter().map(|&i| &self.markers[i].position))
                .unwrap_or_default();
            let label = members.len().to_string();
            let handle = self.surface.place_marker(center, &label, None);

            self.active_clusters.push(Cluster {
                members,
                centroid: center,
                label,
                handle,
            });
        }

        debug!(
            zoom = self.zoom,
            markers = self.markers.len(),
            clusters = self.active_clusters.len(),
            "recomputed marker partition"
        );
    }

    /// Removes every pin this engine placed, forgets all markers and restores
    /// the default zoom. Marker ids keep counting up afterwards.
    pub fn clear_all(&mut self) {
        for record in &mut self.markers {
            if let Some(handle) = record.handle.take() {
                self.surface.remove_marker(handle);
            }
        }
        for cluster in self.active_clusters.drain(..) {
            self.surface.remove_marker(cluster.handle);
        }
        self.markers.clear();
        self.zoom = clamp_zoom(self.config.default_zoom as i64);
    }

    /// The merge radius at the current zoom, or `None` when clustering is off.
    pub fn threshold(&self) -> Option<f64> {
        if self.zoom >= self.config.clustering_cutoff_zoom {
            None
        } else {
            Some(cluster_detector::threshold_for_zoom(
                self.config.cluster_radius_base,
                self.zoom,
            ))
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn markers(&self) -> &[MarkerRecord] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerRecord> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn active_clusters(&self) -> &[Cluster] {
        &self.active_clusters
    }

    pub fn visible_marker_ids(&self) -> Vec<MarkerId> {
        self.markers
            .iter()
            .filter(|m| m.visible())
            .map(|m| m.id)
            .collect()
    }

    pub fn partition(&self) -> Partition {
        Partition {
            individual: self.visible_marker_ids(),
            clusters: self
                .active_clusters
                .iter()
                .map(|c| c.members.clone())
                .collect(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

/// Places or removes a marker's own pin so that it matches `show`.
fn set_visibility<S: MarkerSurface>(
    surface: &mut S,
    on_activate: Option<&ActivationFn>,
    record: &mut MarkerRecord,
    show: bool,
) {
    match (show, record.handle) {
        (true, None) => {
            let activation = on_activate
                .map(|cb| Activation::new(record.id, Arc::clone(&record.payload), Arc::clone(cb)));
            record.handle = Some(surface.place_marker(record.position, &record.label, activation));
        }
        (false, Some(handle)) => {
            surface.remove_marker(handle);
            record.handle = None;
        }
        _ => {}
    }
}
