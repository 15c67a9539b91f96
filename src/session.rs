// THEORY:
// The `session` module is the top-level API of the crate. A `MapSession` wraps
// the cluster engine together with the policies that sit around it in a real map
// view, so that an application only has to feed it lookup events and wheel input.
//
// Responsibilities, in the order a search flows through them:
// 1.  **Reset**: `begin_search` clears every marker, re-centers the camera on
//     (0, 0) at the default zoom and forgets the previous batch's results.
// 2.  **Ingestion**: `apply` takes `LookupEvent`s in arrival order. Located
//     addresses with coordinates become markers; failures are kept for reporting
//     and logged, never fatal.
// 3.  **Framing**: On `Finished`, the viewport is fitted to everything located in
//     the batch and its zoom is fed to the engine, which recomputes the clusters.
// 4.  **Zoom Input**: Wheel notches go through a debouncer; `poll_zoom` applies
//     the settled target once the input has gone quiet.

use crate::config::SessionConfig;
use crate::core_modules::cluster_engine::ClusterEngine;
use crate::core_modules::geo_point::GeoPoint;
use crate::core_modules::marker::{MarkerId, Payload};
use crate::core_modules::surface::{ActivationFn, MarkerSurface};
use crate::core_modules::viewport_fitter::{Viewport, fit_bounds};
use crate::debounce::ZoomDebouncer;
use crate::error::LookupError;
use crate::geolocation::format_location_details;
use crate::lookup_worker::LookupEvent;
use tokio::time::Instant;
use tracing::{info, warn};

/// What applying one `LookupEvent` did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// A located address was ingested as a marker.
    MarkerAdded(MarkerId),
    /// A located address had no coordinates and could not be plotted.
    NotPlotted { ip: String },
    /// One address failed; the batch continues.
    LookupFailed { ip: String, error: LookupError },
    /// The batch ended. Holds the fitted viewport when anything was plotted.
    BatchComplete(Option<Viewport>),
}

/// An address that could not be located, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupFailure {
    pub ip: String,
    pub error: LookupError,
}

pub struct MapSession<S: MarkerSurface> {
    engine: ClusterEngine<S>,
    config: SessionConfig,
    debouncer: ZoomDebouncer,
    viewport: Viewport,
    bounds: Vec<GeoPoint>,
    results: Vec<Payload>,
    failures: Vec<LookupFailure>,
}

impl<S: MarkerSurface> MapSession<S> {
    pub fn new(surface: S, config: SessionConfig) -> Self {
        let engine = ClusterEngine::new(surface, config.engine.clone());
        let viewport = Viewport {
            center: GeoPoint::default(),
            zoom: engine.zoom(),
        };
        Self {
            engine,
            debouncer: ZoomDebouncer::new(config.zoom_debounce),
            config,
            viewport,
            bounds: Vec::new(),
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Registers the callback fired when a user activates an individual pin.
    pub fn with_activation(mut self, callback: ActivationFn) -> Self {
        self.engine = self.engine.with_activation(callback);
        self
    }

    /// Clears the previous search from the map and from the session.
    pub fn begin_search(&mut self) {
        self.engine.clear_all();
        self.debouncer.cancel();
        self.bounds.clear();
        self.results.clear();
        self.failures.clear();
        self.viewport = Viewport {
            center: GeoPoint::default(),
            zoom: self.engine.zoom(),
        };
        self.engine
            .surface_mut()
            .set_view(self.viewport.center, self.viewport.zoom);
    }

    /// Applies one event from a lookup batch.
    pub fn apply(&mut self, event: LookupEvent) -> SessionUpdate {
        match event {
            LookupEvent::Located { ip, record } => {
                let label = record.marker_label();
                let position = record.position();
                let payload = record.into_payload(&ip);
                self.results.push(payload.clone());

                match position {
                    Some(point) => {
                        self.bounds.push(point);
                        let id = self.engine.ingest(point.lat, point.lon, label, payload);
                        SessionUpdate::MarkerAdded(id)
                    }
                    None => {
                        warn!(%ip, "located address has no coordinates");
                        SessionUpdate::NotPlotted { ip }
                    }
                }
            }
            LookupEvent::Failed { ip, error } => {
                warn!(%ip, %error, "lookup failed");
                self.failures.push(LookupFailure {
                    ip: ip.clone(),
                    error: error.clone(),
                });
                SessionUpdate::LookupFailed { ip, error }
            }
            LookupEvent::Finished { located, failed } => {
                info!(located, failed, markers = self.engine.len(), "search batch complete");
                SessionUpdate::BatchComplete(self.frame_batch())
            }
        }
    }

    /// Fits the camera to the batch and hands its zoom to the engine.
    fn frame_batch(&mut self) -> Option<Viewport> {
        let fitted = fit_bounds(&self.bounds).ok()?;
        self.engine.set_zoom(fitted.zoom as i32);
        self.viewport = Viewport {
            center: fitted.center,
            zoom: self.engine.zoom(),
        };
        self.engine
            .surface_mut()
            .set_view(self.viewport.center, self.viewport.zoom);
        Some(self.viewport)
    }

    /// Records one wheel notch and returns the zoom it will settle on.
    pub fn wheel(&mut self, delta: i32, now: Instant) -> u8 {
        self.debouncer.step(self.engine.zoom(), delta, now)
    }

    /// When pending wheel input has gone quiet, applies it and returns the new zoom.
    pub fn poll_zoom(&mut self, now: Instant) -> Option<u8> {
        let zoom = self.debouncer.poll(now)?;
        self.engine.set_zoom(zoom as i32);
        self.viewport.zoom = self.engine.zoom();
        self.engine
            .surface_mut()
            .set_view(self.viewport.center, self.viewport.zoom);
        Some(self.viewport.zoom)
    }

    /// The instant at which pending wheel input settles, if any.
    pub fn zoom_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn engine(&self) -> &ClusterEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ClusterEngine<S> {
        &mut self.engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Payloads of every located address in the current search, in order.
    pub fn results(&self) -> &[Payload] {
        &self.results
    }

    pub fn failures(&self) -> &[LookupFailure] {
        &self.failures
    }

    /// Detail text for every located address, numbered from 1.
    pub fn location_details(&self) -> String {
        self.results
            .iter()
            .enumerate()
            .map(|(i, payload)| format_location_details(i + 1, payload))
            .collect::<Vec<_>>()
            .join(&format!("{}\n", "=".repeat(40)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::surface::RecordingSurface;
    use crate::geolocation::GeoRecord;
    use std::time::Duration;

    fn located(ip: &str, lat: f64, lon: f64) -> LookupEvent {
        LookupEvent::Located {
            ip: ip.to_string(),
            record: GeoRecord {
                status: "success".into(),
                lat: Some(lat),
                lon: Some(lon),
                city: Some("Somewhere".into()),
                country: Some("Nowhere".into()),
                query: Some(ip.to_string()),
                ..GeoRecord::default()
            },
        }
    }

    fn session() -> MapSession<RecordingSurface> {
        MapSession::new(RecordingSurface::new(), SessionConfig::default())
    }

    #[test]
    fn batch_end_fits_the_view_and_reclusters() {
        let mut session = session();
        session.begin_search();
        session.apply(located("10.0.0.1", 0.0, 0.0));
        session.apply(located("10.0.0.2", 0.0, 0.01));
        assert_eq!(session.engine().surface().pin_count(), 2);

        let update = session.apply(LookupEvent::Finished { located: 2, failed: 0 });
        let viewport = match update {
            SessionUpdate::BatchComplete(Some(v)) => v,
            other => panic!("unexpected update: {other:?}"),
        };

        // Span 0.01 longitude, 0 latitude: both axis estimates are huge.
        assert_eq!(viewport.zoom, 19);
        assert_eq!(session.engine().zoom(), 19);
        assert!(session.engine().active_clusters().is_empty());
        assert_eq!(
            session.engine().surface().view(),
            Some((viewport.center, 19))
        );
    }

    #[test]
    fn far_apart_batch_clusters_near_neighbours() {
        let mut session = session();
        session.begin_search();
        session.apply(located("a", -60.0, -170.0));
        session.apply(located("b", 60.0, 170.0));
        session.apply(located("c", 60.0, 170.1));
        session.apply(LookupEvent::Finished { located: 3, failed: 0 });

        assert_eq!(session.engine().zoom(), 2);
        let clusters = session.engine().active_clusters();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![MarkerId(1), MarkerId(2)]);
        assert_eq!(session.engine().visible_marker_ids(), vec![MarkerId(0)]);
    }

    #[test]
    fn failures_and_missing_coordinates_are_reported_not_plotted() {
        let mut session = session();
        session.begin_search();
        let failed = session.apply(LookupEvent::Failed {
            ip: "bogus".into(),
            error: LookupError::rejected("invalid query"),
        });
        assert!(matches!(failed, SessionUpdate::LookupFailed { .. }));

        let no_coords = session.apply(LookupEvent::Located {
            ip: "1.2.3.4".into(),
            record: GeoRecord {
                status: "success".into(),
                ..GeoRecord::default()
            },
        });
        assert_eq!(no_coords, SessionUpdate::NotPlotted { ip: "1.2.3.4".into() });

        let done = session.apply(LookupEvent::Finished { located: 1, failed: 1 });
        assert_eq!(done, SessionUpdate::BatchComplete(None));
        assert_eq!(session.failures().len(), 1);
        assert_eq!(session.results().len(), 1);
        assert!(session.engine().is_empty());
    }

    #[test]
    fn new_search_starts_from_a_clean_map() {
        let mut session = session();
        session.begin_search();
        session.apply(located("a", 10.0, 10.0));
        session.apply(LookupEvent::Finished { located: 1, failed: 0 });
        assert_eq!(session.engine().zoom(), 19);

        session.begin_search();
        assert!(session.engine().is_empty());
        assert_eq!(session.engine().surface().pin_count(), 0);
        assert_eq!(session.engine().zoom(), 3);
        assert!(session.results().is_empty());
        assert_eq!(
            session.viewport(),
            Viewport {
                center: GeoPoint::default(),
                zoom: 3
            }
        );
    }

    #[test]
    fn wheel_burst_applies_one_recompute_after_the_delay() {
        let mut session = session();
        session.begin_search();
        session.apply(located("a", 0.0, 0.0));
        session.apply(located("b", 0.0, 0.3));
        session.engine_mut().set_zoom(2);
        assert_eq!(session.engine().active_clusters().len(), 1);

        let start = Instant::now();
        assert_eq!(session.wheel(1, start), 3);
        assert_eq!(session.wheel(1, start + Duration::from_millis(20)), 4);
        assert_eq!(session.poll_zoom(start + Duration::from_millis(50)), None);
        assert_eq!(session.engine().zoom(), 2);

        assert_eq!(session.poll_zoom(start + Duration::from_millis(120)), Some(4));
        assert_eq!(session.engine().zoom(), 4);
        // threshold at zoom 4 is 0.3125, so the pair still merges.
        assert_eq!(session.engine().active_clusters().len(), 1);
        assert_eq!(session.zoom_deadline(), None);
    }

    #[test]
    fn details_are_numbered_and_separated() {
        let mut session = session();
        session.begin_search();
        session.apply(located("a", 1.0, 2.0));
        session.apply(located("b", 3.0, 4.0));
        let text = session.location_details();
        assert!(text.starts_with("Location 1:\nIP: a\n"));
        assert!(text.contains(&format!("{}\nLocation 2:\nIP: b\n", "=".repeat(40))));
    }
}
