// THEORY:
// The `MarkerSurface` trait is the only seam between the clustering logic and
// whatever actually draws pins. The engine never renders; it asks the surface to
// place or remove pins and keeps the opaque handles it gets back.
//
// Activation is an explicit capability: when a pin for an individual marker is
// placed, the engine hands over an `Activation` bundling the marker's payload
// with the caller-supplied callback. The surface calls `fire` when a user
// activates that pin. Cluster pins carry no activation.
//
// `RecordingSurface` is an in-memory implementation that keeps the live pin set
// and an operation log. It drives the headless binary and the tests.

use crate::core_modules::geo_point::GeoPoint;
use crate::core_modules::marker::{MarkerId, Payload};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Opaque token identifying one placed pin on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

/// Callback invoked with a marker's id and payload when its pin is activated.
pub type ActivationFn = Arc<dyn Fn(MarkerId, &Payload) + Send + Sync>;

/// What a surface needs to report the activation of an individual pin.
#[derive(Clone)]
pub struct Activation {
    pub marker_id: MarkerId,
    pub payload: Arc<Payload>,
    callback: ActivationFn,
}

impl Activation {
    pub fn new(marker_id: MarkerId, payload: Arc<Payload>, callback: ActivationFn) -> Self {
        Self {
            marker_id,
            payload,
            callback,
        }
    }

    pub fn fire(&self) {
        (self.callback)(self.marker_id, &self.payload);
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("marker_id", &self.marker_id)
            .finish_non_exhaustive()
    }
}

/// A rendering surface that can place and remove labeled pins.
pub trait MarkerSurface {
    /// Places a pin and returns the handle used to remove it later.
    fn place_marker(
        &mut self,
        position: GeoPoint,
        label: &str,
        on_activate: Option<Activation>,
    ) -> MarkerHandle;

    /// Removes a pin previously returned by `place_marker`.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Moves the camera. Surfaces without a camera can ignore this.
    fn set_view(&mut self, _center: GeoPoint, _zoom: u8) {}
}

/// One call made against a `RecordingSurface`.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Place {
        handle: MarkerHandle,
        position: GeoPoint,
        label: String,
    },
    Remove {
        handle: MarkerHandle,
    },
    SetView {
        center: GeoPoint,
        zoom: u8,
    },
}

/// A pin that is currently on a `RecordingSurface`.
#[derive(Debug, Clone)]
pub struct Pin {
    pub position: GeoPoint,
    pub label: String,
    pub activation: Option<Activation>,
}

/// In-memory surface that records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pins: BTreeMap<MarkerHandle, Pin>,
    ops: Vec<SurfaceOp>,
    view: Option<(GeoPoint, u8)>,
    next_handle: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins currently on the surface, in placement order.
    pub fn pins(&self) -> impl Iterator<Item = (MarkerHandle, &Pin)> {
        self.pins.iter().map(|(handle, pin)| (*handle, pin))
    }

    pub fn pin(&self, handle: MarkerHandle) -> Option<&Pin> {
        self.pins.get(&handle)
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Every call received since creation or the last `take_ops`.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// The last camera position set, if any.
    pub fn view(&self) -> Option<(GeoPoint, u8)> {
        self.view
    }

    /// Simulates a user activating a pin. Returns false when the pin is gone
    /// or carries no activation.
    pub fn activate(&self, handle: MarkerHandle) -> bool {
        match self.pins.get(&handle).and_then(|pin| pin.activation.as_ref()) {
            Some(activation) => {
                activation.fire();
                true
            }
            None => false,
        }
    }
}

impl MarkerSurface for RecordingSurface {
    fn place_marker(
        &mut self,
        position: GeoPoint,
        label: &str,
        on_activate: Option<Activation>,
    ) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.pins.insert(
            handle,
            Pin {
                position,
                label: label.to_string(),
                activation: on_activate,
            },
        );
        self.ops.push(SurfaceOp::Place {
            handle,
            position,
            label: label.to_string(),
        });
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.pins.remove(&handle);
        self.ops.push(SurfaceOp::Remove { handle });
    }

    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        self.view = Some((center, zoom));
        self.ops.push(SurfaceOp::SetView { center, zoom });
    }
}
