// THEORY:
// The `ViewportFitter` picks a camera for a set of points: a center and a discrete
// zoom level that frame every point with some margin. It is stateless and never
// talks to the cluster engine; callers pass its zoom on to `set_zoom` themselves.
//
// Algorithm steps:
// 1.  **Bounds**: Take the tightest box around the points.
// 2.  **Margin**: Pad each axis by 10% of its own span.
// 3.  **Center**: The midpoint of the padded box.
// 4.  **Zoom**: A fixed linear heuristic, not a tile projection. Each axis gets
//     `round(-1.4 * (range - full_range))` where the full range is 180 degrees
//     of latitude or 360 degrees of longitude. The smaller (more zoomed-out) of
//     the two estimates wins and is clamped into the valid zoom range. The
//     coefficients are fixed so that output stays comparable across versions.

use crate::core_modules::geo_point::{GeoBounds, GeoPoint};
use crate::core_modules::zoom::clamp_zoom;
use crate::error::FitError;

const PADDING_FRACTION: f64 = 0.1;
const ZOOM_SLOPE: f64 = -1.4;
const FULL_LAT_RANGE: f64 = 180.0;
const FULL_LON_RANGE: f64 = 360.0;

/// A camera position: where to center and how far to zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: u8,
}

/// Frames every point. Fails on an empty slice rather than inventing a camera.
pub fn fit_bounds(points: &[GeoPoint]) -> Result<Viewport, FitError> {
    let bounds = GeoBounds::enclosing(points).ok_or(FitError::EmptyBounds)?;
    let padded = bounds.padded(PADDING_FRACTION);

    let zoom_lat = axis_zoom(padded.lat_span(), FULL_LAT_RANGE);
    let zoom_lon = axis_zoom(padded.lon_span(), FULL_LON_RANGE);

    Ok(Viewport {
        center: padded.center(),
        zoom: clamp_zoom(zoom_lat.min(zoom_lon)),
    })
}

fn axis_zoom(range: f64, full_range: f64) -> i64 {
    (ZOOM_SLOPE * (range - full_range)).round() as i64
}
