// THEORY:
// `GeoPoint` is the smallest unit of geographic truth in the engine. Everything
// above it (markers,
// clusters, viewports) is expressed in terms of these points.
//
// Key architectural principles:
// 1.  **Planar Degree Space**: All geometry here treats latitude and longitude as
//     plain Cartesian axes measured in degrees. Distances are Euclidean in that
//     space, not great-circle. Longitude compression near the poles is ignored.
// 2.  **Dumb Data Container**: A `GeoPoint` carries no validation. Coordinates
//     outside `[-90, 90]` / `[-180, 180]` pass through untouched; callers that
//     need validation must do it before ingesting.
// 3.  **Shared Helpers**: The centroid and bounding-box helpers live here so the
//     cluster engine and the viewport fitter compute them the same way.

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Euclidean distance in degree space: `sqrt(dlat^2 + dlon^2)`.
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        let lat_diff = self.lat - other.lat;
        let lon_diff = self.lon - other.lon;
        (lat_diff * lat_diff + lon_diff * lon_diff).sqrt()
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Arithmetic mean of the given points. Not weighted, not geodesic.
/// Returns `None` for an empty iterator.
pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let mut sum_lat = 0.0;
    let mut sum_lon = 0.0;
    let mut count = 0usize;

    for point in points {
        sum_lat += point.lat;
        sum_lon += point.lon;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(GeoPoint {
        lat: sum_lat / count as f64,
        lon: sum_lon / count as f64,
    })
}

/// An axis-aligned box in degree space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// The tightest box enclosing every point, or `None` when there are none.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = GeoBounds {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };

        for point in iter {
            bounds.min_lat = bounds.min_lat.min(point.lat);
            bounds.max_lat = bounds.max_lat.max(point.lat);
            bounds.min_lon = bounds.min_lon.min(point.lon);
            bounds.max_lon = bounds.max_lon.max(point.lon);
        }

        Some(bounds)
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Grows each axis on both sides by `fraction` of that axis' span.
    pub fn padded(&self, fraction: f64) -> Self {
        let lat_padding = self.lat_span() * fraction;
        let lon_padding = self.lon_span() * fraction;
        GeoBounds {
            min_lat: self.min_lat - lat_padding,
            max_lat: self.max_lat + lat_padding,
            min_lon: self.min_lon - lon_padding,
            max_lon: self.max_lon + lon_padding,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lon: (self.min_lon + self.max_lon) / 2.0,
        }
    }
}
