//! Discrete zoom levels shared by the cluster engine, the viewport fitter and
//! the wheel debouncer.

/// The most zoomed-out level the map surface accepts.
pub const MIN_ZOOM: u8 = 2;
/// The most zoomed-in level the map surface accepts.
pub const MAX_ZOOM: u8 = 19;
/// The level a freshly created or cleared engine starts at.
pub const DEFAULT_ZOOM: u8 = 3;
/// At or above this level, points are far enough apart on screen that no
/// clustering is performed.
pub const CLUSTERING_CUTOFF_ZOOM: u8 = 6;

/// Clamps any integer zoom estimate into `[MIN_ZOOM, MAX_ZOOM]`.
pub fn clamp_zoom(zoom: i64) -> u8 {
    zoom.clamp(MIN_ZOOM as i64, MAX_ZOOM as i64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_both_ends() {
        assert_eq!(clamp_zoom(-50), MIN_ZOOM);
        assert_eq!(clamp_zoom(0), MIN_ZOOM);
        assert_eq!(clamp_zoom(7), 7);
        assert_eq!(clamp_zoom(252), MAX_ZOOM);
    }
}
