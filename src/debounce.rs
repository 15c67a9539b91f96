//! Wheel-zoom debouncing.
//!
//! Scroll bursts arrive faster than a recompute is worth running. Each wheel
//! step moves a pending target zoom and pushes the deadline out; the target is
//! released only once input has been quiet for the configured delay.

use crate::core_modules::zoom::clamp_zoom;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct ZoomDebouncer {
    delay: Duration,
    pending: Option<(u8, Instant)>,
}

impl ZoomDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records one wheel notch. Positive `delta` zooms in, anything else zooms
    /// out. Steps accumulate on top of a still-pending target. Returns the new
    /// target.
    pub fn step(&mut self, current_zoom: u8, delta: i32, now: Instant) -> u8 {
        let base = self.pending.map(|(zoom, _)| zoom).unwrap_or(current_zoom);
        let direction: i64 = if delta > 0 { 1 } else { -1 };
        let target = clamp_zoom(base as i64 + direction);
        self.pending = Some((target, now + self.delay));
        target
    }

    /// Releases the pending target once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<u8> {
        match self.pending {
            Some((zoom, deadline)) if now >= deadline => {
                self.pending = None;
                Some(zoom)
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }

    pub fn pending_zoom(&self) -> Option<u8> {
        self.pending.map(|(zoom, _)| zoom)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn burst_is_released_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = ZoomDebouncer::new(DELAY);

        assert_eq!(debouncer.step(3, 120, start), 4);
        assert_eq!(debouncer.step(3, 120, start + Duration::from_millis(30)), 5);
        assert_eq!(debouncer.step(3, 120, start + Duration::from_millis(60)), 6);

        assert_eq!(debouncer.poll(start + Duration::from_millis(150)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(160)), Some(6));
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn steps_are_clamped_to_the_zoom_range() {
        let now = Instant::now();
        let mut debouncer = ZoomDebouncer::new(DELAY);
        assert_eq!(debouncer.step(2, -1, now), 2);
        debouncer.cancel();
        assert_eq!(debouncer.step(19, 1, now), 19);
        assert_eq!(debouncer.pending_zoom(), Some(19));
    }

    #[test]
    fn cancel_drops_the_pending_target() {
        let now = Instant::now();
        let mut debouncer = ZoomDebouncer::new(DELAY);
        debouncer.step(5, 1, now);
        debouncer.cancel();
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(now + DELAY), None);
    }
}
