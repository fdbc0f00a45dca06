//! Frame pacing.
//!
//! The host polls the scheduler with the current instant; it answers whether
//! a frame is due. Time is always passed in, so tests can drive it with
//! synthetic instants.

use std::time::{Duration, Instant};

/// Throttles frames to a target rate.
///
/// After a frame fires, the next deadline keeps the original phase, so a late
/// poll does not push every following frame back.
#[derive(Clone, Debug)]
pub struct FrameScheduler {
    interval: Duration,
    last_frame: Option<Instant>,
    pending: bool,
}

impl FrameScheduler {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / target_fps.max(1),
            last_frame: None,
            pending: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the scheduler. The next poll fires immediately.
    pub fn start(&mut self) {
        self.pending = true;
        self.last_frame = None;
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// True when a frame should run at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        let Some(last) = self.last_frame else {
            self.last_frame = Some(now);
            return true;
        };

        let delta = now.saturating_duration_since(last);
        if delta < self.interval {
            return false;
        }

        let interval_nanos = self.interval.as_nanos().max(1);
        let drift = Duration::from_nanos((delta.as_nanos() % interval_nanos) as u64);
        self.last_frame = Some(now.checked_sub(drift).unwrap_or(now));
        true
    }

    /// How long the host may sleep before the next frame is due.
    /// `None` when nothing is scheduled.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if !self.pending {
            return None;
        }
        match self.last_frame {
            None => Some(Duration::ZERO),
            Some(last) => Some(self.interval.saturating_sub(now.saturating_duration_since(last))),
        }
    }
}

/// Collapses a burst of resize notifications into one, fired once the
/// size has been stable for `delay`.
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending_since: Option<Instant>,
}

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending_since: None }
    }

    /// Record a resize. Restarts the quiet period.
    pub fn notify(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// True once, when the quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.pending_since
            .map(|since| self.delay.saturating_sub(now.saturating_duration_since(since)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_fires() {
        let mut scheduler = FrameScheduler::new(30);
        let t0 = Instant::now();
        assert!(!scheduler.poll(t0), "idle scheduler never fires");
        scheduler.start();
        assert_eq!(scheduler.time_until_next(t0), Some(Duration::ZERO));
        assert!(scheduler.poll(t0));
    }

    #[test]
    fn test_throttles_to_interval() {
        let mut scheduler = FrameScheduler::new(30);
        let interval = scheduler.interval();
        let t0 = Instant::now();
        scheduler.start();
        assert!(scheduler.poll(t0));
        assert!(!scheduler.poll(t0 + Duration::from_millis(1)));
        assert!(!scheduler.poll(t0 + interval - Duration::from_micros(1)));
        assert!(scheduler.poll(t0 + interval));
    }

    #[test]
    fn test_late_poll_keeps_phase() {
        let mut scheduler = FrameScheduler::new(10);
        let interval = scheduler.interval();
        let t0 = Instant::now();
        scheduler.start();
        assert!(scheduler.poll(t0));

        // 1.5 intervals late: fires, next deadline stays on the 100ms grid
        let late = t0 + interval + interval / 2;
        assert!(scheduler.poll(late));
        assert_eq!(scheduler.time_until_next(late), Some(interval / 2));
        assert!(scheduler.poll(t0 + interval * 2));
    }

    #[test]
    fn test_cancel_stops_firing() {
        let mut scheduler = FrameScheduler::new(30);
        let t0 = Instant::now();
        scheduler.start();
        assert!(scheduler.poll(t0));
        scheduler.cancel();
        assert!(!scheduler.is_pending());
        assert!(!scheduler.poll(t0 + Duration::from_secs(5)));
        assert_eq!(scheduler.time_until_next(t0), None);
    }

    #[test]
    fn test_zero_fps_clamped() {
        let scheduler = FrameScheduler::new(0);
        assert_eq!(scheduler.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_resize_debounce() {
        let mut debouncer = ResizeDebouncer::default();
        let t0 = Instant::now();
        assert!(!debouncer.fire(t0));

        debouncer.notify(t0);
        debouncer.notify(t0 + Duration::from_millis(100));
        assert!(!debouncer.fire(t0 + Duration::from_millis(200)));
        assert_eq!(
            debouncer.time_until_fire(t0 + Duration::from_millis(200)),
            Some(Duration::from_millis(50))
        );
        assert!(debouncer.fire(t0 + Duration::from_millis(250)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire(t0 + Duration::from_millis(400)));
    }
}
