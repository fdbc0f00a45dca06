//! Hour-of-day sources for palette selection.

use chrono::{Local, Timelike};

pub trait HourSource {
    /// Fractional hour in [0, 24)
    fn hour_of_day(&self) -> f32;
}

/// Local wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl HourSource for LocalClock {
    fn hour_of_day(&self) -> f32 {
        let now = Local::now();
        now.hour() as f32 + now.minute() as f32 / 60.0 + now.second() as f32 / 3600.0
    }
}

/// Pinned hour, for screenshots and tests
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedHour(pub f32);

impl HourSource for FixedHour {
    fn hour_of_day(&self) -> f32 {
        self.0
    }
}
