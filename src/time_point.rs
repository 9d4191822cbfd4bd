#[cfg(test)]
use mock_instant::Instant;
#[cfg(not(test))]
use std::time::Instant;
use std::time::SystemTime;

/// A capture of both clocks at one moment. The system clock dates a span,
/// the steady clock measures its duration.
#[derive(Clone, Debug)]
pub struct TimePoint {
    pub absolute_time: SystemTime,
    pub relative_time: Instant,
}

impl TimePoint {
    pub fn new() -> TimePoint {
        Self {
            absolute_time: SystemTime::now(),
            relative_time: Instant::now(),
        }
    }
}

impl Default for TimePoint {
    fn default() -> TimePoint {
        TimePoint::new()
    }
}
