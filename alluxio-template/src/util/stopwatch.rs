//! Wall-clock stopwatch accumulating start→pause intervals.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default, Clone, Copy)]
pub struct Stopwatch {
    start: Option<Instant>,
    end: Option<Instant>,
    banked: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started() -> Self {
        let mut sw = Self::new();
        sw.start();
        sw
    }

    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    pub fn pause(&mut self) {
        self.end = Some(Instant::now());
    }

    /// Banks the last start→pause interval and restarts the clock.
    pub fn cont(&mut self) {
        self.banked += self.current();
        self.start = Some(Instant::now());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Banked time plus the interval from the last start to the last pause.
    pub fn elapsed(&self) -> Duration {
        self.banked + self.current()
    }

    fn current(&self) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }
}
