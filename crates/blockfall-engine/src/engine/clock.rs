use std::{
    cell::Cell,
    fmt,
    time::{Duration, Instant},
};

/// Source of monotonic elapsed time for gravity pacing.
///
/// Gravity is driven by elapsed time rather than step counts, so real-time
/// pacing affects automatic descent independently of how often the driver
/// advances the game. Injecting the source keeps that behavior while letting
/// tests and headless training advance time without sleeping.
pub trait TimeSource: fmt::Debug {
    /// Time elapsed since the source was created.
    fn elapsed(&self) -> Duration;
}

/// [`TimeSource`] backed by the monotonic system clock.
#[derive(Debug)]
pub struct SystemTimeSource {
    start: Instant,
}

impl SystemTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Manually advanced [`TimeSource`].
///
/// Time only moves when [`advance`](Self::advance) is called, which takes
/// `&self` so the source can be shared with a running game through an `Rc`.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: Cell<Duration>,
}

impl ManualTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl TimeSource for ManualTimeSource {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}
