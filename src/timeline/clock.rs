use std::time::{Duration, Instant};

use crate::foundation::core::Fps;
use crate::model::config::ClockMode;

/// Source of display-refresh opportunities.
///
/// `wait_for_refresh` is the only suspension point of a playback loop: it yields until the next
/// repaint opportunity and returns that opportunity's timestamp. Timestamps never decrease.
pub trait FrameClock {
    /// Current time on this clock, relative to its origin.
    fn now(&self) -> Duration;
    /// Suspend until the next refresh opportunity and return its timestamp.
    fn wait_for_refresh(&mut self) -> Duration;
}

impl<C: FrameClock + ?Sized> FrameClock for Box<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn wait_for_refresh(&mut self) -> Duration {
        (**self).wait_for_refresh()
    }
}

/// Wall-clock pacing at a fixed refresh rate.
///
/// Late refreshes skip ahead to the next slot instead of bursting to catch up.
#[derive(Debug)]
pub struct RealtimeClock {
    origin: Instant,
    interval: Duration,
    next_deadline: Duration,
}

impl RealtimeClock {
    pub fn new(fps: Fps) -> Self {
        let interval = fps.frame_duration().max(Duration::from_micros(100));
        Self {
            origin: Instant::now(),
            interval,
            next_deadline: interval,
        }
    }
}

impl FrameClock for RealtimeClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_for_refresh(&mut self) -> Duration {
        let now = self.now();
        while self.next_deadline <= now {
            self.next_deadline += self.interval;
        }
        let target = self.next_deadline;
        std::thread::sleep(target - now);
        self.next_deadline = target + self.interval;
        self.now()
    }
}

/// Deterministic clock: every refresh advances time by exactly one frame interval.
#[derive(Clone, Debug)]
pub struct SteppedClock {
    now: Duration,
    step: Duration,
}

impl SteppedClock {
    pub fn new(fps: Fps) -> Self {
        Self::with_step(fps.frame_duration())
    }

    pub fn with_step(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
        }
    }
}

impl FrameClock for SteppedClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn wait_for_refresh(&mut self) -> Duration {
        self.now += self.step;
        self.now
    }
}

/// Build the clock selected by configuration.
pub fn clock_for(mode: ClockMode, fps: Fps) -> Box<dyn FrameClock + Send> {
    match mode {
        ClockMode::Stepped => Box::new(SteppedClock::new(fps)),
        ClockMode::Realtime => Box::new(RealtimeClock::new(fps)),
    }
}
