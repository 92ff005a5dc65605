use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

/// Lifecycle of a [`Timeline`]: `Idle -> Playing -> {Completed | Stopped}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Completed,
    Stopped,
}

/// Identifies one play-through. Ticks carrying a stale id are inert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Cooperative cancellation for whatever session a timeline is currently running.
///
/// Stopping flips shared state that the next tick observes at its head; a tick already in progress
/// finishes normally.
#[derive(Clone, Debug)]
pub struct StopHandle {
    generation: Arc<AtomicU64>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Clone, Copy, Debug)]
struct PlaybackSession {
    id: SessionId,
    start: Duration,
    last_progress: f64,
}

/// One scheduled frame of a live session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub session: SessionId,
    pub elapsed: Duration,
    /// `min(elapsed / duration, 1)`, never decreasing within a session.
    pub progress: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    /// The session was stopped, superseded or already finished; nothing may be drawn.
    Inert,
    /// Draw this frame and keep scheduling.
    Frame(FrameTick),
    /// Draw this frame, then complete. Returned at most once per session.
    Final(FrameTick),
}

/// Progress state machine for one reel instance.
///
/// At most one session is live: [`Timeline::play`] invalidates any previous session before
/// starting the next one, so a superseded loop only ever sees [`Tick::Inert`].
#[derive(Debug)]
pub struct Timeline {
    duration: Duration,
    generation: Arc<AtomicU64>,
    state: PlaybackState,
    session: Option<PlaybackSession>,
}

impl Timeline {
    pub fn new(duration: Duration) -> ReelResult<Self> {
        if duration.is_zero() {
            return Err(ReelError::validation("timeline duration must be non-zero"));
        }
        Ok(Self {
            duration,
            generation: Arc::new(AtomicU64::new(0)),
            state: PlaybackState::Idle,
            session: None,
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            generation: Arc::clone(&self.generation),
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.state == PlaybackState::Playing && !self.is_live() {
            return PlaybackState::Stopped;
        }
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// `true` when `id` is no longer the timeline's current generation.
    pub fn is_superseded(&self, id: SessionId) -> bool {
        self.generation.load(Ordering::Acquire) != id.0
    }

    /// Start a new session at `now`, invalidating any previous one.
    pub fn play(&mut self, now: Duration) -> SessionId {
        let id = SessionId(self.generation.fetch_add(1, Ordering::AcqRel) + 1);
        if let Some(prev) = self.session
            && self.state == PlaybackState::Playing
        {
            tracing::debug!(previous = prev.id.0, next = id.0, "superseding live playback session");
        }
        self.session = Some(PlaybackSession {
            id,
            start: now,
            last_progress: 0.0,
        });
        self.state = PlaybackState::Playing;
        id
    }

    /// Stop the live session, if any. Idempotent.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Playing {
            self.generation.fetch_add(1, Ordering::AcqRel);
            self.state = PlaybackState::Stopped;
            tracing::debug!("playback stopped");
        }
    }

    /// Advance `id` to `now`.
    pub fn tick(&mut self, id: SessionId, now: Duration) -> Tick {
        if self.generation.load(Ordering::Acquire) != id.0 {
            if self.state == PlaybackState::Playing && self.session.is_some_and(|s| s.id == id) {
                self.state = PlaybackState::Stopped;
            }
            return Tick::Inert;
        }
        if self.state != PlaybackState::Playing {
            return Tick::Inert;
        }
        let Some(session) = self.session.as_mut() else {
            return Tick::Inert;
        };
        if session.id != id {
            return Tick::Inert;
        }

        let elapsed = now.saturating_sub(session.start);
        let raw = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let progress = raw.min(1.0).max(session.last_progress);
        session.last_progress = progress;

        let tick = FrameTick {
            session: id,
            elapsed,
            progress,
        };
        if progress >= 1.0 {
            self.state = PlaybackState::Completed;
            Tick::Final(tick)
        } else {
            Tick::Frame(tick)
        }
    }

    fn is_live(&self) -> bool {
        self.session
            .is_some_and(|s| self.generation.load(Ordering::Acquire) == s.id.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scheduler.rs"]
mod tests;
