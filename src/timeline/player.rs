use std::sync::Arc;
use std::time::Duration;

use crate::compose::compositor::Compositor;
use crate::compose::scene::FrameMeta;
use crate::foundation::error::ReelResult;
use crate::model::input::ReelInput;
use crate::render::surface::Surface;
use crate::timeline::clock::FrameClock;
use crate::timeline::scheduler::{PlaybackState, SessionId, StopHandle, Tick, Timeline};

/// One drawn frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStep {
    pub session: SessionId,
    pub elapsed: Duration,
    pub progress: f64,
    pub meta: FrameMeta,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// No live session; nothing was drawn.
    Inert,
    Frame(FrameStep),
    /// The session's last frame (`progress == 1`).
    Completed(FrameStep),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Stopped,
}

/// Binds one timeline, one compositor and one surface.
///
/// The surface is written only by the player's live session; starting a new session invalidates
/// the previous one first.
pub struct ReelPlayer<C: FrameClock> {
    data: Arc<ReelInput>,
    compositor: Compositor,
    surface: Surface,
    clock: C,
    timeline: Timeline,
    session: Option<SessionId>,
    first_frame_pending: bool,
}

impl<C: FrameClock> std::fmt::Debug for ReelPlayer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReelPlayer")
            .field("surface", &self.surface)
            .field("timeline", &self.timeline)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<C: FrameClock> ReelPlayer<C> {
    pub fn new(
        data: Arc<ReelInput>,
        surface: Surface,
        compositor: Compositor,
        clock: C,
        duration: Duration,
    ) -> ReelResult<Self> {
        Ok(Self {
            data,
            compositor,
            surface,
            clock,
            timeline: Timeline::new(duration)?,
            session: None,
            first_frame_pending: false,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn data(&self) -> &Arc<ReelInput> {
        &self.data
    }

    pub fn state(&self) -> PlaybackState {
        self.timeline.state()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.timeline.stop_handle()
    }

    /// Start (or restart) playback. Any previous session becomes inert.
    pub fn begin(&mut self) -> SessionId {
        let id = self.timeline.play(self.clock.now());
        tracing::debug!(?id, "playback session started");
        self.session = Some(id);
        self.first_frame_pending = true;
        id
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        self.timeline.stop();
        self.session = None;
    }

    /// Wait for the next refresh and draw it.
    pub fn step(&mut self) -> ReelResult<StepOutcome> {
        let Some(id) = self.session else {
            return Ok(StepOutcome::Inert);
        };
        if self.timeline.is_superseded(id) {
            self.session = None;
            return Ok(StepOutcome::Inert);
        }

        let now = if std::mem::take(&mut self.first_frame_pending) {
            self.clock.now()
        } else {
            self.clock.wait_for_refresh()
        };

        let (tick, last) = match self.timeline.tick(id, now) {
            Tick::Inert => {
                self.session = None;
                return Ok(StepOutcome::Inert);
            }
            Tick::Frame(t) => (t, false),
            Tick::Final(t) => (t, true),
        };

        let meta = self.compositor.render_frame(
            &mut self.surface,
            &self.data,
            tick.elapsed.as_secs_f64() * 1000.0,
            tick.progress,
        )?;
        let step = FrameStep {
            session: id,
            elapsed: tick.elapsed,
            progress: tick.progress,
            meta,
        };
        if last {
            self.session = None;
            Ok(StepOutcome::Completed(step))
        } else {
            Ok(StepOutcome::Frame(step))
        }
    }

    /// Run a whole session on the calling thread.
    ///
    /// `on_frame` sees every drawn frame in order; `on_complete` runs exactly once, after the
    /// final frame, unless the session was stopped first. An `on_frame` error stops playback and
    /// is returned.
    #[tracing::instrument(skip_all)]
    pub fn play<F, D>(&mut self, mut on_frame: F, on_complete: D) -> ReelResult<PlaybackOutcome>
    where
        F: FnMut(&Surface, &FrameStep) -> ReelResult<()>,
        D: FnOnce(),
    {
        let id = self.begin();
        loop {
            match self.step() {
                Ok(StepOutcome::Inert) => {
                    tracing::debug!("playback stopped before completion");
                    return Ok(PlaybackOutcome::Stopped);
                }
                Ok(StepOutcome::Frame(step)) => {
                    if let Err(e) = on_frame(&self.surface, &step) {
                        self.stop();
                        return Err(e);
                    }
                }
                Ok(StepOutcome::Completed(step)) => {
                    on_frame(&self.surface, &step)?;
                    if self.timeline.is_superseded(id) {
                        return Ok(PlaybackOutcome::Stopped);
                    }
                    on_complete();
                    return Ok(PlaybackOutcome::Completed);
                }
                Err(e) => {
                    self.stop();
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/player.rs"]
mod tests;
