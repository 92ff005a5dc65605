use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::synth::{AmbientSynth, CHANNELS, SAMPLE_RATE};
use crate::capture::gif::{GifConverter, GifExportJob, LazyEncoder, shared_gif_encoder};
use crate::capture::sink::{AudioFormat, Blob, FrameSink, SinkConfig};
use crate::capture::video::VideoBackend;
use crate::compose::compositor::{ComposeOptions, Compositor};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::config::ReelConfig;
use crate::model::input::ReelInput;
use crate::render::fonts::FontBook;
use crate::render::surface::Surface;
use crate::share::delivery::{Delivery, DeliveryOutcome, SharePayload};
use crate::timeline::clock::{FrameClock, clock_for};
use crate::timeline::player::{PlaybackOutcome, ReelPlayer, StepOutcome};

type DynPlayer = ReelPlayer<Box<dyn FrameClock + Send>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Video,
    Gif,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareState {
    Closed,
    Previewing,
    Recording,
    /// An export finished or failed; see [`ShareSession::last_export`].
    Idle,
}

/// Result of one preview refresh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PreviewStatus {
    /// No preview session is running.
    Inactive,
    Frame { progress: f64 },
    /// The preview reached its end; `start_preview` replays it.
    ReplayAvailable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    /// Format selected when the export started.
    pub requested: ExportFormat,
    pub blob: Blob,
    /// `true` when animated-image conversion failed and the video was delivered instead.
    pub fell_back_to_video: bool,
    pub delivery: DeliveryOutcome,
}

/// Requests [`ShareSession::close`] from another thread.
///
/// Observed at the next preview refresh or recorded frame.
#[derive(Clone, Debug, Default)]
pub struct CloseHandle {
    requested: Arc<AtomicBool>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}

/// Preview and export lifecycle for one reel.
///
/// `Closed -> Previewing <-> Recording -> Idle`. Every recording gets its own full-size player
/// and capture; the preview player is never reused for export.
pub struct ShareSession {
    config: ReelConfig,
    fonts: Arc<FontBook>,
    options: ComposeOptions,
    video: Box<dyn VideoBackend>,
    gif_encoder: &'static LazyEncoder,
    delivery: Delivery,
    format: ExportFormat,
    state: ShareState,
    data: Option<Arc<ReelInput>>,
    preview: Option<DynPlayer>,
    last_export: Option<ExportReport>,
    close: CloseHandle,
}

impl std::fmt::Debug for ShareSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareSession")
            .field("state", &self.state)
            .field("format", &self.format)
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

impl ShareSession {
    pub fn new(
        config: ReelConfig,
        fonts: Arc<FontBook>,
        video: Box<dyn VideoBackend>,
        delivery: Delivery,
    ) -> ReelResult<Self> {
        config.validate()?;
        let options = ComposeOptions {
            watermark: config.watermark.clone(),
            ..ComposeOptions::default()
        };
        let gif_encoder = shared_gif_encoder(config.gif.backend);
        Ok(Self {
            config,
            fonts,
            options,
            gif_encoder,
            video,
            delivery,
            format: ExportFormat::default(),
            state: ShareState::Closed,
            data: None,
            preview: None,
            last_export: None,
            close: CloseHandle::default(),
        })
    }

    /// Replace the process-wide animated-image encoder selected by configuration.
    pub fn with_gif_encoder(mut self, encoder: &'static LazyEncoder) -> Self {
        self.gif_encoder = encoder;
        self
    }

    pub fn state(&self) -> ShareState {
        self.state
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Takes effect at the next `start_recording`.
    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn last_export(&self) -> Option<&ExportReport> {
        self.last_export.as_ref()
    }

    pub fn preview_surface(&self) -> Option<&Surface> {
        self.preview.as_ref().map(ReelPlayer::surface)
    }

    /// Whether the local runtime can record video.
    pub fn video_supported(&self) -> bool {
        self.video.is_supported()
    }

    fn player(&self, data: Arc<ReelInput>, canvas: Canvas) -> ReelResult<DynPlayer> {
        ReelPlayer::new(
            data,
            Surface::new(canvas)?,
            Compositor::new(Arc::clone(&self.fonts), self.options.clone()),
            clock_for(self.config.clock, self.config.fps),
            self.config.duration(),
        )
    }

    /// Show `data` and start the preview loop. An open session is closed first.
    pub fn open(&mut self, data: ReelInput) -> ReelResult<()> {
        if self.state != ShareState::Closed {
            self.close();
        }
        self.close.reset();
        let data = Arc::new(data);
        let mut preview = self.player(Arc::clone(&data), self.config.preview)?;
        preview.begin();
        self.data = Some(data);
        self.preview = Some(preview);
        self.last_export = None;
        self.state = ShareState::Previewing;
        tracing::debug!("share session opened");
        Ok(())
    }

    /// Restart the preview from the beginning.
    pub fn start_preview(&mut self) -> ReelResult<()> {
        match self.state {
            ShareState::Previewing | ShareState::Idle => {}
            ShareState::Closed => {
                return Err(ReelError::evaluation("share session is not open"));
            }
            ShareState::Recording => {
                return Err(ReelError::evaluation("cannot preview while recording"));
            }
        }
        if self.preview.is_none() {
            let data = self
                .data
                .clone()
                .ok_or_else(|| ReelError::evaluation("share session has no data"))?;
            self.preview = Some(self.player(data, self.config.preview)?);
        }
        if let Some(preview) = self.preview.as_mut() {
            preview.begin();
        }
        self.state = ShareState::Previewing;
        Ok(())
    }

    /// Draw the next preview frame.
    pub fn preview_frame(&mut self) -> ReelResult<PreviewStatus> {
        if self.close.is_requested() {
            self.close();
            return Ok(PreviewStatus::Inactive);
        }
        if self.state != ShareState::Previewing {
            return Ok(PreviewStatus::Inactive);
        }
        let Some(preview) = self.preview.as_mut() else {
            return Ok(PreviewStatus::Inactive);
        };
        Ok(match preview.step()? {
            StepOutcome::Inert => PreviewStatus::Inactive,
            StepOutcome::Frame(step) => PreviewStatus::Frame {
                progress: step.progress,
            },
            StepOutcome::Completed(_) => {
                tracing::debug!("preview finished; replay available");
                PreviewStatus::ReplayAvailable
            }
        })
    }

    /// Stop every timeline and drop the reel. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut preview) = self.preview.take() {
            preview.stop();
        }
        self.data = None;
        if self.state != ShareState::Closed {
            tracing::debug!("share session closed");
        }
        self.state = ShareState::Closed;
    }

    /// Record the reel at full size in the selected format and deliver it.
    ///
    /// `on_progress` receives a percentage after every recorded frame. Blocks until playback
    /// completes; a [`CloseHandle`] aborts the recording.
    #[tracing::instrument(skip_all, fields(format = ?self.format))]
    pub fn start_recording(
        &mut self,
        mut on_progress: impl FnMut(u8),
    ) -> ReelResult<&ExportReport> {
        match self.state {
            ShareState::Previewing | ShareState::Idle => {}
            ShareState::Closed => return Err(ReelError::evaluation("share session is not open")),
            ShareState::Recording => {
                return Err(ReelError::evaluation("a recording is already in progress"));
            }
        }
        let data = self
            .data
            .clone()
            .ok_or_else(|| ReelError::evaluation("share session has no data"))?;
        let format = self.format;
        let video_supported = self.video.is_supported();
        if format == ExportFormat::Video && !video_supported {
            return Err(ReelError::unsupported(
                "video recording is not supported on this system",
            ));
        }

        if let Some(preview) = self.preview.as_mut() {
            preview.stop();
        }
        self.state = ShareState::Recording;
        self.last_export = None;

        match self.record(data, format, video_supported, &mut on_progress) {
            Ok(report) => {
                self.state = ShareState::Idle;
                Ok(self.last_export.insert(report))
            }
            Err(e) => {
                if self.close.is_requested() {
                    self.close();
                } else {
                    self.state = ShareState::Idle;
                }
                Err(e)
            }
        }
    }

    fn record(
        &mut self,
        data: Arc<ReelInput>,
        format: ExportFormat,
        video_supported: bool,
        on_progress: &mut dyn FnMut(u8),
    ) -> ReelResult<ExportReport> {
        let mut player = self.player(Arc::clone(&data), self.config.canvas)?;
        let audio = self.config.audio.then_some(AudioFormat {
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
        });

        let mut sink: Option<Box<dyn FrameSink>> = if video_supported {
            let mut sink = self.video.create(self.config.video_bitrate)?;
            sink.begin(SinkConfig {
                width: self.config.canvas.width,
                height: self.config.canvas.height,
                fps: self.config.fps,
                audio,
            })?;
            Some(sink)
        } else {
            None
        };
        let mut synth = AmbientSynth::new();
        if audio.is_some() && sink.is_some() {
            synth.start()?;
        }
        let mut gif =
            (format == ExportFormat::Gif).then(|| GifExportJob::new(self.config.gif.clone()));

        let stop = player.stop_handle();
        let close = self.close.clone();
        let mut next_idx = 0u64;
        let mut samples_sent = 0u64;
        let outcome = player.play(
            |surface, step| {
                if close.is_requested() {
                    stop.stop();
                    return Ok(());
                }
                if let Some(sink) = sink.as_mut() {
                    sink.push_frame(FrameIndex(next_idx), &surface.snapshot())?;
                    if let Some(mut stream) = synth.stream() {
                        let due = (step.elapsed.as_secs_f64() * f64::from(SAMPLE_RATE)) as u64;
                        let frames = due.saturating_sub(samples_sent);
                        samples_sent += frames;
                        sink.push_audio(&stream.take_frames(frames as usize))?;
                    }
                }
                next_idx += 1;
                if let Some(job) = gif.as_mut() {
                    job.offer(step.progress, surface)?;
                }
                on_progress((step.progress * 100.0).round().clamp(0.0, 100.0) as u8);
                Ok(())
            },
            || tracing::debug!("recording playback complete"),
        )?;
        synth.stop();

        if outcome == PlaybackOutcome::Stopped {
            return Err(ReelError::evaluation("recording interrupted before completion"));
        }

        let video_blob = match sink.as_mut() {
            Some(sink) => Some(sink.end()?),
            None => None,
        };
        drop(sink);

        let (blob, fell_back_to_video) = match gif {
            None => match video_blob {
                Some(blob) => (blob, false),
                None => {
                    return Err(ReelError::unsupported(
                        "video recording is not supported on this system",
                    ));
                }
            },
            Some(job) => {
                let delay = job.frame_delay_ms();
                let converted = GifConverter::new(&self.config.gif, self.gif_encoder)
                    .convert(&job.into_frames(), delay);
                match (converted, video_blob) {
                    (Ok(blob), _) => (blob, false),
                    (Err(e), Some(video)) => {
                        tracing::warn!(
                            error = %e,
                            "gif conversion failed; delivering video instead"
                        );
                        (video, true)
                    }
                    (Err(e), None) => return Err(e),
                }
            }
        };

        let payload = SharePayload::for_reel(&data, blob, chrono::Utc::now().timestamp_millis());
        let delivery = self.delivery.deliver(&payload)?;
        Ok(ExportReport {
            requested: format,
            blob: payload.blob,
            fell_back_to_video,
            delivery,
        })
    }
}

impl Drop for ShareSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/share/session.rs"]
mod tests;
