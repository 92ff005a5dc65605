use std::io::{Read, Write as _};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::capture::sink::Blob;
use crate::capture::video::is_ffmpeg_on_path;
use crate::compose::palette;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::config::{GifBackendKind, GifSettings};
use crate::render::surface::{FrameRGBA, Surface};

pub const GIF_MIME: &str = "image/gif";

/// Turns a run of equally sized frames into one animated image.
pub trait AnimatedImageEncoder: Send + Sync {
    fn name(&self) -> &'static str;
    fn encode(&self, frames: &[FrameRGBA], frame_delay_ms: u32) -> ReelResult<Blob>;
}

/// Loads an [`AnimatedImageEncoder`] on demand.
pub trait EncoderProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn load(&self) -> ReelResult<Arc<dyn AnimatedImageEncoder>>;
}

/// GIF encoder from the `image` crate. Always available.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinGifEncoder;

impl AnimatedImageEncoder for BuiltinGifEncoder {
    fn name(&self) -> &'static str {
        "builtin"
    }

    #[tracing::instrument(skip_all, fields(frames = frames.len()))]
    fn encode(&self, frames: &[FrameRGBA], frame_delay_ms: u32) -> ReelResult<Blob> {
        use image::codecs::gif::{GifEncoder, Repeat};
        use image::{Delay, Frame};

        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut out, 10);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| ReelError::encoder(format!("gif encoder setup failed: {e}")))?;
            for frame in frames {
                let img = frame.to_rgba_image()?;
                let delay = Delay::from_numer_denom_ms(frame_delay_ms, 1);
                encoder
                    .encode_frame(Frame::from_parts(img, 0, 0, delay))
                    .map_err(|e| ReelError::encoder(format!("gif frame encode failed: {e}")))?;
            }
        }
        if out.is_empty() {
            return Err(ReelError::encoder("gif encoder produced no output"));
        }
        Ok(Blob::new(GIF_MIME, out))
    }
}

/// GIF encoder backed by the system `ffmpeg` with a generated palette.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegGifEncoder;

impl AnimatedImageEncoder for FfmpegGifEncoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    #[tracing::instrument(skip_all, fields(frames = frames.len()))]
    fn encode(&self, frames: &[FrameRGBA], frame_delay_ms: u32) -> ReelResult<Blob> {
        let Some(first) = frames.first() else {
            return Err(ReelError::validation("gif export requires at least one frame"));
        };
        let (width, height) = (first.width, first.height);
        if frames.iter().any(|f| f.width != width || f.height != height) {
            return Err(ReelError::validation("gif frames must share one size"));
        }

        let mut child = Command::new("ffmpeg")
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{width}x{height}"),
                "-framerate",
                &format!("1000/{}", frame_delay_ms.max(1)),
                "-i",
                "pipe:0",
                "-filter_complex",
                "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
                "-loop",
                "0",
                "-f",
                "gif",
                "pipe:1",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReelError::encoder(format!("failed to spawn ffmpeg for gif: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encoder("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::encoder("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encoder("failed to open ffmpeg stderr (unexpected)"))?;
        let reader = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stdout.read_to_end(&mut bytes).map(|_| bytes)
        });
        let drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = stderr.read_to_end(&mut bytes);
            bytes
        });

        let mut scratch = Vec::new();
        let mut write_err = None;
        for frame in frames {
            frame.flatten_over(palette::BACKGROUND, &mut scratch)?;
            if let Err(e) = stdin.write_all(&scratch) {
                write_err = Some(e);
                break;
            }
        }
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| ReelError::encoder(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let bytes = reader
            .join()
            .map_err(|_| ReelError::encoder("ffmpeg stdout reader thread panicked"))?
            .map_err(|e| ReelError::encoder(format!("ffmpeg stdout read failed: {e}")))?;
        let stderr_bytes = drain.join().unwrap_or_default();

        if !status.success() {
            return Err(ReelError::encoder(format!(
                "ffmpeg gif encode exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        if let Some(e) = write_err {
            return Err(ReelError::encoder(format!(
                "failed to write frame to ffmpeg stdin: {e}"
            )));
        }
        if bytes.is_empty() {
            return Err(ReelError::encoder("gif encoder produced no output"));
        }
        Ok(Blob::new(GIF_MIME, bytes))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinProvider;

impl EncoderProvider for BuiltinProvider {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn load(&self) -> ReelResult<Arc<dyn AnimatedImageEncoder>> {
        Ok(Arc::new(BuiltinGifEncoder))
    }
}

/// Fails to load when `ffmpeg` is not on `PATH`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegProvider;

impl EncoderProvider for FfmpegProvider {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn load(&self) -> ReelResult<Arc<dyn AnimatedImageEncoder>> {
        if !is_ffmpeg_on_path() {
            return Err(ReelError::resource_load(
                "ffmpeg gif encoder unavailable: ffmpeg not found on PATH",
            ));
        }
        Ok(Arc::new(FfmpegGifEncoder))
    }
}

/// An encoder loaded at most once.
///
/// A successful load is cached for the lifetime of the value; a failed load is reported to the
/// caller and retried on the next call.
pub struct LazyEncoder {
    provider: Box<dyn EncoderProvider>,
    slot: Mutex<Option<Arc<dyn AnimatedImageEncoder>>>,
    attempts: AtomicUsize,
}

impl std::fmt::Debug for LazyEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyEncoder")
            .field("provider", &self.provider.name())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl LazyEncoder {
    pub fn new(provider: impl EncoderProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            slot: Mutex::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of times the provider has been asked to load.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn ensure_loaded(&self) -> ReelResult<Arc<dyn AnimatedImageEncoder>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(encoder) = slot.as_ref() {
            return Ok(Arc::clone(encoder));
        }
        self.attempts.fetch_add(1, Ordering::Relaxed);
        match self.provider.load() {
            Ok(encoder) => {
                tracing::debug!(provider = self.provider.name(), "gif encoder loaded");
                *slot = Some(Arc::clone(&encoder));
                Ok(encoder)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "gif encoder load failed"
                );
                Err(match e {
                    ReelError::ResourceLoad(_) => e,
                    other => ReelError::resource_load(other.to_string()),
                })
            }
        }
    }
}

/// Process-wide encoder for `kind`, shared by every export.
pub fn shared_gif_encoder(kind: GifBackendKind) -> &'static LazyEncoder {
    static BUILTIN: OnceLock<LazyEncoder> = OnceLock::new();
    static FFMPEG: OnceLock<LazyEncoder> = OnceLock::new();
    match kind {
        GifBackendKind::Builtin => BUILTIN.get_or_init(|| LazyEncoder::new(BuiltinProvider)),
        GifBackendKind::Ffmpeg => FFMPEG.get_or_init(|| LazyEncoder::new(FfmpegProvider)),
    }
}

/// Picks which rendered frames are kept for the animated image.
///
/// Progress is split into `max_frames` equal slots and the first frame landing in each slot is
/// kept, so spacing follows playback progress rather than the refresh rate.
#[derive(Clone, Debug)]
pub struct GifSampler {
    max_frames: usize,
    last_slot: Option<usize>,
}

impl GifSampler {
    pub fn new(max_frames: usize) -> Self {
        Self {
            max_frames,
            last_slot: None,
        }
    }

    pub fn should_capture(&mut self, progress: f64) -> bool {
        if self.max_frames == 0 || !progress.is_finite() {
            return false;
        }
        let slot = (progress.clamp(0.0, 1.0) * self.max_frames as f64).floor() as usize;
        if slot >= self.max_frames {
            return false;
        }
        if self.last_slot.is_some_and(|last| slot <= last) {
            return false;
        }
        self.last_slot = Some(slot);
        true
    }
}

/// Frames collected during one recording pass for animated-image export.
#[derive(Debug)]
pub struct GifExportJob {
    settings: GifSettings,
    sampler: GifSampler,
    frames: Vec<FrameRGBA>,
}

impl GifExportJob {
    pub fn new(settings: GifSettings) -> Self {
        Self {
            sampler: GifSampler::new(settings.max_frames),
            frames: Vec::new(),
            settings,
        }
    }

    /// Snapshot `surface` when `progress` opens a new sample slot. Snapshots are downscaled to
    /// the export size right away.
    pub fn offer(&mut self, progress: f64, surface: &Surface) -> ReelResult<bool> {
        if self.frames.len() >= self.settings.max_frames || !self.sampler.should_capture(progress) {
            return Ok(false);
        }
        let frame = surface
            .snapshot()
            .resized(self.settings.width, self.settings.height)?;
        self.frames.push(frame);
        Ok(true)
    }

    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    pub fn frame_delay_ms(&self) -> u32 {
        self.settings.frame_delay_ms
    }

    pub fn into_frames(self) -> Vec<FrameRGBA> {
        self.frames
    }
}

/// Downscales and encodes captured frames through a [`LazyEncoder`].
#[derive(Debug)]
pub struct GifConverter<'a> {
    settings: GifSettings,
    encoder: &'a LazyEncoder,
}

impl<'a> GifConverter<'a> {
    pub fn new(settings: &GifSettings, encoder: &'a LazyEncoder) -> Self {
        Self {
            settings: settings.clone(),
            encoder,
        }
    }

    #[tracing::instrument(skip_all, fields(input = frames.len()))]
    pub fn convert(&self, frames: &[FrameRGBA], frame_delay_ms: u32) -> ReelResult<Blob> {
        if frames.is_empty() {
            return Err(ReelError::validation("gif export requires at least one frame"));
        }
        let encoder = self.encoder.ensure_loaded()?;
        let resized = subsample_indices(frames.len(), self.settings.max_frames)
            .map(|i| frames[i].resized(self.settings.width, self.settings.height))
            .collect::<ReelResult<Vec<_>>>()?;
        tracing::debug!(
            encoder = encoder.name(),
            frames = resized.len(),
            "encoding animated image"
        );
        encoder.encode(&resized, frame_delay_ms)
    }
}

/// Up to `cap` indices into `0..len`, evenly spread and increasing.
fn subsample_indices(len: usize, cap: usize) -> impl Iterator<Item = usize> {
    let take = len.min(cap);
    (0..take).map(move |i| if len <= cap { i } else { i * len / take })
}

#[cfg(test)]
#[path = "../../tests/unit/capture/gif.rs"]
mod tests;
