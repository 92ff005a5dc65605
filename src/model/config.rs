use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// How the frame clock advances during a recording pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// Advance exactly one frame interval per refresh, as fast as frames render.
    #[default]
    Stepped,
    /// Pace refreshes to wall-clock time.
    Realtime,
}

/// Which animated-image encoder backend to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GifBackendKind {
    /// In-process encoder from the `image` crate.
    #[default]
    Builtin,
    /// System `ffmpeg` with palette generation.
    Ffmpeg,
}

/// Animated-image export settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GifSettings {
    pub width: u32,
    pub height: u32,
    /// Upper bound on captured frames per export.
    pub max_frames: usize,
    pub frame_delay_ms: u32,
    pub backend: GifBackendKind,
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            width: 480,
            height: 270,
            max_frames: 150,
            frame_delay_ms: 100,
            backend: GifBackendKind::Builtin,
        }
    }
}

/// Optional font files per text role. Unset roles fall back to system fonts.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontPaths {
    pub display: Option<PathBuf>,
    pub mono: Option<PathBuf>,
    pub body: Option<PathBuf>,
}

/// Top-level configuration for a reel instance and its exports.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Full-quality render target used for recording.
    pub canvas: Canvas,
    /// Downscaled render target used for the live preview.
    pub preview: Canvas,
    pub fps: Fps,
    pub duration_ms: u64,
    pub video_bitrate: u32,
    /// Mix the ambient synth into video exports.
    pub audio: bool,
    pub clock: ClockMode,
    pub watermark: String,
    pub fonts: FontPaths,
    pub gif: GifSettings,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1920,
                height: 1080,
            },
            preview: Canvas {
                width: 640,
                height: 360,
            },
            fps: Fps { num: 30, den: 1 },
            duration_ms: 30_000,
            video_bitrate: 5_000_000,
            audio: true,
            clock: ClockMode::Stepped,
            watermark: "prompt2wrapped".to_string(),
            fonts: FontPaths::default(),
            gif: GifSettings::default(),
        }
    }
}

impl ReelConfig {
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReelError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| ReelError::serde(format!("invalid config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn validate(&self) -> ReelResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        Canvas::new(self.preview.width, self.preview.height)?;
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p video output)",
            ));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if self.duration_ms == 0 {
            return Err(ReelError::validation("duration_ms must be non-zero"));
        }
        if self.video_bitrate == 0 {
            return Err(ReelError::validation("video_bitrate must be non-zero"));
        }
        if self.gif.width == 0 || self.gif.height == 0 {
            return Err(ReelError::validation("gif width/height must be non-zero"));
        }
        if self.gif.max_frames == 0 {
            return Err(ReelError::validation("gif max_frames must be non-zero"));
        }
        if self.gif.frame_delay_ms < 10 {
            return Err(ReelError::validation(
                "gif frame_delay_ms must be at least 10 (GIF delays are centiseconds)",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/config.rs"]
mod tests;
