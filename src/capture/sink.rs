use std::sync::Arc;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::FrameRGBA;

/// Immutable finished output: container bytes plus their MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    mime: String,
    bytes: Arc<[u8]>,
}

impl Blob {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Concatenate chunks in emission order.
    pub fn from_chunks(mime: impl Into<String>, chunks: Vec<Vec<u8>>) -> Self {
        Self::new(mime, chunks.concat())
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension for the MIME type, ignoring codec parameters.
    pub fn extension(&self) -> &'static str {
        let base = self.mime.split(';').next().unwrap_or_default().trim();
        match base {
            "video/webm" => "webm",
            "video/mp4" => "mp4",
            "image/gif" => "gif",
            "image/png" => "png",
            _ => "bin",
        }
    }
}

/// Raw PCM layout for sinks that accept audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Configuration provided to a [`FrameSink`] at the start of a capture.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Present when interleaved `f32` samples will be pushed alongside frames.
    pub audio: Option<AudioFormat>,
}

/// Consumer of rendered frames in playback order.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex`. A sink is
/// single-use: once `end` returns it cannot be restarted.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Interleaved samples matching `SinkConfig::audio`. Ignored by sinks without audio.
    fn push_audio(&mut self, _samples: &[f32]) -> ReelResult<()> {
        Ok(())
    }
    /// Flush and return the finished container. Never returns a partial blob.
    fn end(&mut self) -> ReelResult<Blob>;
}

/// In-memory sink for tests and debugging. `end` yields the raw frames back to back.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    audio_samples: usize,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn audio_samples(&self) -> usize {
        self.audio_samples
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if self.ended {
            return Err(ReelError::evaluation("sink already finished"));
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        if self.cfg.is_none() {
            return Err(ReelError::evaluation("sink not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(ReelError::evaluation("sink received out-of-order frame index"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn push_audio(&mut self, samples: &[f32]) -> ReelResult<()> {
        self.audio_samples += samples.len();
        Ok(())
    }

    fn end(&mut self) -> ReelResult<Blob> {
        if self.cfg.take().is_none() {
            return Err(ReelError::evaluation("sink not started"));
        }
        self.ended = true;
        let chunks = self.frames.iter().map(|(_, f)| f.data.clone()).collect();
        Ok(Blob::from_chunks("application/octet-stream", chunks))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/sink.rs"]
mod tests;
