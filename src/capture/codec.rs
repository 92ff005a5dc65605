use std::collections::BTreeSet;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// Output container of a video capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    WebM,
    Mp4,
}

impl Container {
    pub fn mime(self) -> &'static str {
        match self {
            Self::WebM => "video/webm",
            Self::Mp4 => "video/mp4",
        }
    }

    /// Muxer name passed to `ffmpeg -f`.
    pub fn muxer(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

/// Container/codec pair a capture can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VideoFormat {
    pub container: Container,
    /// Full MIME type including codec parameters.
    pub mime: &'static str,
    /// `ffmpeg` encoder name; `None` leaves the choice to the muxer's default.
    pub encoder: Option<&'static str>,
}

pub const WEBM_VP9: VideoFormat = VideoFormat {
    container: Container::WebM,
    mime: "video/webm;codecs=vp9",
    encoder: Some("libvpx-vp9"),
};

pub const WEBM_VP8: VideoFormat = VideoFormat {
    container: Container::WebM,
    mime: "video/webm;codecs=vp8",
    encoder: Some("libvpx"),
};

pub const MP4_H264: VideoFormat = VideoFormat {
    container: Container::Mp4,
    mime: "video/mp4;codecs=avc1",
    encoder: Some("libx264"),
};

/// Generic container used when no preferred codec is available.
pub const WEBM_DEFAULT: VideoFormat = VideoFormat {
    container: Container::WebM,
    mime: "video/webm",
    encoder: None,
};

/// Most efficient first.
pub const PREFERENCES: [VideoFormat; 3] = [WEBM_VP9, WEBM_VP8, MP4_H264];

/// What the local `ffmpeg` can encode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodecProbe {
    ffmpeg_available: bool,
    encoders: BTreeSet<String>,
}

impl CodecProbe {
    /// Probe the system `ffmpeg` once per process.
    pub fn detect() -> &'static CodecProbe {
        static PROBE: OnceLock<CodecProbe> = OnceLock::new();
        PROBE.get_or_init(|| {
            let out = Command::new("ffmpeg")
                .args(["-hide_banner", "-encoders"])
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output();
            let probe = match out {
                Ok(out) if out.status.success() => {
                    Self::from_encoder_listing(&String::from_utf8_lossy(&out.stdout))
                }
                Ok(out) => {
                    tracing::warn!(status = %out.status, "ffmpeg -encoders failed");
                    Self::default()
                }
                Err(e) => {
                    tracing::debug!("ffmpeg not available: {e}");
                    Self::default()
                }
            };
            tracing::debug!(
                ffmpeg = probe.ffmpeg_available,
                encoders = probe.encoders.len(),
                "codec probe complete"
            );
            probe
        })
    }

    /// Parse the output of `ffmpeg -encoders`.
    pub fn from_encoder_listing(listing: &str) -> Self {
        let mut encoders = BTreeSet::new();
        let mut in_table = false;
        for line in listing.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("---") {
                in_table = true;
                continue;
            }
            if !in_table {
                continue;
            }
            let mut parts = trimmed.split_whitespace();
            let (Some(flags), Some(name)) = (parts.next(), parts.next()) else {
                continue;
            };
            if flags.len() == 6 && flags.starts_with(['V', 'A', 'S']) {
                encoders.insert(name.to_string());
            }
        }
        Self {
            ffmpeg_available: true,
            encoders,
        }
    }

    pub fn ffmpeg_available(&self) -> bool {
        self.ffmpeg_available
    }

    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }

    pub fn is_type_supported(&self, format: &VideoFormat) -> bool {
        self.ffmpeg_available && format.encoder.is_none_or(|e| self.has_encoder(e))
    }

    /// Whether video capture can run at all.
    pub fn is_supported(&self) -> bool {
        self.ffmpeg_available && PREFERENCES.iter().any(|f| self.is_type_supported(f))
    }

    /// First supported entry of [`PREFERENCES`], else [`WEBM_DEFAULT`].
    pub fn best_format(&self) -> VideoFormat {
        PREFERENCES
            .iter()
            .copied()
            .find(|f| self.is_type_supported(f))
            .unwrap_or(WEBM_DEFAULT)
    }

    /// Audio encoder to pair with `container`, if one is needed and known.
    pub fn audio_encoder_for(&self, container: Container) -> Option<&'static str> {
        match container {
            Container::Mp4 => Some("aac"),
            Container::WebM => ["libopus", "libvorbis"]
                .into_iter()
                .find(|e| self.has_encoder(e)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/codec.rs"]
mod tests;
