//! Wrapreel renders a year-in-review highlight reel and exports it for sharing.
//!
//! A reel is a fixed-length animation built from a [`ReelInput`] payload:
//!
//! - Compose each frame as a display list and rasterize it on the CPU ([`Compositor`])
//! - Drive playback from a frame clock with cooperative stop ([`ReelPlayer`])
//! - Capture video through the system `ffmpeg` or an animated GIF ([`VideoCapture`],
//!   [`GifConverter`])
//! - Run the preview/export/share lifecycle ([`ShareSession`])
#![forbid(unsafe_code)]

mod foundation;

/// Procedural ambient audio.
pub mod audio;
/// Video and animated-image export.
pub mod capture;
pub mod compose;
/// Input payload and configuration.
pub mod model;
/// CPU rasterization, fonts and frame buffers.
pub mod render;
pub mod share;
pub mod timeline;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgba8};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::audio::synth::{AmbientSynth, AudioStream, SynthState};
pub use crate::capture::codec::{CodecProbe, Container, VideoFormat};
pub use crate::capture::gif::{
    AnimatedImageEncoder, EncoderProvider, GifConverter, GifExportJob, GifSampler, LazyEncoder,
    shared_gif_encoder,
};
pub use crate::capture::sink::{AudioFormat, Blob, FrameSink, InMemorySink, SinkConfig};
pub use crate::capture::video::{FfmpegVideoBackend, VideoBackend, VideoCapture, VideoCaptureOpts};
pub use crate::compose::compositor::{ComposeOptions, Compositor, compose_frame};
pub use crate::compose::scene::{DrawOp, FrameMeta, FrameScene};
pub use crate::model::config::{ClockMode, FontPaths, GifBackendKind, GifSettings, ReelConfig};
pub use crate::model::input::{MonthEntry, ReelInput, StatEntry, StatValue};
pub use crate::render::fonts::FontBook;
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::share::delivery::{
    CommandShare, Delivery, DeliveryOutcome, NativeShare, ShareError, SharePayload,
};
pub use crate::share::session::{
    CloseHandle, ExportFormat, ExportReport, PreviewStatus, ShareSession, ShareState,
};
pub use crate::timeline::clock::{FrameClock, RealtimeClock, SteppedClock, clock_for};
pub use crate::timeline::phase::{Phase, phase_at};
pub use crate::timeline::player::{FrameStep, PlaybackOutcome, ReelPlayer, StepOutcome};
pub use crate::timeline::scheduler::{PlaybackState, SessionId, StopHandle, Timeline};
