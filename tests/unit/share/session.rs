use super::*;

use crate::capture::gif::{AnimatedImageEncoder, EncoderProvider};
use crate::capture::sink::InMemorySink;
use crate::foundation::core::Fps;
use crate::model::config::GifSettings;
use crate::render::surface::FrameRGBA;

struct MemorySink(InMemorySink);

impl FrameSink for MemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.0.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        self.0.push_frame(idx, frame)
    }

    fn push_audio(&mut self, samples: &[f32]) -> ReelResult<()> {
        self.0.push_audio(samples)
    }

    fn end(&mut self) -> ReelResult<Blob> {
        let raw = self.0.end()?;
        Ok(Blob::new("video/webm", raw.bytes().to_vec()))
    }
}

struct MemoryVideo {
    supported: bool,
}

impl VideoBackend for MemoryVideo {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn mime(&self) -> &'static str {
        "video/webm"
    }

    fn create(&self, _bitrate: u32) -> ReelResult<Box<dyn FrameSink>> {
        Ok(Box::new(MemorySink(InMemorySink::new())))
    }
}

struct BrokenProvider;

impl EncoderProvider for BrokenProvider {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn load(&self) -> ReelResult<Arc<dyn AnimatedImageEncoder>> {
        Err(ReelError::resource_load("encoder script failed to load"))
    }
}

fn config() -> ReelConfig {
    ReelConfig {
        canvas: Canvas::new(32, 18).unwrap(),
        preview: Canvas::new(16, 10).unwrap(),
        fps: Fps::new(10, 1).unwrap(),
        duration_ms: 1000,
        gif: GifSettings {
            width: 8,
            height: 6,
            max_frames: 4,
            ..GifSettings::default()
        },
        ..ReelConfig::default()
    }
}

fn session(dir: &std::path::Path, supported: bool) -> ShareSession {
    ShareSession::new(
        config(),
        Arc::new(FontBook::empty()),
        Box::new(MemoryVideo { supported }),
        Delivery::to_dir(dir),
    )
    .unwrap()
}

#[test]
fn preview_runs_and_offers_replay() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path(), true);
    assert_eq!(s.preview_frame().unwrap(), PreviewStatus::Inactive);

    s.open(ReelInput::default()).unwrap();
    assert_eq!(s.state(), ShareState::Previewing);
    assert_eq!(s.preview_surface().unwrap().canvas(), Canvas::new(16, 10).unwrap());

    let mut frames = 0;
    let status = loop {
        match s.preview_frame().unwrap() {
            PreviewStatus::Frame { .. } => frames += 1,
            other => break other,
        }
    };
    assert_eq!(status, PreviewStatus::ReplayAvailable);
    assert_eq!(frames, 10);
    assert_eq!(s.preview_frame().unwrap(), PreviewStatus::Inactive);

    s.start_preview().unwrap();
    assert_eq!(
        s.preview_frame().unwrap(),
        PreviewStatus::Frame { progress: 0.0 }
    );
}

#[test]
fn video_export_reports_progress_and_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path(), true);
    s.open(ReelInput::default()).unwrap();

    let mut progress = Vec::new();
    let report = s.start_recording(|p| progress.push(p)).unwrap().clone();
    assert_eq!(s.state(), ShareState::Idle);
    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|w| w[1] >= w[0]));

    assert_eq!(report.requested, ExportFormat::Video);
    assert!(!report.fell_back_to_video);
    assert_eq!(report.blob.len(), 11 * 32 * 18 * 4);
    let DeliveryOutcome::Downloaded(path) = &report.delivery else {
        panic!("expected download");
    };
    assert!(path.extension().is_some_and(|e| e == "webm"));
    assert!(path.exists());
}

#[test]
fn gif_export_without_video_support() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path(), false);
    s.open(ReelInput::default()).unwrap();
    s.set_format(ExportFormat::Gif);

    let report = s.start_recording(|_| {}).unwrap();
    assert_eq!(report.blob.mime(), "image/gif");
    assert!(!report.fell_back_to_video);
}

#[test]
fn video_export_requires_support() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path(), false);
    s.open(ReelInput::default()).unwrap();
    assert!(!s.video_supported());
    assert!(matches!(
        s.start_recording(|_| {}),
        Err(ReelError::Unsupported(_))
    ));
    assert_eq!(s.state(), ShareState::Previewing);
}

#[test]
fn failed_gif_falls_back_to_video() {
    let dir = tempfile::tempdir().unwrap();
    let broken: &'static LazyEncoder = Box::leak(Box::new(LazyEncoder::new(BrokenProvider)));
    let mut s = session(dir.path(), true).with_gif_encoder(broken);
    s.open(ReelInput::default()).unwrap();
    s.set_format(ExportFormat::Gif);

    let report = s.start_recording(|_| {}).unwrap();
    assert!(report.fell_back_to_video);
    assert_eq!(report.requested, ExportFormat::Gif);
    assert_eq!(report.blob.mime(), "video/webm");
}

#[test]
fn close_handle_interrupts_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path(), true);
    s.open(ReelInput::default()).unwrap();
    let handle = s.close_handle();

    let err = s
        .start_recording(|p| {
            if p >= 50 {
                handle.close();
            }
        })
        .unwrap_err();
    assert!(matches!(err, ReelError::Evaluation(_)));
    assert_eq!(s.state(), ShareState::Closed);
    assert!(s.preview_surface().is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn close_is_idempotent_and_blocks_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path(), true);
    s.open(ReelInput::default()).unwrap();
    s.close();
    s.close();
    assert_eq!(s.state(), ShareState::Closed);
    assert!(s.start_recording(|_| {}).is_err());
    assert!(s.start_preview().is_err());
}
