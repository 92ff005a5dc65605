use super::*;

use crate::foundation::core::{Canvas, Rgba8};

fn solid(width: u32, height: u32, v: u8) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: [v, v, v, 255].repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn settings(max_frames: usize) -> GifSettings {
    GifSettings {
        width: 16,
        height: 9,
        max_frames,
        frame_delay_ms: 100,
        backend: GifBackendKind::Builtin,
    }
}

struct CountingProvider {
    fail_first: AtomicUsize,
}

impl EncoderProvider for CountingProvider {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn load(&self) -> ReelResult<Arc<dyn AnimatedImageEncoder>> {
        if self.fail_first.load(Ordering::Relaxed) > 0 {
            self.fail_first.fetch_sub(1, Ordering::Relaxed);
            return Err(ReelError::encoder("script error"));
        }
        Ok(Arc::new(BuiltinGifEncoder))
    }
}

fn decode_frames(bytes: &[u8]) -> Vec<image::Frame> {
    use image::AnimationDecoder as _;

    let decoder = image::codecs::gif::GifDecoder::new(std::io::Cursor::new(bytes)).unwrap();
    decoder.into_frames().collect_frames().unwrap()
}

#[test]
fn sampler_keeps_one_frame_per_progress_slot() {
    let mut sampler = GifSampler::new(10);
    let kept = (0..=900)
        .map(|i| f64::from(i) / 900.0)
        .filter(|&p| sampler.should_capture(p))
        .count();
    assert_eq!(kept, 10);
}

#[test]
fn sampler_is_bounded_with_sparse_progress() {
    let mut sampler = GifSampler::new(150);
    let kept = [0.0, 0.5, 0.5, 0.99, 1.0]
        .into_iter()
        .filter(|&p| sampler.should_capture(p))
        .count();
    assert_eq!(kept, 3);
}

#[test]
fn sampler_ignores_regressing_progress() {
    let mut sampler = GifSampler::new(4);
    assert!(sampler.should_capture(0.6));
    assert!(!sampler.should_capture(0.1));
    assert!(sampler.should_capture(0.8));
}

#[test]
fn subsample_spreads_evenly() {
    assert_eq!(subsample_indices(3, 5).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(subsample_indices(10, 5).collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
}

#[test]
fn lazy_encoder_loads_once() {
    let lazy = LazyEncoder::new(CountingProvider {
        fail_first: AtomicUsize::new(0),
    });
    assert!(!lazy.is_loaded());
    lazy.ensure_loaded().unwrap();
    lazy.ensure_loaded().unwrap();
    assert!(lazy.is_loaded());
    assert_eq!(lazy.load_attempts(), 1);
}

#[test]
fn lazy_encoder_retries_after_failure() {
    let lazy = LazyEncoder::new(CountingProvider {
        fail_first: AtomicUsize::new(1),
    });
    let err = lazy.ensure_loaded().err().unwrap();
    assert!(matches!(err, ReelError::ResourceLoad(_)));
    assert!(!lazy.is_loaded());
    lazy.ensure_loaded().unwrap();
    assert_eq!(lazy.load_attempts(), 2);
}

#[test]
fn shared_encoder_is_process_wide() {
    let a = shared_gif_encoder(GifBackendKind::Builtin);
    let b = shared_gif_encoder(GifBackendKind::Builtin);
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.provider_name(), "builtin");
}

#[test]
fn convert_rejects_empty_input() {
    let lazy = LazyEncoder::new(BuiltinProvider);
    let converter = GifConverter::new(&settings(4), &lazy);
    assert!(matches!(
        converter.convert(&[], 100),
        Err(ReelError::Validation(_))
    ));
    assert!(!lazy.is_loaded());
}

#[test]
fn convert_caps_and_resizes() {
    let lazy = LazyEncoder::new(BuiltinProvider);
    let converter = GifConverter::new(&settings(4), &lazy);
    let frames: Vec<_> = (0..12u8).map(|i| solid(32, 18, i * 20)).collect();

    let blob = converter.convert(&frames, 100).unwrap();
    assert_eq!(blob.mime(), GIF_MIME);
    assert_eq!(blob.extension(), "gif");

    let decoded = decode_frames(blob.bytes());
    assert_eq!(decoded.len(), 4);
    for frame in &decoded {
        assert_eq!(frame.buffer().dimensions(), (16, 9));
    }
}

#[test]
fn export_job_downscales_at_capture() {
    let mut surface = Surface::new(Canvas::new(64, 36).unwrap()).unwrap();
    surface.clear(Rgba8::rgb(0x336699));
    let mut job = GifExportJob::new(settings(3));
    let mut kept = 0;
    for i in 0..=30 {
        if job.offer(f64::from(i) / 30.0, &surface).unwrap() {
            kept += 1;
        }
    }
    assert_eq!(kept, 3);
    assert!(job.frames().iter().all(|f| (f.width, f.height) == (16, 9)));
    assert_eq!(job.frame_delay_ms(), 100);
}
