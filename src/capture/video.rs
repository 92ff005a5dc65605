use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::capture::codec::{CodecProbe, Container, VideoFormat};
use crate::compose::palette;
use crate::capture::sink::{AudioFormat, Blob, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::FrameRGBA;

/// Read size for encoded output; about 100 ms of video at the default bitrate.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Options for [`VideoCapture`].
#[derive(Clone, Debug)]
pub struct VideoCaptureOpts {
    pub format: VideoFormat,
    /// Target video bitrate in bits per second.
    pub bitrate: u32,
    /// Background used to flatten alpha.
    pub background: Rgba8,
}

impl VideoCaptureOpts {
    pub fn new(format: VideoFormat, bitrate: u32) -> Self {
        Self {
            format,
            bitrate,
            background: palette::BACKGROUND,
        }
    }
}

type ChunkReader = JoinHandle<std::io::Result<Vec<Vec<u8>>>>;

/// Streams raw frames into the system `ffmpeg` and collects the encoded container from its
/// stdout as ordered chunks.
///
/// Audio pushed during capture is buffered and muxed in after the video stream closes.
pub struct VideoCapture {
    opts: VideoCaptureOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_reader: Option<ChunkReader>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    audio: Vec<f32>,
    finished: bool,
}

impl std::fmt::Debug for VideoCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoCapture")
            .field("opts", &self.opts)
            .field("running", &self.child.is_some())
            .field("last_idx", &self.last_idx)
            .finish_non_exhaustive()
    }
}

impl VideoCapture {
    pub fn new(opts: VideoCaptureOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_reader: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            audio: Vec::new(),
            finished: false,
        }
    }

    /// `true` when the local runtime can record video at all.
    pub fn is_supported() -> bool {
        CodecProbe::detect().is_supported()
    }

    pub fn format(&self) -> VideoFormat {
        self.opts.format
    }

    /// Kill the encoder without producing output.
    pub fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.stdout_reader = None;
        self.stderr_drain = None;
        self.cfg = None;
        self.finished = true;
    }

    fn video_args(&self, cfg: &SinkConfig, cmd: &mut Command) {
        let format = self.opts.format;
        cmd.args(["-an"]);
        if let Some(encoder) = format.encoder {
            cmd.args(["-c:v", encoder]);
            if encoder.starts_with("libvpx") {
                cmd.args(["-deadline", "realtime", "-cpu-used", "8"]);
            }
        }
        cmd.args([
            "-b:v",
            &self.opts.bitrate.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-g",
            &gop_len(cfg.fps).to_string(),
        ]);
        if format.container == Container::Mp4 {
            cmd.args(["-movflags", "frag_keyframe+empty_moov"]);
        }
        cmd.args(["-f", format.container.muxer(), "pipe:1"]);
    }

    fn mux_audio(&self, video: Vec<u8>, audio: AudioFormat) -> ReelResult<Vec<u8>> {
        use anyhow::Context as _;

        let container = self.opts.format.container;
        let mut video_file = tempfile::Builder::new()
            .suffix(&format!(".{}", container.muxer()))
            .tempfile()
            .context("create temporary video file")?;
        video_file
            .write_all(&video)
            .context("write temporary video file")?;
        let mut audio_file = tempfile::Builder::new()
            .suffix(".f32le")
            .tempfile()
            .context("create temporary audio file")?;
        let pcm: Vec<u8> = self.audio.iter().flat_map(|s| s.to_le_bytes()).collect();
        audio_file
            .write_all(&pcm)
            .context("write temporary audio file")?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error", "-i"])
            .arg(video_file.path())
            .args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(audio_file.path())
            .args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy"]);
        if let Some(enc) = CodecProbe::detect().audio_encoder_for(container) {
            cmd.args(["-c:a", enc]);
        }
        if container == Container::Mp4 {
            cmd.args(["-movflags", "frag_keyframe+empty_moov"]);
        }
        cmd.args(["-shortest", "-f", container.muxer(), "pipe:1"]);

        let out = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ReelError::encoder(format!("failed to spawn ffmpeg for audio mux: {e}")))?;
        if !out.status.success() {
            return Err(ReelError::encoder(format!(
                "ffmpeg audio mux exited with status {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(out.stdout)
    }
}

impl FrameSink for VideoCapture {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if self.finished || self.child.is_some() {
            return Err(ReelError::evaluation(
                "video capture is single-use; construct a new one per recording",
            ));
        }
        Fps::new(cfg.fps.num, cfg.fps.den)?;
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "video capture width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "video capture width/height must be even (required for yuv420p output)",
            ));
        }
        if let Some(audio) = cfg.audio
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(ReelError::validation(
                "audio sample_rate/channels must be non-zero when audio is enabled",
            ));
        }
        let probe = CodecProbe::detect();
        if !probe.is_type_supported(&self.opts.format) {
            return Err(ReelError::unsupported(format!(
                "no ffmpeg encoder for {}",
                self.opts.format.mime
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);
        self.video_args(&cfg, &mut cmd);

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::encoder(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
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

        self.stdout_reader = Some(std::thread::spawn(move || {
            let mut chunks = Vec::new();
            loop {
                let mut buf = vec![0u8; CHUNK_SIZE];
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(chunks);
                }
                buf.truncate(n);
                chunks.push(buf);
            }
        }));
        self.stderr_drain = Some(std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        }));

        tracing::debug!(
            mime = self.opts.format.mime,
            width = cfg.width,
            height = cfg.height,
            "video capture started"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::evaluation("video capture not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::evaluation(
                "video capture received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.last_idx = Some(idx);

        frame.flatten_over(self.opts.background, &mut self.scratch)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::evaluation("video capture is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn push_audio(&mut self, samples: &[f32]) -> ReelResult<()> {
        if self.cfg.as_ref().is_some_and(|c| c.audio.is_some()) {
            self.audio.extend_from_slice(samples);
        }
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    fn end(&mut self) -> ReelResult<Blob> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::evaluation("video capture not started"))?;
        self.finished = true;
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| ReelError::evaluation("video capture not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReelError::encoder(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let chunks = match self.stdout_reader.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encoder("ffmpeg stdout reader thread panicked"))?
                .map_err(|e| ReelError::encoder(format!("ffmpeg stdout read failed: {e}")))?,
            None => Vec::new(),
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encoder("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encoder(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            return Err(ReelError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        if chunks.is_empty() {
            return Err(ReelError::encoder("encoder produced no output"));
        }
        tracing::debug!(chunks = chunks.len(), "video stream closed");

        let mime = self.opts.format.container.mime();
        match cfg.audio {
            Some(audio) if !self.audio.is_empty() => {
                let muxed = self.mux_audio(chunks.concat(), audio)?;
                if muxed.is_empty() {
                    return Err(ReelError::encoder("audio mux produced no output"));
                }
                Ok(Blob::new(mime, muxed))
            }
            _ => Ok(Blob::from_chunks(mime, chunks)),
        }
    }
}

impl Drop for VideoCapture {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// Keyframe interval: two seconds of frames.
fn gop_len(fps: Fps) -> u64 {
    (fps.as_f64() * 2.0).round().max(1.0) as u64
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Source of per-recording video sinks.
pub trait VideoBackend: Send + Sync {
    fn is_supported(&self) -> bool;
    /// MIME type of the container the next sink will produce.
    fn mime(&self) -> &'static str;
    fn create(&self, bitrate: u32) -> ReelResult<Box<dyn FrameSink>>;
}

/// [`VideoCapture`] with the best format the local `ffmpeg` supports.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegVideoBackend;

impl VideoBackend for FfmpegVideoBackend {
    fn is_supported(&self) -> bool {
        VideoCapture::is_supported()
    }

    fn mime(&self) -> &'static str {
        CodecProbe::detect().best_format().container.mime()
    }

    fn create(&self, bitrate: u32) -> ReelResult<Box<dyn FrameSink>> {
        let format = CodecProbe::detect().best_format();
        Ok(Box::new(VideoCapture::new(VideoCaptureOpts::new(
            format, bitrate,
        ))))
    }
}
