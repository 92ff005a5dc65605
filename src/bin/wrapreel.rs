use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use wrapreel::{
    ClockMode, CodecProbe, CommandShare, ComposeOptions, Compositor, Delivery, DeliveryOutcome,
    ExportFormat, FfmpegVideoBackend, FontBook, GifBackendKind, PreviewStatus, ReelConfig,
    ReelInput, ShareSession, Surface, VideoBackend as _, capture::codec::PREFERENCES,
};

#[derive(Parser, Debug)]
#[command(name = "wrapreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single still as a PNG.
    Frame(FrameArgs),
    /// Run the preview loop and write downscaled PNG snapshots.
    Preview(PreviewArgs),
    /// Record the reel as video or GIF and deliver it.
    Export(ExportArgs),
    /// Print which export formats this system supports.
    Probe,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Reel configuration JSON; unset fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the watermark text.
    #[arg(long)]
    watermark: Option<String>,

    /// Override how the frame clock advances.
    #[arg(long, value_enum)]
    clock: Option<ClockChoice>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Reel input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Playback progress in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Reel input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for PNG snapshots.
    #[arg(long)]
    out_dir: PathBuf,

    /// Keep every n-th preview frame.
    #[arg(long, default_value_t = 30)]
    every: u64,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Reel input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatChoice::Video)]
    format: FormatChoice,

    /// Directory the export is saved into.
    #[arg(long)]
    out_dir: PathBuf,

    /// Program that receives the exported file instead of saving it (exit code 130 = cancelled).
    #[arg(long)]
    share_cmd: Option<PathBuf>,

    /// Leave the ambient audio out of video exports.
    #[arg(long, default_value_t = false)]
    no_audio: bool,

    /// Animated-image encoder backend.
    #[arg(long, value_enum)]
    gif_backend: Option<GifBackendChoice>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Video,
    Gif,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClockChoice {
    Stepped,
    Realtime,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GifBackendChoice {
    Builtin,
    Ffmpeg,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Export(args) => cmd_export(args),
        Command::Probe => cmd_probe(),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<ReelConfig> {
    let mut cfg = match &args.config {
        Some(path) => ReelConfig::from_path(path)?,
        None => ReelConfig::default(),
    };
    if let Some(watermark) = &args.watermark {
        cfg.watermark.clone_from(watermark);
    }
    if let Some(clock) = args.clock {
        cfg.clock = match clock {
            ClockChoice::Stepped => ClockMode::Stepped,
            ClockChoice::Realtime => ClockMode::Realtime,
        };
    }
    Ok(cfg)
}

fn load_fonts(cfg: &ReelConfig) -> anyhow::Result<Arc<FontBook>> {
    Ok(Arc::new(FontBook::load(&cfg.fonts)?))
}

fn read_input(path: &Path) -> anyhow::Result<ReelInput> {
    ReelInput::from_path(path).with_context(|| format!("load reel input '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.at),
        "--at must be within [0, 1], got {}",
        args.at
    );
    let cfg = load_config(&args.config)?;
    cfg.validate()?;
    let data = read_input(&args.in_path)?;

    let mut surface = Surface::new(cfg.canvas)?;
    let options = ComposeOptions {
        watermark: cfg.watermark.clone(),
        ..ComposeOptions::default()
    };
    let mut compositor = Compositor::new(load_fonts(&cfg)?, options);
    let elapsed_ms = args.at * cfg.duration_ms as f64;
    let meta = compositor.render_frame(&mut surface, &data, elapsed_ms, args.at)?;
    tracing::debug!(?meta, "frame composed");

    surface.snapshot().save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.every > 0, "--every must be at least 1");
    let cfg = load_config(&args.config)?;
    let data = read_input(&args.in_path)?;
    let fonts = load_fonts(&cfg)?;

    let mut session = ShareSession::new(
        cfg,
        fonts,
        Box::new(FfmpegVideoBackend),
        Delivery::to_dir(&args.out_dir),
    )?;
    session.open(data)?;

    let mut index = 0u64;
    let mut written = 0usize;
    loop {
        let status = session.preview_frame()?;
        let last = !matches!(status, PreviewStatus::Frame { .. });
        if status == PreviewStatus::Inactive {
            break;
        }
        if (index.is_multiple_of(args.every) || last)
            && let Some(surface) = session.preview_surface()
        {
            let path = args.out_dir.join(format!("preview_{index:05}.png"));
            surface.snapshot().save_png(&path)?;
            written += 1;
        }
        if last {
            break;
        }
        index += 1;
    }
    session.close();

    eprintln!("wrote {written} preview frames to {}", args.out_dir.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.config)?;
    if args.no_audio {
        cfg.audio = false;
    }
    if let Some(backend) = args.gif_backend {
        cfg.gif.backend = match backend {
            GifBackendChoice::Builtin => GifBackendKind::Builtin,
            GifBackendChoice::Ffmpeg => GifBackendKind::Ffmpeg,
        };
    }
    let data = read_input(&args.in_path)?;
    let fonts = load_fonts(&cfg)?;

    let mut delivery = Delivery::to_dir(&args.out_dir);
    if let Some(program) = &args.share_cmd {
        delivery = delivery.with_share(CommandShare::new(program));
    }
    let mut session = ShareSession::new(cfg, fonts, Box::new(FfmpegVideoBackend), delivery)?;
    session.set_format(match args.format {
        FormatChoice::Video => ExportFormat::Video,
        FormatChoice::Gif => ExportFormat::Gif,
    });
    session.open(data)?;

    let mut reported = None;
    let report = session.start_recording(|pct| {
        let decile = pct / 10;
        if reported != Some(decile) {
            reported = Some(decile);
            tracing::info!("recording {pct}%");
        }
    })?;

    if report.fell_back_to_video {
        eprintln!("GIF conversion failed, delivered video instead");
    }
    match &report.delivery {
        DeliveryOutcome::Downloaded(path) => eprintln!("wrote {}", path.display()),
        DeliveryOutcome::Shared => eprintln!("shared {} bytes", report.blob.len()),
        DeliveryOutcome::Cancelled => eprintln!("share cancelled"),
    }
    Ok(())
}

fn cmd_probe() -> anyhow::Result<()> {
    let probe = CodecProbe::detect();
    println!("ffmpeg: {}", if probe.ffmpeg_available() { "yes" } else { "no" });
    for format in PREFERENCES {
        let supported = probe.is_type_supported(&format);
        println!("{:<32} {}", format.mime, if supported { "yes" } else { "no" });
    }
    let backend = FfmpegVideoBackend;
    if backend.is_supported() {
        println!("video export: {}", backend.mime());
    } else {
        println!("video export: unsupported");
    }
    if probe.ffmpeg_available() {
        println!("gif export: builtin, ffmpeg");
    } else {
        println!("gif export: builtin");
    }
    Ok(())
}
