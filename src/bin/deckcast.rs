use std::path::PathBuf;

use clap::{Parser, Subcommand};

use deckcast::{ConvertRequest, OutputSelection, VideoConfig, convert};

#[derive(Parser, Debug)]
#[command(name = "deckcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg` and `pdftoppm` on PATH).
    Video(VideoArgs),
    /// Render a self-contained interactive HTML slideshow.
    Html(HtmlArgs),
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Input PDF deck.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Narration clips named slide_<N>.mp3 or slide_<N>.wav.
    #[arg(long = "audio")]
    audio: Vec<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Rasterization oversampling factor.
    #[arg(long, default_value_t = deckcast::RASTER_ZOOM)]
    zoom: f64,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,
}

#[derive(Parser, Debug)]
struct HtmlArgs {
    /// Input PDF deck.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Narration clips named slide_<N>.mp3 or slide_<N>.wav.
    #[arg(long = "audio")]
    audio: Vec<PathBuf>,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Also write a zip bundle (slideshow + usage note) at this path.
    #[arg(long)]
    bundle: Option<PathBuf>,

    /// Rasterization oversampling factor.
    #[arg(long, default_value_t = deckcast::RASTER_ZOOM)]
    zoom: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let report = match cli.cmd {
        Command::Video(args) => {
            let mut req = ConvertRequest::new(&args.in_path);
            req.audio_paths = args.audio;
            req.zoom = args.zoom;
            req.video_config = VideoConfig {
                fps: args.fps,
                overwrite: args.overwrite,
                ..VideoConfig::default()
            };
            req.outputs = OutputSelection {
                video: Some(args.out),
                ..OutputSelection::default()
            };
            convert(&req)?
        }
        Command::Html(args) => {
            let mut req = ConvertRequest::new(&args.in_path);
            req.audio_paths = args.audio;
            req.zoom = args.zoom;
            req.outputs = OutputSelection {
                html: Some(args.out),
                bundle: args.bundle,
                ..OutputSelection::default()
            };
            convert(&req)?
        }
    };

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    for artifact in &report.artifacts {
        eprintln!("wrote {}", artifact.display());
    }
    Ok(())
}
