use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use yoyplot::{
    CpuChartRenderer, Dataset, FrameCounter, FrameRenderer, Sequencer, VideoEncoder, YoyConfig,
};

#[derive(Parser, Debug)]
#[command(name = "yoyplot", version, about = "Animated year-over-year temperature chart")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every frame, then encode the video and add music (requires `ffmpeg` on PATH).
    Render(RunArgs),
    /// Render every frame into the image directory without encoding.
    Frames(RunArgs),
    /// Encode an existing image directory (requires `ffmpeg` on PATH).
    Encode(EncodeArgs),
    /// Render a single preview frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file; unset fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<f64>,

    /// Pixels per inch of the 9x5.5 in figure.
    #[arg(long)]
    dpi: Option<u32>,

    /// Animation length of each year in seconds.
    #[arg(long)]
    seconds: Option<f64>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<YoyConfig> {
        let mut cfg = match &self.config {
            Some(path) => YoyConfig::from_path(path)?,
            None => YoyConfig::default(),
        };
        if let Some(fps) = self.fps {
            cfg.fps = fps;
        }
        if let Some(dpi) = self.dpi {
            cfg.dpi = dpi;
        }
        if let Some(seconds) = self.seconds {
            cfg.seconds_per_year = seconds;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input CSV: a timestamp column and a temperature column.
    #[arg(long)]
    data: PathBuf,

    /// Number of years to animate (default: the whole dataset).
    #[arg(long)]
    years: Option<u32>,

    /// Image directory for the exported frames.
    #[arg(long)]
    images: Option<PathBuf>,

    /// Music track muxed into the final video.
    #[arg(long, conflicts_with = "no_audio")]
    audio: Option<PathBuf>,

    /// Stop after the silent video.
    #[arg(long)]
    no_audio: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Image directory holding the frames.
    #[arg(long)]
    images: Option<PathBuf>,

    /// Music track muxed into the final video.
    #[arg(long, conflicts_with = "no_audio")]
    audio: Option<PathBuf>,

    /// Stop after the silent video.
    #[arg(long)]
    no_audio: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input CSV: a timestamp column and a temperature column.
    #[arg(long)]
    data: PathBuf,

    /// Calendar year to draw.
    #[arg(long)]
    year: i32,

    /// Animation step of that year's curve (1-based).
    #[arg(long, default_value_t = 1)]
    step: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_run(args, true),
        Command::Frames(args) => cmd_run(args, false),
        Command::Encode(args) => cmd_encode(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_audio(cfg: &mut YoyConfig, audio: Option<PathBuf>, no_audio: bool) {
    if no_audio {
        cfg.audio_path = None;
    } else if audio.is_some() {
        cfg.audio_path = audio;
    }
}

fn load_dataset(path: &Path, cfg: &YoyConfig) -> anyhow::Result<Dataset> {
    let dataset = Dataset::from_csv_path(path, &cfg.data)
        .with_context(|| format!("load data '{}'", path.display()))?;
    if dataset.is_empty() {
        anyhow::bail!("data file '{}' has no usable rows", path.display());
    }
    if dataset.skipped_rows() > 0 {
        eprintln!("skipped {} rows without a usable value", dataset.skipped_rows());
    }
    Ok(dataset)
}

fn cmd_run(args: RunArgs, encode: bool) -> anyhow::Result<()> {
    let mut cfg = args.config.load()?;
    if args.years.is_some() {
        cfg.years = args.years;
    }
    if let Some(images) = args.images {
        cfg.image_dir = images;
    }
    apply_audio(&mut cfg, args.audio, args.no_audio);
    cfg.validate()?;

    let dataset = load_dataset(&args.data, &cfg)?;
    let mut seq = Sequencer::new(dataset, cfg.sequencer_opts()?)?;
    let added = match cfg.years {
        Some(n) => seq.add_years(n, cfg.seconds_per_year)?,
        None => seq.add_all_years(cfg.seconds_per_year)?,
    };
    if added == 0 {
        anyhow::bail!("no years with data to animate");
    }

    let frames = cfg.frame_dir();
    frames.prepare(cfg.clean_image_dir)?;
    let mut renderer = CpuChartRenderer::new(cfg.chart.clone(), cfg.dpi)?;

    if encode {
        let encoder = VideoEncoder::new(cfg.encode_opts()?);
        let (stats, out) = seq.generate(&mut renderer, &frames, &encoder)?;
        eprintln!(
            "rendered {} frames for {} years into {}",
            stats.frames,
            stats.curves,
            frames.root().display()
        );
        eprintln!("wrote {}", out.video_path.display());
        if let Some(path) = out.output_path {
            eprintln!("wrote {}", path.display());
        }
    } else {
        let stats = seq.run(&mut renderer, &frames, &mut FrameCounter::new())?;
        eprintln!(
            "rendered {} frames for {} years into {}",
            stats.frames,
            stats.curves,
            frames.root().display()
        );
    }
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let mut cfg = args.config.load()?;
    if let Some(images) = args.images {
        cfg.image_dir = images;
    }
    apply_audio(&mut cfg, args.audio, args.no_audio);

    let out = VideoEncoder::new(cfg.encode_opts()?).encode(&cfg.frame_dir())?;
    eprintln!("encoded {} frames", out.frames);
    eprintln!("wrote {}", out.video_path.display());
    if let Some(path) = out.output_path {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.config.load()?;
    let dataset = load_dataset(&args.data, &cfg)?;
    let seq = Sequencer::new(dataset, cfg.sequencer_opts()?)?;
    let spec = seq.preview_frame(args.year, args.step, cfg.seconds_per_year)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let mut renderer = CpuChartRenderer::new(cfg.chart.clone(), cfg.dpi)?;
    renderer.render_frame(&spec, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
