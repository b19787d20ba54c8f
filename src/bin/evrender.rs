use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use evrender::{
    CompareConfig, EndMode, GenerateConfig, PipelineConfig, PngSequenceSink, RenderConfig, Rgb8,
};

#[derive(Parser, Debug)]
#[command(name = "evrender", version, about = "Event-camera video rendering and comparison")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render event shards into a video (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Compose two videos side by side.
    Compare(CompareArgs),
    /// Render events, then compare them with the original video.
    Pipeline(PipelineArgs),
    /// Run the upsampling and event-simulation stages.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct RenderFlags {
    /// Directory of `.npz` event shards.
    #[arg(long)]
    events_dir: Option<PathBuf>,

    /// Capture timestamp file (seconds, one per line).
    #[arg(long)]
    timestamps: Option<PathBuf>,

    /// Sensor width in pixels.
    #[arg(long)]
    sensor_w: Option<u32>,

    /// Sensor height in pixels.
    #[arg(long)]
    sensor_h: Option<u32>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<f64>,

    /// Decay time constant in milliseconds.
    #[arg(long)]
    tau_ms: Option<f64>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Background gray level of the event video.
    #[arg(long)]
    event_bg: Option<u8>,

    /// Positive polarity color as `R,G,B`.
    #[arg(long, value_parser = parse_rgb)]
    pos_color: Option<Rgb8>,

    /// Negative polarity color as `R,G,B`.
    #[arg(long, value_parser = parse_rgb)]
    neg_color: Option<Rgb8>,

    /// Overlap color as `R,G,B`.
    #[arg(long, value_parser = parse_rgb)]
    overlap_color: Option<Rgb8>,
}

impl RenderFlags {
    fn apply(self, cfg: &mut RenderConfig) {
        override_with(&mut cfg.events_dir, self.events_dir);
        if self.timestamps.is_some() {
            cfg.timestamps = self.timestamps;
        }
        override_with(&mut cfg.sensor_width, self.sensor_w);
        override_with(&mut cfg.sensor_height, self.sensor_h);
        override_with(&mut cfg.fps, self.fps);
        override_with(&mut cfg.tau_ms, self.tau_ms);
        if self.max_frames.is_some() {
            cfg.max_frames = self.max_frames;
        }
        override_with(&mut cfg.palette.background, self.event_bg);
        override_with(&mut cfg.palette.positive, self.pos_color);
        override_with(&mut cfg.palette.negative, self.neg_color);
        override_with(&mut cfg.palette.overlap, self.overlap_color);
    }
}

#[derive(Args, Debug)]
struct CompareFlags {
    /// Horizontal gap between the videos in pixels.
    #[arg(long)]
    gap: Option<u32>,

    /// Background gray level of the comparison canvas.
    #[arg(long)]
    bg: Option<u8>,

    /// Output frame rate; defaults to the faster source.
    #[arg(long)]
    fps_out: Option<f64>,

    /// What to do when one video ends first.
    #[arg(long, value_enum)]
    end_mode: Option<EndMode>,

    /// Output canvas width.
    #[arg(long)]
    canvas_w: Option<u32>,

    /// Output canvas height.
    #[arg(long)]
    canvas_h: Option<u32>,
}

impl CompareFlags {
    fn apply(self, cfg: &mut CompareConfig) {
        override_with(&mut cfg.gap, self.gap);
        override_with(&mut cfg.background, self.bg);
        if self.fps_out.is_some() {
            cfg.fps_out = self.fps_out;
        }
        override_with(&mut cfg.end_mode, self.end_mode);
        override_with(&mut cfg.canvas.width, self.canvas_w);
        override_with(&mut cfg.canvas.height, self.canvas_h);
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON config; explicit flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    render: RenderFlags,

    /// Output video path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Codec identifier (FourCC such as `mp4v` or an ffmpeg encoder name).
    #[arg(long)]
    codec: Option<String>,

    /// Write numbered PNG frames into this directory instead of a video.
    #[arg(long)]
    png_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// JSON config; explicit flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Left video.
    #[arg(long)]
    video1: Option<PathBuf>,

    /// Right video.
    #[arg(long)]
    video2: Option<PathBuf>,

    /// Output video path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Codec identifier.
    #[arg(long)]
    codec: Option<String>,

    #[command(flatten)]
    compare: CompareFlags,
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// JSON config; explicit flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Original video shown on the left.
    #[arg(long)]
    original: Option<PathBuf>,

    /// Final comparison video.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Codec identifier for both videos.
    #[arg(long)]
    codec: Option<String>,

    #[command(flatten)]
    render: RenderFlags,

    #[command(flatten)]
    compare: CompareFlags,

    /// Keep the intermediate event video.
    #[arg(long)]
    keep_temp: bool,

    /// Fixed path for the intermediate event video (never deleted).
    #[arg(long)]
    temp_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// JSON config; explicit flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of input video frames.
    #[arg(long)]
    video_input_dir: Option<PathBuf>,

    /// Directory for upsampled frames.
    #[arg(long)]
    upsample_output_dir: Option<PathBuf>,

    /// Directory for event shards.
    #[arg(long)]
    events_output_dir: Option<PathBuf>,

    /// GPU id, -1 for CPU.
    #[arg(long, allow_negative_numbers = true)]
    device: Option<i32>,

    /// Positive contrast threshold.
    #[arg(long)]
    ct_pos: Option<f64>,

    /// Negative contrast threshold.
    #[arg(long)]
    ct_neg: Option<f64>,

    /// Refractory period in nanoseconds.
    #[arg(long)]
    refractory_period_ns: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Compare(args) => cmd_compare(args),
        Command::Pipeline(args) => cmd_pipeline(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_or_default<T>(path: Option<&Path>) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match path {
        Some(path) => Ok(evrender::load_json(path)?),
        None => Ok(T::default()),
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_rgb(s: &str) -> Result<Rgb8, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts[..] else {
        return Err(format!("expected R,G,B, got '{s}'"));
    };
    let channel = |c: &str| c.parse::<u8>().map_err(|e| format!("bad channel '{c}': {e}"));
    Ok(Rgb8([channel(r)?, channel(g)?, channel(b)?]))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg: RenderConfig = load_or_default(args.config.as_deref())?;
    args.render.apply(&mut cfg);
    override_with(&mut cfg.out, args.out);
    override_with(&mut cfg.codec, args.codec);

    let stats = match args.png_dir {
        Some(dir) => {
            let mut sink = PngSequenceSink::new(&dir);
            let stats = evrender::render_with_sink(&cfg, &mut sink)?;
            eprintln!("wrote {} frames to {}", stats.frames_written, dir.display());
            stats
        }
        None => {
            if cfg.out.as_os_str().is_empty() {
                anyhow::bail!("an output path is required (--out or \"out\" in --config)");
            }
            let stats = evrender::render_to_video(&cfg)?;
            eprintln!("wrote {}", cfg.out.display());
            stats
        }
    };
    if stats.stopped_early {
        eprintln!(
            "event stream ended after {} of {} frames",
            stats.frames_written, stats.frames_scheduled
        );
    }
    Ok(())
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let mut cfg: CompareConfig = load_or_default(args.config.as_deref())?;
    override_with(&mut cfg.video1, args.video1);
    override_with(&mut cfg.video2, args.video2);
    override_with(&mut cfg.out, args.out);
    override_with(&mut cfg.codec, args.codec);
    args.compare.apply(&mut cfg);
    require_path(&cfg.video1, "--video1")?;
    require_path(&cfg.video2, "--video2")?;
    require_path(&cfg.out, "--out")?;

    let stats = evrender::compose_videos(&cfg)?;
    eprintln!(
        "wrote {} ({} frames at {} fps)",
        cfg.out.display(),
        stats.frames_written,
        stats.fps_out
    );
    Ok(())
}

fn cmd_pipeline(args: PipelineArgs) -> anyhow::Result<()> {
    let mut cfg: PipelineConfig = load_or_default(args.config.as_deref())?;
    args.render.apply(&mut cfg.render);
    args.compare.apply(&mut cfg.compare);
    override_with(&mut cfg.compare.video1, args.original);
    override_with(&mut cfg.compare.out, args.out);
    if let Some(codec) = args.codec {
        cfg.render.codec = codec.clone();
        cfg.compare.codec = codec;
    }
    cfg.keep_temp |= args.keep_temp;
    if args.temp_out.is_some() {
        cfg.temp_out = args.temp_out;
    }
    require_path(&cfg.compare.video1, "--original")?;
    require_path(&cfg.compare.out, "--out")?;

    let stats = evrender::run_pipeline(&cfg)?;
    if let Some(kept) = &stats.kept_intermediate {
        eprintln!("event video kept at {}", kept.display());
    }
    eprintln!("wrote {}", cfg.compare.out.display());
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg: GenerateConfig = load_or_default(args.config.as_deref())?;
    override_with(&mut cfg.video_dir, args.video_input_dir);
    override_with(&mut cfg.upsample_dir, args.upsample_output_dir);
    override_with(&mut cfg.events_dir, args.events_output_dir);
    override_with(&mut cfg.upsample.device, args.device);
    override_with(&mut cfg.simulate.ct_pos, args.ct_pos);
    override_with(&mut cfg.simulate.ct_neg, args.ct_neg);
    override_with(&mut cfg.simulate.refractory_period_ns, args.refractory_period_ns);

    evrender::generate_events(&cfg)
        .with_context(|| format!("generate events into '{}'", cfg.events_dir.display()))?;
    eprintln!("wrote events to {}", cfg.events_dir.display());
    Ok(())
}

fn require_path(path: &Path, flag: &str) -> anyhow::Result<()> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("{flag} is required");
    }
    Ok(())
}
