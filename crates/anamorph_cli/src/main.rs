//! Anamorph CLI
//!
//! De-squeeze anamorphic stills, plan framing-guide overlays and preview
//! how a spring preset animates a ratio change.

mod config;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anamorph_animation::scheduler::run_until_idle;
use anamorph_animation::{FrameQueue, RenderSink, Spring, SpringDriver, Trajectory};
use anamorph_frame::desqueeze::{self, matching_preset};
use anamorph_frame::{
    output_file_name, status_line, AspectRatio, CameraFacing, DesqueezePlan, ExportFormat,
    OverlayMode, OverlayPlan,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::AnamorphConfig;

#[derive(Parser)]
#[command(name = "anamorph")]
#[command(version, about = "Anamorphic de-squeeze and framing-guide toolkit")]
struct Cli {
    /// Config file (defaults to ./anamorph.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stretch an image horizontally by a squeeze ratio
    Desqueeze {
        /// Source image
        input: PathBuf,

        /// Squeeze ratio (e.g. 1.33, 1.5, 2.0)
        #[arg(short, long)]
        ratio: Option<f64>,

        /// Output format: png, jpeg or webp
        #[arg(short, long)]
        format: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Print a JSON report instead of the output path
        #[arg(long)]
        json: bool,
    },
    /// Print the framing-guide overlay for a preview surface as JSON
    Guides {
        /// Surface width in device pixels
        #[arg(long, default_value_t = 1920.0)]
        width: f64,

        /// Surface height in device pixels
        #[arg(long, default_value_t = 1080.0)]
        height: f64,

        /// Target ratio, e.g. 16:9, 2.39:1 or 1.85
        #[arg(short, long)]
        ratio: Option<String>,

        /// matte or frame
        #[arg(short, long)]
        mode: Option<String>,

        /// Matte opacity, 0 to 1
        #[arg(long)]
        opacity: Option<f64>,

        /// Device pixel ratio used for stroke widths
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,

        /// Report the front camera in the status line
        #[arg(long)]
        front: bool,
    },
    /// Animate a value with a spring and print every rendered frame
    Spring {
        /// Starting value
        #[arg(long, default_value_t = 1.0)]
        from: f64,

        /// Target value
        #[arg(long, default_value_t = 1.33)]
        to: f64,

        /// subtle, medium, expressive or custom
        #[arg(short, long)]
        preset: Option<String>,

        /// Manual stiffness, in (0, 1]
        #[arg(long)]
        stiffness: Option<f64>,

        /// Manual damping, in (0, 1)
        #[arg(long)]
        damping: Option<f64>,

        /// Frame at which to retarget mid-flight
        #[arg(long, requires = "retarget_to")]
        retarget_at: Option<u64>,

        /// Value to retarget to
        #[arg(long, requires = "retarget_at")]
        retarget_to: Option<f64>,

        /// Give up after this many frames
        #[arg(long, default_value_t = 10_000)]
        max_frames: u64,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AnamorphConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Desqueeze {
            input,
            ratio,
            format,
            output,
            json,
        } => {
            let report = run_desqueeze(&config, &input, ratio, format.as_deref(), &output)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.path.display());
            }
        }
        Commands::Guides {
            width,
            height,
            ratio,
            mode,
            opacity,
            dpr,
            front,
        } => {
            let report = run_guides(&config, width, height, ratio, mode, opacity, dpr, front)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Spring {
            from,
            to,
            preset,
            stiffness,
            damping,
            retarget_at,
            retarget_to,
            max_frames,
            json,
        } => {
            let mut section = config.spring;
            if let Some(preset) = preset {
                section.preset = preset;
            }
            section.stiffness = stiffness.or(section.stiffness);
            section.damping = damping.or(section.damping);
            let retarget = retarget_at.zip(retarget_to);
            let report = run_spring(&section, from, to, retarget, max_frames)?;
            print_spring(&report, json)?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct DesqueezeReport {
    path: PathBuf,
    mime: &'static str,
    bytes: usize,
    plan: DesqueezePlan,
}

fn run_desqueeze(
    config: &AnamorphConfig,
    input: &Path,
    ratio: Option<f64>,
    format: Option<&str>,
    output: &Path,
) -> Result<DesqueezeReport> {
    let ratio = ratio.unwrap_or(config.desqueeze.ratio);
    let format: ExportFormat = match format {
        Some(format) => format
            .parse()
            .with_context(|| format!("Invalid export format {format:?}"))?,
        None => config.desqueeze.export_format()?,
    };

    let image = desqueeze::load(input)
        .with_context(|| format!("Failed to load image {}", input.display()))?;
    let plan = DesqueezePlan::for_image(&image, ratio)?;
    tracing::info!("{}", plan.summary());
    if let Some(preset) = matching_preset(ratio) {
        tracing::debug!(preset, "ratio matches squeeze preset");
    }

    let bytes = desqueeze::encode(&desqueeze::stretch(&image, &plan), format)?;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let path = output.join(output_file_name(ratio, format));
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), mime = format.mime(), "wrote de-squeezed image");
    Ok(DesqueezeReport {
        path,
        mime: format.mime(),
        bytes: bytes.len(),
        plan,
    })
}

#[derive(Debug, Serialize)]
struct GuidesReport {
    status: String,
    overlay: OverlayPlan,
}

#[allow(clippy::too_many_arguments)]
fn run_guides(
    config: &AnamorphConfig,
    width: f64,
    height: f64,
    ratio: Option<String>,
    mode: Option<String>,
    opacity: Option<f64>,
    dpr: f64,
    front: bool,
) -> Result<GuidesReport> {
    if !(width > 0.0 && height > 0.0) {
        anyhow::bail!("Surface must have a positive size, got {width}x{height}");
    }

    let aspect: AspectRatio = match ratio {
        Some(ratio) => ratio
            .parse()
            .with_context(|| format!("Invalid guide ratio {ratio:?}"))?,
        None => config.guides.aspect()?,
    };
    let mode: OverlayMode = match mode {
        Some(mode) => mode.parse()?,
        None => config.guides.overlay_mode()?,
    };
    let opacity = opacity.unwrap_or(config.guides.opacity);
    if !(0.0..=1.0).contains(&opacity) {
        tracing::warn!(opacity, "matte opacity outside 0..1, clamping");
    }

    let facing = if front {
        CameraFacing::User
    } else {
        CameraFacing::Environment
    };
    Ok(GuidesReport {
        status: status_line(&aspect.label(), facing),
        overlay: OverlayPlan::build(width, height, aspect, mode, opacity, dpr),
    })
}

#[derive(Debug, Serialize)]
struct SpringReport {
    preset: String,
    stiffness: f64,
    damping: f64,
    frames: u64,
    settled: bool,
    final_value: f64,
    peak: Option<f64>,
    values: Vec<f64>,
}

/// Drive a spring over a frame queue until it rests or `max_frames` pass
fn run_spring(
    section: &config::SpringSection,
    from: f64,
    to: f64,
    retarget: Option<(u64, f64)>,
    max_frames: u64,
) -> Result<SpringReport> {
    let (preset, spring_config) = section.resolve()?;
    let mut spring = Spring::new(spring_config, from);
    spring.set_preset(preset);

    let queue = Rc::new(RefCell::new(FrameQueue::new()));
    let trajectory = Rc::new(RefCell::new(Trajectory::new()));
    let sink = {
        let trajectory = trajectory.clone();
        move |value: f64| trajectory.borrow_mut().render(value)
    };
    let driver = SpringDriver::new(spring, queue.clone(), sink);

    tracing::info!(
        %preset,
        stiffness = spring_config.stiffness(),
        damping = spring_config.damping(),
        from,
        to,
        "animating"
    );
    driver.set_target(to);

    // Idle frames still count, so a retarget can land after an early settle
    let mut frame = 0;
    while frame < max_frames {
        if let Some((at, value)) = retarget {
            if frame == at {
                driver.set_target(value);
            }
        }
        let ran = run_until_idle(&queue, 1);
        if ran == 0 && retarget.map_or(true, |(at, _)| frame >= at) {
            break;
        }
        frame += 1;
    }

    let settled = !driver.is_animating();
    if !settled {
        tracing::warn!(max_frames, current = driver.current(), "spring did not settle");
        driver.halt();
    }

    let trajectory = trajectory.borrow();
    Ok(SpringReport {
        preset: preset.to_string(),
        stiffness: spring_config.stiffness(),
        damping: spring_config.damping(),
        frames: driver.frames(),
        settled,
        final_value: driver.current(),
        peak: trajectory.peak(),
        values: trajectory.values().to_vec(),
    })
}

fn print_spring(report: &SpringReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for (frame, value) in report.values.iter().enumerate() {
        println!("{:>5}  {:>10.6}  {:.2}", frame + 1, value, value);
    }
    println!(
        "{} frames, settled={}, final={}",
        report.frames, report.settled, report.final_value
    );
    Ok(())
}
