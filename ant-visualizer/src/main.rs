use anyhow::{Context, Result};
use ant_common::{Coord, LangtonsAnt};
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ant_visualizer::{canvas_size, even_size, parse_color, Colors, Renderer, VideoWriter, ENCODE_BATCH_SIZE};

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
enum OutputFormat {
    /// H.264 video in an MP4 container
    Mp4,
    /// One PNG per frame inside the output directory
    PngFrames,
    /// Only the final frame, as a single PNG
    Png,
}

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output path: a file for mp4/png, a directory for png-frames
    #[arg(short, long, default_value = "langtons_ant.mp4")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Mp4)]
    format: OutputFormat,

    /// Number of frames to render, including the initial one
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Simulation steps between consecutive frames
    #[arg(long, default_value_t = 1)]
    steps_per_frame: u32,

    /// Frames over which the speed ramps up linearly to --steps-per-frame (0 = no ramp)
    #[arg(long, default_value_t = 0)]
    ramp_frames: u32,

    /// Edge length of one grid cell in pixels
    #[arg(long, default_value_t = 5)]
    cell_size: u32,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    start_x: i64,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    start_y: i64,

    /// Frames per second for the output video
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Color of marked cells (name or #rrggbb)
    #[arg(long, default_value = "red")]
    cell_color: String,

    /// Color of the ant (name or #rrggbb)
    #[arg(long, default_value = "#0066ff")]
    ant_color: String,

    /// Background color (name or #rrggbb)
    #[arg(long, default_value = "white")]
    bg_color: String,
}

impl Args {
    fn start(&self) -> Coord {
        Coord::new(self.start_x, self.start_y)
    }

    fn colors(&self) -> Colors {
        let defaults = Colors::default();
        Colors {
            background: parse_color(&self.bg_color, defaults.background),
            cell: parse_color(&self.cell_color, defaults.cell),
            ant: parse_color(&self.ant_color, defaults.ant),
            ..defaults
        }
    }

    /// Steps run before painting frame `index`. Frame 0 is the initial state.
    fn steps_for_frame(&self, index: u32) -> u32 {
        if index >= self.ramp_frames {
            return self.steps_per_frame;
        }
        let full = u64::from(self.steps_per_frame);
        let ramped = (full * u64::from(index) / u64::from(self.ramp_frames)).max(1).min(full);
        u32::try_from(ramped).unwrap_or(self.steps_per_frame)
    }

    /// Steps executed after the initial frame.
    fn total_steps(&self) -> u64 {
        if self.frames == 0 {
            return 0;
        }
        let ramp_end = self.frames.min(self.ramp_frames.max(1));
        let ramped: u64 = (1..ramp_end).map(|i| u64::from(self.steps_for_frame(i))).sum();
        ramped + u64::from(self.frames - ramp_end) * u64::from(self.steps_per_frame)
    }
}

fn progress_bar(len: u64, template: &str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    bar
}

/// Renders every frame and hands each one to `sink` in order.
/// `speed` gives the steps to run before each frame.
fn render_frames<S, F>(renderer: &mut Renderer, frames: u32, speed: S, mut sink: F) -> Result<()>
where
    S: Fn(u32) -> u32,
    F: FnMut(u32, &Renderer) -> Result<()>,
{
    if frames == 0 {
        return Ok(());
    }
    sink(0, &*renderer)?;
    renderer.start();
    for index in 1..frames {
        renderer.set_steps_per_frame(speed(index));
        // Painting is left to the sink, which may use a fixed canvas.
        renderer.advance();
        sink(index, &*renderer)?;
    }
    renderer.stop();
    Ok(())
}

fn write_mp4(args: &Args, renderer: &mut Renderer) -> Result<usize> {
    // The run is deterministic, so a headless pass yields the final bounds up front.
    let mut probe = LangtonsAnt::at(args.start());
    probe.run(args.total_steps());
    let final_bounds = probe.grid_bounds();
    let (width, height) = even_size(canvas_size(&final_bounds, args.cell_size)?);
    info!(
        "Final bounds x[{}, {}], y[{}, {}] -> video {}x{} px",
        final_bounds.min_x, final_bounds.max_x, final_bounds.min_y, final_bounds.max_y, width, height
    );

    let mut writer = VideoWriter::new(width, height, args.fps)?;
    let bar = progress_bar(
        u64::from(args.frames),
        "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} encoded ({percent}%) [{eta}]",
    );

    let mut batch: Vec<RgbaImage> = Vec::with_capacity(ENCODE_BATCH_SIZE);
    render_frames(renderer, args.frames, |i| args.steps_for_frame(i), |_, r| {
        batch.push(r.paint(width, height, &final_bounds));
        if batch.len() >= ENCODE_BATCH_SIZE {
            writer.encode_batch(&batch)?;
            bar.inc(batch.len() as u64);
            batch.clear();
        }
        Ok(())
    })?;
    writer.encode_batch(&batch)?;
    bar.inc(batch.len() as u64);
    bar.finish_with_message(format!("Encoded {} frames", writer.frame_count()));
    report_dropped_frames(args.frames, writer.frame_count());

    let description = format!("Langton's ant - {} steps", args.total_steps());
    writer.finish(&args.output, &description)
}

fn write_png_frames(args: &Args, renderer: &mut Renderer) -> Result<usize> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create frame directory {}", args.output.display()))?;
    let bar = progress_bar(
        u64::from(args.frames),
        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]",
    );
    let frame_path = |index: u32| args.output.join(format!("frame_{:05}.png", index));

    if args.frames == 0 {
        return Ok(0);
    }
    save_png(&renderer.draw()?, &frame_path(0))?;
    bar.inc(1);

    renderer.start();
    let mut written = 1;
    for index in 1..args.frames {
        renderer.set_steps_per_frame(args.steps_for_frame(index));
        let Some(frame) = renderer.tick()? else {
            break;
        };
        save_png(&frame, &frame_path(index))?;
        written += 1;
        bar.inc(1);
    }
    renderer.stop();
    bar.finish();
    Ok(written)
}

fn write_final_png(args: &Args, renderer: &mut Renderer) -> Result<usize> {
    let image = match args.total_steps() {
        0 => renderer.draw()?,
        steps => {
            renderer.fast_forward(steps - 1);
            renderer.step()?
        }
    };
    save_png(&image, &args.output)?;
    Ok(1)
}

/// Number of rendered frames the encoder dropped, with a warning when any were.
fn report_dropped_frames(rendered: u32, encoded: usize) -> usize {
    let dropped = (rendered as usize).saturating_sub(encoded);
    if dropped > 0 {
        warn!("{} of {} rendered frames failed to encode and are missing from the video", dropped, rendered);
    }
    dropped
}

fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("Failed to write image {}", path.display()))
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    // Initialize logger
    Builder::from_default_env()
        .filter(None, LevelFilter::Info)
        .init();

    info!("Starting Langton's Ant Visualizer...");
    info!("Output: {} ({:?})", args.output.display(), args.format);
    info!(
        "Frames: {} | Steps per frame: {} | Cell size: {} px",
        args.frames, args.steps_per_frame, args.cell_size
    );

    let colors = args.colors();
    debug!("Colors: {:?}", colors);

    let mut renderer = Renderer::new(args.cell_size, args.steps_per_frame, args.start(), colors)
        .context("Cannot start the visualizer")?;

    let start_time = Instant::now();
    let frame_count = match args.format {
        OutputFormat::Mp4 => write_mp4(&args, &mut renderer)?,
        OutputFormat::PngFrames => write_png_frames(&args, &mut renderer)?,
        OutputFormat::Png => write_final_png(&args, &mut renderer)?,
    };

    let ant = renderer.ant();
    let pos = ant.ant_position();
    info!(
        "Rendered {} frames in {:.2?} | Steps: {} | Black cells: {} | Ant position: ({}, {})",
        frame_count,
        start_time.elapsed(),
        ant.steps_taken(),
        ant.marked_cell_count(),
        pos.x,
        pos.y
    );
    info!("Output saved to: {}", args.output.display());
    Ok(())
}
