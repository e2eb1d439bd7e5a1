use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::{debug, info};

use pixelbean::graphics::{metadata, renderer, FrameTiming, RenderOptions};

/// Decode a Divoom PixelBean file and export it as GIF, PNG frames or a sprite sheet.
#[derive(Parser, Debug)]
#[command(name = "pixelbean", version, about)]
struct Args {
    /// PixelBean file as downloaded from the gallery
    input: PathBuf,

    /// Write a looping GIF
    #[arg(long)]
    gif: Option<PathBuf>,

    /// Write one PNG per frame into this directory
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Write all frames onto a single PNG sprite sheet
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// Write a JSON description of the animation
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Uniform scale factor for rendered frames
    #[arg(long, conflicts_with_all = ["width", "height"])]
    scale: Option<f32>,

    /// Output width in pixels (height follows the aspect ratio unless given)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (width follows the aspect ratio unless given)
    #[arg(long)]
    height: Option<u32>,

    /// How the device speed value maps to a frame delay
    #[arg(long, value_enum, default_value_t = Timing::Millis)]
    timing: Timing,

    /// Skip oxipng optimisation of written PNGs
    #[arg(long)]
    no_optimise: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Timing {
    /// Speed is the frame duration in milliseconds
    Millis,
    /// Speed is frames per second
    Fps,
}

impl From<Timing> for FrameTiming {
    fn from(timing: Timing) -> Self {
        match timing {
            Timing::Millis => FrameTiming::SpeedAsMillis,
            Timing::Fps => FrameTiming::SpeedAsFps,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("{:?}", args);

    let animation = pixelbean::decode_file(&args.input)
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;

    println!(
        "{}: {} frames, {}x{} px, speed {}, {} colours",
        args.input.display(),
        animation.total_frames(),
        animation.width(),
        animation.height(),
        animation.speed(),
        animation.palette().len()
    );

    let options = RenderOptions {
        scale: args.scale,
        width: args.width,
        height: args.height,
        timing: args.timing.into(),
        optimise_png: !args.no_optimise,
    };

    if let Some(path) = &args.gif {
        renderer::save_gif(&animation, path, &options)
            .with_context(|| format!("Failed to write GIF {}", path.display()))?;
    }

    if let Some(dir) = &args.png_dir {
        renderer::save_png_frames(&animation, dir, &options)
            .with_context(|| format!("Failed to write PNG frames to {}", dir.display()))?;
    }

    let sheet_layout = match &args.sheet {
        Some(path) => Some(
            renderer::save_sprite_sheet(&animation, path, &options)
                .with_context(|| format!("Failed to write sprite sheet {}", path.display()))?,
        ),
        None => None,
    };

    if let Some(path) = &args.metadata {
        let source = args.input.to_string_lossy();
        let sheet_name = args
            .sheet
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned());
        let sheet = match (&sheet_name, &sheet_layout) {
            (Some(name), Some(layout)) => Some((name.as_str(), layout)),
            _ => None,
        };

        let meta = metadata::generate_metadata(&animation, &options, Some(&*source), sheet);
        metadata::save_metadata(&meta, path)
            .with_context(|| format!("Failed to write metadata {}", path.display()))?;
        info!("Saved metadata to {}", path.display());
    }

    Ok(())
}
