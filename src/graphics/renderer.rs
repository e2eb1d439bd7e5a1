//! Rendering of decoded animations to RGBA frames, GIF, PNG frames and sprite sheets.

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    imageops::{self, FilterType},
    Delay, Frame, ImageError, Rgba, RgbaImage,
};
use log::{debug, info, warn};
use oxipng::{InFile, OutFile};
use thiserror::Error;

use super::animation::Animation;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image error: {0}")]
    Image(#[from] ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("PNG optimisation failed: {0}")]
    Optimise(String),
    #[error("invalid output size: {0}")]
    InvalidSize(String),
    #[error("frame {0} does not exist")]
    MissingFrame(usize),
}

/// How the opaque `speed` value turns into a per-frame delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameTiming {
    /// `speed` is the frame duration in milliseconds.
    #[default]
    SpeedAsMillis,
    /// `speed` is a rate; the duration is `1000 / speed` milliseconds.
    SpeedAsFps,
}

impl FrameTiming {
    pub fn frame_delay_ms(self, speed: u16) -> u32 {
        match self {
            FrameTiming::SpeedAsMillis => speed as u32,
            FrameTiming::SpeedAsFps if speed == 0 => 0,
            FrameTiming::SpeedAsFps => 1000 / speed as u32,
        }
    }
}

/// Configuration options for rendered output
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Uniform scale factor; takes precedence over `width`/`height`.
    pub scale: Option<f32>,
    /// Target width. With no height, the height keeps the aspect ratio.
    pub width: Option<u32>,
    /// Target height. With no width, the width keeps the aspect ratio.
    pub height: Option<u32>,
    pub timing: FrameTiming,
    /// Run written PNGs through oxipng.
    pub optimise_png: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: None,
            width: None,
            height: None,
            timing: FrameTiming::default(),
            optimise_png: true,
        }
    }
}

impl RenderOptions {
    /// Output size for an `original_width x original_height` frame.
    pub fn target_size(
        &self,
        original_width: u32,
        original_height: u32,
    ) -> Result<(u32, u32), RenderError> {
        let (width, height) = if let Some(scale) = self.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(RenderError::InvalidSize(format!("scale {}", scale)));
            }
            (
                (original_width as f32 * scale).round() as u32,
                (original_height as f32 * scale).round() as u32,
            )
        } else {
            match (self.width, self.height) {
                (Some(w), Some(h)) => (w, h),
                (Some(w), None) => (
                    w,
                    (w as f64 * original_height as f64 / original_width as f64).round() as u32,
                ),
                (None, Some(h)) => (
                    (h as f64 * original_width as f64 / original_height as f64).round() as u32,
                    h,
                ),
                (None, None) => (original_width, original_height),
            }
        };

        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize(format!("{}x{}", width, height)));
        }
        Ok((width, height))
    }
}

/// Render one frame, resolving every index through the palette.
pub fn render_frame(
    animation: &Animation,
    index: usize,
    options: &RenderOptions,
) -> Result<RgbaImage, RenderError> {
    let grid = animation
        .frame(index)
        .ok_or(RenderError::MissingFrame(index))?;
    let palette = animation.palette();

    let original_width = grid.width() as u32;
    let original_height = grid.height() as u32;
    let mut image = RgbaImage::new(original_width, original_height);

    for (y, row) in grid.rows().enumerate() {
        for (x, &palette_index) in row.iter().enumerate() {
            let [r, g, b] = palette[palette_index as usize];
            image.put_pixel(x as u32, y as u32, Rgba([r, g, b, 255]));
        }
    }

    let (width, height) = options.target_size(original_width, original_height)?;
    if (width, height) != (original_width, original_height) {
        image = imageops::resize(&image, width, height, FilterType::Nearest);
    }

    Ok(image)
}

pub fn render_frames(
    animation: &Animation,
    options: &RenderOptions,
) -> Result<Vec<RgbaImage>, RenderError> {
    (0..animation.frames().len())
        .map(|index| render_frame(animation, index, options))
        .collect()
}

/// Write the animation as a looping GIF.
pub fn save_gif(
    animation: &Animation,
    path: &Path,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let delay_ms = options.timing.frame_delay_ms(animation.speed());
    let frames = render_frames(animation, options)?;

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames.into_iter().map(|image| {
        Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1))
    }))?;

    info!(
        "Saved {} frames to {} ({} ms per frame)",
        animation.total_frames(),
        path.display(),
        delay_ms
    );
    Ok(())
}

/// Write every frame as `frame_NNN.png` into `output_dir`.
pub fn save_png_frames(
    animation: &Animation,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<Vec<PathBuf>, RenderError> {
    fs::create_dir_all(output_dir)?;

    let mut paths = Vec::with_capacity(animation.frames().len());
    for (index, image) in render_frames(animation, options)?.iter().enumerate() {
        let path = output_dir.join(format!("frame_{:03}.png", index));
        save_png(image, &path, options)?;
        paths.push(path);
    }

    info!("Saved {} PNG frames to {}", paths.len(), output_dir.display());
    Ok(paths)
}

/// Grid placement of frames on a sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub frames_per_row: u32,
    pub rows: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Top-left corner of each frame, in frame order.
    pub positions: Vec<(u32, u32)>,
}

impl SheetLayout {
    pub fn new(frame_count: usize, frame_width: u32, frame_height: u32) -> Self {
        let frames_per_row = ((frame_count as f32).sqrt().ceil() as u32).max(1);
        let rows = (frame_count as u32).div_ceil(frames_per_row);

        let positions = (0..frame_count as u32)
            .map(|i| {
                (
                    (i % frames_per_row) * frame_width,
                    (i / frames_per_row) * frame_height,
                )
            })
            .collect();

        SheetLayout {
            frames_per_row,
            rows,
            frame_width,
            frame_height,
            positions,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (
            self.frames_per_row * self.frame_width,
            self.rows * self.frame_height,
        )
    }
}

/// Lay every frame out on a near-square sheet and save it as PNG.
pub fn save_sprite_sheet(
    animation: &Animation,
    path: &Path,
    options: &RenderOptions,
) -> Result<SheetLayout, RenderError> {
    let frames = render_frames(animation, options)?;
    let (frame_width, frame_height) = frames
        .first()
        .map(|f| f.dimensions())
        .ok_or(RenderError::MissingFrame(0))?;

    let layout = SheetLayout::new(frames.len(), frame_width, frame_height);
    let (sheet_width, sheet_height) = layout.dimensions();
    debug!(
        "Creating sheet with dimensions: {}x{} for {} frames",
        sheet_width,
        sheet_height,
        frames.len()
    );

    let mut sheet = RgbaImage::new(sheet_width, sheet_height);
    for (frame, &(x, y)) in frames.iter().zip(&layout.positions) {
        copy_frame_to_sheet(&mut sheet, frame, x, y);
    }

    save_png(&sheet, path, options)?;
    info!("Saved sprite sheet to {}", path.display());
    Ok(layout)
}

fn copy_frame_to_sheet(sheet: &mut RgbaImage, frame: &RgbaImage, x: u32, y: u32) {
    for (f_x, f_y, pixel) in frame.enumerate_pixels() {
        let sheet_x = x + f_x;
        let sheet_y = y + f_y;

        if sheet_x < sheet.width() && sheet_y < sheet.height() {
            sheet.put_pixel(sheet_x, sheet_y, *pixel);
        }
    }
}

fn save_png(image: &RgbaImage, path: &Path, options: &RenderOptions) -> Result<(), RenderError> {
    image.save(path)?;

    if options.optimise_png {
        if let Err(e) = optimise_png(path) {
            warn!("{} saved unoptimised: {}", path.display(), e);
        }
    }
    Ok(())
}

/// Optimises a PNG file in place using oxipng
fn optimise_png(path: &Path) -> Result<(), RenderError> {
    let temp_path = path.with_extension("temp.png");
    fs::rename(path, &temp_path)?;

    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;

    let result = oxipng::optimize(
        &InFile::Path(temp_path.clone()),
        &OutFile::Path(Some(path.to_path_buf())),
        &options,
    );

    if let Err(e) = result {
        // Put the unoptimised file back where the caller expects it
        fs::rename(&temp_path, path)?;
        return Err(RenderError::Optimise(e.to_string()));
    }

    if let Err(e) = fs::remove_file(&temp_path) {
        warn!("Failed to remove temporary file {}: {}", temp_path.display(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_interprets_speed() {
        assert_eq!(FrameTiming::SpeedAsMillis.frame_delay_ms(100), 100);
        assert_eq!(FrameTiming::SpeedAsFps.frame_delay_ms(8), 125);
        assert_eq!(FrameTiming::SpeedAsFps.frame_delay_ms(0), 0);
    }

    #[test]
    fn target_size_keeps_aspect_ratio() -> anyhow::Result<()> {
        let mut options = RenderOptions::default();
        assert_eq!(options.target_size(64, 32)?, (64, 32));

        options.width = Some(256);
        assert_eq!(options.target_size(64, 32)?, (256, 128));

        options.width = None;
        options.height = Some(64);
        assert_eq!(options.target_size(64, 32)?, (128, 64));

        options.scale = Some(2.5);
        assert_eq!(options.target_size(16, 16)?, (40, 40));
        Ok(())
    }

    #[test]
    fn target_size_rejects_degenerate_requests() {
        let options = RenderOptions {
            scale: Some(0.0),
            ..RenderOptions::default()
        };
        assert!(options.target_size(16, 16).is_err());

        let options = RenderOptions {
            width: Some(0),
            ..RenderOptions::default()
        };
        assert!(options.target_size(16, 16).is_err());
    }

    #[test]
    fn sheet_layout_is_near_square() {
        let layout = SheetLayout::new(5, 16, 16);
        assert_eq!(layout.frames_per_row, 3);
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.dimensions(), (48, 32));
        assert_eq!(layout.positions[4], (16, 16));

        let single = SheetLayout::new(1, 64, 64);
        assert_eq!(single.dimensions(), (64, 64));
    }
}
