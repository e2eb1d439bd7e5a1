//! JSON sidecar describing a decoded animation and, optionally, its sprite sheet.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::animation::Animation;
use super::renderer::{RenderError, RenderOptions, SheetLayout};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnimationMetadata {
    /// File the animation was decoded from, if any.
    pub source: Option<String>,
    pub total_frames: u32,
    /// Raw device speed value, unconverted.
    pub speed: u16,
    /// Delay per frame under the timing rule used for export.
    pub frame_delay_ms: u32,
    pub row_count: u8,
    pub column_count: u8,
    /// Pixel size of the decoded frames (before any scaling).
    pub width: u32,
    pub height: u32,
    /// Shared palette, first-seen order.
    pub palette: Vec<[u8; 3]>,
    pub sheet: Option<SheetInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SheetInfo {
    /// Filename of the sheet PNG this metadata corresponds to.
    pub image: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frames_per_row: u32,
    pub frames: Vec<FrameInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub idx: u32,
    pub sheet_x: u32,
    pub sheet_y: u32,
    pub duration_ms: u32,
}

pub fn generate_metadata(
    animation: &Animation,
    options: &RenderOptions,
    source: Option<&str>,
    sheet: Option<(&str, &SheetLayout)>,
) -> AnimationMetadata {
    let frame_delay_ms = options.timing.frame_delay_ms(animation.speed());

    let sheet = sheet.map(|(image, layout)| SheetInfo {
        image: image.to_string(),
        frame_width: layout.frame_width,
        frame_height: layout.frame_height,
        frames_per_row: layout.frames_per_row,
        frames: layout
            .positions
            .iter()
            .enumerate()
            .map(|(idx, &(sheet_x, sheet_y))| FrameInfo {
                idx: idx as u32,
                sheet_x,
                sheet_y,
                duration_ms: frame_delay_ms,
            })
            .collect(),
    });

    AnimationMetadata {
        source: source.map(str::to_string),
        total_frames: animation.total_frames(),
        speed: animation.speed(),
        frame_delay_ms,
        row_count: animation.row_count(),
        column_count: animation.column_count(),
        width: animation.width() as u32,
        height: animation.height() as u32,
        palette: animation.palette().to_vec(),
        sheet,
    }
}

pub fn save_metadata(metadata: &AnimationMetadata, path: &Path) -> Result<(), RenderError> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, metadata)?;
    Ok(())
}
