//! Palette compaction: raw RGB frames in, shared palette plus index grids out.

use std::collections::HashMap;

use log::debug;

use super::animation::{FrameGrid, Rgb, TILE_DIM};
use crate::error::DecodeError;

const PIXELS_PER_TILE: usize = TILE_DIM * TILE_DIM;

/// Growable colour table owned by a single compaction call. Colours keep the order
/// in which they were first seen.
#[derive(Debug, Default)]
pub struct PaletteBuilder {
    colours: Vec<Rgb>,
    lookup: HashMap<Rgb, u32>,
}

impl PaletteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `colour`, inserting it at the end if it is new.
    pub fn index_of(&mut self, colour: Rgb) -> u32 {
        if let Some(&index) = self.lookup.get(&colour) {
            return index;
        }
        let index = self.colours.len() as u32;
        self.colours.push(colour);
        self.lookup.insert(colour, index);
        index
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    pub fn into_colours(self) -> Vec<Rgb> {
        self.colours
    }
}

/// Convert raw tile-ordered RGB frames into one shared palette and one index grid per
/// frame.
///
/// Raw buffers hold 16x16 tiles back to back. Inside a tile pixels run left to right,
/// then top to bottom; tiles run left to right across `column_count` tiles, then down
/// the tile rows.
pub fn compact(
    frames: &[Vec<u8>],
    row_count: u8,
    column_count: u8,
) -> Result<(Vec<Rgb>, Vec<FrameGrid>), DecodeError> {
    let columns = column_count as usize;
    let width = columns * TILE_DIM;
    let height = row_count as usize * TILE_DIM;
    let frame_size = width * height * 3;

    let mut palette = PaletteBuilder::new();
    let mut grids = Vec::with_capacity(frames.len());

    for raw in frames {
        if raw.len() < frame_size {
            return Err(DecodeError::truncated("raw frame", frame_size, raw.len()));
        }

        let mut indices = vec![0u32; width * height];
        for (pixel, rgb) in raw[..frame_size].chunks_exact(3).enumerate() {
            let tile = pixel / PIXELS_PER_TILE;
            let in_tile = pixel % PIXELS_PER_TILE;

            let x = (tile % columns) * TILE_DIM + in_tile % TILE_DIM;
            let y = (tile / columns) * TILE_DIM + in_tile / TILE_DIM;

            indices[y * width + x] = palette.index_of([rgb[0], rgb[1], rgb[2]]);
        }

        grids.push(FrameGrid::new(width, height, indices));
    }

    debug!(
        "Compacted {} frames into a {}-colour palette",
        grids.len(),
        palette.len()
    );
    Ok((palette.into_colours(), grids))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a tile-ordered raw frame from a per-pixel colour function.
    fn raw_frame(rows: u8, cols: u8, colour: impl Fn(usize, usize) -> Rgb) -> Vec<u8> {
        let mut raw = Vec::new();
        for tile_y in 0..rows as usize {
            for tile_x in 0..cols as usize {
                for y in 0..TILE_DIM {
                    for x in 0..TILE_DIM {
                        raw.extend_from_slice(&colour(tile_x * TILE_DIM + x, tile_y * TILE_DIM + y));
                    }
                }
            }
        }
        raw
    }

    #[test]
    fn builder_keeps_first_seen_order() {
        let mut builder = PaletteBuilder::new();
        assert_eq!(builder.index_of([9, 9, 9]), 0);
        assert_eq!(builder.index_of([1, 2, 3]), 1);
        assert_eq!(builder.index_of([9, 9, 9]), 0);
        assert_eq!(builder.into_colours(), vec![[9, 9, 9], [1, 2, 3]]);
    }

    #[test]
    fn tiles_land_at_their_grid_position() -> anyhow::Result<()> {
        // 2x2 tiles, each tile a distinct flat colour
        let colour = |x: usize, y: usize| [(x / 16) as u8 * 100, (y / 16) as u8 * 100, 7];
        let raw = raw_frame(2, 2, colour);

        let (palette, grids) = compact(&[raw], 2, 2)?;
        assert_eq!(palette, vec![[0, 0, 7], [100, 0, 7], [0, 100, 7], [100, 100, 7]]);

        let grid = &grids[0];
        assert_eq!(grid.width(), 32);
        assert_eq!(grid.height(), 32);
        for y in 0..32 {
            for x in 0..32 {
                let index = grid.get(x, y).unwrap() as usize;
                assert_eq!(palette[index], colour(x, y));
            }
        }
        Ok(())
    }

    #[test]
    fn palette_is_shared_across_frames() -> anyhow::Result<()> {
        let first = raw_frame(1, 1, |x, _| if x < 8 { [1, 1, 1] } else { [2, 2, 2] });
        let second = raw_frame(1, 1, |_, y| if y < 8 { [2, 2, 2] } else { [3, 3, 3] });

        let (palette, grids) = compact(&[first, second], 1, 1)?;
        assert_eq!(palette, vec![[1, 1, 1], [2, 2, 2], [3, 3, 3]]);
        assert_eq!(grids[1].get(0, 0), Some(1));
        assert_eq!(grids[1].get(0, 15), Some(2));
        Ok(())
    }

    #[test]
    fn short_frame_is_truncated() {
        let err = compact(&[vec![0u8; 100]], 1, 1).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedStream { .. }));
    }
}
