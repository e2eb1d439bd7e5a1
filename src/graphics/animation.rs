//! The decoded animation value handed to callers.

/// One palette colour, stored as raw `[r, g, b]` bytes.
pub type Rgb = [u8; 3];

/// Edge length of a device tile in pixels.
pub const TILE_DIM: usize = 16;

/// A single frame: a `height x width` grid of palette indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGrid {
    width: usize,
    height: usize,
    indices: Vec<u32>,
}

impl FrameGrid {
    pub(crate) fn new(width: usize, height: usize, indices: Vec<u32>) -> Self {
        debug_assert_eq!(indices.len(), width * height);
        FrameGrid {
            width,
            height,
            indices,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Palette index at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.indices[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.indices.chunks_exact(self.width)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// A fully decoded PixelBean animation.
///
/// Built once by the decoder and never mutated afterwards. Every frame has the same
/// dimensions and every index resolves into `palette`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    total_frames: u32,
    speed: u16,
    row_count: u8,
    column_count: u8,
    palette: Vec<Rgb>,
    frames: Vec<FrameGrid>,
}

impl Animation {
    pub(crate) fn new(
        speed: u16,
        row_count: u8,
        column_count: u8,
        palette: Vec<Rgb>,
        frames: Vec<FrameGrid>,
    ) -> Self {
        Animation {
            total_frames: frames.len() as u32,
            speed,
            row_count,
            column_count,
            palette,
            frames,
        }
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Device-reported playback value. Its unit is not fixed by the container, so it
    /// is passed through untouched; see `FrameTiming` in the renderer.
    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn row_count(&self) -> u8 {
        self.row_count
    }

    pub fn column_count(&self) -> u8 {
        self.column_count
    }

    /// Pixel width (`column_count * 16`).
    pub fn width(&self) -> usize {
        self.column_count as usize * TILE_DIM
    }

    /// Pixel height (`row_count * 16`).
    pub fn height(&self) -> usize {
        self.row_count as usize * TILE_DIM
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn frames(&self) -> &[FrameGrid] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&FrameGrid> {
        self.frames.get(index)
    }

    /// Resolved colour of one pixel.
    pub fn pixel(&self, frame: usize, x: usize, y: usize) -> Option<Rgb> {
        let index = self.frames.get(frame)?.get(x, y)?;
        self.palette.get(index as usize).copied()
    }

    /// Row-major RGB bytes of one frame, three bytes per pixel.
    pub fn frame_rgb(&self, frame: usize) -> Option<Vec<u8>> {
        let grid = self.frames.get(frame)?;
        let mut rgb = Vec::with_capacity(grid.indices.len() * 3);
        for &index in &grid.indices {
            rgb.extend_from_slice(&self.palette[index as usize]);
        }
        Some(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Animation {
        let indices = (0..16 * 16).map(|i| ((i % 16 + i / 16) % 2) as u32).collect();
        Animation::new(
            100,
            1,
            1,
            vec![[0, 0, 0], [255, 255, 255]],
            vec![FrameGrid::new(16, 16, indices)],
        )
    }

    #[test]
    fn dimensions_follow_tile_counts() {
        let anim = checker();
        assert_eq!(anim.total_frames(), 1);
        assert_eq!(anim.width(), 16);
        assert_eq!(anim.height(), 16);
        assert_eq!(anim.frame(0).map(FrameGrid::width), Some(16));
        assert!(anim.frame(1).is_none());
    }

    #[test]
    fn pixels_resolve_through_palette() {
        let anim = checker();
        assert_eq!(anim.pixel(0, 0, 0), Some([0, 0, 0]));
        assert_eq!(anim.pixel(0, 1, 0), Some([255, 255, 255]));
        assert_eq!(anim.pixel(0, 16, 0), None);

        let rgb = anim.frame_rgb(0).unwrap();
        assert_eq!(rgb.len(), 16 * 16 * 3);
        assert_eq!(&rgb[3..6], &[255, 255, 255]);
    }

    #[test]
    fn rows_cover_the_grid() {
        let anim = checker();
        let grid = anim.frame(0).unwrap();
        assert_eq!(grid.rows().count(), 16);
        let row = grid.rows().nth(3).unwrap();
        assert_eq!(row.len(), 16);
        assert_eq!(row[0], 1);
    }
}
