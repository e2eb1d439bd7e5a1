//! Decoded animation model and everything that consumes it
//!
//! `animation` and `palette` are part of decoding; `renderer` and `metadata` turn a
//! finished [`Animation`] into files.

pub mod animation;
pub mod metadata;
pub mod palette;
pub mod renderer;

pub use animation::{Animation, FrameGrid, Rgb, TILE_DIM};
pub use renderer::{FrameTiming, RenderError, RenderOptions};
