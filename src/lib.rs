//! Registration and compositing of overlapping microscope image tiles
//!
//! Tiles arrive with nominal stage positions. Overlapping pairs are aligned to
//! sub-pixel precision by phase correlation of whitened overlap crops, tiles of
//! further layers are aligned against an assembled reference mosaic, and tiles
//! are composited into an integer canvas with maximum-intensity blending.

/// Pairwise and layer registration with result caching
pub mod algorithm;
/// Maximum-intensity compositing into an output canvas
pub mod compositing;
/// High-pass whitening filters applied before correlation
pub mod filter;
/// Input/output adapters, configuration and error handling
pub mod io;
/// Fourier transforms, phase correlation and resampling
pub mod math;
/// Tile geometry and overlap computation
pub mod spatial;

pub use io::error::{Result, StitchError};
