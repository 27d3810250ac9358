//! Capabilities the registration engine requires from a microscope data reader

use crate::io::error::Result;
use ndarray::Array2;

/// Supplies single 2-D intensity planes
///
/// Rows must increase with physical Y. Readers whose underlying format
/// stores scanlines in the opposite order flip them before returning.
pub trait ImageSource {
    /// Read one plane of `tile` for `channel`
    ///
    /// Intensities are expected to be normalized to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tile or channel does not exist or the
    /// underlying data cannot be decoded
    fn read(&self, tile: usize, channel: usize) -> Result<Array2<f64>>;
}

/// Describes where each tile was captured
pub trait MetadataSource {
    /// Number of tiles in the acquisition
    fn tile_count(&self) -> usize;

    /// Tile shape in pixels as `[height, width]`
    ///
    /// # Errors
    ///
    /// Returns an error if the tile index is out of range or its header
    /// cannot be read
    fn pixel_size(&self, tile: usize) -> Result<[usize; 2]>;

    /// Physical pixel size as `[y, x]` microns per pixel, uniform across tiles
    fn pixel_calibration(&self) -> [f64; 2];

    /// Stage position of the first focal plane as `[y, x]` microns
    ///
    /// # Errors
    ///
    /// Returns an error if the tile index is out of range
    fn stage_position(&self, tile: usize) -> Result<[f64; 2]>;
}
