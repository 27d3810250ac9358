use crate::compositing::paste::{PastedRegion, paste};
use bitvec::prelude::*;
use ndarray::{Array2, ArrayView2};
use num_traits::{NumCast, PrimInt, Unsigned};
use std::fmt;

/// Unsigned integer pixel type of an output canvas
///
/// The unit interval maps linearly onto `0..=MAX`.
pub trait CanvasPixel: PrimInt + Unsigned + fmt::Debug {
    /// Convert a `[0, 1]` intensity, rounding to the nearest level
    fn from_unit(value: f64) -> Self {
        let max = Self::max_value().to_f64().unwrap_or(0.0);
        let scaled = (value.clamp(0.0, 1.0) * max).round();
        <Self as NumCast>::from(scaled).unwrap_or_else(Self::max_value)
    }

    /// Convert back to a `[0, 1]` intensity
    fn to_unit(self) -> f64 {
        let max = Self::max_value().to_f64().unwrap_or(1.0);
        self.to_f64().unwrap_or(0.0) / max
    }
}

impl<T: PrimInt + Unsigned + fmt::Debug> CanvasPixel for T {}

/// Output mosaic buffer that remembers which pixels have been pasted
#[derive(Clone, Debug)]
pub struct Canvas<P: CanvasPixel> {
    pixels: Array2<P>,
    coverage: BitVec,
}

impl<P: CanvasPixel> Canvas<P> {
    /// Create a zeroed canvas of `[height, width]` pixels
    pub fn new(shape: [usize; 2]) -> Self {
        Self {
            pixels: Array2::from_elem((shape[0], shape[1]), P::zero()),
            coverage: bitvec![0; shape[0] * shape[1]],
        }
    }

    /// Canvas extent as `[height, width]`
    pub fn shape(&self) -> [usize; 2] {
        let (height, width) = self.pixels.dim();
        [height, width]
    }

    /// Pixel buffer
    pub const fn pixels(&self) -> &Array2<P> {
        &self.pixels
    }

    /// Give up the canvas, keeping its pixels
    pub fn into_pixels(self) -> Array2<P> {
        self.pixels
    }

    /// Composite an image with maximum-intensity blending
    ///
    /// See [`paste`] for placement rules.
    pub fn paste(
        &mut self,
        image: ArrayView2<'_, f64>,
        position: [f64; 2],
        debug: bool,
    ) -> Option<PastedRegion> {
        let region = paste(self.pixels.view_mut(), image, position, debug)?;
        let width = self.pixels.ncols();
        for row in region.origin[0]..region.origin[0] + region.shape[0] {
            let start = row * width + region.origin[1];
            if let Some(bits) = self.coverage.get_mut(start..start + region.shape[1]) {
                bits.fill(true);
            }
        }
        Some(region)
    }

    /// Whether any paste has written this pixel
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        let (height, width) = self.pixels.dim();
        row < height && col < width && self.coverage.get(row * width + col).as_deref() == Some(&true)
    }

    /// Share of pixels written by at least one paste
    pub fn covered_fraction(&self) -> f64 {
        if self.coverage.is_empty() {
            return 0.0;
        }
        self.coverage.count_ones() as f64 / self.coverage.len() as f64
    }

    /// Pixel values of covered pixels in row-major order
    pub fn covered_values(&self) -> Vec<P> {
        self.pixels
            .iter()
            .zip(self.coverage.iter())
            .filter_map(|(pixel, covered)| (*covered).then_some(*pixel))
            .collect()
    }

    /// Floating point copy scaled to `[0, 1]`, usable as a layer reference
    pub fn to_normalized(&self) -> Array2<f64> {
        self.pixels.mapv(CanvasPixel::to_unit)
    }
}
