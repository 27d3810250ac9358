//! High-pass pre-filters applied to image crops before correlation
//!
//! Both filters respond with (near) zero to uniform intensity gradients, so
//! uneven illumination across a tile does not pull the correlation peak.

use crate::io::configuration::DEFAULT_HIGHPASS_SIGMA;
use ndarray::{Array2, ArrayView2, Axis};

/// Edge-enhancing transform used to flatten an image's spectrum
pub trait Whitening {
    /// Produce the filtered plane, same shape as the input
    fn whiten(&self, image: ArrayView2<'_, f64>) -> Array2<f64>;
}

/// Discrete Laplacian with a positive centre tap
///
/// Edges mirror the border sample, so a linear ramp whitens to zero
/// everywhere except where the ramp meets the border.
#[derive(Debug, Clone, Copy, Default)]
pub struct Laplace;

impl Whitening for Laplace {
    fn whiten(&self, image: ArrayView2<'_, f64>) -> Array2<f64> {
        let (height, width) = image.dim();
        let at = |row: isize, col: isize| -> f64 {
            let r = reflect_index(row, height);
            let c = reflect_index(col, width);
            image.get((r, c)).copied().unwrap_or(0.0)
        };

        Array2::from_shape_fn((height, width), |(row, col)| {
            let (r, c) = (row as isize, col as isize);
            4.0f64.mul_add(
                at(r, c),
                -(at(r - 1, c) + at(r + 1, c) + at(r, c - 1) + at(r, c + 1)),
            )
        })
    }
}

/// Subtract a Gaussian-blurred copy, keeping only fine structure
#[derive(Debug, Clone, Copy)]
pub struct GaussianHighPass {
    /// Blur standard deviation in pixels
    pub sigma: f64,
}

impl Default for GaussianHighPass {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_HIGHPASS_SIGMA,
        }
    }
}

impl Whitening for GaussianHighPass {
    fn whiten(&self, image: ArrayView2<'_, f64>) -> Array2<f64> {
        let kernel = gaussian_kernel(self.sigma);
        let blurred = convolve_axis(convolve_axis(image, &kernel, Axis(0)).view(), &kernel, Axis(1));
        &image - &blurred
    }
}

// Kernel truncated at four standard deviations, normalized to unit sum
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma.is_nan() || sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (4.0 * sigma).ceil() as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i * i) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn convolve_axis(image: ArrayView2<'_, f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut output = Array2::zeros(image.raw_dim());
    for (source, mut target) in image.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        let length = source.len();
        for (position, slot) in target.iter_mut().enumerate() {
            *slot = kernel
                .iter()
                .enumerate()
                .map(|(tap, weight)| {
                    let index = reflect_index(position as isize + tap as isize - radius, length);
                    weight * source.get(index).copied().unwrap_or(0.0)
                })
                .sum();
        }
    }
    output
}

/// Map an out-of-range index back into `0..length` by half-sample reflection
///
/// `-1` maps to `0` and `length` maps to `length - 1`.
pub fn reflect_index(index: isize, length: usize) -> usize {
    if length == 0 {
        return 0;
    }
    let period = 2 * length as isize;
    let folded = index.rem_euclid(period);
    if folded < length as isize {
        folded as usize
    } else {
        (period - 1 - folded) as usize
    }
}
