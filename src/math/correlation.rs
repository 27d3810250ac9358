//! Translation estimation by phase correlation
//!
//! The integer peak of the inverse-transformed, normalized cross-power
//! spectrum is refined on an upsampled grid by evaluating the inverse DFT
//! directly at fractional displacements, so only a small neighbourhood of the
//! peak is ever computed at the finer resolution.

use crate::io::configuration::{REJECTED_ERROR, SPECTRUM_REGULARIZATION, UPSAMPLE_FACTOR};
use crate::io::error::{Result, computation_error};
use crate::math::fourier::{self, frequency};
use crate::math::resample::hann_window;
use ndarray::{Array2, ArrayView2, Zip};
use rustfft::num_complex::Complex;
use std::f64::consts::TAU;

/// Shift and goodness of fit between two planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationEstimate {
    /// Displacement `[dy, dx]` that moves the second plane onto the first
    pub shift: [f64; 2],
    /// Normalized residual in `[0, 1]`; zero for a perfect match
    pub error: f64,
}

/// Phase correlation settings
#[derive(Debug, Clone, Copy)]
pub struct PhaseCorrelation {
    /// Peak precision is `1 / upsample_factor` pixels
    pub upsample_factor: usize,
    /// Taper both planes with a Hann window before transforming
    pub apodize: bool,
    /// Normalization floor relative to the spectrum's peak magnitude
    pub regularization: f64,
}

impl Default for PhaseCorrelation {
    fn default() -> Self {
        Self {
            upsample_factor: UPSAMPLE_FACTOR,
            apodize: true,
            regularization: SPECTRUM_REGULARIZATION,
        }
    }
}

/// Intermediate products of one correlation, kept for inspection
#[derive(Debug, Clone)]
pub struct CorrelationSurface {
    /// Magnitude of the inverse-transformed normalized spectrum, zero shift centered
    pub magnitude: Array2<f64>,
    /// Estimate derived from the surface
    pub estimate: TranslationEstimate,
}

impl PhaseCorrelation {
    /// Estimate the translation taking `moving` onto `reference`
    ///
    /// If `reference(p) == moving(p - shift)`, the returned shift is `shift`.
    ///
    /// # Errors
    ///
    /// Returns an error if the planes differ in shape or are empty
    pub fn estimate(
        &self,
        reference: ArrayView2<'_, f64>,
        moving: ArrayView2<'_, f64>,
    ) -> Result<TranslationEstimate> {
        Ok(self.surface(reference, moving)?.estimate)
    }

    /// Estimate the translation and keep the correlation surface
    ///
    /// # Errors
    ///
    /// Returns an error if the planes differ in shape or are empty
    pub fn surface(
        &self,
        reference: ArrayView2<'_, f64>,
        moving: ArrayView2<'_, f64>,
    ) -> Result<CorrelationSurface> {
        if reference.dim() != moving.dim() {
            return Err(computation_error(
                "phase correlation",
                &format!(
                    "shape mismatch {:?} vs {:?}",
                    reference.dim(),
                    moving.dim()
                ),
            ));
        }
        let (height, width) = reference.dim();
        if height == 0 || width == 0 {
            return Err(computation_error("phase correlation", &"empty plane"));
        }

        let (reference_spectrum, moving_spectrum) = if self.apodize {
            let window = hann_window([height, width]);
            (
                fourier::forward((&reference * &window).view())?,
                fourier::forward((&moving * &window).view())?,
            )
        } else {
            (fourier::forward(reference)?, fourier::forward(moving)?)
        };

        let product = Zip::from(&reference_spectrum)
            .and(&moving_spectrum)
            .map_collect(|a, b| a * b.conj());

        let reference_energy: f64 = reference_spectrum.iter().map(|v| v.norm_sqr()).sum();
        let moving_energy: f64 = moving_spectrum.iter().map(|v| v.norm_sqr()).sum();
        let energy = reference_energy * moving_energy;
        if energy <= 0.0 {
            // Featureless planes carry no alignment signal
            return Ok(CorrelationSurface {
                magnitude: Array2::zeros((height, width)),
                estimate: TranslationEstimate {
                    shift: [0.0, 0.0],
                    error: REJECTED_ERROR,
                },
            });
        }

        let peak_magnitude = product.iter().map(|v| v.norm()).fold(0.0, f64::max);
        let floor = self.regularization.mul_add(peak_magnitude, f64::MIN_POSITIVE);
        let normalized = product.mapv(|v| v / (v.norm() + floor));

        let surface = fourier::inverse(normalized.view())?.mapv(|v| v.norm());
        let coarse = coarse_peak(&surface);
        let shift = self.refine(&normalized, coarse);

        let peak = evaluate_inverse(&product, &[shift[0]], &[shift[1]]);
        let matched = peak.iter().map(|v| v.norm_sqr()).sum::<f64>();
        let error = (1.0 - matched / energy).abs().sqrt();

        Ok(CorrelationSurface {
            magnitude: fourier::fft_shift(surface.view()),
            estimate: TranslationEstimate { shift, error },
        })
    }

    fn refine(&self, spectrum: &Array2<Complex<f64>>, coarse: [f64; 2]) -> [f64; 2] {
        if self.upsample_factor <= 1 {
            return coarse;
        }

        let factor = self.upsample_factor as f64;
        let region = (factor * 1.5).ceil() as usize;
        let center = (region / 2) as f64;
        let offsets: Vec<f64> = (0..region)
            .map(|i| (i as f64 - center) / factor)
            .collect();
        let rows: Vec<f64> = offsets.iter().map(|o| coarse[0] + o).collect();
        let cols: Vec<f64> = offsets.iter().map(|o| coarse[1] + o).collect();

        let grid = evaluate_inverse(spectrum, &rows, &cols);
        let mut best = (f64::NEG_INFINITY, coarse);
        for ((row, col), value) in grid.indexed_iter() {
            let magnitude = value.norm();
            if magnitude > best.0 {
                let y = rows.get(row).copied().unwrap_or(coarse[0]);
                let x = cols.get(col).copied().unwrap_or(coarse[1]);
                best = (magnitude, [y, x]);
            }
        }
        best.1
    }
}

// Largest surface value, with indices past the midpoint read as negative shifts
fn coarse_peak(surface: &Array2<f64>) -> [f64; 2] {
    let (height, width) = surface.dim();
    let mut best = (f64::NEG_INFINITY, (0, 0));
    for (index, &value) in surface.indexed_iter() {
        if value > best.0 {
            best = (value, index);
        }
    }
    let (row, col) = best.1;
    let wrap = |index: usize, length: usize| {
        if index > length / 2 {
            index as f64 - length as f64
        } else {
            index as f64
        }
    };
    [wrap(row, height), wrap(col, width)]
}

/// Evaluate the unnormalized inverse DFT of `spectrum` at fractional positions
///
/// Returns a `rows.len() x cols.len()` grid; integer positions reproduce the
/// corresponding samples of the full inverse transform.
pub fn evaluate_inverse(
    spectrum: &Array2<Complex<f64>>,
    rows: &[f64],
    cols: &[f64],
) -> Array2<Complex<f64>> {
    let (height, width) = spectrum.dim();

    let mut partial = Array2::<Complex<f64>>::zeros((rows.len(), width));
    for (mut accumulated, &y) in partial.rows_mut().into_iter().zip(rows) {
        for (k, spectrum_row) in spectrum.rows().into_iter().enumerate() {
            let phase = Complex::cis(TAU * y * frequency(k, height));
            for (slot, &value) in accumulated.iter_mut().zip(spectrum_row.iter()) {
                *slot += value * phase;
            }
        }
    }

    let column_phases: Vec<Vec<Complex<f64>>> = cols
        .iter()
        .map(|&x| {
            (0..width)
                .map(|l| Complex::cis(TAU * x * frequency(l, width)))
                .collect()
        })
        .collect();

    let mut grid = Array2::<Complex<f64>>::zeros((rows.len(), cols.len()));
    for (partial_row, mut grid_row) in partial.rows().into_iter().zip(grid.rows_mut()) {
        for (slot, phases) in grid_row.iter_mut().zip(&column_phases) {
            *slot = partial_row
                .iter()
                .zip(phases)
                .map(|(value, phase)| value * phase)
                .sum();
        }
    }
    grid
}
