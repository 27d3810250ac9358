//! Two-dimensional discrete Fourier transforms over `ndarray` planes
//!
//! Transforms are unnormalized in both directions, matching `rustfft`.

use crate::io::error::{Result, computation_error};
use ndarray::{Array2, ArrayView2};
use rustfft::num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

/// Forward transform of a real plane
///
/// # Errors
///
/// Returns an error if the working buffer is not contiguous
pub fn forward(image: ArrayView2<'_, f64>) -> Result<Array2<Complex<f64>>> {
    let mut spectrum = image.mapv(|value| Complex::new(value, 0.0));
    transform(&mut spectrum, FftDirection::Forward)?;
    Ok(spectrum)
}

/// Inverse transform without the `1 / N` scaling
///
/// # Errors
///
/// Returns an error if the working buffer is not contiguous
pub fn inverse(spectrum: ArrayView2<'_, Complex<f64>>) -> Result<Array2<Complex<f64>>> {
    let mut output = spectrum.as_standard_layout().into_owned();
    transform(&mut output, FftDirection::Inverse)?;
    Ok(output)
}

fn transform(data: &mut Array2<Complex<f64>>, direction: FftDirection) -> Result<()> {
    let (height, width) = data.dim();
    if height == 0 || width == 0 {
        return Ok(());
    }

    if !data.is_standard_layout() {
        *data = data.as_standard_layout().into_owned();
    }

    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft(width, direction);
    let column_fft = planner.plan_fft(height, direction);

    // Rows are contiguous in standard layout, so one call covers all of them
    let buffer = data
        .as_slice_mut()
        .ok_or_else(|| computation_error("fft2", &"plane is not in standard layout"))?;
    row_fft.process(buffer);

    let mut column = vec![Complex::default(); height];
    for mut lane in data.columns_mut() {
        for (slot, value) in column.iter_mut().zip(lane.iter()) {
            *slot = *value;
        }
        column_fft.process(&mut column);
        for (value, slot) in lane.iter_mut().zip(&column) {
            *value = *slot;
        }
    }

    Ok(())
}

/// Signed frequency of DFT bin `index` for a transform of `length` samples
///
/// Bins above the midpoint wrap to negative frequencies, in cycles per sample.
pub fn frequency(index: usize, length: usize) -> f64 {
    let signed = if index <= length.saturating_sub(1) / 2 {
        index as f64
    } else {
        index as f64 - length as f64
    };
    signed / length as f64
}

/// Move the zero-displacement bin to the center of the plane
pub fn fft_shift(plane: ArrayView2<'_, f64>) -> Array2<f64> {
    let (height, width) = plane.dim();
    let mut shifted = Array2::zeros((height, width));
    for ((row, col), &value) in plane.indexed_iter() {
        let target = ((row + height / 2) % height, (col + width / 2) % width);
        if let Some(slot) = shifted.get_mut(target) {
            *slot = value;
        }
    }
    shifted
}
