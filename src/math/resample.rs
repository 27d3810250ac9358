//! Sub-pixel resampling and range utilities for floating point planes
//!
//! Shifts use bilinear interpolation with zero fill outside the source, so a
//! shift by whole pixels is an exact translation.

use ndarray::{Array2, ArrayView2, s};

/// Translate an image by a sub-pixel `[dy, dx]` amount
///
/// Output pixel `p` samples the input at `p - shift`; samples falling outside
/// the input contribute zero.
pub fn shift_bilinear(image: ArrayView2<'_, f64>, shift: [f64; 2]) -> Array2<f64> {
    if shift == [0.0, 0.0] {
        return image.to_owned();
    }

    let (height, width) = image.dim();
    let sample = |row: i64, col: i64| -> f64 {
        if row < 0 || col < 0 {
            return 0.0;
        }
        image
            .get((row as usize, col as usize))
            .copied()
            .unwrap_or(0.0)
    };

    Array2::from_shape_fn((height, width), |(row, col)| {
        let source_y = row as f64 - shift[0];
        let source_x = col as f64 - shift[1];
        let y0 = source_y.floor();
        let x0 = source_x.floor();
        let fy = source_y - y0;
        let fx = source_x - x0;
        let (y0, x0) = (y0 as i64, x0 as i64);

        let top = (1.0 - fx).mul_add(sample(y0, x0), fx * sample(y0, x0 + 1));
        let bottom = (1.0 - fx).mul_add(sample(y0 + 1, x0), fx * sample(y0 + 1, x0 + 1));
        (1.0 - fy).mul_add(top, fy * bottom)
    })
}

/// View of the leading `shape` rows and columns, limited to what exists
pub fn truncate(image: ArrayView2<'_, f64>, shape: [usize; 2]) -> ArrayView2<'_, f64> {
    let (height, width) = image.dim();
    image.slice_move(s![..shape[0].min(height), ..shape[1].min(width)])
}

/// Clamp every intensity into the unit range
pub fn clamp_unit(image: &mut Array2<f64>) {
    image.mapv_inplace(|value| value.clamp(0.0, 1.0));
}

/// Separable Hann window, non-zero at every sample
pub fn hann_window(shape: [usize; 2]) -> Array2<f64> {
    let taper = |length: usize| -> Vec<f64> {
        (0..length)
            .map(|i| {
                let phase = std::f64::consts::TAU * (i as f64 + 0.5) / length as f64;
                0.5f64.mul_add(-phase.cos(), 0.5)
            })
            .collect()
    };
    let rows = taper(shape[0]);
    let cols = taper(shape[1]);

    Array2::from_shape_fn((shape[0], shape[1]), |(row, col)| {
        rows.get(row).copied().unwrap_or(0.0) * cols.get(col).copied().unwrap_or(0.0)
    })
}
