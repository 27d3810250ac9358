//! Pasting with maximum-intensity blending
//!
//! The source is placed at a fractional position: the integer part selects
//! the target slice and the remainder is applied as a bilinear sub-pixel
//! shift. Fractional pixels shifted past the slice edge are discarded.

use crate::compositing::canvas::CanvasPixel;
use crate::io::configuration::DEBUG_OUTLINE_INTENSITY;
use crate::math::resample::{clamp_unit, shift_bilinear};
use crate::math::vector;
use ndarray::{ArrayView2, ArrayViewMut2, Zip, s};

/// Canvas rectangle written by a paste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastedRegion {
    /// Top-left `[row, col]` of the written slice
    pub origin: [usize; 2],
    /// Slice extent as `[height, width]`
    pub shape: [usize; 2],
}

/// Composite `image` into `target` at `position`, keeping the brighter pixel
///
/// Source rows or columns that fall before the canvas origin are dropped, and
/// the source is truncated where it runs past the canvas edge. With `debug`,
/// the border of the written slice is brightened by a faint outline. Each
/// border pixel is brightened once, so a slice one pixel high or wide gets
/// the same single increment as any other border.
///
/// Returns the written region, or `None` when the image misses the canvas.
pub fn paste<P: CanvasPixel>(
    mut target: ArrayViewMut2<'_, P>,
    image: ArrayView2<'_, f64>,
    position: [f64; 2],
    debug: bool,
) -> Option<PastedRegion> {
    let (whole, fraction) = vector::split_fraction(position);
    let skip = [(-whole[0]).max(0) as usize, (-whole[1]).max(0) as usize];
    let origin = [whole[0].max(0) as usize, whole[1].max(0) as usize];

    let (target_height, target_width) = target.dim();
    let (image_height, image_width) = image.dim();
    let shape = [
        image_height
            .saturating_sub(skip[0])
            .min(target_height.saturating_sub(origin[0])),
        image_width
            .saturating_sub(skip[1])
            .min(target_width.saturating_sub(origin[1])),
    ];
    if shape.contains(&0) {
        return None;
    }

    let source = image.slice(s![skip[0]..skip[0] + shape[0], skip[1]..skip[1] + shape[1]]);
    let mut shifted = shift_bilinear(source, fraction);
    clamp_unit(&mut shifted);

    let mut slice = target.slice_mut(s![
        origin[0]..origin[0] + shape[0],
        origin[1]..origin[1] + shape[1]
    ]);
    Zip::from(&mut slice).and(&shifted).for_each(|pixel, &value| {
        *pixel = (*pixel).max(P::from_unit(value));
    });

    if debug {
        outline(&mut slice);
    }

    Some(PastedRegion { origin, shape })
}

// Saturating add on the one-pixel border, each border pixel once even when
// the first and last row or column coincide
fn outline<P: CanvasPixel>(slice: &mut ArrayViewMut2<'_, P>) {
    let brightness = P::from_unit(DEBUG_OUTLINE_INTENSITY);
    let (height, width) = slice.dim();
    for ((row, col), pixel) in slice.indexed_iter_mut() {
        if row == 0 || col == 0 || row + 1 == height || col + 1 == width {
            *pixel = pixel.saturating_add(brightness);
        }
    }
}
