//! Axis-aligned overlap between two nominally placed tiles

use crate::io::error::{Result, geometry_error};
use crate::math::vector;
use crate::spatial::TileSet;

/// Shared rectangle of two tiles, expressed in each tile's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapRegion {
    /// First tile's origin relative to the overlap's top-left corner
    pub offset1: [f64; 2],
    /// Second tile's origin relative to the overlap's top-left corner
    pub offset2: [f64; 2],
    /// Overlap extent in whole pixels as `[height, width]`
    pub shape: [usize; 2],
}

/// Compute the overlap of tiles `first` and `second`
///
/// The top-left corner is the element-wise maximum of the two tile origins
/// and the bottom-right the element-wise minimum of their far corners. The
/// extent is rounded up to whole pixels.
///
/// # Errors
///
/// Returns an error if either index is out of range, or
/// [`StitchError::Geometry`](crate::StitchError::Geometry) if the rounded extent is not positive on both axes
pub fn intersection(tiles: &TileSet, first: usize, second: usize) -> Result<OverlapRegion> {
    let size = vector::from_extent(tiles.size());
    let origin1 = tiles.tile_position(first)?;
    let origin2 = tiles.tile_position(second)?;

    let corner = vector::max(origin1, origin2);
    let far = vector::min(vector::add(origin1, size), vector::add(origin2, size));
    let extent = vector::sub(far, corner);
    let rounded = [extent[0].ceil(), extent[1].ceil()];

    if rounded.iter().any(|&e| e <= 0.0) {
        return Err(geometry_error(first, second, extent));
    }

    Ok(OverlapRegion {
        offset1: vector::sub(origin1, corner),
        offset2: vector::sub(origin2, corner),
        shape: [rounded[0] as usize, rounded[1] as usize],
    })
}

/// Every pair `(i, j)` with `i < j` whose nominal rectangles intersect
pub fn overlapping_pairs(tiles: &TileSet) -> Vec<(usize, usize)> {
    let count = tiles.len();
    (0..count)
        .flat_map(|first| ((first + 1)..count).map(move |second| (first, second)))
        .filter(|&(first, second)| intersection(tiles, first, second).is_ok())
        .collect()
}
