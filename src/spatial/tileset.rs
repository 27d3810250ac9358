//! Tile geometry derived from acquisition metadata
//!
//! Stage positions arrive in microns and are converted to pixel units once,
//! at construction. Every tile in a set shares one pixel shape.

use crate::io::error::{Result, check_tile_index, validation_error};
use crate::io::source::MetadataSource;
use crate::math::vector;

/// Pixel-space layout of a tile acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct TileSet {
    size: [usize; 2],
    calibration: [f64; 2],
    positions: Vec<[f64; 2]>,
}

impl TileSet {
    /// Read tile sizes and stage positions from a metadata source
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source reports no tiles
    /// - The pixel calibration is not finite and strictly positive
    /// - Any tile's pixel size differs from tile 0's
    /// - The source fails to report a tile's size or position
    pub fn from_metadata<M: MetadataSource + ?Sized>(metadata: &M) -> Result<Self> {
        let tile_count = metadata.tile_count();
        if tile_count == 0 {
            return Err(validation_error(&"acquisition contains no tiles"));
        }

        let calibration = metadata.pixel_calibration();
        if calibration.iter().any(|c| !c.is_finite() || *c <= 0.0) {
            return Err(validation_error(&format!(
                "pixel calibration {calibration:?} must be finite and positive"
            )));
        }

        let size = metadata.pixel_size(0)?;
        let mut stage_positions = Vec::with_capacity(tile_count);
        for tile in 0..tile_count {
            let tile_size = metadata.pixel_size(tile)?;
            if tile_size != size {
                return Err(validation_error(&format!(
                    "tile {tile} is {}x{} pixels but tile 0 is {}x{}",
                    tile_size[0], tile_size[1], size[0], size[1]
                )));
            }
            stage_positions.push(metadata.stage_position(tile)?);
        }

        Self::from_stage_positions(size, calibration, &stage_positions)
    }

    /// Build from already-known geometry
    ///
    /// # Errors
    ///
    /// Returns an error if there are no positions, the tile size has a zero
    /// axis, or the calibration is not finite and strictly positive
    pub fn from_stage_positions(
        size: [usize; 2],
        calibration: [f64; 2],
        stage_positions: &[[f64; 2]],
    ) -> Result<Self> {
        if stage_positions.is_empty() {
            return Err(validation_error(&"acquisition contains no tiles"));
        }
        if size.contains(&0) {
            return Err(validation_error(&format!(
                "tile size {}x{} has an empty axis",
                size[0], size[1]
            )));
        }
        if calibration.iter().any(|c| !c.is_finite() || *c <= 0.0) {
            return Err(validation_error(&format!(
                "pixel calibration {calibration:?} must be finite and positive"
            )));
        }

        let positions = stage_positions
            .iter()
            .map(|stage| [stage[0] / calibration[0], stage[1] / calibration[1]])
            .collect();

        Ok(Self {
            size,
            calibration,
            positions,
        })
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the set holds no tiles (never true for a constructed set)
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Shared tile shape as `[height, width]` pixels
    pub const fn size(&self) -> [usize; 2] {
        self.size
    }

    /// Microns per pixel as `[y, x]`
    pub const fn calibration(&self) -> [f64; 2] {
        self.calibration
    }

    /// Position of one tile in pixel units
    ///
    /// # Errors
    ///
    /// Returns an error if `tile` is out of range
    pub fn tile_position(&self, tile: usize) -> Result<[f64; 2]> {
        let index = check_tile_index(tile, self.len())?;
        Ok(self.positions.get(index).copied().unwrap_or_default())
    }

    /// All tile positions in tile index order
    pub fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }

    /// Tile centers (position plus half the tile size)
    pub fn centers(&self) -> Vec<[f64; 2]> {
        let half = [self.size[0] as f64 / 2.0, self.size[1] as f64 / 2.0];
        self.positions
            .iter()
            .map(|&position| vector::add(position, half))
            .collect()
    }

    /// Element-wise minimum position
    pub fn origin(&self) -> [f64; 2] {
        self.positions
            .iter()
            .copied()
            .reduce(vector::min)
            .unwrap_or_default()
    }

    /// Grid shape as `(rows, cols)`, from the distinct Y and X positions
    ///
    /// Positions are compared exactly, so tiles in one row must report the
    /// same stage Y.
    ///
    /// # Errors
    ///
    /// Returns an error if `rows * cols` differs from the tile count
    pub fn grid_dimensions(&self) -> Result<(usize, usize)> {
        let distinct = |axis: usize| {
            let mut values: Vec<f64> = self
                .positions
                .iter()
                .filter_map(|position| position.get(axis).copied())
                .collect();
            values.sort_by(f64::total_cmp);
            values.dedup();
            values.len()
        };

        let shape = (distinct(0), distinct(1));
        if shape.0 * shape.1 != self.len() {
            return Err(validation_error(&format!(
                "{} tiles do not form a grid ({} distinct rows x {} distinct columns)",
                self.len(),
                shape.0,
                shape.1
            )));
        }
        Ok(shape)
    }

    /// Positions relative to the origin, truncated to whole pixels
    ///
    /// This is the frame of a mosaic assembled from this set.
    pub fn mosaic_positions(&self) -> Vec<[usize; 2]> {
        self.positions_relative_to(self.origin())
    }

    /// Positions relative to another set's origin, truncated to whole pixels
    ///
    /// Places the tiles in the frame of a mosaic assembled from a different
    /// acquisition. Positions before that origin saturate to zero.
    pub fn positions_relative_to(&self, origin: [f64; 2]) -> Vec<[usize; 2]> {
        self.positions
            .iter()
            .map(|&position| Self::relative_position(position, origin))
            .collect()
    }

    /// One pixel-unit position relative to `origin`, truncated to whole pixels
    pub fn relative_position(position: [f64; 2], origin: [f64; 2]) -> [usize; 2] {
        let relative = vector::sub(position, origin);
        [relative[0] as usize, relative[1] as usize]
    }

    /// Canvas shape that holds every tile at its origin-relative position
    pub fn mosaic_shape(&self) -> [usize; 2] {
        let origin = self.origin();
        let extent = self
            .positions
            .iter()
            .map(|&position| vector::sub(position, origin))
            .reduce(vector::max)
            .unwrap_or_default();
        [
            (extent[0] + self.size[0] as f64).ceil() as usize,
            (extent[1] + self.size[1] as f64).ceil() as usize,
        ]
    }
}
