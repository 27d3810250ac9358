//! Tile images on disk, located through a manifest
//!
//! Any PNG or TIFF readable by the `image` crate is accepted. Samples are
//! widened to 16 bits and normalized to `[0, 1]`.

use crate::io::error::{Result, StitchError, check_tile_index, invalid_parameter};
use crate::io::manifest::{Manifest, ManifestEntry};
use crate::io::source::{ImageSource, MetadataSource};
use image::DynamicImage;
use ndarray::Array2;
use std::path::Path;
use tracing::debug;

const SAMPLE_MAX: f64 = u16::MAX as f64;

/// Image files listed in a manifest, read on demand
#[derive(Debug, Clone)]
pub struct ImageFileTiles {
    manifest: Manifest,
    flip_vertical: bool,
}

impl ImageFileTiles {
    /// Parse the manifest at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or parsed
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_manifest(Manifest::from_path(path)?))
    }

    /// Wrap an already parsed manifest
    pub const fn from_manifest(manifest: Manifest) -> Self {
        Self {
            manifest,
            flip_vertical: false,
        }
    }

    /// Reverse scanline order on read, for files stored bottom row first
    #[must_use]
    pub fn with_vertical_flip(self, flip_vertical: bool) -> Self {
        Self {
            flip_vertical,
            ..self
        }
    }

    /// The underlying manifest
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn entry(&self, tile: usize) -> Result<&ManifestEntry> {
        let index = check_tile_index(tile, self.manifest.entries.len())?;
        self.manifest
            .entries
            .get(index)
            .ok_or(StitchError::InvalidTileIndex {
                index,
                tile_count: self.manifest.entries.len(),
            })
    }
}

impl ImageSource for ImageFileTiles {
    fn read(&self, tile: usize, channel: usize) -> Result<Array2<f64>> {
        let entry = self.entry(tile)?;
        debug!(tile, path = %entry.path.display(), "reading tile image");
        let image = image::open(&entry.path).map_err(|source| StitchError::ImageLoad {
            path: entry.path.clone(),
            source,
        })?;
        decode_plane(&image, channel, self.flip_vertical)
    }
}

impl MetadataSource for ImageFileTiles {
    fn tile_count(&self) -> usize {
        self.manifest.entries.len()
    }

    fn pixel_size(&self, tile: usize) -> Result<[usize; 2]> {
        let entry = self.entry(tile)?;
        let (width, height) =
            image::image_dimensions(&entry.path).map_err(|source| StitchError::ImageLoad {
                path: entry.path.clone(),
                source,
            })?;
        Ok([height as usize, width as usize])
    }

    fn pixel_calibration(&self) -> [f64; 2] {
        self.manifest.calibration
    }

    fn stage_position(&self, tile: usize) -> Result<[f64; 2]> {
        Ok(self.entry(tile)?.stage_position)
    }
}

/// Extract one channel of a decoded image as a `[0, 1]` plane
///
/// Grey images expose luma as channel 0 and, when present, alpha as
/// channel 1. Colour images expose their channels in storage order.
///
/// # Errors
///
/// Returns an error if `channel` exceeds the image's channel count
pub fn decode_plane(image: &DynamicImage, channel: usize, flip_vertical: bool) -> Result<Array2<f64>> {
    let channel_count = usize::from(image.color().channel_count());
    if channel >= channel_count {
        return Err(invalid_parameter(
            "channel",
            &channel,
            &format!("image has {channel_count} channels"),
        ));
    }
    // Luma is replicated into RGB by the conversion; alpha always lands last
    let sample = if channel_count <= 2 && channel == 1 {
        3
    } else {
        channel
    };

    let rgba = image.to_rgba16();
    let height = rgba.height() as usize;
    let width = rgba.width() as usize;

    Ok(Array2::from_shape_fn((height, width), |(row, col)| {
        let source_row = if flip_vertical { height - 1 - row } else { row };
        rgba.get_pixel_checked(col as u32, source_row as u32)
            .and_then(|pixel| pixel.0.get(sample))
            .map_or(0.0, |&value| f64::from(value) / SAMPLE_MAX)
    }))
}
