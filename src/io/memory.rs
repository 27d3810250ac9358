//! Tile acquisition held entirely in memory
//!
//! Useful for synthetic data and for driving the aligners from planes that
//! were decoded elsewhere. Every successful read is counted.

use crate::io::error::{Result, check_tile_index, invalid_parameter, validation_error};
use crate::io::source::{ImageSource, MetadataSource};
use ndarray::Array2;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct StoredTile {
    stage_position: [f64; 2],
    channels: Vec<Array2<f64>>,
}

/// Owned planes with their stage positions
#[derive(Debug, Default)]
pub struct InMemoryTiles {
    calibration: [f64; 2],
    tiles: Vec<StoredTile>,
    reads: AtomicUsize,
}

impl InMemoryTiles {
    /// Create an empty acquisition with the given microns per pixel
    pub fn new(calibration: [f64; 2]) -> Self {
        Self {
            calibration,
            tiles: Vec::new(),
            reads: AtomicUsize::new(0),
        }
    }

    /// Add a single-channel tile, returning its index
    pub fn push_tile(&mut self, stage_position: [f64; 2], plane: Array2<f64>) -> usize {
        self.tiles.push(StoredTile {
            stage_position,
            channels: vec![plane],
        });
        self.tiles.len() - 1
    }

    /// Add a multi-channel tile, returning its index
    ///
    /// # Errors
    ///
    /// Returns an error if no channels are given or their shapes differ
    pub fn push_channels(
        &mut self,
        stage_position: [f64; 2],
        channels: Vec<Array2<f64>>,
    ) -> Result<usize> {
        let Some(first) = channels.first() else {
            return Err(validation_error(&"a tile needs at least one channel"));
        };
        if channels.iter().any(|plane| plane.dim() != first.dim()) {
            return Err(validation_error(&"all channels of a tile must share one shape"));
        }
        self.tiles.push(StoredTile {
            stage_position,
            channels,
        });
        Ok(self.tiles.len() - 1)
    }

    /// Number of successful reads since creation or the last reset
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Zero the read counter
    pub fn reset_read_count(&self) {
        self.reads.store(0, Ordering::Relaxed);
    }

    fn tile(&self, tile: usize) -> Result<&StoredTile> {
        let index = check_tile_index(tile, self.tiles.len())?;
        self.tiles
            .get(index)
            .ok_or_else(|| validation_error(&format!("tile {tile} is missing")))
    }
}

impl ImageSource for InMemoryTiles {
    fn read(&self, tile: usize, channel: usize) -> Result<Array2<f64>> {
        let stored = self.tile(tile)?;
        let plane = stored.channels.get(channel).ok_or_else(|| {
            invalid_parameter(
                "channel",
                &channel,
                &format!("tile {tile} has {} channels", stored.channels.len()),
            )
        })?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(plane.clone())
    }
}

impl MetadataSource for InMemoryTiles {
    fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    fn pixel_size(&self, tile: usize) -> Result<[usize; 2]> {
        let stored = self.tile(tile)?;
        let (height, width) = stored.channels.first().map_or((0, 0), Array2::dim);
        Ok([height, width])
    }

    fn pixel_calibration(&self) -> [f64; 2] {
        self.calibration
    }

    fn stage_position(&self, tile: usize) -> Result<[f64; 2]> {
        Ok(self.tile(tile)?.stage_position)
    }
}
