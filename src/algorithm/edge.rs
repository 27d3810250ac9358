//! Pairwise registration of overlapping tiles
//!
//! Each tile pair is registered from the content of its nominal overlap:
//! both crops are whitened and phase-correlated, and shifts larger than the
//! configured fraction of the tile size are discarded as spurious. Results
//! are cached per unordered pair, so a pair's image data is read at most once.
//!
//! A single correlation of a narrow overlap underestimates shifts across it,
//! because the zero-filled border of the shifted crop dominates a short axis.
//! Later passes re-crop the second tile at the running estimate and correlate
//! only the rows and columns both crops sample from inside their tiles, until
//! a pass moves less than half an upsampled pixel.

use crate::algorithm::cache::{PairKey, RegistrationCache, RegistrationResult};
use crate::filter::{Laplace, Whitening};
use crate::io::configuration::RegistrationConfig;
use crate::io::error::Result;
use crate::io::source::ImageSource;
use crate::math::correlation::{CorrelationSurface, PhaseCorrelation};
use crate::math::resample::{clamp_unit, shift_bilinear, truncate};
use crate::spatial::{OverlapRegion, TileSet, intersection};
use ndarray::{Array2, ArrayView2, s};
use std::ops::Range;
use tracing::{debug, warn};

/// Intermediate images of one pairwise registration
#[derive(Debug, Clone)]
pub struct PairInspection {
    /// Overlap crops of the first and second tile
    pub overlap: (Array2<f64>, Array2<f64>),
    /// The same crops after whitening
    pub whitened: (Array2<f64>, Array2<f64>),
    /// Correlation surface and unfiltered estimate
    pub surface: CorrelationSurface,
}

/// Registers overlapping tile pairs and remembers the outcome
pub struct EdgeAligner<'a, S: ImageSource + ?Sized, W: Whitening = Laplace> {
    source: &'a S,
    tiles: &'a TileSet,
    config: RegistrationConfig,
    whitening: W,
    cache: RegistrationCache,
}

impl<'a, S: ImageSource + ?Sized> EdgeAligner<'a, S> {
    /// Create an aligner with default settings and Laplacian whitening
    pub fn new(source: &'a S, tiles: &'a TileSet) -> Self {
        Self {
            source,
            tiles,
            config: RegistrationConfig::default(),
            whitening: Laplace,
            cache: RegistrationCache::new(),
        }
    }
}

impl<'a, S: ImageSource + ?Sized, W: Whitening> EdgeAligner<'a, S, W> {
    /// Create an aligner with explicit settings and whitening strategy
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn with_whitening(
        source: &'a S,
        tiles: &'a TileSet,
        config: RegistrationConfig,
        whitening: W,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            tiles,
            config,
            whitening,
            cache: RegistrationCache::new(),
        })
    }

    /// Largest accepted `|shift|` per axis, in pixels
    pub fn max_shift(&self) -> [f64; 2] {
        let size = self.tiles.size();
        [
            self.config.max_shift_fraction * size[0] as f64,
            self.config.max_shift_fraction * size[1] as f64,
        ]
    }

    /// Active configuration
    pub const fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Registrations computed so far
    pub const fn cache(&self) -> &RegistrationCache {
        &self.cache
    }

    /// Give up the aligner, keeping its registrations
    pub fn into_cache(self) -> RegistrationCache {
        self.cache
    }

    /// Adopt registrations computed by another aligner over the same tiles
    pub fn merge_cache(&mut self, other: RegistrationCache) {
        self.cache.merge(other);
    }

    /// Overlap rectangle of two tiles at their nominal positions
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of range or the tiles do not intersect
    pub fn intersection(&self, first: usize, second: usize) -> Result<OverlapRegion> {
        intersection(self.tiles, first, second)
    }

    /// Read a tile, shift it by `offset`, keep the leading `shape` and clamp to `[0, 1]`
    ///
    /// The shift is applied at full sub-pixel precision before cropping.
    ///
    /// # Errors
    ///
    /// Returns an error if the image source fails
    pub fn crop(&self, tile: usize, offset: [f64; 2], shape: [usize; 2]) -> Result<Array2<f64>> {
        let image = self.source.read(tile, self.config.channel)?;
        Ok(shifted_crop(image.view(), offset, shape))
    }

    /// Overlap crops of both tiles
    ///
    /// # Errors
    ///
    /// Returns an error if the tiles do not intersect or a read fails
    pub fn overlap(&self, first: usize, second: usize) -> Result<(Array2<f64>, Array2<f64>)> {
        let region = self.intersection(first, second)?;
        let crop1 = self.crop(first, region.offset1, region.shape)?;
        let crop2 = self.crop(second, region.offset2, region.shape)?;
        Ok((crop1, crop2))
    }

    /// Shift aligning `second`'s content with `first`'s, with its error
    ///
    /// Registering `(second, first)` returns the negated shift and the same
    /// error. A rejected estimate comes back as zero shift with error 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the tiles do not intersect or image data cannot be
    /// read; nothing is cached in that case
    pub fn register(&mut self, first: usize, second: usize) -> Result<RegistrationResult> {
        let key = PairKey::new(first, second);
        let result = if let Some(cached) = self.cache.lookup(key) {
            debug!(first, second, "registration cache hit");
            cached
        } else {
            let (low, high) = key.tiles();
            let computed = self.estimate(low, high)?;
            self.cache.insert(key, computed)
        };

        Ok(if first > second {
            result.reversed()
        } else {
            result
        })
    }

    /// Correlate a pair once, without filtering, refinement, caching or rejection
    ///
    /// # Errors
    ///
    /// Returns an error if the tiles do not intersect or a read fails
    pub fn inspect(&self, first: usize, second: usize) -> Result<PairInspection> {
        let overlap = self.overlap(first, second)?;
        let whitened = (
            self.whitening.whiten(overlap.0.view()),
            self.whitening.whiten(overlap.1.view()),
        );
        let surface = self
            .correlation()
            .surface(whitened.0.view(), whitened.1.view())?;
        Ok(PairInspection {
            overlap,
            whitened,
            surface,
        })
    }

    fn estimate(&self, first: usize, second: usize) -> Result<RegistrationResult> {
        let region = self.intersection(first, second)?;
        let first_image = self.source.read(first, self.config.channel)?;
        let second_image = self.source.read(second, self.config.channel)?;
        let reference = shifted_crop(first_image.view(), region.offset1, region.shape);

        let correlation = self.correlation();
        let size = self.tiles.size();
        let limit = self.max_shift();
        let settled = 0.5 / self.config.upsample_factor as f64;

        let mut shift = [0.0, 0.0];
        let mut error = RegistrationResult::rejected().error;
        let mut passes = 0;
        while passes < self.config.refinement_passes {
            let offset = [region.offset2[0] + shift[0], region.offset2[1] + shift[1]];
            let (rows, cols) = if passes == 0 {
                (0..region.shape[0], 0..region.shape[1])
            } else {
                (
                    overlap_span(
                        sampled_span(region.offset1[0], size[0], region.shape[0]),
                        sampled_span(offset[0], size[0], region.shape[0]),
                    ),
                    overlap_span(
                        sampled_span(region.offset1[1], size[1], region.shape[1]),
                        sampled_span(offset[1], size[1], region.shape[1]),
                    ),
                )
            };
            let narrow = rows.len() < MIN_REFINED_EXTENT || cols.len() < MIN_REFINED_EXTENT;
            if passes > 0 && narrow {
                break;
            }

            let moving = shifted_crop(second_image.view(), offset, region.shape);
            let estimate = correlation.estimate(
                self.whitening
                    .whiten(reference.slice(s![rows.clone(), cols.clone()]))
                    .view(),
                self.whitening.whiten(moving.slice(s![rows, cols])).view(),
            )?;
            shift = [shift[0] + estimate.shift[0], shift[1] + estimate.shift[1]];
            error = estimate.error;
            passes += 1;

            let out_of_range = shift
                .iter()
                .zip(&limit)
                .any(|(component, bound)| component.abs() > *bound);
            if out_of_range {
                warn!(
                    first,
                    second,
                    dy = shift[0],
                    dx = shift[1],
                    passes,
                    "rejecting registration beyond maximum shift"
                );
                return Ok(RegistrationResult::rejected());
            }
            if estimate.shift.iter().all(|step| step.abs() < settled) {
                break;
            }
        }

        debug!(
            first,
            second,
            dy = shift[0],
            dx = shift[1],
            error,
            passes,
            "registered tile pair"
        );
        Ok(RegistrationResult { shift, error })
    }

    fn correlation(&self) -> PhaseCorrelation {
        PhaseCorrelation {
            upsample_factor: self.config.upsample_factor,
            apodize: self.config.apodize,
            ..PhaseCorrelation::default()
        }
    }
}

// Refinement stops once the trimmed overlap is this narrow
const MIN_REFINED_EXTENT: usize = 4;

fn shifted_crop(image: ArrayView2<'_, f64>, offset: [f64; 2], shape: [usize; 2]) -> Array2<f64> {
    let shifted = shift_bilinear(image, offset);
    let mut cropped = truncate(shifted.view(), shape).to_owned();
    clamp_unit(&mut cropped);
    cropped
}

// Crop indices along one axis whose samples fall inside the tile
fn sampled_span(offset: f64, tile_extent: usize, crop_extent: usize) -> Range<usize> {
    let limit = crop_extent as f64;
    let start = offset.ceil().clamp(0.0, limit) as usize;
    let end = ((offset + tile_extent as f64 - 1.0).floor() + 1.0).clamp(0.0, limit) as usize;
    start.min(end)..end
}

fn overlap_span(a: Range<usize>, b: Range<usize>) -> Range<usize> {
    let start = a.start.max(b.start);
    start..a.end.min(b.end).max(start)
}
