//! Registration of a second acquisition layer against an assembled mosaic
//!
//! Each tile of the new layer is correlated with the window of the reference
//! mosaic at the tile's nominal mosaic position. No pair cache is involved
//! since every tile is compared once.
//!
//! Nominal positions default to the layer's own origin, which matches the
//! mosaic only when both acquisitions start at the same stage position.
//! [`LayerAligner::with_reference_origin`] places them in the mosaic's frame.

use crate::filter::{Laplace, Whitening};
use crate::io::configuration::RegistrationConfig;
use crate::io::error::{Result, check_tile_index, computation_error};
use crate::io::source::ImageSource;
use crate::math::correlation::PhaseCorrelation;
use crate::math::resample::truncate;
use crate::spatial::TileSet;
use ndarray::{ArrayView2, s};
use tracing::debug;

/// Registered position of one layer tile within the reference mosaic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPlacement {
    /// Sub-pixel `[y, x]` position of the tile's origin in the mosaic
    pub position: [f64; 2],
    /// Goodness of fit in `[0, 1]`
    pub error: f64,
}

/// Aligns tiles of a new layer against a reference mosaic
pub struct LayerAligner<'a, S: ImageSource + ?Sized, W: Whitening = Laplace> {
    source: &'a S,
    reference: ArrayView2<'a, f64>,
    nominal: Vec<[f64; 2]>,
    frame_origin: [f64; 2],
    config: RegistrationConfig,
    whitening: W,
}

impl<'a, S: ImageSource + ?Sized> LayerAligner<'a, S> {
    /// Create an aligner with default settings and Laplacian whitening
    ///
    /// `tiles` describes the layer's nominal geometry; tile positions are
    /// taken relative to the layer's own origin and truncated to whole mosaic
    /// pixels.
    pub fn new(source: &'a S, tiles: &TileSet, reference: ArrayView2<'a, f64>) -> Self {
        Self {
            source,
            reference,
            nominal: tiles.positions().to_vec(),
            frame_origin: tiles.origin(),
            config: RegistrationConfig::default(),
            whitening: Laplace,
        }
    }
}

impl<'a, S: ImageSource + ?Sized, W: Whitening> LayerAligner<'a, S, W> {
    /// Create an aligner with explicit settings and whitening strategy
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn with_whitening(
        source: &'a S,
        tiles: &TileSet,
        reference: ArrayView2<'a, f64>,
        config: RegistrationConfig,
        whitening: W,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            reference,
            nominal: tiles.positions().to_vec(),
            frame_origin: tiles.origin(),
            config,
            whitening,
        })
    }

    /// Measure nominal positions from `origin`, the pixel-unit origin of the
    /// tile set the reference mosaic was assembled from
    #[must_use]
    pub fn with_reference_origin(mut self, origin: [f64; 2]) -> Self {
        self.frame_origin = origin;
        self
    }

    /// Nominal whole-pixel mosaic position of every tile
    pub fn positions(&self) -> Vec<[usize; 2]> {
        self.nominal
            .iter()
            .map(|&position| TileSet::relative_position(position, self.frame_origin))
            .collect()
    }

    /// Register one layer tile against the reference mosaic
    ///
    /// The reference window starts at the tile's nominal mosaic position and
    /// is clipped at the mosaic border; the tile is truncated to the window.
    ///
    /// # Errors
    ///
    /// Returns an error if `tile` is out of range, the image source fails,
    /// or the tile's nominal position lies outside the reference
    pub fn register(&self, tile: usize) -> Result<LayerPlacement> {
        let index = check_tile_index(tile, self.nominal.len())?;
        let origin = self
            .nominal
            .get(index)
            .map(|&position| TileSet::relative_position(position, self.frame_origin))
            .unwrap_or_default();
        let image = self.source.read(tile, self.config.channel)?;

        let (height, width) = image.dim();
        let (ref_height, ref_width) = self.reference.dim();
        let window = self.reference.slice(s![
            origin[0].min(ref_height)..(origin[0] + height).min(ref_height),
            origin[1].min(ref_width)..(origin[1] + width).min(ref_width)
        ]);
        if window.is_empty() {
            return Err(computation_error(
                "layer registration",
                &format!(
                    "tile {tile} at mosaic position {origin:?} lies outside the {ref_height}x{ref_width} reference"
                ),
            ));
        }
        let moving = truncate(image.view(), [window.nrows(), window.ncols()]);

        let correlation = PhaseCorrelation {
            upsample_factor: self.config.upsample_factor,
            apodize: self.config.apodize,
            ..PhaseCorrelation::default()
        };
        let estimate = correlation.estimate(
            self.whitening.whiten(window).view(),
            self.whitening.whiten(moving).view(),
        )?;

        let position = [
            origin[0] as f64 + estimate.shift[0],
            origin[1] as f64 + estimate.shift[1],
        ];
        debug!(
            tile,
            y = position[0],
            x = position[1],
            error = estimate.error,
            "registered layer tile"
        );
        Ok(LayerPlacement {
            position,
            error: estimate.error,
        })
    }
}
