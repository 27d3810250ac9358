//! Command-line interface for registering tile acquisitions from manifests

use crate::algorithm::{EdgeAligner, LayerAligner};
use crate::compositing::Canvas;
use crate::filter::{GaussianHighPass, Laplace, Whitening};
use crate::io::configuration::{
    DEFAULT_CHANNEL, DEFAULT_MAX_SHIFT_FRACTION, REFINEMENT_PASSES, RegistrationConfig,
    UPSAMPLE_FACTOR,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::ImageFileTiles;
use crate::io::progress::ProgressManager;
use crate::io::source::ImageSource;
use crate::spatial::TileSet;
use crate::spatial::overlap::overlapping_pairs;
use clap::Parser;
use ndarray::Array2;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tilestitch")]
#[command(
    author,
    version,
    about = "Register overlapping microscope tiles and report refined offsets"
)]
/// Command-line arguments for the registration tool
// Each flag toggles an independent stage or reader option
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Manifest of the reference acquisition
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Manifest of an additional layer to align against the reference mosaic
    #[arg(short, long = "layer", value_name = "MANIFEST")]
    pub layers: Vec<PathBuf>,

    /// Largest accepted pairwise shift as a fraction of the tile size
    #[arg(short, long, default_value_t = DEFAULT_MAX_SHIFT_FRACTION)]
    pub max_shift: f64,

    /// Image channel used for registration
    #[arg(short, long, default_value_t = DEFAULT_CHANNEL)]
    pub channel: usize,

    /// Sub-pixel refinement factor (1 disables refinement)
    #[arg(short, long, default_value_t = UPSAMPLE_FACTOR)]
    pub upsample: usize,

    /// Most correlation passes per tile pair (1 keeps the first estimate)
    #[arg(short, long, default_value_t = REFINEMENT_PASSES)]
    pub passes: usize,

    /// Disable Hann apodization of whitened crops
    #[arg(long)]
    pub no_apodize: bool,

    /// Whiten with a Gaussian high-pass of this sigma instead of the Laplacian
    #[arg(long, value_name = "SIGMA")]
    pub highpass: Option<f64>,

    /// Tile images store the bottom scanline first
    #[arg(short, long)]
    pub flip: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Registration settings selected by the flags
    pub const fn registration_config(&self) -> RegistrationConfig {
        RegistrationConfig {
            max_shift_fraction: self.max_shift,
            channel: self.channel,
            upsample_factor: self.upsample,
            apodize: !self.no_apodize,
            refinement_passes: self.passes,
        }
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Runs the registration stages and writes the textual report
///
/// Pair rows read `first second dy dx error`; layer rows read
/// `layer tile y x error`, with `layer` counted from 1.
pub struct Stitcher {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl Stitcher {
    /// Create a runner for the given arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Run every stage, reporting to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest or image cannot be read, the reference
    /// tiles do not form a grid, or the settings are invalid
    pub fn process(&mut self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.process_to(&mut out)
    }

    /// Run every stage, reporting to `out`
    ///
    /// # Errors
    ///
    /// Same as [`Stitcher::process`], plus failures writing to `out`
    pub fn process_to<O: Write>(&mut self, out: &mut O) -> Result<()> {
        match self.cli.highpass {
            Some(sigma) if sigma.is_nan() || sigma <= 0.0 => Err(invalid_parameter(
                "highpass",
                &sigma,
                &"sigma must be positive",
            )),
            Some(sigma) => self.run(GaussianHighPass { sigma }, out),
            None => self.run(Laplace, out),
        }
    }

    fn run<W: Whitening + Copy, O: Write>(&mut self, whitening: W, out: &mut O) -> Result<()> {
        let start_time = Instant::now();
        let config = self.cli.registration_config();
        config.validate()?;

        let source = self.open(&self.cli.manifest)?;
        let tiles = TileSet::from_metadata(&source)?;
        let (rows, cols) = tiles.grid_dimensions()?;
        info!(tiles = tiles.len(), rows, cols, "loaded reference acquisition");

        let pairs = overlapping_pairs(&tiles);
        let stage = self.start_stage("pairs", pairs.len());
        let mut aligner = EdgeAligner::with_whitening(&source, &tiles, config, whitening)?;
        for &(first, second) in &pairs {
            let result = aligner.register(first, second)?;
            writeln!(
                out,
                "{first} {second} {:.3} {:.3} {:.4}",
                result.shift[0], result.shift[1], result.error
            )?;
            self.advance(stage, &format!("{first}-{second}"));
        }
        self.finish_stage(stage);
        let rejected = aligner
            .cache()
            .sorted_entries()
            .iter()
            .filter(|(_, result)| result.is_rejected())
            .count();
        info!(pairs = pairs.len(), rejected, "pairwise registration complete");

        let reference = self.composite(&source, &tiles, config.channel)?;

        let layers = self.cli.layers.clone();
        for (layer_index, layer_path) in layers.iter().enumerate() {
            let layer_number = layer_index + 1;
            let layer_source = self.open(layer_path)?;
            let layer_tiles = TileSet::from_metadata(&layer_source)?;
            let layer_aligner = LayerAligner::with_whitening(
                &layer_source,
                &layer_tiles,
                reference.view(),
                config,
                whitening,
            )?
            .with_reference_origin(tiles.origin());

            let stage = self.start_stage(&format!("layer {layer_number}"), layer_tiles.len());
            for tile in 0..layer_tiles.len() {
                let placement = layer_aligner.register(tile)?;
                writeln!(
                    out,
                    "{layer_number} {tile} {:.3} {:.3} {:.4}",
                    placement.position[0], placement.position[1], placement.error
                )?;
                self.advance(stage, &format!("tile {tile}"));
            }
            self.finish_stage(stage);
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }
        info!(elapsed = ?start_time.elapsed(), "run complete");
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<ImageFileTiles> {
        Ok(ImageFileTiles::open(path)?.with_vertical_flip(self.cli.flip))
    }

    // Nominal-position mosaic of the reference tiles, used as the layer reference
    fn composite<S: ImageSource + ?Sized>(
        &mut self,
        source: &S,
        tiles: &TileSet,
        channel: usize,
    ) -> Result<Array2<f64>> {
        if self.cli.layers.is_empty() {
            return Ok(Array2::zeros((0, 0)));
        }

        let positions = tiles.mosaic_positions();
        let stage = self.start_stage("composite", positions.len());
        let mut canvas = Canvas::<u16>::new(tiles.mosaic_shape());
        for (tile, position) in positions.iter().enumerate() {
            let image = source.read(tile, channel)?;
            canvas.paste(
                image.view(),
                [position[0] as f64, position[1] as f64],
                false,
            );
            self.advance(stage, &format!("tile {tile}"));
        }
        self.finish_stage(stage);
        info!(
            covered = canvas.covered_fraction(),
            "composited reference mosaic"
        );
        Ok(canvas.to_normalized())
    }

    fn start_stage(&mut self, label: &str, total: usize) -> Option<usize> {
        self.progress_manager
            .as_mut()
            .map(|pm| pm.start_stage(label, total))
    }

    fn advance(&self, stage: Option<usize>, message: &str) {
        if let (Some(pm), Some(stage)) = (&self.progress_manager, stage) {
            pm.advance(stage, message);
        }
    }

    fn finish_stage(&self, stage: Option<usize>) {
        if let (Some(pm), Some(stage)) = (&self.progress_manager, stage) {
            pm.finish_stage(stage);
        }
    }
}
