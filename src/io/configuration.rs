//! Registration constants and runtime configuration defaults

use crate::io::error::{Result, invalid_parameter};

/// Largest accepted pairwise shift as a fraction of the tile size per axis
pub const DEFAULT_MAX_SHIFT_FRACTION: f64 = 0.05;

/// Sub-pixel precision of correlation peaks is `1 / UPSAMPLE_FACTOR` pixels
pub const UPSAMPLE_FACTOR: usize = 10;

/// Correlation passes per pair; each pass re-crops the second tile at the running estimate
pub const REFINEMENT_PASSES: usize = 8;

/// Error value reported for rejected registrations
pub const REJECTED_ERROR: f64 = 1.0;

// Keeps near-empty frequency bins from dominating the normalized spectrum
/// Normalization floor relative to the cross-power spectrum's peak magnitude
pub const SPECTRUM_REGULARIZATION: f64 = 0.05;

/// Image channel read for registration unless overridden
pub const DEFAULT_CHANNEL: usize = 0;

/// Standard deviation of the blur subtracted by the Gaussian high-pass filter
pub const DEFAULT_HIGHPASS_SIGMA: f64 = 2.0;

// 6000 counts on a 16-bit canvas
/// Debug outline brightness as a fraction of the canvas pixel range
pub const DEBUG_OUTLINE_INTENSITY: f64 = 6000.0 / 65535.0;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Tunable parameters shared by the pairwise and layer aligners
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegistrationConfig {
    /// Shifts larger than this fraction of the tile size are rejected
    pub max_shift_fraction: f64,
    /// Channel passed to the image source
    pub channel: usize,
    /// Peak refinement factor; 1 disables sub-pixel refinement
    pub upsample_factor: usize,
    /// Apply a Hann window to whitened crops before correlation
    pub apodize: bool,
    /// Upper bound on correlation passes per pair; 1 keeps the first estimate
    pub refinement_passes: usize,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            max_shift_fraction: DEFAULT_MAX_SHIFT_FRACTION,
            channel: DEFAULT_CHANNEL,
            upsample_factor: UPSAMPLE_FACTOR,
            apodize: true,
            refinement_passes: REFINEMENT_PASSES,
        }
    }
}

impl RegistrationConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_shift_fraction` is not a finite, non-negative number
    /// - `upsample_factor` or `refinement_passes` is zero
    pub fn validate(&self) -> Result<()> {
        if !self.max_shift_fraction.is_finite() || self.max_shift_fraction < 0.0 {
            return Err(invalid_parameter(
                "max_shift_fraction",
                &self.max_shift_fraction,
                &"must be a finite, non-negative fraction",
            ));
        }
        if self.upsample_factor == 0 {
            return Err(invalid_parameter(
                "upsample_factor",
                &self.upsample_factor,
                &"must be at least 1",
            ));
        }
        if self.refinement_passes == 0 {
            return Err(invalid_parameter(
                "refinement_passes",
                &self.refinement_passes,
                &"must be at least 1",
            ));
        }
        Ok(())
    }
}
