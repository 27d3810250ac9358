//! Numerical building blocks for registration

/// Phase correlation with sub-pixel peak refinement
pub mod correlation;
/// Two-dimensional Fourier transforms
pub mod fourier;
/// Bilinear sub-pixel shifts, cropping and windowing
pub mod resample;
/// Element-wise arithmetic on `[y, x]` pairs
pub mod vector;
