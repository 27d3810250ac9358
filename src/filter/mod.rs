//! Image pre-filters applied before correlation

/// High-pass whitening strategies
pub mod whitening;

pub use whitening::{GaussianHighPass, Laplace, Whitening};
