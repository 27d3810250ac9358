//! Registration of tiles against each other and against an assembled mosaic

/// Memoized pairwise registration results with hit/miss tracking
pub mod cache;
/// Pairwise registration of overlapping tiles with outlier rejection
pub mod edge;
/// Registration of a new layer's tiles against a reference mosaic
pub mod layer;

pub use cache::{CacheStats, PairKey, RegistrationCache, RegistrationResult};
pub use edge::{EdgeAligner, PairInspection};
pub use layer::{LayerAligner, LayerPlacement};
