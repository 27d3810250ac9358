//! Maximum-intensity compositing of registered tiles into an output canvas

/// Owned output canvas with coverage tracking
pub mod canvas;
/// Pasting one floating point tile into an unsigned integer pixel buffer
pub mod paste;

pub use canvas::{Canvas, CanvasPixel};
pub use paste::{PastedRegion, paste};
