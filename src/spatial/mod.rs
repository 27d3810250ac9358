//! Tile geometry in pixel space
//!
//! This module contains spatial-related functionality including:
//! - Tile positions, grid shape and mosaic frame derived from stage metadata
//! - Pairwise overlap rectangles between nominally placed tiles

/// Overlap rectangles and overlapping-pair enumeration
pub mod overlap;
/// Tile set construction and derived geometry
pub mod tileset;

pub use overlap::{OverlapRegion, intersection};
pub use tileset::TileSet;
