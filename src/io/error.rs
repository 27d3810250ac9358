//! Error types for mosaic construction, registration and tile I/O

use std::fmt;
use std::path::PathBuf;

/// Main error type for all stitching operations
///
/// Low-confidence registrations are not errors. They surface as a
/// [`RegistrationResult`](crate::algorithm::RegistrationResult) carrying the
/// rejection sentinel instead.
#[derive(Debug)]
pub enum StitchError {
    /// Tile geometry is inconsistent or does not form a rectangular grid
    Validation {
        /// Description of the inconsistency
        reason: String,
    },

    /// Two tiles requested for registration do not overlap
    Geometry {
        /// First tile of the requested pair
        first: usize,
        /// Second tile of the requested pair
        second: usize,
        /// Overlap extent that failed the positivity check (rows, cols)
        extent: [f64; 2],
    },

    /// Tile index exceeds the tile set
    InvalidTileIndex {
        /// The invalid tile index
        index: usize,
        /// Number of tiles available
        tile_count: usize,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Manifest file could not be interpreted
    InvalidManifest {
        /// Manifest path
        path: PathBuf,
        /// One-based line number of the offending entry
        line: usize,
        /// Explanation of the problem
        reason: String,
    },

    /// Failed to load a tile image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Numerical computation produced an invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for StitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { reason } => write!(f, "Invalid tile layout: {reason}"),
            Self::Geometry {
                first,
                second,
                extent,
            } => write!(
                f,
                "Tiles {first} and {second} do not intersect (overlap extent {}x{})",
                extent[0], extent[1]
            ),
            Self::InvalidTileIndex { index, tile_count } => {
                write!(
                    f,
                    "Tile index {index} is out of bounds ({tile_count} tiles)"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidManifest { path, line, reason } => {
                write!(
                    f,
                    "Invalid manifest '{}' at line {line}: {reason}",
                    path.display()
                )
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for StitchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for stitching results
pub type Result<T> = std::result::Result<T, StitchError>;

impl From<image::ImageError> for StitchError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for StitchError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create a tile layout validation error
pub fn validation_error(reason: &impl ToString) -> StitchError {
    StitchError::Validation {
        reason: reason.to_string(),
    }
}

/// Create a missing-overlap error for a tile pair
pub const fn geometry_error(first: usize, second: usize, extent: [f64; 2]) -> StitchError {
    StitchError::Geometry {
        first,
        second,
        extent,
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> StitchError {
    StitchError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> StitchError {
    StitchError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Reject tile indices outside `0..tile_count`
///
/// # Errors
///
/// Returns [`StitchError::InvalidTileIndex`] when `index >= tile_count`
pub const fn check_tile_index(index: usize, tile_count: usize) -> Result<usize> {
    if index < tile_count {
        Ok(index)
    } else {
        Err(StitchError::InvalidTileIndex { index, tile_count })
    }
}
