//! Plain-text acquisition manifests
//!
//! A manifest lists one tile image per line followed by its stage position in
//! microns, plus a single `calibration` line giving microns per pixel:
//!
//! ```text
//! # two tiles, 10% overlap
//! calibration 0.65 0.65
//! tile_0.png 0.0 0.0
//! tile_1.png 0.0 58.5
//! ```
//!
//! Relative image paths are resolved against the manifest's directory.

use crate::io::error::{Result, StitchError};
use std::fs;
use std::path::{Path, PathBuf};

const CALIBRATION_KEYWORD: &str = "calibration";

/// One tile image and where it was captured
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    /// Image file location
    pub path: PathBuf,
    /// Stage position as `[y, x]` microns
    pub stage_position: [f64; 2],
}

/// Parsed manifest contents
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Microns per pixel as `[y, x]`
    pub calibration: [f64; 2],
    /// Tiles in file order
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Read and parse a manifest file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| StitchError::FileSystem {
            path: path.to_path_buf(),
            operation: "manifest read",
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text; `path` anchors relative image paths and error reports
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidManifest`] if a line is malformed, the
    /// calibration line is missing or repeated, or no tiles are listed
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let invalid = |line: usize, reason: String| StitchError::InvalidManifest {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut calibration = None;
        let mut entries = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let fields: Vec<&str> = content.split_whitespace().collect();
            let [name, y, x] = fields.as_slice() else {
                return Err(invalid(
                    line,
                    format!("expected 3 fields, found {}", fields.len()),
                ));
            };
            let position = [
                parse_coordinate(y).map_err(|reason| invalid(line, reason))?,
                parse_coordinate(x).map_err(|reason| invalid(line, reason))?,
            ];

            if *name == CALIBRATION_KEYWORD {
                if calibration.is_some() {
                    return Err(invalid(line, "calibration given more than once".to_string()));
                }
                if position.iter().any(|&value| value <= 0.0) {
                    return Err(invalid(line, "calibration must be positive".to_string()));
                }
                calibration = Some(position);
            } else {
                entries.push(ManifestEntry {
                    path: base.join(name),
                    stage_position: position,
                });
            }
        }

        let calibration =
            calibration.ok_or_else(|| invalid(0, "missing calibration line".to_string()))?;
        if entries.is_empty() {
            return Err(invalid(0, "no tiles listed".to_string()));
        }

        Ok(Self {
            calibration,
            entries,
        })
    }
}

fn parse_coordinate(field: &str) -> std::result::Result<f64, String> {
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("'{field}' is not a finite number"))
}
