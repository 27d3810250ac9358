//! Input/output adapters, configuration and error handling

/// Command-line interface and run orchestration
pub mod cli;
/// Tunable constants and registration settings
pub mod configuration;
/// Error types and constructors
pub mod error;
/// Tile images on disk located through a manifest
pub mod image;
/// Tracing subscriber setup
pub mod logging;
/// Acquisition manifest parsing
pub mod manifest;
/// In-memory tile source
pub mod memory;
/// Progress bars for registration stages
pub mod progress;
/// Traits describing microscope data readers
pub mod source;
