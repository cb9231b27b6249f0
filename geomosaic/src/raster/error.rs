//! Raster engine errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading, merging or writing rasters.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The input file could not be opened.
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created.
    #[error("Failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TIFF decoding or encoding failed.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Image decoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The file extension is not a supported raster format.
    #[error("Unsupported raster format: '{0}'")]
    UnsupportedFormat(String),

    /// The decoded samples do not form a grid of the stated size.
    #[error("Unsupported sample layout: {0}")]
    UnsupportedLayout(String),

    /// Georeferencing tags are present but unusable.
    #[error("Invalid georeference: {0}")]
    InvalidGeoreference(String),

    /// A raster has zero width or height.
    #[error("Raster has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Mosaic called without inputs.
    #[error("No input rasters")]
    NoInputs,

    /// The union extent needs more cells than the engine allows.
    #[error("Output grid {width}x{height} exceeds the maximum cell count")]
    TooLarge { width: u64, height: u64 },
}
