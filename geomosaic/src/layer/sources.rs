//! Building map layers from command-line style sources.

use std::path::PathBuf;

use thiserror::Error;

use super::types::MapLayer;

/// Errors building layers from sources.
#[derive(Debug, Error)]
pub enum LayerSourceError {
    /// A `NAME=PATH` specification was malformed.
    #[error("Invalid layer specification '{0}' - expected NAME=PATH")]
    InvalidSpec(String),

    /// The glob pattern could not be parsed.
    #[error("Invalid layer pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A path matched by the pattern could not be read.
    #[error("Failed to read matched path: {0}")]
    Glob(#[from] glob::GlobError),
}

/// Parse a `NAME=PATH` layer specification.
///
/// A bare path (no `=`) is accepted and named after its file stem.
///
/// # Examples
///
/// ```
/// use geomosaic::layer::parse_layer_spec;
///
/// let layer = parse_layer_spec("Elevation=/data/dem.tif").unwrap();
/// assert_eq!(layer.name, "Elevation");
///
/// let layer = parse_layer_spec("/data/dem.tif").unwrap();
/// assert_eq!(layer.name, "dem");
/// ```
pub fn parse_layer_spec(spec: &str) -> Result<MapLayer, LayerSourceError> {
    match spec.split_once('=') {
        Some((name, path)) => {
            let name = name.trim();
            let path = path.trim();
            if name.is_empty() || path.is_empty() {
                return Err(LayerSourceError::InvalidSpec(spec.to_string()));
            }
            Ok(MapLayer::named(name, path))
        }
        None => {
            let path = spec.trim();
            if path.is_empty() {
                return Err(LayerSourceError::InvalidSpec(spec.to_string()));
            }
            Ok(MapLayer::from_path(path))
        }
    }
}

/// Create one layer per file matching a glob pattern, in path order.
pub fn layers_from_glob(pattern: &str) -> Result<Vec<MapLayer>, LayerSourceError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths.into_iter().map(MapLayer::from_path).collect())
}
