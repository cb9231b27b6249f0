//! Loading a mosaic result into the map.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::layer::{DatasetName, MapLayer, MapViewer, ViewerError};
use crate::raster::{io, RasterError};

/// Errors loading a result raster into the map.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The output exists but could not be opened as a raster.
    #[error("Failed to open {} as a raster: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    /// The path has no file name to build a layer from.
    #[error("Invalid result path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The viewer refused the layer or the redraw.
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

/// What the loader did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "load", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A layer with this name was added on top of the map.
    Added { name: String },
    /// No file at the path; the map is untouched.
    Missing,
}

/// Adds produced rasters to a map viewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultLoader;

impl ResultLoader {
    pub fn new() -> Self {
        Self
    }

    /// Open `path` as a raster, add it to the viewer and request a redraw.
    ///
    /// A missing path is not an error: the viewer is left untouched and
    /// [`LoadOutcome::Missing`] is returned. Callers that need the layer
    /// must check existence themselves.
    pub fn load(&self, viewer: &mut dyn MapViewer, path: &Path) -> Result<LoadOutcome, LoadError> {
        if !path.exists() {
            debug!(path = %path.display(), "Result raster not found, nothing to load");
            return Ok(LoadOutcome::Missing);
        }

        let header = io::read_info(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset =
            DatasetName::from_path(path).ok_or_else(|| LoadError::InvalidPath(path.to_path_buf()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| dataset.name.clone());

        viewer.add_layer(MapLayer::raster(name.clone(), dataset))?;
        viewer.refresh()?;

        info!(
            layer = %name,
            width = header.width,
            height = header.height,
            "Loaded mosaic result"
        );
        Ok(LoadOutcome::Added { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{InMemoryMap, LayerKind, LayerRef};
    use crate::mosaic::PixelType;
    use crate::raster::{GeoTransform, Raster};
    use tempfile::TempDir;

    struct RefusingViewer;

    impl MapViewer for RefusingViewer {
        fn layer_count(&self) -> Result<usize, ViewerError> {
            Ok(0)
        }

        fn layer(&self, index: usize) -> Result<LayerRef, ViewerError> {
            Err(ViewerError::IndexOutOfRange { index, count: 0 })
        }

        fn raster_dataset(&self, _index: usize) -> Result<Option<DatasetName>, ViewerError> {
            Ok(None)
        }

        fn add_layer(&mut self, layer: MapLayer) -> Result<(), ViewerError> {
            Err(ViewerError::AddLayer {
                name: layer.name,
                reason: "read-only map".to_string(),
            })
        }

        fn refresh(&mut self) -> Result<(), ViewerError> {
            Ok(())
        }
    }

    fn write_result(dir: &Path) -> PathBuf {
        let path = dir.join("mosaic.tif");
        let raster = Raster::new(2, 2, GeoTransform::identity(), vec![1.0; 4]);
        io::write_geotiff(&path, &raster, PixelType::Float32).unwrap();
        path
    }

    #[test]
    fn test_missing_path_is_noop() {
        let mut map = InMemoryMap::with_layers(vec![MapLayer::from_path("/data/r1.tif")]);
        let outcome = ResultLoader::new()
            .load(&mut map, Path::new("/nonexistent/out.tif"))
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Missing);
        assert_eq!(map.layer_count().unwrap(), 1);
        assert_eq!(map.refresh_count(), 0);
    }

    #[test]
    fn test_existing_raster_added_on_top() {
        let temp = TempDir::new().unwrap();
        let path = write_result(temp.path());
        let mut map = InMemoryMap::with_layers(vec![MapLayer::from_path("/data/r1.tif")]);

        let outcome = ResultLoader::new().load(&mut map, &path).unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Added {
                name: "mosaic".to_string()
            }
        );
        assert_eq!(map.layer_count().unwrap(), 2);
        assert_eq!(map.layer(0).unwrap(), LayerRef::new("mosaic", LayerKind::Raster));
        assert_eq!(map.raster_dataset(0).unwrap().unwrap().full_path(), path);
        assert_eq!(map.refresh_count(), 1);
    }

    #[test]
    fn test_unreadable_file_is_open_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.tif");
        std::fs::write(&path, b"not a tiff").unwrap();
        let mut map = InMemoryMap::new();

        let err = ResultLoader::new().load(&mut map, &path).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert_eq!(map.layer_count().unwrap(), 0);
    }

    #[test]
    fn test_viewer_refusal_is_error() {
        let temp = TempDir::new().unwrap();
        let path = write_result(temp.path());

        let err = ResultLoader::new()
            .load(&mut RefusingViewer, &path)
            .unwrap_err();
        assert!(matches!(err, LoadError::Viewer(ViewerError::AddLayer { .. })));
    }
}
