//! Layer and dataset value types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// File extensions opened as raster datasets.
const RASTER_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg", "bmp"];

/// File extensions treated as vector feature datasets.
const VECTOR_EXTENSIONS: &[&str] = &["shp", "geojson", "json", "gpkg", "kml", "gml"];

/// Kind of content a map layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Grid of pixel values.
    Raster,
    /// Vector geometry (points, lines, polygons).
    Vector,
    /// Anything else (basemaps, graphics, group layers).
    Other,
}

impl LayerKind {
    /// Infer the layer kind from a dataset file extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if RASTER_EXTENSIONS.contains(&extension.as_str()) {
            LayerKind::Raster
        } else if VECTOR_EXTENSIONS.contains(&extension.as_str()) {
            LayerKind::Vector
        } else {
            LayerKind::Other
        }
    }

    /// Returns true for raster layers.
    pub fn is_raster(self) -> bool {
        self == LayerKind::Raster
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Raster => write!(f, "raster"),
            LayerKind::Vector => write!(f, "vector"),
            LayerKind::Other => write!(f, "other"),
        }
    }
}

/// Read-only snapshot of a layer held by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRef {
    /// Display name shown in the table of contents.
    pub name: String,
    /// What the layer draws.
    pub kind: LayerKind,
}

impl LayerRef {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Storage location of the dataset backing a layer.
///
/// Mirrors how GIS workspaces identify data: a workspace (directory) plus a
/// dataset name inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetName {
    /// Workspace path (the directory holding the dataset).
    pub workspace: PathBuf,
    /// Dataset name within the workspace, including extension.
    pub name: String,
}

impl DatasetName {
    pub fn new(workspace: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            name: name.into(),
        }
    }

    /// Split a file path into workspace and dataset name.
    ///
    /// Returns `None` for paths without a file name (e.g. `/` or `..`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let workspace = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Some(Self { workspace, name })
    }

    /// Workspace path joined with the dataset name.
    pub fn full_path(&self) -> PathBuf {
        self.workspace.join(&self.name)
    }
}

/// A layer as stored by a map viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayer {
    pub name: String,
    pub kind: LayerKind,
    /// Backing dataset, if the layer has one.
    pub dataset: Option<DatasetName>,
}

impl MapLayer {
    /// Create a raster layer backed by the given dataset.
    pub fn raster(name: impl Into<String>, dataset: DatasetName) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Raster,
            dataset: Some(dataset),
        }
    }

    /// Create a layer for a dataset file, naming it after the file stem.
    ///
    /// The kind is inferred from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::named(name, path)
    }

    /// Create a layer for a dataset file with an explicit display name.
    pub fn named(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: name.into(),
            kind: LayerKind::from_path(path),
            dataset: DatasetName::from_path(path),
        }
    }

    /// Snapshot of this layer's name and kind.
    pub fn to_ref(&self) -> LayerRef {
        LayerRef::new(self.name.clone(), self.kind)
    }
}
