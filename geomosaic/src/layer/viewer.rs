//! The map viewer collaborator.

use thiserror::Error;

use super::types::{DatasetName, LayerRef, MapLayer};

/// Errors reported by a map viewer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// The viewer cannot be queried (not initialized, already closed).
    #[error("Map viewer is unavailable: {0}")]
    Unavailable(String),

    /// A layer index outside `0..layer_count`.
    #[error("Layer index {index} out of range (layer count: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// The viewer refused a new layer.
    #[error("Failed to add layer '{name}': {reason}")]
    AddLayer { name: String, reason: String },
}

/// Narrow view of a map control, as used by the mosaic workflow.
///
/// Layer collections belong to the viewer and must only be mutated from the
/// thread that owns it, so the trait carries no `Send`/`Sync` bounds.
///
/// # Implementors
///
/// - [`InMemoryMap`](super::InMemoryMap) - layer list held in memory
pub trait MapViewer {
    /// Number of layers currently in the map.
    fn layer_count(&self) -> Result<usize, ViewerError>;

    /// Name and kind of the layer at `index`.
    fn layer(&self, index: usize) -> Result<LayerRef, ViewerError>;

    /// Dataset backing the layer at `index`.
    ///
    /// Returns `Ok(None)` for layers that are not raster-typed or that have
    /// no dataset.
    fn raster_dataset(&self, index: usize) -> Result<Option<DatasetName>, ViewerError>;

    /// Add a layer to the map.
    fn add_layer(&mut self, layer: MapLayer) -> Result<(), ViewerError>;

    /// Request a redraw of the map.
    fn refresh(&mut self) -> Result<(), ViewerError>;
}
