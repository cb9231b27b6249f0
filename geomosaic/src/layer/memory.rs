//! In-memory map viewer.

use tracing::debug;

use super::types::{DatasetName, LayerRef, MapLayer};
use super::viewer::{MapViewer, ViewerError};

/// A map viewer that keeps its layer list in memory.
///
/// Newly added layers go on top of the drawing order (index 0), the way map
/// controls place freshly added data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMap {
    layers: Vec<MapLayer>,
    refresh_count: u64,
}

impl InMemoryMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map holding the given layers in order.
    pub fn with_layers(layers: Vec<MapLayer>) -> Self {
        Self {
            layers,
            refresh_count: 0,
        }
    }

    /// Append a layer at the bottom of the drawing order.
    pub fn push(&mut self, layer: MapLayer) {
        self.layers.push(layer);
    }

    /// Remove every layer with the given name, returning how many were removed.
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.layers.len();
        self.layers.retain(|l| l.name != name);
        before - self.layers.len()
    }

    /// All layers, top first.
    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    /// Number of redraws requested so far.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    fn get(&self, index: usize) -> Result<&MapLayer, ViewerError> {
        self.layers.get(index).ok_or(ViewerError::IndexOutOfRange {
            index,
            count: self.layers.len(),
        })
    }
}

impl MapViewer for InMemoryMap {
    fn layer_count(&self) -> Result<usize, ViewerError> {
        Ok(self.layers.len())
    }

    fn layer(&self, index: usize) -> Result<LayerRef, ViewerError> {
        self.get(index).map(MapLayer::to_ref)
    }

    fn raster_dataset(&self, index: usize) -> Result<Option<DatasetName>, ViewerError> {
        let layer = self.get(index)?;
        if !layer.kind.is_raster() {
            return Ok(None);
        }
        Ok(layer.dataset.clone())
    }

    fn add_layer(&mut self, layer: MapLayer) -> Result<(), ViewerError> {
        debug!(layer = %layer.name, kind = %layer.kind, "Adding layer to map");
        self.layers.insert(0, layer);
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), ViewerError> {
        self.refresh_count += 1;
        Ok(())
    }
}
