//! Layer catalog reading.
//!
//! Enumerates the raster layers currently held by a [`MapViewer`] and turns
//! them into a checklist for the selection UI. Every raster layer starts out
//! checked.

use tracing::debug;

use crate::layer::{MapViewer, ViewerError};

/// Ordered list of raster layer display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerCatalog {
    names: Vec<String>,
}

impl LayerCatalog {
    /// Read the raster layer names from the viewer, in layer order.
    ///
    /// A map without raster layers yields an empty catalog, not an error.
    pub fn read(viewer: &dyn MapViewer) -> Result<Self, ViewerError> {
        let count = viewer.layer_count()?;
        let mut names = Vec::new();
        for index in 0..count {
            let layer = viewer.layer(index)?;
            if layer.kind.is_raster() {
                names.push(layer.name);
            }
        }
        debug!(total = count, rasters = names.len(), "Read layer catalog");
        Ok(Self { names })
    }

    /// Raster layer names in layer order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One row of the layer checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub name: String,
    pub checked: bool,
}

/// Multi-check list of raster layer names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerChecklist {
    items: Vec<ChecklistItem>,
}

impl LayerChecklist {
    /// Build a checklist with every catalog entry checked.
    pub fn all_checked(catalog: &LayerCatalog) -> Self {
        Self {
            items: catalog
                .names()
                .iter()
                .map(|name| ChecklistItem {
                    name: name.clone(),
                    checked: true,
                })
                .collect(),
        }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Set the checked state of every item with the given name.
    ///
    /// Returns false if no item has that name.
    pub fn set_checked(&mut self, name: &str, checked: bool) -> bool {
        let mut found = false;
        for item in self.items.iter_mut().filter(|i| i.name == name) {
            item.checked = checked;
            found = true;
        }
        found
    }

    /// Set the checked state of the item at `index`.
    pub fn set_checked_at(&mut self, index: usize, checked: bool) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Check exactly the given names and uncheck everything else.
    pub fn check_only<S: AsRef<str>>(&mut self, names: &[S]) {
        for item in &mut self.items {
            item.checked = names.iter().any(|n| n.as_ref() == item.name);
        }
    }

    /// Names of the checked items, in list order.
    pub fn checked_names(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.checked)
            .map(|i| i.name.clone())
            .collect()
    }

    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|i| i.checked).count()
    }
}

impl From<&LayerCatalog> for LayerChecklist {
    fn from(catalog: &LayerCatalog) -> Self {
        Self::all_checked(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{InMemoryMap, LayerRef, MapLayer};

    fn mixed_map() -> InMemoryMap {
        InMemoryMap::with_layers(vec![
            MapLayer::from_path("/data/R1.tif"),
            MapLayer::from_path("/data/roads.shp"),
            MapLayer::from_path("/data/R2.tif"),
            MapLayer::from_path("/data/R3.png"),
        ])
    }

    /// Viewer whose handle is no longer usable.
    struct ClosedViewer;

    impl MapViewer for ClosedViewer {
        fn layer_count(&self) -> Result<usize, ViewerError> {
            Err(ViewerError::Unavailable("map control disposed".to_string()))
        }

        fn layer(&self, _index: usize) -> Result<LayerRef, ViewerError> {
            unreachable!()
        }

        fn raster_dataset(
            &self,
            _index: usize,
        ) -> Result<Option<crate::layer::DatasetName>, ViewerError> {
            unreachable!()
        }

        fn add_layer(&mut self, _layer: MapLayer) -> Result<(), ViewerError> {
            unreachable!()
        }

        fn refresh(&mut self) -> Result<(), ViewerError> {
            unreachable!()
        }
    }

    #[test]
    fn test_catalog_filters_rasters_in_order() {
        let catalog = LayerCatalog::read(&mixed_map()).unwrap();
        assert_eq!(catalog.names(), &["R1", "R2", "R3"]);
    }

    #[test]
    fn test_catalog_empty_map() {
        let catalog = LayerCatalog::read(&InMemoryMap::new()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_catalog_no_rasters() {
        let map = InMemoryMap::with_layers(vec![MapLayer::from_path("/data/roads.shp")]);
        let catalog = LayerCatalog::read(&map).unwrap();
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn test_catalog_unusable_viewer() {
        assert!(matches!(
            LayerCatalog::read(&ClosedViewer),
            Err(ViewerError::Unavailable(_))
        ));
    }

    #[test]
    fn test_checklist_all_checked() {
        let catalog = LayerCatalog::read(&mixed_map()).unwrap();
        let checklist = LayerChecklist::from(&catalog);
        assert_eq!(checklist.checked_count(), 3);
        assert!(checklist.items().iter().all(|i| i.checked));
    }

    #[test]
    fn test_checklist_toggle() {
        let catalog = LayerCatalog::read(&mixed_map()).unwrap();
        let mut checklist = LayerChecklist::all_checked(&catalog);

        assert!(checklist.set_checked("R2", false));
        assert!(!checklist.set_checked("missing", false));
        assert!(checklist.set_checked_at(0, false));
        assert!(!checklist.set_checked_at(10, true));

        assert_eq!(checklist.checked_names(), vec!["R3".to_string()]);
    }

    #[test]
    fn test_checklist_check_only() {
        let catalog = LayerCatalog::read(&mixed_map()).unwrap();
        let mut checklist = LayerChecklist::all_checked(&catalog);
        checklist.check_only(&["R3", "R1"]);
        assert_eq!(checklist.checked_names(), vec!["R1", "R3"]);
    }
}
