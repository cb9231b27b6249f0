//! Map viewer abstraction and layer types.
//!
//! The mosaic workflow never owns map layers. It reads them through the
//! [`MapViewer`] trait, which exposes only what the workflow needs: layer
//! count, indexed layer access, the dataset backing a raster layer, layer
//! addition and a redraw request.
//!
//! # Example
//!
//! ```
//! use geomosaic::layer::{InMemoryMap, MapLayer, MapViewer};
//!
//! let mut map = InMemoryMap::new();
//! map.push(MapLayer::from_path("/data/north.tif"));
//! map.push(MapLayer::from_path("/data/roads.shp"));
//!
//! assert_eq!(map.layer_count().unwrap(), 2);
//! assert!(map.layer(0).unwrap().kind.is_raster());
//! ```

mod memory;
mod sources;
mod types;
mod viewer;

pub use memory::InMemoryMap;
pub use sources::{layers_from_glob, parse_layer_spec, LayerSourceError};
pub use types::{DatasetName, LayerKind, LayerRef, MapLayer};
pub use viewer::{MapViewer, ViewerError};
