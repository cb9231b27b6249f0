//! GeoMosaic - merge raster map layers into a single mosaic raster
//!
//! This library provides the workflow behind the mosaic dialog: reading the
//! raster layers held by a map viewer, validating the user's selection,
//! running a "mosaic to new raster" geoprocessing tool and loading the
//! product back into the map.
//!
//! # Architecture
//!
//! ```text
//! MapViewer ──► LayerCatalog ──► MosaicDialog / MosaicForm
//!                                     │
//!                                     ▼
//!                           MosaicRequestBuilder ──► MosaicRequest
//!                                                        │
//!                                                        ▼
//!                     Geoprocessor ◄── MosaicExecutor ──► MosaicOutcome
//!                                                        │
//!                                                        ▼
//!                                    ResultLoader ──► MapViewer::add_layer
//! ```
//!
//! The map viewer and the geoprocessing tool are traits ([`layer::MapViewer`],
//! [`geoprocessing::Geoprocessor`]) so the workflow can run against the bundled
//! in-memory map and native raster engine, an external command, or test fakes.

pub mod catalog;
pub mod config;
pub mod dialog;
pub mod executor;
pub mod geoprocessing;
pub mod layer;
pub mod loader;
pub mod logging;
pub mod mosaic;
pub mod raster;
pub mod workflow;

/// Library version, taken from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
