//! Native raster engine.
//!
//! Reads single-band rasters (GeoTIFF through `tiff`, common image formats
//! through `image`), merges them onto a new grid and writes the result as a
//! GeoTIFF.
//!
//! # Georeferencing
//!
//! Rasters are north-up grids described by a [`GeoTransform`]: the map
//! coordinate of the top-left corner and the cell size. GeoTIFF inputs take
//! it from `ModelPixelScaleTag` and `ModelTiepointTag`; rasters without those
//! tags sit at the origin with 1×1 cells.
//!
//! # Example
//!
//! ```
//! use geomosaic::mosaic::MosaicMethod;
//! use geomosaic::raster::{mosaic_rasters, GeoTransform, Raster};
//!
//! let west = Raster::new(2, 1, GeoTransform::new(0.0, 1.0, 1.0, 1.0), vec![1.0, 2.0]);
//! let east = Raster::new(2, 1, GeoTransform::new(1.0, 1.0, 1.0, 1.0), vec![10.0, 20.0]);
//!
//! let mosaic = mosaic_rasters(&[west, east], MosaicMethod::First).unwrap();
//! assert_eq!(mosaic.raster.data(), &[1.0, 2.0, 20.0]);
//! ```

mod error;
mod grid;
pub mod io;
mod merge;

pub use error::RasterError;
pub use grid::{Extent, GeoTransform, Raster, RasterInfo};
pub use merge::{mosaic_rasters, Mosaic, MAX_OUTPUT_CELLS};
