//! Geoprocessing tool abstraction.
//!
//! The workflow runs one tool, "mosaic to new raster", through the
//! [`Geoprocessor`] trait. Backends report results as an ordered list of
//! free-text messages and, when they can, a structured [`ToolStatus`].
//!
//! # Backends
//!
//! - [`NativeGeoprocessor`] - in-process raster engine ([`crate::raster`])
//! - [`CommandGeoprocessor`] - shells out to an external mosaic program
//!
//! [`runtime::bind`] picks a backend from configuration, falling back to the
//! native engine when an external program cannot be found.

mod command;
mod messages;
mod native;
pub mod runtime;
mod tool;

pub use command::CommandGeoprocessor;
pub use messages::{contains_error_marker, MessageKind, MessageLog, ERROR_MARKER};
pub use native::NativeGeoprocessor;
pub use runtime::{bind, BindError, BoundRuntime};
pub use tool::{
    Geoprocessor, GeoprocessingError, GpEnvironment, MosaicToNewRaster, ToolReport, ToolStatus,
    TOOL_NAME,
};
