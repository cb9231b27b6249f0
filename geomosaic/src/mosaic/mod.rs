//! Mosaic request types and validation.
//!
//! A [`MosaicRequest`] is the validated unit of work handed to the executor.
//! It is only ever produced by [`MosaicRequestBuilder`], which checks the
//! user's form input and resolves the checked layer names to dataset paths.

mod method;
mod pixel;
mod request;

pub use method::{MosaicMethod, ParseMethodError};
pub use pixel::{ParsePixelTypeError, PixelType};
pub use request::{
    MosaicForm, MosaicRequest, MosaicRequestBuilder, RequestError, UnresolvedLayerPolicy,
    ValidationError, DEFAULT_NUMBER_OF_BANDS, MIN_INPUT_RASTERS,
};
