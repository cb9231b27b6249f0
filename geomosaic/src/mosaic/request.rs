//! Mosaic request building and validation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::method::{MosaicMethod, ParseMethodError};
use super::pixel::PixelType;
use crate::layer::{MapViewer, ViewerError};

/// Minimum number of checked raster layers for a mosaic.
pub const MIN_INPUT_RASTERS: usize = 2;

/// Default number of bands in the output raster.
pub const DEFAULT_NUMBER_OF_BANDS: u32 = 1;

/// Raw user input from the mosaic form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MosaicForm {
    /// Checked raster layer names, in checklist order.
    pub checked_layers: Vec<String>,
    /// Output path text as typed or picked.
    pub output_path: String,
    /// Selected dropdown label, if any.
    pub method_label: Option<String>,
}

/// A form predicate that does not hold.
///
/// Variants are listed in the order they are checked; only the first unmet
/// predicate is reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Fewer than [`MIN_INPUT_RASTERS`] layers checked.
    #[error("Select at least two raster layers (selected: {selected})")]
    TooFewRasters { selected: usize },

    /// Output path blank or whitespace.
    #[error("Specify an output path")]
    MissingOutputPath,

    /// No method selected in the dropdown.
    #[error("Select a mosaic method")]
    MissingMethod,

    /// The selected label does not start with a known method keyword.
    #[error(transparent)]
    UnknownMethod(#[from] ParseMethodError),
}

/// Errors producing a [`MosaicRequest`].
#[derive(Debug, Error)]
pub enum RequestError {
    /// The form input is insufficient.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Checked names no longer resolve to raster datasets.
    ///
    /// Only produced under [`UnresolvedLayerPolicy::Reject`].
    #[error("Checked layers are no longer in the map: {}", .0.join(", "))]
    UnresolvedLayers(Vec<String>),

    /// The viewer failed while re-reading its layers.
    #[error("Failed to read map layers: {0}")]
    Viewer(#[from] ViewerError),
}

/// What to do with checked names that no longer resolve at submit time.
///
/// Layers can be removed from the map between the catalog read and the
/// submit. `Drop` skips such names, `Reject` refuses the whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedLayerPolicy {
    #[default]
    Drop,
    Reject,
}

impl FromStr for UnresolvedLayerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(UnresolvedLayerPolicy::Drop),
            "reject" => Ok(UnresolvedLayerPolicy::Reject),
            other => Err(format!("unknown policy '{}' - must be 'drop' or 'reject'", other)),
        }
    }
}

impl fmt::Display for UnresolvedLayerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedLayerPolicy::Drop => write!(f, "drop"),
            UnresolvedLayerPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// A validated unit of mosaic work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicRequest {
    /// Resolved input dataset paths, in checklist order.
    pub inputs: Vec<PathBuf>,
    /// Output raster path.
    pub output: PathBuf,
    pub method: MosaicMethod,
    pub pixel_type: PixelType,
    pub number_of_bands: u32,
    /// Checked names dropped because they no longer resolved.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_layers: Vec<String>,
}

impl MosaicRequest {
    /// Directory the output is written to (`.` for a bare file name).
    pub fn output_location(&self) -> PathBuf {
        match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Output file name including extension.
    pub fn output_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Input paths joined with `;`, the tool's list syntax.
    pub fn joined_inputs(&self) -> String {
        self.inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Validates form input and resolves layer names into a [`MosaicRequest`].
#[derive(Debug, Clone)]
pub struct MosaicRequestBuilder {
    pixel_type: PixelType,
    number_of_bands: u32,
    unresolved_policy: UnresolvedLayerPolicy,
}

impl Default for MosaicRequestBuilder {
    fn default() -> Self {
        Self {
            pixel_type: PixelType::Float32,
            number_of_bands: DEFAULT_NUMBER_OF_BANDS,
            unresolved_policy: UnresolvedLayerPolicy::Drop,
        }
    }
}

impl MosaicRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output pixel type.
    pub fn with_pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    /// Set the number of output bands.
    pub fn with_number_of_bands(mut self, bands: u32) -> Self {
        self.number_of_bands = bands;
        self
    }

    /// Set the policy for checked names that no longer resolve.
    pub fn with_unresolved_policy(mut self, policy: UnresolvedLayerPolicy) -> Self {
        self.unresolved_policy = policy;
        self
    }

    pub fn unresolved_policy(&self) -> UnresolvedLayerPolicy {
        self.unresolved_policy
    }

    /// Check the form predicates in priority order.
    ///
    /// Returns the output path exactly as typed and the selected method. A
    /// path of only whitespace counts as missing, but surrounding spaces on a
    /// real path are part of the file name and are kept.
    pub fn validate(&self, form: &MosaicForm) -> Result<(PathBuf, MosaicMethod), ValidationError> {
        let selected = form.checked_layers.len();
        if selected < MIN_INPUT_RASTERS {
            return Err(ValidationError::TooFewRasters { selected });
        }

        let output = form.output_path.as_str();
        if output.trim().is_empty() {
            return Err(ValidationError::MissingOutputPath);
        }

        let label = form
            .method_label
            .as_deref()
            .ok_or(ValidationError::MissingMethod)?;
        let method = MosaicMethod::from_label(label)?;

        Ok((PathBuf::from(output), method))
    }

    /// Validate the form and resolve checked names against the viewer.
    ///
    /// The viewer's layer list is re-read here rather than reusing the
    /// catalog shown to the user.
    pub fn build(
        &self,
        viewer: &dyn MapViewer,
        form: &MosaicForm,
    ) -> Result<MosaicRequest, RequestError> {
        let (output, method) = self.validate(form)?;
        let (inputs, unresolved) = resolve_datasets(viewer, &form.checked_layers)?;

        if !unresolved.is_empty() {
            match self.unresolved_policy {
                UnresolvedLayerPolicy::Reject => {
                    return Err(RequestError::UnresolvedLayers(unresolved));
                }
                UnresolvedLayerPolicy::Drop => {
                    warn!(layers = ?unresolved, "Dropping checked layers that are no longer in the map");
                }
            }
        }

        debug!(
            output_location = %output_dir(&output).display(),
            output_name = %output.file_name().unwrap_or_default().to_string_lossy(),
            "Resolved mosaic output"
        );

        Ok(MosaicRequest {
            inputs,
            output,
            method,
            pixel_type: self.pixel_type,
            number_of_bands: self.number_of_bands,
            dropped_layers: unresolved,
        })
    }
}

fn output_dir(output: &Path) -> &Path {
    output.parent().unwrap_or_else(|| Path::new("."))
}

/// Resolve each checked name to the datasets of raster layers with that name.
///
/// Every raster layer sharing a name contributes its dataset. Returns the
/// resolved paths and the names that matched nothing.
fn resolve_datasets(
    viewer: &dyn MapViewer,
    names: &[String],
) -> Result<(Vec<PathBuf>, Vec<String>), ViewerError> {
    let count = viewer.layer_count()?;
    let mut inputs = Vec::new();
    let mut unresolved = Vec::new();

    for name in names {
        let mut matched = false;
        for index in 0..count {
            let layer = viewer.layer(index)?;
            if layer.name != *name || !layer.kind.is_raster() {
                continue;
            }
            if let Some(dataset) = viewer.raster_dataset(index)? {
                let path = dataset.full_path();
                debug!(layer = %name, path = %path.display(), "Raster dataset path");
                inputs.push(path);
                matched = true;
            }
        }
        if !matched {
            unresolved.push(name.clone());
        }
    }

    Ok((inputs, unresolved))
}
