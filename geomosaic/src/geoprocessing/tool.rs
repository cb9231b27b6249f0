//! Tool parameters, reports and the `Geoprocessor` trait.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::mosaic::{MosaicMethod, MosaicRequest, PixelType};

/// Name of the mosaic tool as it appears in messages.
pub const TOOL_NAME: &str = "MosaicToNewRaster";

/// Parameters of a "mosaic to new raster" invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicToNewRaster {
    /// Input dataset paths joined with `;`.
    pub input_rasters: String,
    /// Directory the output is written to.
    pub output_location: PathBuf,
    /// Output file name, extension included.
    pub raster_dataset_name_with_extension: String,
    pub pixel_type: PixelType,
    pub number_of_bands: u32,
    pub mosaic_method: MosaicMethod,
}

impl MosaicToNewRaster {
    /// Build the tool parameters for a validated request.
    pub fn from_request(request: &MosaicRequest) -> Self {
        Self {
            input_rasters: request.joined_inputs(),
            output_location: request.output_location(),
            raster_dataset_name_with_extension: request.output_name(),
            pixel_type: request.pixel_type,
            number_of_bands: request.number_of_bands,
            mosaic_method: request.method,
        }
    }

    /// Input paths split back out of the `;`-joined list.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.input_rasters
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// Full output path.
    pub fn output_path(&self) -> PathBuf {
        self.output_location
            .join(&self.raster_dataset_name_with_extension)
    }
}

impl fmt::Display for MosaicToNewRaster {
    /// Formats the invocation the way tool logs echo it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} # {} # {} {} FIRST",
            TOOL_NAME,
            self.input_rasters,
            self.output_location.display(),
            self.raster_dataset_name_with_extension,
            self.pixel_type,
            self.number_of_bands,
            self.mosaic_method
        )
    }
}

/// Environment settings applied to a tool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpEnvironment {
    /// Replace an existing output instead of failing.
    pub overwrite_output: bool,
}

impl Default for GpEnvironment {
    fn default() -> Self {
        Self {
            overwrite_output: true,
        }
    }
}

/// Structured completion status, for backends that report one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Succeeded,
    SucceededWithWarnings,
    Failed,
}

impl ToolStatus {
    pub fn is_failure(self) -> bool {
        self == ToolStatus::Failed
    }
}

/// Everything a tool run reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolReport {
    /// Messages in the order the tool emitted them.
    pub messages: Vec<String>,
    /// Completion status, when the backend provides one.
    pub status: Option<ToolStatus>,
}

impl ToolReport {
    /// A report carrying only text messages.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: ToolStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// All messages, one per line.
    pub fn joined(&self) -> String {
        let mut text = String::new();
        for message in &self.messages {
            text.push_str(message);
            text.push('\n');
        }
        text
    }
}

/// The tool could not be run at all.
///
/// Problems the tool itself reports (bad input, existing output) arrive as
/// `ERROR` messages in the [`ToolReport`] instead.
#[derive(Debug, Error)]
pub enum GeoprocessingError {
    /// The external program could not be started.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while talking to the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool run was aborted.
    #[error("Tool execution aborted: {0}")]
    Aborted(String),
}

/// A geoprocessing backend able to run the mosaic tool.
///
/// Implementations must be `Send + Sync` so a run can be moved off the UI
/// thread.
pub trait Geoprocessor: Send + Sync {
    /// Backend name for logs and banners.
    fn name(&self) -> &str;

    /// Run "mosaic to new raster" once.
    ///
    /// # Errors
    ///
    /// Returns `GeoprocessingError` only when the tool could not be invoked.
    /// Tool-level failures are reported through `ERROR` messages.
    fn execute(
        &self,
        tool: &MosaicToNewRaster,
        env: &GpEnvironment,
    ) -> Result<ToolReport, GeoprocessingError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_request() -> MosaicRequest {
        MosaicRequest {
            inputs: vec![PathBuf::from("/data/r1.tif"), PathBuf::from("/data/r2.tif")],
            output: PathBuf::from("/tmp/out.tif"),
            method: MosaicMethod::First,
            pixel_type: PixelType::Float32,
            number_of_bands: 1,
            dropped_layers: Vec::new(),
        }
    }

    struct EchoGeoprocessor;

    impl Geoprocessor for EchoGeoprocessor {
        fn name(&self) -> &str {
            "echo"
        }

        fn execute(
            &self,
            tool: &MosaicToNewRaster,
            _env: &GpEnvironment,
        ) -> Result<ToolReport, GeoprocessingError> {
            Ok(ToolReport::from_messages([format!("Executing: {}", tool)]))
        }
    }

    #[test]
    fn test_tool_from_request() {
        let tool = MosaicToNewRaster::from_request(&sample_request());
        assert_eq!(tool.input_rasters, "/data/r1.tif;/data/r2.tif");
        assert_eq!(tool.output_location, PathBuf::from("/tmp"));
        assert_eq!(tool.raster_dataset_name_with_extension, "out.tif");
        assert_eq!(tool.pixel_type, PixelType::Float32);
        assert_eq!(tool.number_of_bands, 1);
        assert_eq!(tool.mosaic_method, MosaicMethod::First);
    }

    #[test]
    fn test_input_paths_split() {
        let tool = MosaicToNewRaster::from_request(&sample_request());
        assert_eq!(
            tool.input_paths(),
            vec![PathBuf::from("/data/r1.tif"), PathBuf::from("/data/r2.tif")]
        );
        assert_eq!(tool.output_path(), PathBuf::from("/tmp/out.tif"));
    }

    #[test]
    fn test_tool_display() {
        let tool = MosaicToNewRaster::from_request(&sample_request());
        assert_eq!(
            tool.to_string(),
            "MosaicToNewRaster /data/r1.tif;/data/r2.tif /tmp out.tif # 32_BIT_FLOAT # 1 FIRST FIRST"
        );
    }

    #[test]
    fn test_environment_overwrites_by_default() {
        assert!(GpEnvironment::default().overwrite_output);
    }

    #[test]
    fn test_report_joined() {
        let report = ToolReport::from_messages(["a", "b"]);
        assert_eq!(report.joined(), "a\nb\n");
        assert!(report.status.is_none());
        assert_eq!(
            report.with_status(ToolStatus::Failed).status,
            Some(ToolStatus::Failed)
        );
    }

    #[test]
    fn test_trait_object() {
        let gp: Arc<dyn Geoprocessor> = Arc::new(EchoGeoprocessor);
        let tool = MosaicToNewRaster::from_request(&sample_request());
        let report = gp.execute(&tool, &GpEnvironment::default()).unwrap();
        assert!(report.messages[0].starts_with("Executing: MosaicToNewRaster"));
    }

    #[test]
    fn test_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Geoprocessor>();
    }
}
