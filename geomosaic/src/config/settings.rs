//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::executor::ClassificationMode;
use crate::geoprocessing::GpEnvironment;
use crate::mosaic::{MosaicMethod, PixelType, UnresolvedLayerPolicy};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Mosaic defaults
    pub mosaic: MosaicSettings,
    /// Geoprocessing backend selection
    pub geoprocessing: GeoprocessingSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Mosaic defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicSettings {
    /// Method preselected in the dialog and used when none is given.
    pub method: MosaicMethod,
    /// Output pixel type.
    pub pixel_type: PixelType,
    /// Output band count.
    pub number_of_bands: u32,
    /// Replace an existing output raster.
    pub overwrite_output: bool,
    /// What to do with checked layers that vanished before submit.
    pub unresolved_layers: UnresolvedLayerPolicy,
    /// Add the output raster to the map after a successful mosaic.
    pub load_result: bool,
}

impl MosaicSettings {
    /// Tool environment derived from these settings.
    pub fn environment(&self) -> GpEnvironment {
        GpEnvironment {
            overwrite_output: self.overwrite_output,
        }
    }
}

/// Geoprocessing backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Built-in raster engine.
    #[default]
    Native,
    /// External mosaic program.
    Command,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Backend::Native),
            "command" => Ok(Backend::Command),
            other => Err(format!(
                "unknown backend '{}' - must be 'native' or 'command'",
                other
            )),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Native => write!(f, "native"),
            Backend::Command => write!(f, "command"),
        }
    }
}

/// Geoprocessing backend configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoprocessingSettings {
    /// Backend tried first.
    pub backend: Backend,
    /// Program run by the command backend.
    pub command: Option<String>,
    /// Argument template for the command backend.
    pub args: String,
    /// Fall back to the native engine when the configured backend can't bind.
    pub fallback_native: bool,
    /// How tool reports are classified.
    pub classification: ClassificationMode,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}
