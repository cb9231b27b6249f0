//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::executor::ClassificationMode;
use crate::mosaic::{MosaicMethod, PixelType, UnresolvedLayerPolicy, DEFAULT_NUMBER_OF_BANDS};

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "geomosaic.log";

/// Default argument template for the command backend.
///
/// Matches `gdal_merge.py`; `{input_list}` expands to one argument per input.
pub const DEFAULT_COMMAND_ARGS: &str = "-o {output} -of GTiff {input_list}";

/// Default log file path (~/.geomosaic/geomosaic.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for MosaicSettings {
    fn default() -> Self {
        Self {
            method: MosaicMethod::default(),
            pixel_type: PixelType::default(),
            number_of_bands: DEFAULT_NUMBER_OF_BANDS,
            overwrite_output: true,
            unresolved_layers: UnresolvedLayerPolicy::default(),
            load_result: true,
        }
    }
}

impl Default for GeoprocessingSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Native,
            command: None,
            args: DEFAULT_COMMAND_ARGS.to_string(),
            fallback_native: true,
            classification: ClassificationMode::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            mosaic: MosaicSettings::default(),
            geoprocessing: GeoprocessingSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
