//! CLI runner for common setup.
//!
//! Encapsulates config loading, logging initialization and geoprocessing
//! runtime binding for the commands that run mosaics.

use std::path::Path;

use geomosaic::config::ConfigFile;
use geomosaic::geoprocessing::{self, BoundRuntime};
use geomosaic::logging::{init_logging, LoggingGuard};
use tracing::{info, warn};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config from `config_path` and initialize logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to read (defaults apply if missing)
    /// * `debug_mode` - Enable debug-level logging regardless of RUST_LOG
    /// * `stdout_logging` - Mirror log lines to stdout
    pub fn new(config_path: &Path, debug_mode: bool, stdout_logging: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load_from(config_path)?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| geomosaic::config::DEFAULT_LOG_FILE_NAME.to_string());

        let logging_guard = init_logging(log_dir, &log_file, stdout_logging, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("GeoMosaic v{}", geomosaic::VERSION);
        info!("GeoMosaic CLI: {} command", command);
    }

    /// Bind the configured geoprocessing backend.
    ///
    /// Failing to bind is fatal for the mosaic commands.
    pub fn bind_runtime(&self) -> Result<BoundRuntime, CliError> {
        let runtime = geoprocessing::bind(&self.config.geoprocessing)?;
        if runtime.fell_back() {
            warn!(
                configured = %self.config.geoprocessing.backend,
                "Using native geoprocessing engine"
            );
        }
        Ok(runtime)
    }
}
