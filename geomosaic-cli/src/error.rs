//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and the process exit code.

use std::fmt;
use std::process;

use geomosaic::config::ConfigFileError;
use geomosaic::geoprocessing::BindError;
use geomosaic::layer::{LayerSourceError, ViewerError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// No geoprocessing runtime available
    Bind(BindError),
    /// A layer source could not be turned into map layers
    LayerSource(LayerSourceError),
    /// The map viewer failed
    Viewer(ViewerError),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Interactive prompt failed
    Prompt(String),
    /// JSON output could not be produced
    Output(String),
    /// The mosaic was rejected or failed; details were already shown
    MosaicIncomplete,
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Bind(e) => {
                eprintln!();
                eprintln!("Backend '{}' unavailable: {}", e.backend, e.reason);
                eprintln!();
                eprintln!("Common fixes:");
                eprintln!("  1. Install the program named by geoprocessing.command");
                eprintln!("  2. Use the built-in engine: geomosaic config set geoprocessing.backend native");
                eprintln!("  3. Allow fallback: geomosaic config set geoprocessing.fallback_native true");
            }
            CliError::LayerSource(_) => {
                eprintln!();
                eprintln!("Layers are given as --layer NAME=PATH or --layers 'GLOB'.");
            }
            CliError::Config(_) | CliError::ConfigFile(_) => {
                eprintln!();
                eprintln!("Use 'geomosaic config list' to see available keys.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Bind(e) => write!(f, "{}", e),
            CliError::LayerSource(e) => write!(f, "{}", e),
            CliError::Viewer(e) => write!(f, "{}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
            CliError::MosaicIncomplete => write!(f, "Mosaic did not complete"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Bind(e) => Some(e),
            CliError::LayerSource(e) => Some(e),
            CliError::Viewer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<BindError> for CliError {
    fn from(e: BindError) -> Self {
        CliError::Bind(e)
    }
}

impl From<LayerSourceError> for CliError {
    fn from(e: LayerSourceError) -> Self {
        CliError::LayerSource(e)
    }
}

impl From<ViewerError> for CliError {
    fn from(e: ViewerError) -> Self {
        CliError::Viewer(e)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomosaic::config::Backend;
    use std::error::Error;

    #[test]
    fn test_bind_error_message_and_source() {
        let err = CliError::from(BindError {
            backend: Backend::Command,
            reason: "program 'gdal_merge.py' not found".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Unable to bind to a geoprocessing runtime. Application will be shut down."
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_plain_variants_have_no_source() {
        let err = CliError::InvalidArgument("--bands must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: --bands must be positive");
        assert!(err.source().is_none());
        assert!(CliError::MosaicIncomplete.source().is_none());
    }
}
