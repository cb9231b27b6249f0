//! Configuration key access and validation.
//!
//! Type-safe get/set of configuration values by `section.key` name, backing
//! the `config get|set|list` commands.

use std::str::FromStr;

use thiserror::Error;

use super::parser::{expand_tilde, parse_bool};
use super::settings::ConfigFile;
use super::writer::path_to_string;
use crate::mosaic::{MosaicMethod, PixelType};

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Mosaic settings
    MosaicMethod,
    MosaicPixelType,
    MosaicNumberOfBands,
    MosaicOverwriteOutput,
    MosaicUnresolvedLayers,
    MosaicLoadResult,

    // Geoprocessing settings
    GeoprocessingBackend,
    GeoprocessingCommand,
    GeoprocessingArgs,
    GeoprocessingFallbackNative,
    GeoprocessingClassification,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "mosaic.pixel_type").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::MosaicMethod => "mosaic.method",
            ConfigKey::MosaicPixelType => "mosaic.pixel_type",
            ConfigKey::MosaicNumberOfBands => "mosaic.number_of_bands",
            ConfigKey::MosaicOverwriteOutput => "mosaic.overwrite_output",
            ConfigKey::MosaicUnresolvedLayers => "mosaic.unresolved_layers",
            ConfigKey::MosaicLoadResult => "mosaic.load_result",
            ConfigKey::GeoprocessingBackend => "geoprocessing.backend",
            ConfigKey::GeoprocessingCommand => "geoprocessing.command",
            ConfigKey::GeoprocessingArgs => "geoprocessing.args",
            ConfigKey::GeoprocessingFallbackNative => "geoprocessing.fallback_native",
            ConfigKey::GeoprocessingClassification => "geoprocessing.classification",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "mosaic").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "pixel_type").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::MosaicMethod => config.mosaic.method.to_string(),
            ConfigKey::MosaicPixelType => config.mosaic.pixel_type.to_string(),
            ConfigKey::MosaicNumberOfBands => config.mosaic.number_of_bands.to_string(),
            ConfigKey::MosaicOverwriteOutput => config.mosaic.overwrite_output.to_string(),
            ConfigKey::MosaicUnresolvedLayers => config.mosaic.unresolved_layers.to_string(),
            ConfigKey::MosaicLoadResult => config.mosaic.load_result.to_string(),
            ConfigKey::GeoprocessingBackend => config.geoprocessing.backend.to_string(),
            ConfigKey::GeoprocessingCommand => {
                config.geoprocessing.command.clone().unwrap_or_default()
            }
            ConfigKey::GeoprocessingArgs => config.geoprocessing.args.clone(),
            ConfigKey::GeoprocessingFallbackNative => {
                config.geoprocessing.fallback_native.to_string()
            }
            ConfigKey::GeoprocessingClassification => {
                config.geoprocessing.classification.to_string()
            }
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Set a value in the config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        let value = value.trim();
        match self {
            ConfigKey::MosaicMethod => {
                config.mosaic.method = MosaicMethod::from_str(&value.to_uppercase())
                    .map_err(|e| self.invalid(e.to_string()))?;
            }
            ConfigKey::MosaicPixelType => {
                config.mosaic.pixel_type =
                    PixelType::from_str(value).map_err(|e| self.invalid(e.to_string()))?;
            }
            ConfigKey::MosaicNumberOfBands => {
                config.mosaic.number_of_bands =
                    value.parse().map_err(|_| self.invalid("must be a positive integer"))?;
            }
            ConfigKey::MosaicOverwriteOutput => {
                config.mosaic.overwrite_output = parse_bool(value);
            }
            ConfigKey::MosaicUnresolvedLayers => {
                config.mosaic.unresolved_layers = value.parse().map_err(|e| self.invalid(e))?;
            }
            ConfigKey::MosaicLoadResult => {
                config.mosaic.load_result = parse_bool(value);
            }
            ConfigKey::GeoprocessingBackend => {
                config.geoprocessing.backend = value.parse().map_err(|e| self.invalid(e))?;
            }
            ConfigKey::GeoprocessingCommand => {
                config.geoprocessing.command = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ConfigKey::GeoprocessingArgs => {
                config.geoprocessing.args = value.to_string();
            }
            ConfigKey::GeoprocessingFallbackNative => {
                config.geoprocessing.fallback_native = parse_bool(value);
            }
            ConfigKey::GeoprocessingClassification => {
                config.geoprocessing.classification =
                    value.parse().map_err(|e| self.invalid(e))?;
            }
            ConfigKey::LoggingFile => {
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| self.invalid(reason))
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigKeyError {
        ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.into(),
        }
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::MosaicMethod => Box::new(OneOfSpec::new(&[
                "last", "first", "blend", "mean", "minimum", "maximum",
            ])),
            ConfigKey::MosaicPixelType => Box::new(OneOfSpec::new(&[
                "8_bit_unsigned",
                "8_bit_signed",
                "16_bit_unsigned",
                "16_bit_signed",
                "32_bit_unsigned",
                "32_bit_signed",
                "32_bit_float",
                "64_bit",
            ])),
            ConfigKey::MosaicNumberOfBands => Box::new(PositiveIntegerSpec),
            ConfigKey::MosaicOverwriteOutput => Box::new(BooleanSpec),
            ConfigKey::MosaicUnresolvedLayers => Box::new(OneOfSpec::new(&["drop", "reject"])),
            ConfigKey::MosaicLoadResult => Box::new(BooleanSpec),
            ConfigKey::GeoprocessingBackend => Box::new(OneOfSpec::new(&["native", "command"])),
            ConfigKey::GeoprocessingCommand => Box::new(AnyStringSpec),
            ConfigKey::GeoprocessingArgs => Box::new(PlaceholderSpec),
            ConfigKey::GeoprocessingFallbackNative => Box::new(BooleanSpec),
            ConfigKey::GeoprocessingClassification => {
                Box::new(OneOfSpec::new(&["marker", "status"]))
            }
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::MosaicMethod,
            ConfigKey::MosaicPixelType,
            ConfigKey::MosaicNumberOfBands,
            ConfigKey::MosaicOverwriteOutput,
            ConfigKey::MosaicUnresolvedLayers,
            ConfigKey::MosaicLoadResult,
            ConfigKey::GeoprocessingBackend,
            ConfigKey::GeoprocessingCommand,
            ConfigKey::GeoprocessingArgs,
            ConfigKey::GeoprocessingFallbackNative,
            ConfigKey::GeoprocessingClassification,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Accepts any string value.
struct AnyStringSpec;

impl ValueSpecification for AnyStringSpec {
    fn is_satisfied_by(&self, _value: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Requires the value to be one of a set of options (case-insensitive).
struct OneOfSpec {
    options: &'static [&'static str],
}

impl OneOfSpec {
    fn new(options: &'static [&'static str]) -> Self {
        Self { options }
    }
}

impl ValueSpecification for OneOfSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        if self.options.iter().any(|opt| *opt == lower) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", self.options.join(", ")))
        }
    }
}

/// Integer greater than zero.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u32>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("must be a positive integer".to_string()),
        }
    }
}

struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        let valid = ["true", "false", "yes", "no", "1", "0", "on", "off"];
        if valid.contains(&lower.as_str()) {
            Ok(())
        } else {
            Err("must be true/false, yes/no, 1/0, or on/off".to_string())
        }
    }
}

/// Non-empty path.
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// Argument template that names the output.
struct PlaceholderSpec;

impl ValueSpecification for PlaceholderSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let names_output = ["{output}", "{output_location}", "{output_name}"]
            .iter()
            .any(|p| value.contains(p));
        if names_output {
            Ok(())
        } else {
            Err("must reference {output}, {output_location} or {output_name}".to_string())
        }
    }
}
