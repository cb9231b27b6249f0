//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module is the single place where INI key names are mapped to struct
//! fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::mosaic::{MosaicMethod, PixelType};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [mosaic] section
    if let Some(section) = ini.section(Some("mosaic")) {
        if let Some(v) = section.get("method") {
            config.mosaic.method =
                MosaicMethod::from_str(&v.trim().to_uppercase()).map_err(|_| {
                    invalid(
                        "mosaic",
                        "method",
                        v,
                        "must be one of: LAST, FIRST, BLEND, MEAN, MINIMUM, MAXIMUM",
                    )
                })?;
        }
        if let Some(v) = section.get("pixel_type") {
            config.mosaic.pixel_type = PixelType::from_str(v).map_err(|_| {
                invalid(
                    "mosaic",
                    "pixel_type",
                    v,
                    "must be a pixel type such as 8_BIT_UNSIGNED or 32_BIT_FLOAT",
                )
            })?;
        }
        if let Some(v) = section.get("number_of_bands") {
            config.mosaic.number_of_bands = parse_positive(v).ok_or_else(|| {
                invalid("mosaic", "number_of_bands", v, "must be a positive integer")
            })?;
        }
        if let Some(v) = section.get("overwrite_output") {
            config.mosaic.overwrite_output = parse_bool(v);
        }
        if let Some(v) = section.get("unresolved_layers") {
            config.mosaic.unresolved_layers = v
                .parse()
                .map_err(|reason: String| invalid("mosaic", "unresolved_layers", v, &reason))?;
        }
        if let Some(v) = section.get("load_result") {
            config.mosaic.load_result = parse_bool(v);
        }
    }

    // [geoprocessing] section
    if let Some(section) = ini.section(Some("geoprocessing")) {
        if let Some(v) = section.get("backend") {
            config.geoprocessing.backend = v
                .parse()
                .map_err(|reason: String| invalid("geoprocessing", "backend", v, &reason))?;
        }
        if let Some(v) = section.get("command") {
            let v = v.trim();
            if !v.is_empty() {
                config.geoprocessing.command = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("args") {
            let v = v.trim();
            if !v.is_empty() {
                config.geoprocessing.args = v.to_string();
            }
        }
        if let Some(v) = section.get("fallback_native") {
            config.geoprocessing.fallback_native = parse_bool(v);
        }
        if let Some(v) = section.get("classification") {
            config.geoprocessing.classification = v.parse().map_err(|reason: String| {
                invalid("geoprocessing", "classification", v, &reason)
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
