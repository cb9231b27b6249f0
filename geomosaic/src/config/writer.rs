//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let command = config.geoprocessing.command.as_deref().unwrap_or("");

    format!(
        r#"[mosaic]
; Mosaic method preselected in the dialog and used when none is given:
;   LAST    - later rasters overwrite earlier ones
;   FIRST   - earlier rasters win
;   BLEND   - weighted by distance to each raster's edge
;   MEAN, MINIMUM, MAXIMUM - cell statistics over overlapping rasters
method = {}
; Output pixel type: 8_BIT_UNSIGNED, 8_BIT_SIGNED, 16_BIT_UNSIGNED, 16_BIT_SIGNED,
; 32_BIT_UNSIGNED, 32_BIT_SIGNED, 32_BIT_FLOAT, 64_BIT
pixel_type = {}
; Output band count (the native engine writes single-band rasters)
number_of_bands = {}
; Replace an existing output raster (true/false)
overwrite_output = {}
; Checked layers that left the map before submit:
;   drop   - skip them with a warning
;   reject - refuse the request
unresolved_layers = {}
; Add the output raster to the map after a successful mosaic
load_result = {}

[geoprocessing]
; Backend tried first: native (built-in engine) or command (external program)
backend = {}
; Program run by the command backend, e.g. gdal_merge.py
command = {}
; Argument template. Placeholders: {{inputs}} {{input_list}} {{output}}
; {{output_location}} {{output_name}} {{pixel_type}} {{bands}} {{method}}
args = {}
; Use the native engine when the configured backend is unavailable
fallback_native = {}
; Result classification:
;   marker - any ERROR message means failure
;   status - trust the backend's exit status when it reports one
classification = {}

[logging]
; Log file location
file = {}
"#,
        config.mosaic.method,
        config.mosaic.pixel_type,
        config.mosaic.number_of_bands,
        config.mosaic.overwrite_output,
        config.mosaic.unresolved_layers,
        config.mosaic.load_result,
        config.geoprocessing.backend,
        command,
        config.geoprocessing.args,
        config.geoprocessing.fallback_native,
        config.geoprocessing.classification,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
