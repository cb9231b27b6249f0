//! In-process mosaic backend.

use tracing::{debug, info};

use super::messages::MessageLog;
use super::tool::{Geoprocessor, GeoprocessingError, GpEnvironment, MosaicToNewRaster, ToolReport};
use crate::raster::{self, io};

/// Runs "mosaic to new raster" with the bundled raster engine.
///
/// Problems with the inputs or output are reported as `ERROR` messages:
///
/// | code | condition |
/// |------|-----------|
/// | 000732 | input or output location missing, or input format unsupported |
/// | 000725 | output exists and overwriting is disabled |
/// | 000622 | band count other than 1 |
/// | 000860 | output name is not a `.tif`/`.tiff` file |
/// | 999999 | read, merge or write failure |
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeGeoprocessor;

impl NativeGeoprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Geoprocessor for NativeGeoprocessor {
    fn name(&self) -> &str {
        "native"
    }

    fn execute(
        &self,
        tool: &MosaicToNewRaster,
        env: &GpEnvironment,
    ) -> Result<ToolReport, GeoprocessingError> {
        let mut log = MessageLog::start(tool);
        run(tool, env, &mut log);
        Ok(log.finish())
    }
}

fn run(tool: &MosaicToNewRaster, env: &GpEnvironment, log: &mut MessageLog) {
    let output = tool.output_path();

    if tool.number_of_bands != 1 {
        log.error(
            "000622",
            format!(
                "Failed to execute. Parameters are not valid. Number of Bands: {} is not supported, only single-band output can be written",
                tool.number_of_bands
            ),
        );
        return;
    }
    if !io::is_supported_output(&output) {
        log.error(
            "000860",
            format!(
                "Raster Dataset Name with Extension: {} is not a valid GeoTIFF name (.tif, .tiff)",
                tool.raster_dataset_name_with_extension
            ),
        );
        return;
    }
    if !tool.output_location.is_dir() {
        log.error(
            "000732",
            format!(
                "Output Location: Dataset {} does not exist or is not supported",
                tool.output_location.display()
            ),
        );
        return;
    }
    if output.exists() && !env.overwrite_output {
        log.error(
            "000725",
            format!("Raster Dataset Name with Extension: Dataset {} already exists.", output.display()),
        );
        return;
    }

    let paths = tool.input_paths();
    if paths.is_empty() {
        log.error("000732", "Input Rasters: no datasets given");
        return;
    }
    for path in &paths {
        if !path.is_file() || !io::is_supported_input(path) {
            log.error(
                "000732",
                format!(
                    "Input Rasters: Dataset {} does not exist or is not supported",
                    path.display()
                ),
            );
        }
    }
    if log.has_errors() {
        return;
    }

    let mut rasters = Vec::with_capacity(paths.len());
    for path in &paths {
        match io::read_raster(path) {
            Ok(raster) => rasters.push(raster),
            Err(e) => {
                log.error("999999", format!("Failed to read {}: {}", path.display(), e));
                return;
            }
        }
    }

    let mosaic = match raster::mosaic_rasters(&rasters, tool.mosaic_method) {
        Ok(mosaic) => mosaic,
        Err(e) => {
            log.error("999999", format!("Mosaic failed: {}", e));
            return;
        }
    };
    if mosaic.mismatched_cell_sizes {
        log.warning(
            "000445",
            "Cell sizes of the input rasters differ, using the cell size of the first input",
        );
    }
    debug!(
        width = mosaic.raster.width(),
        height = mosaic.raster.height(),
        "Merged input rasters"
    );

    if let Err(e) = io::write_geotiff(&output, &mosaic.raster, tool.pixel_type) {
        log.error("999999", format!("Failed to write {}: {}", output.display(), e));
        return;
    }

    info!(
        output = %output.display(),
        inputs = paths.len(),
        method = %tool.mosaic_method,
        "Native mosaic written"
    );
}
