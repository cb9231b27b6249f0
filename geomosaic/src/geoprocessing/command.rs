//! External-program mosaic backend.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use super::messages::{contains_error_marker, MessageKind, MessageLog};
use super::tool::{
    Geoprocessor, GeoprocessingError, GpEnvironment, MosaicToNewRaster, ToolReport, ToolStatus,
};

/// Placeholder that expands to one argument per input raster.
const INPUT_LIST: &str = "{input_list}";

/// Suffix of the sibling file holding a previous output during a run.
const PREVIOUS_SUFFIX: &str = "geomosaic-previous";

/// Runs an external mosaic program (for example `gdal_merge.py`).
///
/// The argument template is split on whitespace and each token has its
/// placeholders substituted:
///
/// - `{inputs}` - input paths joined with `;`
/// - `{input_list}` - standalone token, one argument per input
/// - `{output}`, `{output_location}`, `{output_name}`
/// - `{pixel_type}`, `{bands}`, `{method}`
///
/// Stdout lines followed by stderr lines become the message log.
///
/// When overwriting, an existing output is moved aside for the run and put
/// back if the program fails, so a failed run leaves the old raster intact.
#[derive(Debug, Clone)]
pub struct CommandGeoprocessor {
    program: String,
    args_template: String,
}

impl CommandGeoprocessor {
    pub fn new(program: impl Into<String>, args_template: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args_template: args_template.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for a tool invocation.
    pub fn build_args(&self, tool: &MosaicToNewRaster) -> Vec<String> {
        let output = tool.output_path().display().to_string();
        let location = tool.output_location.display().to_string();
        let bands = tool.number_of_bands.to_string();

        let mut args = Vec::new();
        for token in self.args_template.split_whitespace() {
            if token == INPUT_LIST {
                args.extend(tool.input_paths().iter().map(|p| p.display().to_string()));
                continue;
            }
            args.push(
                token
                    .replace("{inputs}", &tool.input_rasters)
                    .replace("{output_location}", &location)
                    .replace("{output_name}", &tool.raster_dataset_name_with_extension)
                    .replace("{output}", &output)
                    .replace("{pixel_type}", tool.pixel_type.keyword())
                    .replace("{bands}", &bands)
                    .replace("{method}", tool.mosaic_method.keyword()),
            );
        }
        args
    }

    fn run(&self, tool: &MosaicToNewRaster) -> Result<ToolReport, GeoprocessingError> {
        let args = self.build_args(tool);
        debug!(program = %self.program, args = ?args, "Running mosaic command");

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| GeoprocessingError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut messages: Vec<String> = String::from_utf8_lossy(&result.stdout)
            .lines()
            .chain(String::from_utf8_lossy(&result.stderr).lines())
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        let status = if result.status.success() {
            if messages.iter().any(|m| MessageKind::classify(m).is_warning()) {
                ToolStatus::SucceededWithWarnings
            } else {
                ToolStatus::Succeeded
            }
        } else {
            warn!(program = %self.program, status = %result.status, "Mosaic command failed");
            if !contains_error_marker(&messages) {
                messages.push(format!(
                    "ERROR 999999: {} exited with {}",
                    self.program, result.status
                ));
            }
            ToolStatus::Failed
        };

        Ok(ToolReport {
            messages,
            status: Some(status),
        })
    }
}

impl Geoprocessor for CommandGeoprocessor {
    fn name(&self) -> &str {
        "command"
    }

    fn execute(
        &self,
        tool: &MosaicToNewRaster,
        env: &GpEnvironment,
    ) -> Result<ToolReport, GeoprocessingError> {
        let output = tool.output_path();
        let previous = if output.exists() {
            if !env.overwrite_output {
                let mut log = MessageLog::start(tool);
                log.error(
                    "000725",
                    format!(
                        "Raster Dataset Name with Extension: Dataset {} already exists.",
                        output.display()
                    ),
                );
                return Ok(log.finish());
            }
            Some(PreviousOutput::set_aside(&output)?)
        } else {
            None
        };

        let result = self.run(tool);

        if let Some(previous) = previous {
            let failed = match &result {
                Ok(report) => {
                    report.status == Some(ToolStatus::Failed)
                        || contains_error_marker(&report.messages)
                }
                Err(_) => true,
            };
            let settled = if failed {
                previous.restore()
            } else {
                previous.discard()
            };
            if let Err(e) = settled {
                warn!(output = %output.display(), error = %e, "Failed to settle previous output");
            }
        }
        result
    }
}

/// An existing output renamed to a hidden sibling while the program runs.
struct PreviousOutput {
    output: PathBuf,
    saved: PathBuf,
}

impl PreviousOutput {
    fn set_aside(output: &Path) -> io::Result<Self> {
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let saved = output.with_file_name(format!(".{}.{}", name, PREVIOUS_SUFFIX));
        std::fs::rename(output, &saved)?;
        debug!(output = %output.display(), saved = %saved.display(), "Set previous output aside");
        Ok(Self {
            output: output.to_path_buf(),
            saved,
        })
    }

    /// Put the previous output back, replacing anything the program left.
    fn restore(self) -> io::Result<()> {
        if self.output.exists() {
            std::fs::remove_file(&self.output)?;
        }
        std::fs::rename(&self.saved, &self.output)
    }

    fn discard(self) -> io::Result<()> {
        std::fs::remove_file(&self.saved)
    }
}
