//! Tool message logs.
//!
//! Tools report progress and problems as free text. Error lines carry the
//! `ERROR` marker, optionally followed by a six digit code
//! (`ERROR 000732: ...`); warnings use `WARNING` the same way.

use std::sync::OnceLock;
use std::time::Instant;

use chrono::{DateTime, Local};
use regex::Regex;

use super::tool::{MosaicToNewRaster, ToolReport, ToolStatus, TOOL_NAME};

/// Marker whose presence anywhere in a log means the run failed.
pub const ERROR_MARKER: &str = "ERROR";

const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Returns true if the concatenated log contains [`ERROR_MARKER`].
///
/// Matching is case-sensitive. Messages are joined line by line, so the
/// marker is never assembled across two messages. An empty log has no
/// marker.
///
/// # Examples
///
/// ```
/// use geomosaic::geoprocessing::contains_error_marker;
///
/// assert!(contains_error_marker(&["ERROR 999999: input raster invalid"]));
/// assert!(!contains_error_marker(&["Executing...", "Succeeded"]));
/// assert!(!contains_error_marker::<&str>(&[]));
/// ```
pub fn contains_error_marker<S: AsRef<str>>(messages: &[S]) -> bool {
    let joined = messages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    joined.contains(ERROR_MARKER)
}

/// Severity of a single message line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning { code: Option<String> },
    Error { code: Option<String> },
}

fn severity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(ERROR|WARNING)(?:\s+(\d{6}))?\s*:").expect("severity pattern is valid")
    })
}

impl MessageKind {
    /// Classify a message line by its leading marker.
    pub fn classify(message: &str) -> Self {
        match severity_pattern().captures(message) {
            Some(caps) => {
                let code = caps.get(2).map(|m| m.as_str().to_string());
                if &caps[1] == "ERROR" {
                    MessageKind::Error { code }
                } else {
                    MessageKind::Warning { code }
                }
            }
            None => MessageKind::Info,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MessageKind::Error { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, MessageKind::Warning { .. })
    }
}

/// Accumulates the message log of one tool run.
#[derive(Debug)]
pub struct MessageLog {
    messages: Vec<String>,
    started: Instant,
    warnings: usize,
    errors: usize,
}

impl MessageLog {
    /// Start a log with the standard "Executing" and "Start Time" lines.
    pub fn start(tool: &MosaicToNewRaster) -> Self {
        let mut log = Self {
            messages: Vec::new(),
            started: Instant::now(),
            warnings: 0,
            errors: 0,
        };
        log.info(format!("Executing: {}", tool));
        log.info(format!("Start Time: {}", timestamp(Local::now())));
        log
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn warning(&mut self, code: &str, message: impl AsRef<str>) {
        self.warnings += 1;
        self.messages
            .push(format!("WARNING {}: {}", code, message.as_ref()));
    }

    pub fn error(&mut self, code: &str, message: impl AsRef<str>) {
        self.errors += 1;
        self.messages
            .push(format!("ERROR {}: {}", code, message.as_ref()));
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Close the log with a success or failure trailer.
    pub fn finish(mut self) -> ToolReport {
        let elapsed = self.started.elapsed().as_secs_f64();
        let now = timestamp(Local::now());

        let status = if self.errors > 0 {
            self.info(format!("Failed to execute ({}).", TOOL_NAME));
            self.info(format!("Failed at {} (Elapsed Time: {:.2} seconds)", now, elapsed));
            ToolStatus::Failed
        } else {
            self.info(format!(
                "Succeeded at {} (Elapsed Time: {:.2} seconds)",
                now, elapsed
            ));
            if self.warnings > 0 {
                ToolStatus::SucceededWithWarnings
            } else {
                ToolStatus::Succeeded
            }
        };

        ToolReport {
            messages: self.messages,
            status: Some(status),
        }
    }
}

fn timestamp(time: DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosaic::{MosaicMethod, PixelType};
    use std::path::PathBuf;

    fn tool() -> MosaicToNewRaster {
        MosaicToNewRaster {
            input_rasters: "a.tif;b.tif".to_string(),
            output_location: PathBuf::from("/tmp"),
            raster_dataset_name_with_extension: "out.tif".to_string(),
            pixel_type: PixelType::Float32,
            number_of_bands: 1,
            mosaic_method: MosaicMethod::Last,
        }
    }

    #[test]
    fn test_marker_detection() {
        assert!(contains_error_marker(&["ok", "ERROR 000732: missing"]));
        assert!(contains_error_marker(&["Input has an ERROR inside"]));
        assert!(!contains_error_marker(&["error in lower case"]));
        assert!(!contains_error_marker(&["Executing...", "Succeeded"]));
    }

    #[test]
    fn test_marker_not_assembled_across_messages() {
        assert!(!contains_error_marker(&["ERR", "OR"]));
    }

    #[test]
    fn test_classify_lines() {
        assert_eq!(
            MessageKind::classify("ERROR 000732: Dataset does not exist"),
            MessageKind::Error {
                code: Some("000732".to_string())
            }
        );
        assert_eq!(
            MessageKind::classify("WARNING: cell sizes differ"),
            MessageKind::Warning { code: None }
        );
        assert_eq!(MessageKind::classify("Start Time: now"), MessageKind::Info);
        assert_eq!(MessageKind::classify("ERROR 1: short code"), MessageKind::Info);
    }

    #[test]
    fn test_successful_log() {
        let log = MessageLog::start(&tool());
        let report = log.finish();

        assert_eq!(report.status, Some(ToolStatus::Succeeded));
        assert!(report.messages[0].starts_with("Executing: MosaicToNewRaster"));
        assert!(report.messages[1].starts_with("Start Time: "));
        assert!(report.messages.last().unwrap().starts_with("Succeeded at "));
        assert!(!contains_error_marker(&report.messages));
    }

    #[test]
    fn test_log_with_warning() {
        let mut log = MessageLog::start(&tool());
        log.warning("000445", "cell sizes differ");
        let report = log.finish();

        assert_eq!(report.status, Some(ToolStatus::SucceededWithWarnings));
        assert!(report.messages.contains(&"WARNING 000445: cell sizes differ".to_string()));
    }

    #[test]
    fn test_failed_log() {
        let mut log = MessageLog::start(&tool());
        log.error("000732", "Input Rasters: Dataset a.tif does not exist");
        assert!(log.has_errors());
        let report = log.finish();

        assert_eq!(report.status, Some(ToolStatus::Failed));
        assert!(contains_error_marker(&report.messages));
        assert!(report
            .messages
            .contains(&"Failed to execute (MosaicToNewRaster).".to_string()));
    }
}
