//! Mosaic execution and outcome classification.
//!
//! The executor turns a [`MosaicRequest`] into exactly one geoprocessor
//! invocation and classifies what comes back. The geoprocessor's message log
//! is the primary status channel: any `ERROR` marker means the run failed.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::geoprocessing::{
    contains_error_marker, Geoprocessor, GpEnvironment, MosaicToNewRaster, ToolReport,
};
use crate::mosaic::MosaicRequest;

/// Text shown to the user when a mosaic succeeds.
pub const SUCCESS_MESSAGE: &str = "Mosaic completed successfully.";

/// How tool reports are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationMode {
    /// Failure if and only if the joined log contains `ERROR`.
    #[default]
    MessageMarker,
    /// Use the backend's structured status when present, else the marker.
    PreferStatus,
}

impl FromStr for ClassificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "marker" => Ok(ClassificationMode::MessageMarker),
            "status" => Ok(ClassificationMode::PreferStatus),
            other => Err(format!(
                "unknown classification '{}' - must be 'marker' or 'status'",
                other
            )),
        }
    }
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationMode::MessageMarker => write!(f, "marker"),
            ClassificationMode::PreferStatus => write!(f, "status"),
        }
    }
}

/// Why a mosaic failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// The tool ran and reported an error.
    Tool,
    /// The tool could not be invoked.
    Invocation,
}

/// Classified result of one mosaic run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MosaicOutcome {
    /// The tool finished without errors. `messages` is the diagnostic log,
    /// which is not shown to the user.
    Success { messages: Vec<String> },
    /// The run failed. `detail` is the full tool log for [`FailureCause::Tool`]
    /// or the error description for [`FailureCause::Invocation`].
    Failure { cause: FailureCause, detail: String },
}

impl MosaicOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MosaicOutcome::Success { .. })
    }

    /// Text to present to the user.
    pub fn user_message(&self) -> &str {
        match self {
            MosaicOutcome::Success { .. } => SUCCESS_MESSAGE,
            MosaicOutcome::Failure { detail, .. } => detail,
        }
    }
}

/// Classify a tool report.
pub fn classify(report: ToolReport, mode: ClassificationMode) -> MosaicOutcome {
    let failed = match (mode, report.status) {
        (ClassificationMode::PreferStatus, Some(status)) => status.is_failure(),
        _ => contains_error_marker(&report.messages),
    };

    if failed {
        MosaicOutcome::Failure {
            cause: FailureCause::Tool,
            detail: report.joined(),
        }
    } else {
        MosaicOutcome::Success {
            messages: report.messages,
        }
    }
}

/// Runs mosaic requests against a geoprocessor.
#[derive(Clone)]
pub struct MosaicExecutor {
    geoprocessor: Arc<dyn Geoprocessor>,
    env: GpEnvironment,
    classification: ClassificationMode,
}

impl MosaicExecutor {
    pub fn new(geoprocessor: Arc<dyn Geoprocessor>) -> Self {
        Self {
            geoprocessor,
            env: GpEnvironment::default(),
            classification: ClassificationMode::default(),
        }
    }

    pub fn with_environment(mut self, env: GpEnvironment) -> Self {
        self.env = env;
        self
    }

    pub fn with_classification(mut self, mode: ClassificationMode) -> Self {
        self.classification = mode;
        self
    }

    pub fn geoprocessor_name(&self) -> &str {
        self.geoprocessor.name()
    }

    /// Invoke the tool once and classify the result.
    ///
    /// Never retries. Invocation errors become
    /// [`FailureCause::Invocation`] failures rather than propagating.
    pub fn execute(&self, request: &MosaicRequest) -> MosaicOutcome {
        let tool = MosaicToNewRaster::from_request(request);
        debug!(
            output_location = %tool.output_location.display(),
            output_name = %tool.raster_dataset_name_with_extension,
            "Mosaic output"
        );
        info!(
            backend = self.geoprocessor.name(),
            inputs = request.inputs.len(),
            method = %request.method,
            "Executing mosaic"
        );

        let outcome = match self.geoprocessor.execute(&tool, &self.env) {
            Ok(report) => classify(report, self.classification),
            Err(e) => MosaicOutcome::Failure {
                cause: FailureCause::Invocation,
                detail: e.to_string(),
            },
        };

        match &outcome {
            MosaicOutcome::Success { messages } => {
                info!(messages = messages.len(), "Mosaic succeeded");
            }
            MosaicOutcome::Failure { cause, detail } => {
                warn!(cause = ?cause, detail = %detail, "Mosaic failed");
            }
        }
        outcome
    }
}

impl fmt::Debug for MosaicExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MosaicExecutor")
            .field("geoprocessor", &self.geoprocessor.name())
            .field("env", &self.env)
            .field("classification", &self.classification)
            .finish()
    }
}
