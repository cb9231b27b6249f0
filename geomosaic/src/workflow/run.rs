//! Submit handling.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::notify::{Notification, Notifier};
use super::state::WorkflowState;
use crate::config::ConfigFile;
use crate::executor::{FailureCause, MosaicExecutor, MosaicOutcome};
use crate::geoprocessing::Geoprocessor;
use crate::layer::MapViewer;
use crate::loader::{LoadOutcome, ResultLoader};
use crate::mosaic::{MosaicForm, MosaicRequest, MosaicRequestBuilder, RequestError, ValidationError};

/// How often the progress callback runs while a mosaic executes.
pub const TICK_INTERVAL: Duration = Duration::from_millis(80);

/// What happened to the result raster after a successful mosaic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadReport {
    /// Loading is disabled.
    Skipped,
    /// The loader ran.
    Loaded { outcome: LoadOutcome },
    /// The loader failed; the mosaic is kept.
    Failed { error: String },
}

/// Final result of one submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmitResult {
    /// No request was built; nothing was executed.
    Rejected {
        error: String,
        /// The unmet form predicate, when that was the reason.
        #[serde(skip)]
        validation: Option<ValidationError>,
    },
    /// The mosaic ran and failed.
    Failed { outcome: MosaicOutcome },
    /// The mosaic succeeded.
    Completed { output: PathBuf, load: LoadReport },
}

/// Everything a submit did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitReport {
    /// States visited, starting and ending with `Idle`.
    pub trace: Vec<WorkflowState>,
    /// The request that was executed, if one was built.
    pub request: Option<MosaicRequest>,
    pub result: SubmitResult,
}

impl SubmitReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.result, SubmitResult::Completed { .. })
    }
}

/// Runs the mosaic workflow against a viewer.
#[derive(Debug)]
pub struct MosaicWorkflow {
    builder: MosaicRequestBuilder,
    executor: MosaicExecutor,
    loader: ResultLoader,
    load_result: bool,
    state: WorkflowState,
}

impl MosaicWorkflow {
    pub fn new(builder: MosaicRequestBuilder, executor: MosaicExecutor) -> Self {
        Self {
            builder,
            executor,
            loader: ResultLoader::new(),
            load_result: true,
            state: WorkflowState::Idle,
        }
    }

    /// Build a workflow from configuration and a bound geoprocessor.
    pub fn from_config(config: &ConfigFile, geoprocessor: Arc<dyn Geoprocessor>) -> Self {
        let builder = MosaicRequestBuilder::new()
            .with_pixel_type(config.mosaic.pixel_type)
            .with_number_of_bands(config.mosaic.number_of_bands)
            .with_unresolved_policy(config.mosaic.unresolved_layers);
        let executor = MosaicExecutor::new(geoprocessor)
            .with_environment(config.mosaic.environment())
            .with_classification(config.geoprocessing.classification);
        Self::new(builder, executor).with_load_result(config.mosaic.load_result)
    }

    /// Whether a successful mosaic is added to the map.
    pub fn with_load_result(mut self, load_result: bool) -> Self {
        self.load_result = load_result;
        self
    }

    pub fn builder(&self) -> &MosaicRequestBuilder {
        &self.builder
    }

    pub fn executor(&self) -> &MosaicExecutor {
        &self.executor
    }

    /// Current state; `Idle` whenever no submit is running.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Validate, execute and report on the calling thread.
    pub fn submit(
        &mut self,
        viewer: &mut dyn MapViewer,
        form: &MosaicForm,
        notifier: &mut dyn Notifier,
    ) -> SubmitReport {
        self.run(viewer, form, notifier, |executor, request| executor.execute(request))
    }

    /// Like [`submit`](Self::submit), but executes on a worker thread.
    ///
    /// The calling thread keeps running `tick` every [`TICK_INTERVAL`] until
    /// the tool finishes. The viewer is only touched from the calling thread,
    /// after the worker has been joined. A panicking backend becomes an
    /// invocation failure.
    pub fn submit_with_progress(
        &mut self,
        viewer: &mut dyn MapViewer,
        form: &MosaicForm,
        notifier: &mut dyn Notifier,
        tick: &mut dyn FnMut(),
    ) -> SubmitReport {
        self.run(viewer, form, notifier, |executor, request| {
            thread::scope(|scope| {
                let worker = scope.spawn(|| executor.execute(request));
                while !worker.is_finished() {
                    tick();
                    thread::sleep(TICK_INTERVAL);
                }
                worker.join()
            })
            .unwrap_or_else(|panic| MosaicOutcome::Failure {
                cause: FailureCause::Invocation,
                detail: panic_message(panic.as_ref()),
            })
        })
    }

    fn run(
        &mut self,
        viewer: &mut dyn MapViewer,
        form: &MosaicForm,
        notifier: &mut dyn Notifier,
        execute: impl FnOnce(&MosaicExecutor, &MosaicRequest) -> MosaicOutcome,
    ) -> SubmitReport {
        let mut trace = vec![self.state];
        self.advance(&mut trace, WorkflowState::Validating);

        let request = match self.builder.build(&*viewer, form) {
            Ok(request) => request,
            Err(e) => {
                self.advance(&mut trace, WorkflowState::ValidationFailed);
                notifier.notify(rejection_notice(&e));
                self.advance(&mut trace, WorkflowState::Idle);
                let validation = match &e {
                    RequestError::Validation(v) => Some(v.clone()),
                    _ => None,
                };
                return SubmitReport {
                    trace,
                    request: None,
                    result: SubmitResult::Rejected {
                        error: e.to_string(),
                        validation,
                    },
                };
            }
        };

        if !request.dropped_layers.is_empty() {
            notifier.notify(Notification::warning(
                "Warning",
                format!(
                    "Skipped layers that are no longer in the map: {}",
                    request.dropped_layers.join(", ")
                ),
            ));
        }

        self.advance(&mut trace, WorkflowState::Executing);
        let outcome = execute(&self.executor, &request);

        let result = match outcome {
            MosaicOutcome::Failure { cause, ref detail } => {
                self.advance(&mut trace, WorkflowState::ExecFailed);
                let message = match cause {
                    FailureCause::Tool => detail.clone(),
                    FailureCause::Invocation => format!("Execution failed: {}", detail),
                };
                notifier.notify(Notification::error("Error", message));
                SubmitResult::Failed { outcome }
            }
            MosaicOutcome::Success { .. } => {
                self.advance(&mut trace, WorkflowState::ExecSucceeded);
                notifier.notify(Notification::info("Success", outcome.user_message()));
                let load = if self.load_result {
                    self.advance(&mut trace, WorkflowState::LoadAttempted);
                    self.load(viewer, &request, notifier)
                } else {
                    LoadReport::Skipped
                };
                SubmitResult::Completed {
                    output: request.output.clone(),
                    load,
                }
            }
        };

        self.advance(&mut trace, WorkflowState::Idle);
        SubmitReport {
            trace,
            request: Some(request),
            result,
        }
    }

    fn load(
        &self,
        viewer: &mut dyn MapViewer,
        request: &MosaicRequest,
        notifier: &mut dyn Notifier,
    ) -> LoadReport {
        match self.loader.load(viewer, &request.output) {
            Ok(outcome) => LoadReport::Loaded { outcome },
            Err(e) => {
                warn!(output = %request.output.display(), error = %e, "Failed to load mosaic result");
                notifier.notify(Notification::error(
                    "Load Failed",
                    format!("Failed to add layer: {}", e),
                ));
                LoadReport::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn advance(&mut self, trace: &mut Vec<WorkflowState>, next: WorkflowState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal workflow transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Workflow transition");
        self.state = next;
        trace.push(next);
    }
}

fn rejection_notice(error: &RequestError) -> Notification {
    match error {
        RequestError::Validation(_) | RequestError::UnresolvedLayers(_) => {
            Notification::warning("Input Error", error.to_string())
        }
        RequestError::Viewer(_) => Notification::error("Error", error.to_string()),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("geoprocessor panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("geoprocessor panicked: {}", s)
    } else {
        "geoprocessor panicked".to_string()
    }
}
