//! The mosaic workflow: validate, execute, report, load.
//!
//! [`MosaicWorkflow::submit`] runs the stages in order and reports every
//! outcome through a [`Notifier`]. Each submit walks the
//! [`WorkflowState`] machine from `Idle` back to `Idle`; the visited states
//! are recorded in the returned [`SubmitReport`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use geomosaic::executor::MosaicExecutor;
//! use geomosaic::geoprocessing::NativeGeoprocessor;
//! use geomosaic::layer::InMemoryMap;
//! use geomosaic::mosaic::{MosaicForm, MosaicRequestBuilder};
//! use geomosaic::workflow::{MosaicWorkflow, RecordingNotifier, SubmitResult};
//!
//! let executor = MosaicExecutor::new(Arc::new(NativeGeoprocessor::new()));
//! let mut workflow = MosaicWorkflow::new(MosaicRequestBuilder::new(), executor);
//! let mut map = InMemoryMap::new();
//! let mut notifier = RecordingNotifier::new();
//!
//! let report = workflow.submit(&mut map, &MosaicForm::default(), &mut notifier);
//! assert!(matches!(report.result, SubmitResult::Rejected { .. }));
//! assert_eq!(notifier.notifications().len(), 1);
//! ```

mod notify;
mod run;
mod state;

pub use notify::{Notification, Notifier, RecordingNotifier, Severity};
pub use run::{LoadReport, MosaicWorkflow, SubmitReport, SubmitResult, TICK_INTERVAL};
pub use state::WorkflowState;
