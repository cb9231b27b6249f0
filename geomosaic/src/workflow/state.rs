//! Workflow states.

use std::fmt;

use serde::Serialize;

/// Where a submit is in the workflow.
///
/// ```text
/// Idle → Validating → ValidationFailed → Idle
///                   → Executing → ExecFailed → Idle
///                               → ExecSucceeded → LoadAttempted → Idle
///                                               → Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    Validating,
    ValidationFailed,
    Executing,
    ExecFailed,
    ExecSucceeded,
    LoadAttempted,
}

impl WorkflowState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_advance_to(self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, ValidationFailed)
                | (Validating, Executing)
                | (ValidationFailed, Idle)
                | (Executing, ExecFailed)
                | (Executing, ExecSucceeded)
                | (ExecFailed, Idle)
                | (ExecSucceeded, LoadAttempted)
                | (ExecSucceeded, Idle)
                | (LoadAttempted, Idle)
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Validating => "validating",
            WorkflowState::ValidationFailed => "validation failed",
            WorkflowState::Executing => "executing",
            WorkflowState::ExecFailed => "execution failed",
            WorkflowState::ExecSucceeded => "execution succeeded",
            WorkflowState::LoadAttempted => "load attempted",
        };
        write!(f, "{}", name)
    }
}
