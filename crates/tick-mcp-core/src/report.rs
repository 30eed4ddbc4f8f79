//! Per-item outcomes and the aggregate report returned by every batch tool.

use serde::Serialize;

use crate::error::{ErrorKind, ValidationError};
use crate::model::Task;
use crate::mutation::OperationKind;

/// What a successful item did on the provider side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    TaskCreated { task: Box<Task> },
    TaskUpdated { task: Box<Task> },
    /// An update with no fields; nothing was sent.
    TaskUnchanged,
    TaskCompleted,
    TaskDeleted,
    ProjectDeleted,
}

/// Result of one batch item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Success {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(flatten)]
        effect: Effect,
    },
    Failure {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

impl ItemOutcome {
    /// Failure for an item that never passed validation.
    #[must_use]
    pub fn invalid(index: usize, id: Option<String>, error: &ValidationError) -> Self {
        Self::Failure {
            index,
            id,
            kind: ErrorKind::ValidationError,
            message: error.to_string(),
        }
    }

    /// Position of the item in the normalized input.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Success { index, .. } | Self::Failure { index, .. } => *index,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Aggregate result of a batch call, one entry per input item in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub operation: OperationKind,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Build a report, sorting outcomes back into input order.
    #[must_use]
    pub fn new(operation: OperationKind, mut results: Vec<ItemOutcome>) -> Self {
        results.sort_by_key(ItemOutcome::index);
        let succeeded = results.iter().filter(|outcome| outcome.is_success()).count();
        Self {
            operation,
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}
