//! Runs prepared batch items against a [`TaskStore`].

use futures::{StreamExt, TryStreamExt, stream};
use tick_mcp_client::{ClientError, TaskStore};
use tick_mcp_core::{BatchReport, Effect, ItemOutcome, Mutation, OperationKind, Prepared};
use tracing::{debug, warn};

use crate::error::ServiceError;

/// Dispatch every prepared item, at most `limit` at a time, and report in input order.
///
/// Items are independent: a validation or provider failure is recorded on that item and
/// the rest still run. Nothing is retried.
///
/// # Errors
/// Returns [`ServiceError::Client`] with an auth error when the provider rejects our
/// credentials; the batch is abandoned because every later item would fail the same way.
pub async fn dispatch<S: TaskStore>(
    store: &S,
    operation: OperationKind,
    items: Vec<Prepared>,
    limit: usize,
) -> Result<BatchReport, ServiceError> {
    debug!(?operation, items = items.len(), limit, "dispatching batch");
    let results: Vec<ItemOutcome> = stream::iter(items)
        .map(|item| run_item(store, item))
        .buffered(limit.max(1))
        .try_collect()
        .await?;
    let report = BatchReport::new(operation, results);
    debug!(
        ?operation,
        succeeded = report.succeeded,
        failed = report.failed,
        "batch finished"
    );
    Ok(report)
}

async fn run_item<S: TaskStore>(store: &S, item: Prepared) -> Result<ItemOutcome, ServiceError> {
    let Prepared {
        index,
        identifier,
        mutation,
    } = item;

    let mutation = match mutation {
        Ok(mutation) => mutation,
        Err(err) => {
            warn!(index, "batch item failed validation: {err}");
            return Ok(ItemOutcome::invalid(index, identifier, &err));
        }
    };

    match apply(store, mutation).await {
        Ok((id, effect)) => Ok(ItemOutcome::Success {
            index,
            id: id.or(identifier),
            effect,
        }),
        Err(err) if err.is_auth() => Err(err.into()),
        Err(err) => {
            warn!(index, kind = %err.kind(), "batch item failed: {err}");
            Ok(ItemOutcome::Failure {
                index,
                id: identifier,
                kind: err.kind(),
                message: err.to_string(),
            })
        }
    }
}

/// Perform exactly one store call (or none for an empty update).
async fn apply<S: TaskStore>(
    store: &S,
    mutation: Mutation,
) -> Result<(Option<String>, Effect), ClientError> {
    match mutation {
        Mutation::CreateTask(task) => {
            let created = store.create_task(&task).await?;
            Ok((
                Some(created.id.clone()),
                Effect::TaskCreated {
                    task: Box::new(created),
                },
            ))
        }
        Mutation::CreateSubtask {
            parent_task_id,
            task,
        } => {
            let created = store.create_subtask(&parent_task_id, &task).await?;
            Ok((
                Some(created.id.clone()),
                Effect::TaskCreated {
                    task: Box::new(created),
                },
            ))
        }
        Mutation::UpdateTask(patch) if !patch.has_changes() => {
            Ok((Some(patch.task_id), Effect::TaskUnchanged))
        }
        Mutation::UpdateTask(patch) => {
            let updated = store.update_task(&patch).await?;
            Ok((
                Some(patch.task_id),
                Effect::TaskUpdated {
                    task: Box::new(updated),
                },
            ))
        }
        Mutation::CompleteTask(target) => {
            store
                .complete_task(&target.project, &target.task_id)
                .await?;
            Ok((Some(target.task_id), Effect::TaskCompleted))
        }
        Mutation::DeleteTask(target) => {
            store.delete_task(&target.project, &target.task_id).await?;
            Ok((Some(target.task_id), Effect::TaskDeleted))
        }
        Mutation::DeleteProject(project) => {
            store.delete_project(&project).await?;
            Ok((Some(project.to_string()), Effect::ProjectDeleted))
        }
    }
}
