use chrono_tz::Tz;
use futures::{StreamExt, TryStreamExt, stream};
use tick_mcp_client::TaskStore;
use tick_mcp_core::model::is_inbox_id;
use tick_mcp_core::{
    BatchItem, BatchReport, InputContext, Mutation, NewProject, OneOrMany, OperationKind,
    Prepared, Project, ProjectData, ProjectRef, SubtaskInput, Task, TaskInput, TaskRefInput,
    TaskUpdateInput, ValidationError, ViewMode, filter_tasks, input::project_deletion, prepare,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::dispatch::dispatch;
use crate::error::ServiceError;
use crate::query::{QueryResult, TaskQuery};

/// Per-invocation defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Zone for date filters and bare dates.
    pub timezone: Tz,
    /// Fan-out limit for batch items and project scans.
    pub max_concurrency: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            max_concurrency: 4,
        }
    }
}

/// Service façade behind every tool and CLI command.
pub struct TaskService<S> {
    store: S,
    settings: ServiceSettings,
}

impl<S> TaskService<S> {
    /// Wrap a store with per-invocation defaults.
    #[must_use]
    pub const fn new(store: S, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    const fn input_context(&self) -> InputContext {
        InputContext {
            timezone: self.settings.timezone,
        }
    }
}

impl<S: TaskStore> TaskService<S> {
    /// List every project visible to the account.
    ///
    /// # Errors
    /// Propagates provider failures.
    pub async fn get_all_projects(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.store.list_projects().await?)
    }

    /// A project with its open tasks.
    ///
    /// # Errors
    /// Fails for a blank id or when the provider call fails.
    pub async fn get_project_info(&self, project_id: &str) -> Result<ProjectData, ServiceError> {
        let project = ProjectRef::parse(project_id).ok_or(ValidationError::MissingField("project_id"))?;
        Ok(self.store.get_project_with_tasks(&project).await?)
    }

    /// A single project record, without its tasks.
    ///
    /// # Errors
    /// Fails for a blank id or when the provider call fails.
    pub async fn get_project(&self, project_id: &str) -> Result<Project, ServiceError> {
        let project = ProjectRef::parse(project_id).ok_or(ValidationError::MissingField("project_id"))?;
        Ok(self.store.get_project(&project).await?)
    }

    /// A single task, open or completed.
    ///
    /// # Errors
    /// Fails for blank ids or when the provider call fails.
    pub async fn get_task(&self, project_id: &str, task_id: &str) -> Result<Task, ServiceError> {
        let project = ProjectRef::parse(project_id).ok_or(ValidationError::MissingField("project_id"))?;
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return Err(ValidationError::MissingField("task_id").into());
        }
        Ok(self.store.get_task(&project, task_id).await?)
    }

    /// Create a project.
    ///
    /// # Errors
    /// Fails for a blank name, an unknown view mode or a provider failure.
    pub async fn create_project(
        &self,
        name: &str,
        color: Option<String>,
        view_mode: Option<String>,
    ) -> Result<Project, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        let view_mode = view_mode
            .as_deref()
            .map(str::trim)
            .filter(|mode| !mode.is_empty())
            .map(str::parse::<ViewMode>)
            .transpose()
            .map_err(|reason| ValidationError::invalid("view_mode", reason))?;
        let request = NewProject {
            name: name.to_owned(),
            color: color.filter(|color| !color.trim().is_empty()),
            view_mode,
            kind: None,
        };
        let project = self.store.create_project(&request).await?;
        info!(project = %project.id, "created project");
        Ok(project)
    }

    /// Delete one or more projects.
    ///
    /// # Errors
    /// Only an auth failure aborts the batch.
    pub async fn delete_projects(
        &self,
        projects: OneOrMany<BatchItem<String>>,
    ) -> Result<BatchReport, ServiceError> {
        let prepared = prepare(projects.normalize(), project_deletion);
        self.run(OperationKind::DeleteProjects, prepared).await
    }

    /// Create one or more tasks.
    ///
    /// # Errors
    /// Only an auth failure aborts the batch.
    pub async fn create_tasks(
        &self,
        tasks: OneOrMany<BatchItem<TaskInput>>,
    ) -> Result<BatchReport, ServiceError> {
        let ctx = self.input_context();
        let prepared = prepare(tasks.normalize(), |task| {
            task.into_new_task(&ctx).map(Mutation::CreateTask)
        });
        self.run(OperationKind::CreateTasks, prepared).await
    }

    /// Update one or more tasks; items without changes succeed without a provider call.
    ///
    /// # Errors
    /// Only an auth failure aborts the batch.
    pub async fn update_tasks(
        &self,
        tasks: OneOrMany<BatchItem<TaskUpdateInput>>,
    ) -> Result<BatchReport, ServiceError> {
        let ctx = self.input_context();
        let prepared = prepare(tasks.normalize(), |task| {
            task.into_patch(&ctx).map(Mutation::UpdateTask)
        });
        self.run(OperationKind::UpdateTasks, prepared).await
    }

    /// Mark one or more tasks complete.
    ///
    /// # Errors
    /// Only an auth failure aborts the batch.
    pub async fn complete_tasks(
        &self,
        tasks: OneOrMany<BatchItem<TaskRefInput>>,
    ) -> Result<BatchReport, ServiceError> {
        let prepared = prepare(tasks.normalize(), |task| {
            task.into_task_ref().map(Mutation::CompleteTask)
        });
        self.run(OperationKind::CompleteTasks, prepared).await
    }

    /// Delete one or more tasks.
    ///
    /// # Errors
    /// Only an auth failure aborts the batch.
    pub async fn delete_tasks(
        &self,
        tasks: OneOrMany<BatchItem<TaskRefInput>>,
    ) -> Result<BatchReport, ServiceError> {
        let prepared = prepare(tasks.normalize(), |task| {
            task.into_task_ref().map(Mutation::DeleteTask)
        });
        self.run(OperationKind::DeleteTasks, prepared).await
    }

    /// Create one or more subtasks.
    ///
    /// # Errors
    /// Only an auth failure aborts the batch.
    pub async fn create_subtasks(
        &self,
        subtasks: OneOrMany<BatchItem<SubtaskInput>>,
    ) -> Result<BatchReport, ServiceError> {
        let prepared = prepare(subtasks.normalize(), SubtaskInput::into_mutation);
        self.run(OperationKind::CreateSubtasks, prepared).await
    }

    /// Filter open tasks.
    ///
    /// The filter is resolved before any provider call, so malformed criteria never
    /// reach the network.
    ///
    /// # Errors
    /// Fails for malformed criteria or when a project fetch fails.
    pub async fn query_tasks(&self, query: TaskQuery) -> Result<QueryResult, ServiceError> {
        self.query_tasks_at(query, OffsetDateTime::now_utc()).await
    }

    /// [`Self::query_tasks`] with an explicit reference instant.
    ///
    /// # Errors
    /// Fails for malformed criteria or when a project fetch fails.
    pub async fn query_tasks_at(
        &self,
        query: TaskQuery,
        reference: OffsetDateTime,
    ) -> Result<QueryResult, ServiceError> {
        let filter = query.into_filter(reference, self.settings.timezone)?;
        // An id lookup ignores the project criterion, so it must scan everything.
        let scope = if filter.task_id.is_some() {
            None
        } else {
            filter.project.as_ref()
        };
        let candidates = self.fetch_tasks(scope).await?;
        let matched = filter_tasks(&candidates, &filter);
        debug!(scanned = candidates.len(), matched = matched.len(), "query finished");
        Ok(QueryResult::from(matched))
    }

    async fn run(
        &self,
        operation: OperationKind,
        prepared: Vec<Prepared>,
    ) -> Result<BatchReport, ServiceError> {
        dispatch(&self.store, operation, prepared, self.settings.max_concurrency).await
    }

    /// Tasks of one project, or of the inbox followed by every open project.
    async fn fetch_tasks(&self, scope: Option<&ProjectRef>) -> Result<Vec<Task>, ServiceError> {
        if let Some(project) = scope {
            return Ok(self.store.get_project_with_tasks(project).await?.tasks);
        }

        let projects = self.store.list_projects().await?;
        let targets: Vec<ProjectRef> = std::iter::once(ProjectRef::Inbox)
            .chain(
                projects
                    .into_iter()
                    .filter(|project| !project.is_closed() && !is_inbox_id(&project.id))
                    .map(|project| ProjectRef::Id(project.id)),
            )
            .collect();
        debug!(projects = targets.len(), "scanning projects");

        let store = &self.store;
        let data: Vec<ProjectData> = stream::iter(targets)
            .map(|project| async move { store.get_project_with_tasks(&project).await })
            .buffered(self.settings.max_concurrency.max(1))
            .try_collect()
            .await?;
        Ok(data.into_iter().flat_map(|data| data.tasks).collect())
    }
}
