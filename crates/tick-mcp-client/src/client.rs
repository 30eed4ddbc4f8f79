//! `reqwest`-backed implementation of [`TaskStore`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tick_mcp_core::{NewProject, NewTask, Project, ProjectData, ProjectRef, Task, TaskPatch};
use tracing::debug;

use crate::auth::CredentialProvider;
use crate::error::{ClientError, error_body};
use crate::region::Endpoints;
use crate::store::TaskStore;

const USER_AGENT: &str = concat!("tick-mcp/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client with a per-request timeout.
///
/// # Errors
/// Fails when the TLS backend cannot be initialized.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| ClientError::from_transport(&err))
}

/// REST client for the TickTick open API.
#[derive(Debug, Clone)]
pub struct TickTickClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    credentials: Arc<CredentialProvider>,
}

#[derive(Deserialize)]
struct RawProjectData {
    #[serde(default)]
    project: Option<Project>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl TickTickClient {
    #[must_use]
    pub const fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        credentials: Arc<CredentialProvider>,
    ) -> Self {
        Self {
            http,
            endpoints,
            credentials,
        }
    }

    /// Credential provider shared with the auth command.
    #[must_use]
    pub const fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let url = self.endpoints.api(segments)?;
        debug!(%method, %url, "provider request");
        Ok(self.http.request(method, url))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let token = self.credentials.get_valid_access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| ClientError::from_transport(&err))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.credentials.invalidate().await;
        }
        let body = error_body(response).await;
        debug!(%status, "provider error response");
        Err(ClientError::from_status(status, body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::from_transport(&err))?;
        serde_json::from_slice(&bytes).map_err(|err| ClientError::Unexpected {
            status: Some(status),
            message: format!("failed to decode response: {err}"),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let response = self.execute(self.request(Method::GET, segments)?).await?;
        Self::decode(response).await
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, segments)?.json(body);
        let response = self.execute(request).await?;
        Self::decode(response).await
    }

    async fn send_empty(&self, method: Method, segments: &[&str]) -> Result<(), ClientError> {
        self.execute(self.request(method, segments)?).await?;
        Ok(())
    }
}

impl TaskStore for TickTickClient {
    #[tracing::instrument(skip_all)]
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.get_json(&["project"]).await
    }

    #[tracing::instrument(skip_all, fields(project = %project))]
    async fn get_project(&self, project: &ProjectRef) -> Result<Project, ClientError> {
        if project.is_inbox() {
            return Ok(Project::inbox());
        }
        self.get_json(&["project", project.as_str()]).await
    }

    #[tracing::instrument(skip_all, fields(project = %project))]
    async fn get_project_with_tasks(&self, project: &ProjectRef) -> Result<ProjectData, ClientError> {
        let raw: RawProjectData = self.get_json(&["project", project.as_str(), "data"]).await?;
        let project = match (raw.project, project) {
            (Some(record), _) => record,
            (None, ProjectRef::Inbox) => Project::inbox(),
            (None, ProjectRef::Id(id)) => {
                return Err(ClientError::Unexpected {
                    status: None,
                    message: format!("project data for {id} has no project record"),
                });
            }
        };
        Ok(ProjectData {
            project,
            tasks: raw.tasks,
        })
    }

    #[tracing::instrument(skip_all, fields(name = %project.name))]
    async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
        self.post_json(&["project"], project).await
    }

    #[tracing::instrument(skip_all, fields(project = %project))]
    async fn delete_project(&self, project: &ProjectRef) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &["project", project.as_str()])
            .await
    }

    #[tracing::instrument(skip_all, fields(project = %project, task = task_id))]
    async fn get_task(&self, project: &ProjectRef, task_id: &str) -> Result<Task, ClientError> {
        self.get_json(&["project", project.as_str(), "task", task_id])
            .await
    }

    #[tracing::instrument(skip_all, fields(project = %task.project))]
    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.post_json(&["task"], task).await
    }

    #[tracing::instrument(skip_all, fields(project = %patch.project, task = %patch.task_id))]
    async fn update_task(&self, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.post_json(&["task", patch.task_id.as_str()], patch).await
    }

    #[tracing::instrument(skip_all, fields(project = %project, task = task_id))]
    async fn complete_task(&self, project: &ProjectRef, task_id: &str) -> Result<(), ClientError> {
        self.send_empty(
            Method::POST,
            &["project", project.as_str(), "task", task_id, "complete"],
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(project = %project, task = task_id))]
    async fn delete_task(&self, project: &ProjectRef, task_id: &str) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &["project", project.as_str(), "task", task_id])
            .await
    }

    #[tracing::instrument(skip_all, fields(project = %task.project, parent = parent_task_id))]
    async fn create_subtask(&self, parent_task_id: &str, task: &NewTask) -> Result<Task, ClientError> {
        let mut body = task.clone();
        body.parent_id = Some(parent_task_id.to_owned());
        self.post_json(&["task"], &body).await
    }
}
