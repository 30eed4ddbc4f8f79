//! Canned [`TaskStore`] for exercising tool handlers without a provider.

use tick_mcp_app::{ServiceSettings, TaskService};
use tick_mcp_client::{AuthError, ClientError, TaskStore};
use tick_mcp_core::{
    NewProject, NewTask, Priority, Project, ProjectData, ProjectRef, Task, TaskPatch,
};

/// Knows one project, `work`, holding a single high-priority task `w1`.
pub struct StubStore {
    pub reject_auth: bool,
}

pub fn service() -> TaskService<StubStore> {
    TaskService::new(StubStore { reject_auth: false }, ServiceSettings::default())
}

pub fn rejecting_service() -> TaskService<StubStore> {
    TaskService::new(StubStore { reject_auth: true }, ServiceSettings::default())
}

fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_owned(),
        name: name.to_owned(),
        ..Project::inbox()
    }
}

impl StubStore {
    fn check(&self) -> Result<(), ClientError> {
        if self.reject_auth {
            Err(AuthError::Rejected.into())
        } else {
            Ok(())
        }
    }

    fn missing<T>(&self, what: &str) -> Result<T, ClientError> {
        self.check()?;
        Err(ClientError::NotFound {
            message: format!("{what} not found"),
        })
    }
}

impl TaskStore for StubStore {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.check()?;
        Ok(vec![project("work", "Work")])
    }

    async fn get_project(&self, project_ref: &ProjectRef) -> Result<Project, ClientError> {
        self.check()?;
        match project_ref {
            ProjectRef::Inbox => Ok(Project::inbox()),
            ProjectRef::Id(id) if id == "work" => Ok(project("work", "Work")),
            ProjectRef::Id(id) => self.missing(id),
        }
    }

    async fn get_project_with_tasks(&self, project_ref: &ProjectRef) -> Result<ProjectData, ClientError> {
        let project = self.get_project(project_ref).await?;
        let tasks = if project.id == "work" {
            vec![Task {
                id: "w1".to_owned(),
                project_id: "work".to_owned(),
                title: "Write report".to_owned(),
                priority: Priority::High,
                ..Task::default()
            }]
        } else {
            Vec::new()
        };
        Ok(ProjectData { project, tasks })
    }

    async fn create_project(&self, request: &NewProject) -> Result<Project, ClientError> {
        self.check()?;
        Ok(project("p-new", &request.name))
    }

    async fn delete_project(&self, project_ref: &ProjectRef) -> Result<(), ClientError> {
        self.get_project(project_ref).await.map(|_| ())
    }

    async fn get_task(&self, _project: &ProjectRef, task_id: &str) -> Result<Task, ClientError> {
        self.missing(task_id)
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.check()?;
        Ok(Task {
            id: format!("t-{}", task.title.to_lowercase().replace(' ', "-")),
            project_id: task.project.to_string(),
            title: task.title.clone(),
            priority: task.priority.unwrap_or_default(),
            parent_id: task.parent_id.clone(),
            ..Task::default()
        })
    }

    async fn update_task(&self, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.missing(&patch.task_id)
    }

    async fn complete_task(&self, _project: &ProjectRef, task_id: &str) -> Result<(), ClientError> {
        self.check()?;
        if task_id == "w1" {
            Ok(())
        } else {
            self.missing(task_id)
        }
    }

    async fn delete_task(&self, _project: &ProjectRef, task_id: &str) -> Result<(), ClientError> {
        self.complete_task(&ProjectRef::Inbox, task_id).await
    }

    async fn create_subtask(&self, parent_task_id: &str, task: &NewTask) -> Result<Task, ClientError> {
        if parent_task_id != "w1" {
            return self.missing(parent_task_id);
        }
        let mut task = task.clone();
        task.parent_id = Some(parent_task_id.to_owned());
        self.create_task(&task).await
    }
}

/// Parse the JSON text content of a tool result.
pub fn json_body(result: &rmcp::model::CallToolResult) -> serde_json::Value {
    let text = result
        .content
        .first()
        .and_then(|item| item.as_text().map(|text| text.text.clone()))
        .unwrap_or_else(|| panic!("tool response should include text content"));
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("tool response is not JSON: {err}"))
}
