//! In-memory [`TaskStore`] for service and dispatcher tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tick_mcp_client::{AuthError, ClientError, TaskStore};
use tick_mcp_core::{
    NewProject, NewTask, Project, ProjectData, ProjectRef, Task, TaskPatch, TaskStatus,
};

#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<MockStoreInner>,
}

#[derive(Default)]
struct MockStoreInner {
    projects: Mutex<Vec<Project>>,
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<String>>,
    reject_auth: Mutex<bool>,
    unavailable: Mutex<HashSet<String>>,
    next_id: Mutex<u32>,
    in_flight: Mutex<usize>,
    max_in_flight: Mutex<usize>,
}

pub fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.into(),
        name: name.into(),
        color: None,
        view_mode: None,
        closed: None,
        group_id: None,
        kind: None,
        sort_order: None,
    }
}

pub fn task(id: &str, project_id: &str, title: &str) -> Task {
    Task {
        id: id.into(),
        project_id: project_id.into(),
        title: title.into(),
        ..Task::default()
    }
}

fn not_found(what: &str) -> ClientError {
    ClientError::NotFound {
        message: format!("{what} not found"),
    }
}

impl MockStore {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let store = Self::default();
        *guard(&store.inner.projects) = projects;
        store
    }

    pub fn add_task(&self, task: Task) {
        guard(&self.inner.tasks).push(task);
    }

    pub fn tasks(&self) -> Vec<Task> {
        guard(&self.inner.tasks).clone()
    }

    pub fn calls(&self) -> Vec<String> {
        guard(&self.inner.calls).clone()
    }

    pub fn reject_auth(&self) {
        *guard(&self.inner.reject_auth) = true;
    }

    /// Make fetches of `project_id` fail with a transient error.
    pub fn make_unavailable(&self, project_id: &str) {
        guard(&self.inner.unavailable).insert(project_id.to_owned());
    }

    pub fn max_in_flight(&self) -> usize {
        *guard(&self.inner.max_in_flight)
    }

    async fn enter(&self, call: String) -> Result<(), ClientError> {
        guard(&self.inner.calls).push(call);
        if *guard(&self.inner.reject_auth) {
            return Err(AuthError::Rejected.into());
        }
        {
            let mut in_flight = guard(&self.inner.in_flight);
            *in_flight += 1;
            let mut max = guard(&self.inner.max_in_flight);
            *max = (*max).max(*in_flight);
        }
        // Hold the slot long enough for sibling calls to overlap.
        tokio::time::sleep(Duration::from_millis(5)).await;
        *guard(&self.inner.in_flight) -= 1;
        Ok(())
    }

    fn project_key(project: &ProjectRef) -> String {
        project.as_str().to_owned()
    }

    fn owns(project: &ProjectRef, task: &Task) -> bool {
        project.matches(&task.project_id)
    }

    fn next_id(&self) -> String {
        let mut counter = guard(&self.inner.next_id);
        *counter += 1;
        format!("generated-{counter}")
    }

    fn insert(&self, request: &NewTask, parent_id: Option<&str>) -> Task {
        let project_id = match &request.project {
            ProjectRef::Inbox => "inbox118000001".to_owned(),
            ProjectRef::Id(id) => id.clone(),
        };
        let created = Task {
            id: self.next_id(),
            project_id,
            title: request.title.clone(),
            content: request.content.clone(),
            priority: request.priority.unwrap_or_default(),
            due_date: request.due_date,
            parent_id: parent_id.map(str::to_owned),
            ..Task::default()
        };
        guard(&self.inner.tasks).push(created.clone());
        created
    }
}

impl TaskStore for MockStore {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.enter("list_projects".into()).await?;
        Ok(guard(&self.inner.projects).clone())
    }

    async fn get_project(&self, project: &ProjectRef) -> Result<Project, ClientError> {
        self.enter(format!("get_project {project}")).await?;
        if project.is_inbox() {
            return Ok(Project::inbox());
        }
        guard(&self.inner.projects)
            .iter()
            .find(|candidate| candidate.id == project.as_str())
            .cloned()
            .ok_or_else(|| not_found("project"))
    }

    async fn get_project_with_tasks(&self, project: &ProjectRef) -> Result<ProjectData, ClientError> {
        let key = Self::project_key(project);
        self.enter(format!("get_project_with_tasks {key}")).await?;
        if guard(&self.inner.unavailable).contains(&key) {
            return Err(ClientError::Transient {
                message: "503 Service Unavailable".into(),
            });
        }
        let record = if project.is_inbox() {
            Project::inbox()
        } else {
            guard(&self.inner.projects)
                .iter()
                .find(|candidate| candidate.id == key)
                .cloned()
                .ok_or_else(|| not_found("project"))?
        };
        let tasks = guard(&self.inner.tasks)
            .iter()
            .filter(|task| Self::owns(project, task) && task.status == TaskStatus::Open)
            .cloned()
            .collect();
        Ok(ProjectData {
            project: record,
            tasks,
        })
    }

    async fn create_project(&self, request: &NewProject) -> Result<Project, ClientError> {
        self.enter(format!("create_project {}", request.name)).await?;
        let mut created = project(&self.next_id(), &request.name);
        created.color.clone_from(&request.color);
        created.view_mode = request.view_mode;
        guard(&self.inner.projects).push(created.clone());
        Ok(created)
    }

    async fn delete_project(&self, project: &ProjectRef) -> Result<(), ClientError> {
        self.enter(format!("delete_project {project}")).await?;
        let mut projects = guard(&self.inner.projects);
        let before = projects.len();
        projects.retain(|candidate| candidate.id != project.as_str());
        if projects.len() == before {
            return Err(not_found("project"));
        }
        Ok(())
    }

    async fn get_task(&self, project: &ProjectRef, task_id: &str) -> Result<Task, ClientError> {
        self.enter(format!("get_task {project} {task_id}")).await?;
        guard(&self.inner.tasks)
            .iter()
            .find(|task| task.id == task_id && Self::owns(project, task))
            .cloned()
            .ok_or_else(|| not_found("task"))
    }

    async fn create_task(&self, request: &NewTask) -> Result<Task, ClientError> {
        self.enter(format!("create_task {}", request.title)).await?;
        Ok(self.insert(request, None))
    }

    async fn update_task(&self, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.enter(format!("update_task {}", patch.task_id)).await?;
        let mut tasks = guard(&self.inner.tasks);
        let task = tasks
            .iter_mut()
            .find(|task| task.id == patch.task_id && Self::owns(&patch.project, task))
            .ok_or_else(|| not_found("task"))?;
        if let Some(title) = &patch.title {
            task.title.clone_from(title);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if patch.due_date.is_some() {
            task.due_date = patch.due_date;
        }
        Ok(task.clone())
    }

    async fn complete_task(&self, project: &ProjectRef, task_id: &str) -> Result<(), ClientError> {
        self.enter(format!("complete_task {project} {task_id}")).await?;
        let mut tasks = guard(&self.inner.tasks);
        let task = tasks
            .iter_mut()
            .find(|task| task.id == task_id && Self::owns(project, task))
            .ok_or_else(|| not_found("task"))?;
        task.status = TaskStatus::Completed;
        Ok(())
    }

    async fn delete_task(&self, project: &ProjectRef, task_id: &str) -> Result<(), ClientError> {
        self.enter(format!("delete_task {project} {task_id}")).await?;
        let mut tasks = guard(&self.inner.tasks);
        let before = tasks.len();
        tasks.retain(|task| !(task.id == task_id && Self::owns(project, task)));
        if tasks.len() == before {
            return Err(not_found("task"));
        }
        Ok(())
    }

    async fn create_subtask(&self, parent_task_id: &str, request: &NewTask) -> Result<Task, ClientError> {
        self.enter(format!("create_subtask {parent_task_id}")).await?;
        if !guard(&self.inner.tasks).iter().any(|task| task.id == parent_task_id) {
            return Err(not_found("parent task"));
        }
        Ok(self.insert(request, Some(parent_task_id)))
    }
}
