use std::future::Future;

use tick_mcp_core::{NewProject, NewTask, Project, ProjectData, ProjectRef, Task, TaskPatch};

use crate::error::ClientError;

/// Remote task store. Every call performs at most one provider request.
pub trait TaskStore: Send + Sync {
    /// `GET /project`
    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, ClientError>> + Send;

    /// `GET /project/{id}`
    fn get_project(
        &self,
        project: &ProjectRef,
    ) -> impl Future<Output = Result<Project, ClientError>> + Send;

    /// `GET /project/{id}/data`; the inbox record is synthesized when absent.
    fn get_project_with_tasks(
        &self,
        project: &ProjectRef,
    ) -> impl Future<Output = Result<ProjectData, ClientError>> + Send;

    /// `POST /project`
    fn create_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = Result<Project, ClientError>> + Send;

    /// `DELETE /project/{id}`
    fn delete_project(
        &self,
        project: &ProjectRef,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// `GET /project/{pid}/task/{tid}`
    fn get_task(
        &self,
        project: &ProjectRef,
        task_id: &str,
    ) -> impl Future<Output = Result<Task, ClientError>> + Send;

    /// `POST /task`
    fn create_task(&self, task: &NewTask) -> impl Future<Output = Result<Task, ClientError>> + Send;

    /// `POST /task/{tid}`
    fn update_task(
        &self,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<Task, ClientError>> + Send;

    /// `POST /project/{pid}/task/{tid}/complete`
    fn complete_task(
        &self,
        project: &ProjectRef,
        task_id: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// `DELETE /project/{pid}/task/{tid}`
    fn delete_task(
        &self,
        project: &ProjectRef,
        task_id: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// `POST /task` with `parentId` set.
    fn create_subtask(
        &self,
        parent_task_id: &str,
        task: &NewTask,
    ) -> impl Future<Output = Result<Task, ClientError>> + Send;
}
