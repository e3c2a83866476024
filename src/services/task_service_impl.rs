//! `SeaORM` implementation of the `TaskService` trait.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use crate::db::repositories::task::{NewSubtask, NewTask, TaskChanges};
use crate::db::{Store, User};
use crate::domain::events::ActivityEvent;
use crate::domain::policy::Action;
use crate::entities::{projects, subtasks, tags, tasks};
use crate::services::access::{Access, ResourceError};
use crate::services::task_service::{
    CreateSubtask, CreateTask, TaskDetails, TaskService, UpdateTask,
};

pub struct SeaOrmTaskService {
    store: Store,
    access: Access,
    event_bus: broadcast::Sender<ActivityEvent>,
}

impl SeaOrmTaskService {
    #[must_use]
    pub fn new(store: Store, event_bus: broadcast::Sender<ActivityEvent>) -> Self {
        Self {
            access: Access::new(store.clone()),
            store,
            event_bus,
        }
    }

    /// Returns the assignee if they belong to the project's workspace.
    async fn check_assignee(
        &self,
        project: &projects::Model,
        user_id: i32,
    ) -> Result<User, ResourceError> {
        let assignee = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ResourceError::Validation(format!("User {user_id} does not exist")))?;

        if !self
            .store
            .teams()
            .is_workspace_member(assignee.id, project.workspace_id)
            .await?
        {
            return Err(ResourceError::Validation(format!(
                "User {user_id} is not a member of this workspace"
            )));
        }

        Ok(assignee)
    }

    fn publish_assignment(
        &self,
        task: &tasks::Model,
        project: &projects::Model,
        assignee: &User,
        actor_id: i32,
    ) {
        let _ = self.event_bus.send(ActivityEvent::TaskAssigned {
            task_id: task.id,
            task_title: task.title.clone(),
            workspace_id: project.workspace_id,
            assignee_id: assignee.id,
            assignee_email: assignee.email.clone(),
            actor_id,
        });
    }

    async fn subtask(&self, subtask_id: i32) -> Result<subtasks::Model, ResourceError> {
        self.store
            .tasks()
            .get_subtask(subtask_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("Subtask {subtask_id}")))
    }
}

#[async_trait]
impl TaskService for SeaOrmTaskService {
    async fn list(
        &self,
        requester: &User,
        project_id: i32,
    ) -> Result<Vec<tasks::Model>, ResourceError> {
        self.access
            .project(requester, project_id, Action::Read)
            .await?;
        Ok(self.store.tasks().list_for_project(project_id).await?)
    }

    async fn create(
        &self,
        requester: &User,
        task: CreateTask,
    ) -> Result<tasks::Model, ResourceError> {
        let project = self
            .access
            .project(requester, task.project_id, Action::Contribute)
            .await?;

        let assignee = match task.assignee.and_then(|a| a.resolve(requester.id)) {
            Some(user_id) => Some(self.check_assignee(&project, user_id).await?),
            None => None,
        };

        let created = self
            .store
            .tasks()
            .create(NewTask {
                title: task.title,
                description: task.description,
                status: task.status,
                priority: task.priority,
                assigned_to: assignee.as_ref().map(|u| u.id),
                due_date: task.due_date,
                project_id: project.id,
                created_by: requester.id,
            })
            .await?;

        if let Some(assignee) = &assignee {
            self.publish_assignment(&created, &project, assignee, requester.id);
        }

        Ok(created)
    }

    async fn get(&self, requester: &User, id: i32) -> Result<TaskDetails, ResourceError> {
        let (task, _) = self.access.task(requester, id, Action::Read).await?;

        let repo = self.store.tasks();
        let subtasks = repo.subtasks(task.id).await?;
        let tags = repo.tags(&task).await?;

        Ok(TaskDetails {
            task,
            subtasks,
            tags,
        })
    }

    async fn update(
        &self,
        requester: &User,
        id: i32,
        changes: UpdateTask,
    ) -> Result<tasks::Model, ResourceError> {
        let (task, project) = self.access.task(requester, id, Action::Contribute).await?;

        let new_assignee = match changes.assignee.map(|a| a.resolve(requester.id)) {
            Some(Some(user_id)) if task.assigned_to != Some(user_id) => {
                Some(Some(self.check_assignee(&project, user_id).await?))
            }
            Some(Some(_)) => None,
            Some(None) => Some(None),
            None => None,
        };

        let updated = self
            .store
            .tasks()
            .update(
                task,
                TaskChanges {
                    title: changes.title,
                    description: changes.description,
                    status: changes.status,
                    priority: changes.priority,
                    assigned_to: new_assignee
                        .as_ref()
                        .map(|assignee| assignee.as_ref().map(|u| u.id)),
                    due_date: changes.due_date,
                },
            )
            .await?;

        if let Some(Some(assignee)) = &new_assignee {
            self.publish_assignment(&updated, &project, assignee, requester.id);
        }

        Ok(updated)
    }

    async fn delete(&self, requester: &User, id: i32) -> Result<(), ResourceError> {
        let (task, _) = self.access.task(requester, id, Action::Delete).await?;
        self.store.tasks().delete(task.id).await?;

        info!(task_id = id, actor_id = requester.id, "Task deleted");
        Ok(())
    }

    async fn add_subtask(
        &self,
        requester: &User,
        task_id: i32,
        subtask: CreateSubtask,
    ) -> Result<subtasks::Model, ResourceError> {
        let (task, _) = self
            .access
            .task(requester, task_id, Action::Contribute)
            .await?;

        if let Some(parent_id) = subtask.parent_subtask_id {
            let parent = self.subtask(parent_id).await?;
            if parent.task_id != task.id {
                return Err(ResourceError::Validation(
                    "Parent subtask belongs to a different task".to_string(),
                ));
            }
        }

        Ok(self
            .store
            .tasks()
            .create_subtask(NewSubtask {
                title: subtask.title,
                task_id: task.id,
                parent_subtask_id: subtask.parent_subtask_id,
                created_by: requester.id,
            })
            .await?)
    }

    async fn update_subtask(
        &self,
        requester: &User,
        subtask_id: i32,
        title: Option<String>,
        is_completed: Option<bool>,
    ) -> Result<subtasks::Model, ResourceError> {
        let subtask = self.subtask(subtask_id).await?;
        self.access
            .task(requester, subtask.task_id, Action::Contribute)
            .await?;

        Ok(self
            .store
            .tasks()
            .update_subtask(subtask, title, is_completed)
            .await?)
    }

    async fn delete_subtask(&self, requester: &User, subtask_id: i32) -> Result<(), ResourceError> {
        let subtask = self.subtask(subtask_id).await?;
        self.access
            .task(requester, subtask.task_id, Action::Contribute)
            .await?;

        self.store.tasks().delete_subtask(subtask.id).await?;
        Ok(())
    }

    async fn attach_tag(
        &self,
        requester: &User,
        task_id: i32,
        name: &str,
    ) -> Result<tags::Model, ResourceError> {
        let (task, _) = self
            .access
            .task(requester, task_id, Action::Contribute)
            .await?;

        Ok(self.store.tasks().attach_tag(task.id, name).await?)
    }

    async fn detach_tag(
        &self,
        requester: &User,
        task_id: i32,
        tag_id: i32,
    ) -> Result<(), ResourceError> {
        let (task, _) = self
            .access
            .task(requester, task_id, Action::Contribute)
            .await?;

        if !self.store.tasks().detach_tag(task.id, tag_id).await? {
            return Err(ResourceError::NotFound(format!(
                "Tag {tag_id} on task {task_id}"
            )));
        }
        Ok(())
    }
}
