// Task use cases, passed through to the repository with one log line per mutation

use log::{debug, info, warn};

use crate::app::models::Task;
use crate::app::repository::TaskRepository;
use crate::error::StorageResult;

pub struct TaskService {
    repository: Box<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repository: Box<dyn TaskRepository>) -> TaskService {
        TaskService { repository }
    }

    pub fn add_task(&mut self, task: &Task) -> StorageResult<i32> {
        let result = self.repository.add_task(task);
        match &result {
            Ok(id) => info!("event=task_add module=service status=ok id={id}"),
            Err(err) => warn!("event=task_add module=service status=error error={err}"),
        }
        result
    }

    pub fn get_tasks(&self) -> StorageResult<Vec<Task>> {
        let tasks = self.repository.get_all_tasks()?;
        debug!("event=task_list module=service status=ok count={}", tasks.len());
        Ok(tasks)
    }

    pub fn get_task(&self, task_id: i32) -> StorageResult<Task> {
        self.repository.get_task(task_id)
    }

    pub fn update_task(&mut self, task: &Task) -> StorageResult<()> {
        let result = self.repository.update_task(task);
        log_mutation("task_update", task, &result);
        result
    }

    pub fn update_tasks(&mut self, tasks: &[Task]) -> StorageResult<()> {
        let result = self.repository.update_tasks(tasks);
        match &result {
            Ok(()) => info!(
                "event=task_update_many module=service status=ok count={}",
                tasks.len()
            ),
            Err(err) => warn!("event=task_update_many module=service status=error error={err}"),
        }
        result
    }

    pub fn delete_task(&mut self, task: &Task) -> StorageResult<()> {
        let result = self.repository.delete_task(task);
        log_mutation("task_delete", task, &result);
        result
    }
}

fn log_mutation(event: &str, task: &Task, result: &StorageResult<()>) {
    let id = task.id.unwrap_or(-1);
    match result {
        Ok(()) => info!("event={event} module=service status=ok id={id}"),
        Err(err) => warn!("event={event} module=service status=error id={id} error={err}"),
    }
}
