// Data access contract used by the service layer.
// The SQLite storage is the only production implementation; tests plug in their own.
use crate::app::models::Task;
use crate::app::storage::Storage;
use crate::error::{StorageError, StorageResult};

pub trait TaskRepository {
    // Store a new task and return its generated identifier
    fn add_task(&mut self, task: &Task) -> StorageResult<i32>;
    fn update_task(&mut self, task: &Task) -> StorageResult<()>;
    fn update_tasks(&mut self, tasks: &[Task]) -> StorageResult<()>;
    fn delete_task(&mut self, task: &Task) -> StorageResult<()>;
    fn get_all_tasks(&self) -> StorageResult<Vec<Task>>;
    fn get_task(&self, task_id: i32) -> StorageResult<Task>;
}

impl TaskRepository for Storage {
    fn add_task(&mut self, task: &Task) -> StorageResult<i32> {
        self.insert_task(task)
    }

    fn update_task(&mut self, task: &Task) -> StorageResult<()> {
        Storage::update_task(self, task).map(|_| ())
    }

    fn update_tasks(&mut self, tasks: &[Task]) -> StorageResult<()> {
        Storage::update_tasks(self, tasks).map(|_| ())
    }

    fn delete_task(&mut self, task: &Task) -> StorageResult<()> {
        let id = task.id.ok_or(StorageError::Unsaved)?;
        Storage::delete_task(self, id).map(|_| ())
    }

    fn get_all_tasks(&self) -> StorageResult<Vec<Task>> {
        Storage::get_all_tasks(self)
    }

    fn get_task(&self, task_id: i32) -> StorageResult<Task> {
        Storage::get_task(self, task_id)
    }
}
