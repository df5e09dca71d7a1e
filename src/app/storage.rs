// Communication with SQLite
// Philosophy of CRUD lives here
// Based on https://github.com/rusqlite/rusqlite/blob/master/examples/persons/main.rs
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::app::models::{Priority, Task};
use crate::error::{StorageError, StorageResult};

const TASK_SELECT_SQL: &str =
    "SELECT Id, Title, Description, DueDate, PriorityLevel, Completed FROM task_item";

pub struct Storage {
    pub db_con: Connection,
}

impl Storage {
    // Open (or create) the database file and make sure the table exists
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Storage> {
        let path = path.as_ref();
        info!("event=db_open module=storage status=start path={}", path.display());
        let storage = Storage {
            db_con: Connection::open(path)?,
        };
        storage.create_table_if_not_exists()?;
        info!("event=db_open module=storage status=ok");
        Ok(storage)
    }

    pub fn open_in_memory() -> StorageResult<Storage> {
        let storage = Storage {
            db_con: Connection::open_in_memory()?,
        };
        storage.create_table_if_not_exists()?;
        Ok(storage)
    }

    pub fn create_table_if_not_exists(&self) -> StorageResult<()> {
        self.db_con.execute(
            "CREATE TABLE IF NOT EXISTS task_item (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                Title TEXT,
                Description TEXT,
                DueDate DATETIME,
                PriorityLevel INT,
                Completed TINYINT
            );",
            (),
        )?;
        Ok(())
    }

    // CREATE
    // Returns the generated identifier
    pub fn insert_task(&self, task: &Task) -> StorageResult<i32> {
        self.db_con.execute(
            "INSERT INTO task_item (Title, Description, DueDate, PriorityLevel, Completed) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                &task.title,
                &task.description,
                &task.due_date,
                task.priority.ordinal(),
                task.completed
            ],
        )?;
        let rowid = self.db_con.last_insert_rowid();
        let id = i32::try_from(rowid).map_err(|_| StorageError::IdOutOfRange(rowid))?;
        debug!("event=task_insert module=storage status=ok id={id}");
        Ok(id)
    }

    // READ
    // Rows come back in insertion order so equal sort keys stay stable
    pub fn get_all_tasks(&self) -> StorageResult<Vec<Task>> {
        let mut stmt = self
            .db_con
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY Id"))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<Task>, rusqlite::Error>>()?;
        Ok(tasks)
    }

    pub fn get_task(&self, task_id: i32) -> StorageResult<Task> {
        self.db_con
            .query_row(
                &format!("{TASK_SELECT_SQL} WHERE Id = ?1"),
                [task_id],
                task_from_row,
            )
            .optional()?
            .ok_or(StorageError::NotFound(task_id))
    }

    // UPDATE
    // Zero affected rows is not an error: the task may already be gone
    pub fn update_task(&self, task: &Task) -> StorageResult<usize> {
        let id = task.id.ok_or(StorageError::Unsaved)?;
        Ok(update_with(&self.db_con, task, id)?)
    }

    // Update several tasks inside one transaction
    pub fn update_tasks(&mut self, tasks: &[Task]) -> StorageResult<usize> {
        let tx = self.db_con.transaction()?;
        let mut changed = 0;
        for task in tasks {
            let id = task.id.ok_or(StorageError::Unsaved)?;
            changed += update_with(&tx, task, id)?;
        }
        tx.commit()?;
        Ok(changed)
    }

    // DELETE
    pub fn delete_task(&self, task_id: i32) -> StorageResult<usize> {
        Ok(self
            .db_con
            .execute("DELETE FROM task_item WHERE Id = ?;", [task_id])?)
    }
}

fn update_with(con: &Connection, task: &Task, id: i32) -> rusqlite::Result<usize> {
    con.execute(
        "UPDATE task_item SET Title = ?, Description = ?, DueDate = ?, PriorityLevel = ?, Completed = ? WHERE Id = ?;",
        params![
            &task.title,
            &task.description,
            &task.due_date,
            task.priority.ordinal(),
            task.completed,
            id
        ],
    )
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        due_date: row.get(3)?,
        priority: Priority::from_ordinal(row.get::<_, Option<i32>>(4)?.unwrap_or(0)),
        completed: row.get::<_, Option<bool>>(5)?.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(title: &str) -> Task {
        Task::new(
            title,
            "details",
            Priority::Medium,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let storage = Storage::open_in_memory().unwrap();
        let first = storage.insert_task(&sample("a")).unwrap();
        let second = storage.insert_task(&sample("b")).unwrap();
        assert!(second > first);

        let loaded = storage.get_task(second).unwrap();
        assert_eq!(loaded.title, "b");
        assert_eq!(loaded.priority, Priority::Medium);
        assert_eq!(loaded.id, Some(second));
    }

    #[test]
    fn get_task_reports_missing_rows() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(matches!(
            storage.get_task(42),
            Err(StorageError::NotFound(42))
        ));
    }

    #[test]
    fn unknown_priority_reads_back_as_low() {
        let storage = Storage::open_in_memory().unwrap();
        let id = storage.insert_task(&sample("odd")).unwrap();
        storage
            .db_con
            .execute("UPDATE task_item SET PriorityLevel = 9 WHERE Id = ?", [id])
            .unwrap();
        assert_eq!(storage.get_task(id).unwrap().priority, Priority::Low);
    }

    #[test]
    fn update_requires_an_id() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(matches!(
            storage.update_task(&sample("unsaved")),
            Err(StorageError::Unsaved)
        ));
    }

    #[test]
    fn missing_rows_are_a_no_op() {
        let storage = Storage::open_in_memory().unwrap();
        let id = storage.insert_task(&sample("stays")).unwrap();

        let mut ghost = sample("ghost");
        ghost.id = Some(id + 41);
        assert_eq!(storage.update_task(&ghost).unwrap(), 0);
        assert_eq!(storage.delete_task(id + 41).unwrap(), 0);

        let all = storage.get_all_tasks().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "stays");
    }

    #[test]
    fn rowid_beyond_i32_is_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .db_con
            .execute(
                "INSERT INTO task_item (Id, Title) VALUES (?1, 'big');",
                [i64::from(i32::MAX)],
            )
            .unwrap();
        assert!(matches!(
            storage.insert_task(&sample("next")),
            Err(StorageError::IdOutOfRange(rowid)) if rowid == i64::from(i32::MAX) + 1
        ));
    }

    #[test]
    fn bulk_update_is_all_or_nothing() {
        let mut storage = Storage::open_in_memory().unwrap();
        let id = storage.insert_task(&sample("keep")).unwrap();

        let mut changed = storage.get_task(id).unwrap();
        changed.title = "changed".into();
        let result = storage.update_tasks(&[changed, sample("no id")]);
        assert!(matches!(result, Err(StorageError::Unsaved)));

        assert_eq!(storage.get_task(id).unwrap().title, "keep");
    }
}
