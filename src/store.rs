use crate::config::Config;
use crate::error::Result;
use crate::task::{Task, PENDING};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use tracing::debug;

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL,
    deadline TEXT,
    status TEXT NOT NULL DEFAULT 'pending'
)";
const INSERT_TASK: &str = "INSERT INTO tasks (description, deadline, status) VALUES (?1, ?2, ?3)";
const SELECT_TASKS: &str = "SELECT id, description, deadline, status FROM tasks ORDER BY id";
const SELECT_TASKS_BY_STATUS: &str =
    "SELECT id, description, deadline, status FROM tasks WHERE status = ?1 ORDER BY id";
const SELECT_TASK_BY_ID: &str = "SELECT id, description, deadline, status FROM tasks WHERE id = ?1";
const UPDATE_TASK: &str = "UPDATE tasks SET description = ?1, status = ?2 WHERE id = ?3";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

/// Result of an update or delete against a single id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The task as it looks after an update, or as it was before a delete.
    Applied(Task),
    NotFound,
}

/// SQLite-backed task table. Every call opens its own connection and
/// commits before returning.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.path.clone(),
        }
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(SCHEMA_TASKS, [])?;
        debug!(path = %self.path.display(), "task table ready");
        Ok(())
    }

    /// Inserts a pending task and returns its id. The description is stored
    /// as given, empty included.
    pub fn create(&self, description: &str, deadline: Option<&str>) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(INSERT_TASK, params![description, deadline, PENDING])?;
        let id = conn.last_insert_rowid();
        debug!(id, "task created");
        Ok(id)
    }

    /// All tasks in id order, or only those whose status equals `status`
    /// exactly. An empty filter lists everything.
    pub fn list(&self, status: Option<&str>) -> Result<Vec<Task>> {
        let conn = self.connect()?;
        let tasks = match status.filter(|s| !s.is_empty()) {
            Some(status) => {
                let mut stmt = conn.prepare(SELECT_TASKS_BY_STATUS)?;
                let rows = stmt.query_map(params![status], task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(SELECT_TASKS)?;
                let rows = stmt.query_map([], task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        debug!(?status, count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.connect()?;
        fetch(&conn, id)
    }

    /// Replaces description and/or status; `None` or empty keeps the stored
    /// value. The deadline is never changed here.
    pub fn update(
        &self,
        id: i64,
        description: Option<&str>,
        status: Option<&str>,
    ) -> Result<Change> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let Some(current) = fetch(&tx, id)? else {
            debug!(id, "update skipped, no such task");
            return Ok(Change::NotFound);
        };

        let updated = Task {
            description: non_empty(description)
                .unwrap_or(current.description.as_str())
                .to_string(),
            status: non_empty(status)
                .unwrap_or(current.status.as_str())
                .to_string(),
            ..current
        };
        tx.execute(UPDATE_TASK, params![updated.description, updated.status, id])?;
        tx.commit()?;
        debug!(id, "task updated");
        Ok(Change::Applied(updated))
    }

    pub fn delete(&self, id: i64) -> Result<Change> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let Some(current) = fetch(&tx, id)? else {
            debug!(id, "delete skipped, no such task");
            return Ok(Change::NotFound);
        };

        tx.execute(DELETE_TASK, params![id])?;
        tx.commit()?;
        debug!(id, "task deleted");
        Ok(Change::Applied(current))
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<Option<Task>> {
    Ok(conn
        .query_row(SELECT_TASK_BY_ID, params![id], task_from_row)
        .optional()?)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        description: row.get(1)?,
        deadline: row.get(2)?,
        status: row.get(3)?,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::COMPLETED;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(&Config::new(dir.path().join("tasks.db")));
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn initialize_is_idempotent() {
        let (_dir, store) = store();
        store.create("keep me", None).unwrap();
        store.initialize().unwrap();
        assert_eq!(store.list(None).unwrap().len(), 1);
    }

    #[test]
    fn create_defaults_to_pending_without_deadline() {
        let (_dir, store) = store();
        let id = store.create("Write report", None).unwrap();

        let tasks = store.list(None).unwrap();
        assert_eq!(
            tasks,
            vec![Task {
                id,
                description: "Write report".to_string(),
                deadline: None,
                status: PENDING.to_string(),
            }]
        );
    }

    #[test]
    fn create_accepts_empty_description() {
        let (_dir, store) = store();
        let id = store.create("", Some("whenever")).unwrap();
        let task = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.deadline.as_deref(), Some("whenever"));
    }

    #[test]
    fn list_keeps_creation_order() {
        let (_dir, store) = store();
        for name in ["a", "b", "c", "d"] {
            store.create(name, None).unwrap();
        }
        let names: Vec<_> = store
            .list(None)
            .unwrap()
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn list_filters_by_exact_status() {
        let (_dir, store) = store();
        let a = store.create("a", None).unwrap();
        let b = store.create("b", None).unwrap();
        let c = store.create("c", None).unwrap();
        store.update(b, None, Some(COMPLETED)).unwrap();
        store.update(c, None, Some("Pending")).unwrap();

        let pending: Vec<_> = store
            .list(Some(PENDING))
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(pending, [a]);
        assert!(store.list(Some("pend")).unwrap().is_empty());
        assert!(store.list(Some("archived")).unwrap().is_empty());
        assert_eq!(store.list(Some("")).unwrap().len(), 3);
    }

    #[test]
    fn status_filter_is_bound_not_spliced() {
        let (_dir, store) = store();
        store.create("a", None).unwrap();
        let hostile = "x' OR '1'='1";
        assert!(store.list(Some(hostile)).unwrap().is_empty());
        assert_eq!(store.list(None).unwrap().len(), 1);
    }

    #[test]
    fn get_by_id_absent_is_none() {
        let (_dir, store) = store();
        assert_eq!(store.get_by_id(42).unwrap(), None);
    }

    #[test]
    fn update_missing_id_changes_nothing() {
        let (_dir, store) = store();
        store.create("a", Some("2024-01-01")).unwrap();
        let before = store.list(None).unwrap();

        assert_eq!(
            store.update(9999, Some("b"), Some(COMPLETED)).unwrap(),
            Change::NotFound
        );
        assert_eq!(store.list(None).unwrap(), before);
    }

    #[test]
    fn update_status_only_preserves_description_and_deadline() {
        let (_dir, store) = store();
        let id = store.create("Buy milk", Some("2024-01-01")).unwrap();

        store.update(id, None, Some(COMPLETED)).unwrap();
        let task = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(task.description, "Buy milk");
        assert_eq!(task.deadline.as_deref(), Some("2024-01-01"));
        assert_eq!(task.status, COMPLETED);
    }

    #[test]
    fn update_description_keeps_status_and_blank_means_keep() {
        let (_dir, store) = store();
        let id = store.create("old", Some("2024-01-01")).unwrap();

        let change = store.update(id, Some("new"), Some("")).unwrap();
        let Change::Applied(task) = change else {
            panic!("expected update to apply");
        };
        assert_eq!(task.description, "new");
        assert_eq!(task.status, PENDING);
        assert_eq!(task.deadline.as_deref(), Some("2024-01-01"));
        assert_eq!(store.get_by_id(id).unwrap(), Some(task));
    }

    #[test]
    fn update_accepts_any_status_text() {
        let (_dir, store) = store();
        let id = store.create("a", None).unwrap();
        store.update(id, None, Some("blocked")).unwrap();
        assert_eq!(store.list(Some("blocked")).unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_only_that_row_once() {
        let (_dir, store) = store();
        let a = store.create("a", None).unwrap();
        let b = store.create("b", None).unwrap();
        let c = store.create("c", None).unwrap();

        assert!(matches!(store.delete(b).unwrap(), Change::Applied(t) if t.description == "b"));
        let ids: Vec<_> = store.list(None).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, [a, c]);
        assert_eq!(store.delete(b).unwrap(), Change::NotFound);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (_dir, store) = store();
        let a = store.create("a", None).unwrap();
        let b = store.create("b", None).unwrap();
        store.delete(b).unwrap();
        let c = store.create("c", None).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn missing_directory_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(&Config::new(dir.path().join("nope").join("tasks.db")));
        assert!(matches!(
            store.initialize(),
            Err(crate::error::TaskError::Storage(_))
        ));
    }
}
