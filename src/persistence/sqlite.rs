use super::{
    ApplicationStore, PersistenceError, PersistenceResult, SchedulerStore, TaskStore,
};
use crate::quarter::Quarter;
use crate::registry::Application;
use crate::scheduler::{Recurrence, Scheduler};
use crate::task::{TaskInstance, TaskStatus};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS schedulers (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                owner_id INTEGER NOT NULL,
                recurrence_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY,
                scheduler_id INTEGER NOT NULL REFERENCES schedulers(id) ON DELETE CASCADE,
                quarter TEXT NOT NULL,
                year INTEGER NOT NULL,
                UNIQUE (scheduler_id, quarter, year)
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                date TEXT NOT NULL,
                owner_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                comments TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection.lock().expect("sqlite mutex poisoned")
    }

    fn insert_task_tx(tx: &rusqlite::Transaction, task: &TaskInstance) -> PersistenceResult<i64> {
        tx.execute(
            "INSERT INTO tasks (name, date, owner_id, status, comments, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.name,
                format_date(task.date),
                task.owner_id,
                task.status.as_str(),
                task.comments,
                format_datetime(task.created_at),
                format_datetime(task.updated_at),
            ],
        )?;
        Ok(tx.last_insert_rowid())
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|err| PersistenceError::InvalidData(format!("invalid date '{input}': {err}")))
}

fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

fn parse_datetime(input: &str) -> PersistenceResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, DATETIME_FORMAT)
        .map_err(|err| PersistenceError::InvalidData(format!("invalid datetime '{input}': {err}")))
}

fn parse_quarter(input: &str) -> PersistenceResult<Quarter> {
    input
        .parse::<Quarter>()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

fn parse_status(input: &str) -> PersistenceResult<TaskStatus> {
    TaskStatus::from_str(input)
        .ok_or_else(|| PersistenceError::InvalidData(format!("invalid task status '{input}'")))
}

/// Raw column values for one task row; parsed outside the rusqlite closure
/// so conversion failures surface as `InvalidData` instead of panics.
struct TaskRow {
    id: i64,
    name: String,
    date: String,
    owner_id: i64,
    status: String,
    comments: String,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            date: row.get(2)?,
            owner_id: row.get(3)?,
            status: row.get(4)?,
            comments: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_task(self) -> PersistenceResult<TaskInstance> {
        Ok(TaskInstance {
            id: Some(self.id),
            name: self.name,
            date: parse_date(&self.date)?,
            owner_id: self.owner_id,
            status: parse_status(&self.status)?,
            comments: self.comments,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

const TASK_COLUMNS: &str = "id, name, date, owner_id, status, comments, created_at, updated_at";

fn collect_tasks(
    mut stmt: rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> PersistenceResult<Vec<TaskInstance>> {
    let rows = stmt.query_map(params, TaskRow::from_row)?;
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?.into_task()?);
    }
    Ok(tasks)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl SchedulerStore for SqliteStore {
    fn insert_scheduler(&self, scheduler: &Scheduler) -> PersistenceResult<i64> {
        let recurrence_json = serde_json::to_string(&scheduler.recurrence)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO schedulers (name, owner_id, recurrence_json) VALUES (?1, ?2, ?3)",
            params![scheduler.name, scheduler.owner_id, recurrence_json],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn scheduler(&self, id: i64) -> PersistenceResult<Option<Scheduler>> {
        let conn = self.lock();
        let row: Option<(i64, String, i64, String)> = conn
            .query_row(
                "SELECT id, name, owner_id, recurrence_json FROM schedulers WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        match row {
            Some((id, name, owner_id, recurrence_json)) => {
                let recurrence: Recurrence = serde_json::from_str(&recurrence_json)?;
                Ok(Some(Scheduler {
                    id: Some(id),
                    name,
                    owner_id,
                    recurrence,
                }))
            }
            None => Ok(None),
        }
    }

    fn schedulers_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<Scheduler>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, owner_id, recurrence_json FROM schedulers
             WHERE owner_id = ?1 ORDER BY name ASC",
        )?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut schedulers = Vec::new();
        for row in rows {
            let (id, name, owner_id, recurrence_json) = row?;
            let recurrence: Recurrence = serde_json::from_str(&recurrence_json)?;
            schedulers.push(Scheduler {
                id: Some(id),
                name,
                owner_id,
                recurrence,
            });
        }
        Ok(schedulers)
    }

    fn rename_scheduler(&self, id: i64, name: &str) -> PersistenceResult<bool> {
        let conn = self.lock();
        let updated = conn.execute(
            "UPDATE schedulers SET name = ?2 WHERE id = ?1",
            params![id, name],
        )?;
        Ok(updated > 0)
    }

    fn delete_scheduler(&self, id: i64) -> PersistenceResult<bool> {
        let conn = self.lock();
        let deleted = conn.execute("DELETE FROM schedulers WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl ApplicationStore for SqliteStore {
    fn insert_application_with_tasks(
        &self,
        application: &Application,
        tasks: &[TaskInstance],
    ) -> PersistenceResult<(i64, Vec<i64>)> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        // The UNIQUE (scheduler_id, quarter, year) constraint is the final
        // arbiter under concurrent applies for the same tuple.
        let inserted = tx.execute(
            "INSERT INTO applications (scheduler_id, quarter, year) VALUES (?1, ?2, ?3)",
            params![
                application.scheduler_id,
                application.quarter.as_str(),
                application.year
            ],
        );
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(PersistenceError::Duplicate);
            }
            return Err(err.into());
        }
        let application_id = tx.last_insert_rowid();

        let mut task_ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            task_ids.push(Self::insert_task_tx(&tx, task)?);
        }

        tx.commit()?;
        Ok((application_id, task_ids))
    }

    fn application(&self, id: i64) -> PersistenceResult<Option<Application>> {
        let conn = self.lock();
        let row: Option<(i64, i64, String, i32)> = conn
            .query_row(
                "SELECT id, scheduler_id, quarter, year FROM applications WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        match row {
            Some((id, scheduler_id, quarter, year)) => Ok(Some(Application {
                id: Some(id),
                scheduler_id,
                quarter: parse_quarter(&quarter)?,
                year,
            })),
            None => Ok(None),
        }
    }

    fn application_exists(
        &self,
        scheduler_id: i64,
        quarter: Quarter,
        year: i32,
    ) -> PersistenceResult<bool> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM applications
             WHERE scheduler_id = ?1 AND quarter = ?2 AND year = ?3",
            params![scheduler_id, quarter.as_str(), year],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn applications_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<Application>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT a.id, a.scheduler_id, a.quarter, a.year
             FROM applications a JOIN schedulers s ON s.id = a.scheduler_id
             WHERE s.owner_id = ?1
             ORDER BY a.year DESC, a.quarter DESC",
        )?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i32>(3)?,
            ))
        })?;
        let mut applications = Vec::new();
        for row in rows {
            let (id, scheduler_id, quarter, year) = row?;
            applications.push(Application {
                id: Some(id),
                scheduler_id,
                quarter: parse_quarter(&quarter)?,
                year,
            });
        }
        Ok(applications)
    }

    fn applications_for_quarter(
        &self,
        owner_id: i64,
        quarter: Quarter,
        year: i32,
    ) -> PersistenceResult<Vec<Application>> {
        let applications = self.applications_for_owner(owner_id)?;
        Ok(applications
            .into_iter()
            .filter(|app| app.quarter == quarter && app.year == year)
            .collect())
    }

    fn delete_application(&self, id: i64) -> PersistenceResult<bool> {
        let conn = self.lock();
        let deleted = conn.execute("DELETE FROM applications WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl TaskStore for SqliteStore {
    fn bulk_insert_tasks(&self, tasks: &[TaskInstance]) -> PersistenceResult<Vec<i64>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            ids.push(Self::insert_task_tx(&tx, task)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    fn task(&self, id: i64) -> PersistenceResult<Option<TaskInstance>> {
        let conn = self.lock();
        let row = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                TaskRow::from_row,
            )
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    fn tasks_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<TaskInstance>> {
        let conn = self.lock();
        let stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE owner_id = ?1 ORDER BY date DESC, name ASC"
        ))?;
        collect_tasks(stmt, params![owner_id])
    }

    fn tasks_on_date(
        &self,
        owner_id: i64,
        date: NaiveDate,
    ) -> PersistenceResult<Vec<TaskInstance>> {
        let conn = self.lock();
        let stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE owner_id = ?1 AND date = ?2 ORDER BY name ASC"
        ))?;
        collect_tasks(stmt, params![owner_id, format_date(date)])
    }

    fn pending_tasks(&self, owner_id: i64) -> PersistenceResult<Vec<TaskInstance>> {
        let conn = self.lock();
        let stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE owner_id = ?1 AND status = 'pending' ORDER BY date DESC, name ASC"
        ))?;
        collect_tasks(stmt, params![owner_id])
    }

    fn set_task_status(&self, id: i64, status: TaskStatus) -> PersistenceResult<bool> {
        let conn = self.lock();
        let now = format_datetime(chrono::Utc::now().naive_utc());
        let updated = conn.execute(
            "UPDATE tasks SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), now],
        )?;
        Ok(updated > 0)
    }

    fn reschedule_task(&self, id: i64, date: NaiveDate) -> PersistenceResult<bool> {
        let conn = self.lock();
        let now = format_datetime(chrono::Utc::now().naive_utc());
        let updated = conn.execute(
            "UPDATE tasks SET date = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, format_date(date), now],
        )?;
        Ok(updated > 0)
    }

    fn delete_task(&self, id: i64) -> PersistenceResult<bool> {
        let conn = self.lock();
        let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
