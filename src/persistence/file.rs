use super::{PersistenceError, PersistenceResult};
use crate::task::{TaskInstance, TaskStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct TaskListSnapshot {
    tasks: Vec<TaskInstance>,
}

pub fn save_tasks_to_json<P: AsRef<Path>>(tasks: &[TaskInstance], path: P) -> PersistenceResult<()> {
    let snapshot = TaskListSnapshot {
        tasks: tasks.to_vec(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_tasks_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<TaskInstance>> {
    let file = File::open(path)?;
    let snapshot: TaskListSnapshot = serde_json::from_reader(file)?;
    Ok(snapshot.tasks)
}

#[derive(Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    date: String,
    owner_id: i64,
    status: String,
    comments: String,
    created_at: String,
    updated_at: String,
}

impl From<&TaskInstance> for TaskCsvRecord {
    fn from(task: &TaskInstance) -> Self {
        Self {
            id: task.id.map(|v| v.to_string()).unwrap_or_default(),
            name: task.name.clone(),
            date: format_date(task.date),
            owner_id: task.owner_id,
            status: task.status.as_str().to_string(),
            comments: task.comments.clone(),
            created_at: format_datetime(task.created_at),
            updated_at: format_datetime(task.updated_at),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<TaskInstance> {
        let status = TaskStatus::from_str(&self.status).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid task status '{}'", self.status))
        })?;
        Ok(TaskInstance {
            id: parse_id(&self.id)?,
            name: self.name,
            date: parse_date(&self.date)?,
            owner_id: self.owner_id,
            status,
            comments: self.comments,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[TaskInstance], path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<TaskInstance>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    Ok(tasks)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|err| PersistenceError::InvalidData(format!("invalid date '{input}': {err}")))
}

fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

fn parse_datetime(input: &str) -> PersistenceResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|err| PersistenceError::InvalidData(format!("invalid datetime '{input}': {err}")))
}

fn parse_id(input: &str) -> PersistenceResult<Option<i64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|err| PersistenceError::InvalidData(format!("invalid id '{input}': {err}")))
}
