use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Deferred,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Deferred => "deferred",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim() {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            "deferred" => Some(TaskStatus::Deferred),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }
}

/// One concrete dated task, materialized from a scheduler application.
///
/// Instances are created in batches by the expansion pipeline and mutated
/// individually afterwards; the core never bulk-mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: Option<i64>,
    pub name: String,
    pub date: NaiveDate,
    pub owner_id: i64,
    pub status: TaskStatus,
    #[serde(default)]
    pub comments: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TaskInstance {
    /// A fresh `pending` instance, the shape every batch builder produces.
    pub fn pending(name: impl Into<String>, date: NaiveDate, owner_id: i64) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: None,
            name: name.into(),
            date,
            owner_id,
            status: TaskStatus::Pending,
            comments: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.touch();
    }

    pub fn reschedule(&mut self, date: NaiveDate) {
        self.date = date;
        self.touch();
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.comments = comments.into();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().naive_utc();
    }
}
