use super::{
    ApplicationStore, PersistenceError, PersistenceResult, SchedulerStore, TaskStore,
};
use crate::quarter::Quarter;
use crate::registry::Application;
use crate::scheduler::Scheduler;
use crate::task::{TaskInstance, TaskStatus};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct Inner {
    schedulers: BTreeMap<i64, Scheduler>,
    applications: BTreeMap<i64, Application>,
    tasks: BTreeMap<i64, TaskInstance>,
    next_scheduler_id: i64,
    next_application_id: i64,
    next_task_id: i64,
}

impl Inner {
    fn new() -> Self {
        Self {
            next_scheduler_id: 1,
            next_application_id: 1,
            next_task_id: 1,
            ..Self::default()
        }
    }
}

/// In-process store, used by tests and as the HTTP backend when the crate is
/// built without the `sqlite` feature.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn quarter_rank(quarter: Quarter) -> u8 {
    match quarter {
        Quarter::Q1 => 1,
        Quarter::Q2 => 2,
        Quarter::Q3 => 3,
        Quarter::Q4 => 4,
    }
}

impl SchedulerStore for MemoryStore {
    fn insert_scheduler(&self, scheduler: &Scheduler) -> PersistenceResult<i64> {
        let mut inner = self.inner.write();
        let id = inner.next_scheduler_id;
        inner.next_scheduler_id += 1;
        let mut record = scheduler.clone();
        record.id = Some(id);
        inner.schedulers.insert(id, record);
        Ok(id)
    }

    fn scheduler(&self, id: i64) -> PersistenceResult<Option<Scheduler>> {
        Ok(self.inner.read().schedulers.get(&id).cloned())
    }

    fn schedulers_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<Scheduler>> {
        let inner = self.inner.read();
        let mut schedulers: Vec<Scheduler> = inner
            .schedulers
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        schedulers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(schedulers)
    }

    fn rename_scheduler(&self, id: i64, name: &str) -> PersistenceResult<bool> {
        let mut inner = self.inner.write();
        match inner.schedulers.get_mut(&id) {
            Some(scheduler) => {
                scheduler.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_scheduler(&self, id: i64) -> PersistenceResult<bool> {
        let mut inner = self.inner.write();
        let removed = inner.schedulers.remove(&id).is_some();
        if removed {
            // Applications cascade with their scheduler, matching the
            // sqlite foreign key.
            inner.applications.retain(|_, app| app.scheduler_id != id);
        }
        Ok(removed)
    }
}

impl ApplicationStore for MemoryStore {
    fn insert_application_with_tasks(
        &self,
        application: &Application,
        tasks: &[TaskInstance],
    ) -> PersistenceResult<(i64, Vec<i64>)> {
        let mut inner = self.inner.write();
        let duplicate = inner.applications.values().any(|app| {
            app.scheduler_id == application.scheduler_id
                && app.quarter == application.quarter
                && app.year == application.year
        });
        if duplicate {
            return Err(PersistenceError::Duplicate);
        }

        let application_id = inner.next_application_id;
        inner.next_application_id += 1;
        let mut record = application.clone();
        record.id = Some(application_id);
        inner.applications.insert(application_id, record);

        let mut task_ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            let id = inner.next_task_id;
            inner.next_task_id += 1;
            let mut record = task.clone();
            record.id = Some(id);
            inner.tasks.insert(id, record);
            task_ids.push(id);
        }

        Ok((application_id, task_ids))
    }

    fn application(&self, id: i64) -> PersistenceResult<Option<Application>> {
        Ok(self.inner.read().applications.get(&id).cloned())
    }

    fn application_exists(
        &self,
        scheduler_id: i64,
        quarter: Quarter,
        year: i32,
    ) -> PersistenceResult<bool> {
        Ok(self.inner.read().applications.values().any(|app| {
            app.scheduler_id == scheduler_id && app.quarter == quarter && app.year == year
        }))
    }

    fn applications_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<Application>> {
        let inner = self.inner.read();
        let mut applications: Vec<Application> = inner
            .applications
            .values()
            .filter(|app| {
                inner
                    .schedulers
                    .get(&app.scheduler_id)
                    .is_some_and(|s| s.owner_id == owner_id)
            })
            .cloned()
            .collect();
        applications.sort_by(|a, b| {
            (b.year, quarter_rank(b.quarter)).cmp(&(a.year, quarter_rank(a.quarter)))
        });
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
        Ok(self.inner.write().applications.remove(&id).is_some())
    }
}

impl TaskStore for MemoryStore {
    fn bulk_insert_tasks(&self, tasks: &[TaskInstance]) -> PersistenceResult<Vec<i64>> {
        let mut inner = self.inner.write();
        let mut ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            let id = inner.next_task_id;
            inner.next_task_id += 1;
            let mut record = task.clone();
            record.id = Some(id);
            inner.tasks.insert(id, record);
            ids.push(id);
        }
        Ok(ids)
    }

    fn task(&self, id: i64) -> PersistenceResult<Option<TaskInstance>> {
        Ok(self.inner.read().tasks.get(&id).cloned())
    }

    fn tasks_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<TaskInstance>> {
        let inner = self.inner.read();
        let mut tasks: Vec<TaskInstance> = inner
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        // Most recent date first, names tie-break, as the task list reads.
        tasks.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));
        Ok(tasks)
    }

    fn tasks_on_date(
        &self,
        owner_id: i64,
        date: NaiveDate,
    ) -> PersistenceResult<Vec<TaskInstance>> {
        let tasks = self.tasks_for_owner(owner_id)?;
        Ok(tasks.into_iter().filter(|t| t.date == date).collect())
    }

    fn pending_tasks(&self, owner_id: i64) -> PersistenceResult<Vec<TaskInstance>> {
        let tasks = self.tasks_for_owner(owner_id)?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .collect())
    }

    fn set_task_status(&self, id: i64, status: TaskStatus) -> PersistenceResult<bool> {
        let mut inner = self.inner.write();
        match inner.tasks.get_mut(&id) {
            Some(task) => {
                task.set_status(status);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn reschedule_task(&self, id: i64, date: NaiveDate) -> PersistenceResult<bool> {
        let mut inner = self.inner.write();
        match inner.tasks.get_mut(&id) {
            Some(task) => {
                task.reschedule(date);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_task(&self, id: i64) -> PersistenceResult<bool> {
        Ok(self.inner.write().tasks.remove(&id).is_some())
    }
}
