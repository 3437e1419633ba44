//! Quarterly task planning: recurring schedulers are expanded into concrete
//! task instances for a calendar quarter, recorded per quarter so the same
//! scheduler cannot be applied twice, and persisted behind a pluggable store.

pub mod batch;
pub mod expansion;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod quarter;
pub mod registry;
pub mod scheduler;
pub mod task;
pub mod validation;

pub use batch::{BatchError, build_cycling_batch, build_simple_batch};
pub use persistence::{
    MemoryStore, PersistenceError, PersistenceResult, Store, load_tasks_from_csv,
    load_tasks_from_json, save_tasks_to_csv, save_tasks_to_json,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use quarter::{ParseQuarterError, Quarter};
pub use registry::{Application, ApplicationRegistry, ApplyError, ApplyOutcome, RevokeError};
pub use scheduler::{Recurrence, Scheduler};
pub use task::{TaskInstance, TaskStatus};
pub use validation::ValidationError;
