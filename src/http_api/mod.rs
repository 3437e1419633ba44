use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::persistence::{PersistenceError, Store};
use crate::quarter::Quarter;
use crate::registry::{Application, ApplicationRegistry, ApplyError, ApplyOutcome, RevokeError};
use crate::scheduler::{Recurrence, Scheduler};
use crate::task::{TaskInstance, TaskStatus};
use crate::validation;

pub struct AppState<S> {
    registry: Arc<ApplicationRegistry<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            registry: Arc::new(ApplicationRegistry::new(store)),
        }
    }

    fn registry(&self) -> Arc<ApplicationRegistry<S>> {
        self.registry.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Duplicate => ApiError::Conflict(value.to_string()),
            PersistenceError::NotFound => ApiError::NotFound(value.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ApplyError> for ApiError {
    fn from(value: ApplyError) -> Self {
        match value {
            ApplyError::Validation(_) | ApplyError::Configuration(_) => {
                ApiError::Invalid(value.to_string())
            }
            ApplyError::DuplicateApplication { .. } => ApiError::Conflict(value.to_string()),
            ApplyError::SchedulerNotFound(_) => ApiError::NotFound(value.to_string()),
            ApplyError::Store(err) => err.into(),
        }
    }
}

impl From<RevokeError> for ApiError {
    fn from(value: RevokeError) -> Self {
        match value {
            RevokeError::ApplicationNotFound(_) => ApiError::NotFound(value.to_string()),
            RevokeError::Store(err) => err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Conflict(message) => {
                let body = Json(ErrorBody {
                    error: "conflict",
                    message,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateSchedulerPayload {
    name: String,
    owner_id: i64,
    recurrence: Recurrence,
}

#[derive(Debug, Deserialize)]
struct ApplyPayload {
    scheduler_id: i64,
    quarter: Quarter,
    year: i32,
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: TaskStatus,
}

#[derive(Debug, Deserialize)]
struct ReschedulePayload {
    date: NaiveDate,
}

pub fn router<S: Store + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedulers", post(create_scheduler::<S>))
        .route(
            "/schedulers/:id",
            get(get_scheduler::<S>).delete(delete_scheduler::<S>),
        )
        .route("/owners/:owner_id/schedulers", get(list_schedulers::<S>))
        .route("/applications", post(apply_scheduler::<S>))
        .route(
            "/applications/:id",
            get(get_application::<S>).delete(revoke_application::<S>),
        )
        .route("/owners/:owner_id/applications", get(list_applications::<S>))
        .route("/owners/:owner_id/tasks", get(list_tasks::<S>))
        .route("/tasks/:id", get(get_task::<S>).delete(delete_task::<S>))
        .route("/tasks/:id/status", put(update_task_status::<S>))
        .route("/tasks/:id/date", put(reschedule_task::<S>))
        .with_state(state)
}

pub async fn serve<S: Store + Send + Sync + 'static>(
    addr: SocketAddr,
    store: S,
) -> std::io::Result<()> {
    let state = AppState::new(store);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn create_scheduler<S: Store>(
    State(state): State<AppState<S>>,
    Json(payload): Json<CreateSchedulerPayload>,
) -> Result<(StatusCode, Json<Scheduler>), ApiError> {
    let mut scheduler = Scheduler::new(payload.name, payload.owner_id, payload.recurrence);
    validation::validate_scheduler(&scheduler).map_err(|err| ApiError::invalid(err.to_string()))?;

    let registry = state.registry();
    let id = registry.store().insert_scheduler(&scheduler)?;
    scheduler.id = Some(id);
    Ok((StatusCode::CREATED, Json(scheduler)))
}

async fn get_scheduler<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<Scheduler>, ApiError> {
    let registry = state.registry();
    match registry.store().scheduler(id)? {
        Some(scheduler) => Ok(Json(scheduler)),
        None => Err(ApiError::not_found(format!("scheduler {id} not found"))),
    }
}

async fn list_schedulers<S: Store>(
    State(state): State<AppState<S>>,
    Path(owner_id): Path<i64>,
) -> Result<Json<Vec<Scheduler>>, ApiError> {
    let registry = state.registry();
    Ok(Json(registry.store().schedulers_for_owner(owner_id)?))
}

async fn delete_scheduler<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let registry = state.registry();
    if registry.store().delete_scheduler(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("scheduler {id} not found")))
    }
}

async fn apply_scheduler<S: Store>(
    State(state): State<AppState<S>>,
    Json(payload): Json<ApplyPayload>,
) -> Result<(StatusCode, Json<ApplyOutcome>), ApiError> {
    let registry = state.registry();
    let outcome = registry.apply(
        &mut rand::thread_rng(),
        payload.scheduler_id,
        payload.quarter,
        payload.year,
    )?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_application<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<Application>, ApiError> {
    let registry = state.registry();
    match registry.store().application(id)? {
        Some(application) => Ok(Json(application)),
        None => Err(ApiError::not_found(format!("application {id} not found"))),
    }
}

async fn list_applications<S: Store>(
    State(state): State<AppState<S>>,
    Path(owner_id): Path<i64>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let registry = state.registry();
    Ok(Json(registry.store().applications_for_owner(owner_id)?))
}

async fn revoke_application<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let registry = state.registry();
    registry.revoke(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tasks<S: Store>(
    State(state): State<AppState<S>>,
    Path(owner_id): Path<i64>,
) -> Result<Json<Vec<TaskInstance>>, ApiError> {
    let registry = state.registry();
    Ok(Json(registry.store().tasks_for_owner(owner_id)?))
}

async fn get_task<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<TaskInstance>, ApiError> {
    let registry = state.registry();
    match registry.store().task(id)? {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::not_found(format!("task {id} not found"))),
    }
}

async fn update_task_status<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<TaskInstance>, ApiError> {
    let registry = state.registry();
    if !registry.store().set_task_status(id, payload.status)? {
        return Err(ApiError::not_found(format!("task {id} not found")));
    }
    let updated = registry
        .store()
        .task(id)?
        .ok_or_else(|| ApiError::Internal("task not found after status update".to_string()))?;
    Ok(Json(updated))
}

async fn reschedule_task<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<Json<TaskInstance>, ApiError> {
    let registry = state.registry();
    if !registry.store().reschedule_task(id, payload.date)? {
        return Err(ApiError::not_found(format!("task {id} not found")));
    }
    let updated = registry
        .store()
        .task(id)?
        .ok_or_else(|| ApiError::Internal("task not found after reschedule".to_string()))?;
    Ok(Json(updated))
}

async fn delete_task<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let registry = state.registry();
    if registry.store().delete_task(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("task {id} not found")))
    }
}
