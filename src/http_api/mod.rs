use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ProjectMetadata, ProjectPlan, ScheduleResult, Task, WorkPackage};

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<ProjectPlan>>,
}

impl AppState {
    pub fn new(plan: ProjectPlan) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
        }
    }

    pub fn with_shared(plan: Arc<RwLock<ProjectPlan>>) -> Self {
        Self { plan }
    }

    fn plan(&self) -> Arc<RwLock<ProjectPlan>> {
        self.plan.clone()
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

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<polars::prelude::PolarsError> for ApiError {
    fn from(value: polars::prelude::PolarsError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct StartDatePayload {
    #[serde(rename = "startDate")]
    start_date: NaiveDate,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(get_metadata).put(update_metadata))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route(
            "/workpackages",
            get(list_work_packages).post(upsert_work_package),
        )
        .route("/workpackages/:id", axum::routing::delete(delete_work_package))
        .route("/schedule", get(get_schedule))
        .route("/project/start_date", post(set_start_date))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: ProjectPlan) -> std::io::Result<()> {
    let state = AppState::new(plan);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_metadata(State(state): State<AppState>) -> Json<ProjectMetadata> {
    let plan = state.plan();
    let metadata = {
        let guard = plan.read();
        guard.metadata().clone()
    };
    Json(metadata)
}

async fn update_metadata(
    State(state): State<AppState>,
    Json(metadata): Json<ProjectMetadata>,
) -> Result<Json<ProjectMetadata>, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard.set_project_name(metadata.project_name.clone());
        guard.set_project_description(metadata.project_description.clone());
        // Goes through the bulk shift so constraint dates move with it.
        guard
            .set_project_start_date(metadata.project_start_date)
            .map_err(ApiError::from)?;
    }
    let current = {
        let guard = plan.read();
        guard.metadata().clone()
    };
    Ok(Json(current))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let plan = state.plan();
    let tasks = {
        let guard = plan.read();
        guard.tasks()?
    };
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let plan = state.plan();
    let result = {
        let guard = plan.read();
        guard.find_task(&task_id)?
    };
    match result {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::not_found(format!("task {task_id} not found"))),
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        if guard.find_task(&task.id)?.is_some() {
            return Err(ApiError::Conflict(format!(
                "task {} already exists",
                task.id
            )));
        }
        guard.upsert_task_record(task.clone()).map_err(ApiError::from)?;
    }
    let created = {
        let guard = plan.read();
        guard
            .find_task(&task.id)?
            .ok_or_else(|| ApiError::internal("task not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    let plan = state.plan();
    {
        let mut guard = plan.write();
        if guard.find_task(&task_id)?.is_none() {
            return Err(ApiError::not_found(format!("task {task_id} not found")));
        }
        guard.upsert_task_record(task.clone()).map_err(ApiError::from)?;
    }
    let updated = {
        let guard = plan.read();
        guard
            .find_task(&task_id)?
            .ok_or_else(|| ApiError::internal("task not found after update"))?
    };
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    let removed = {
        let mut guard = plan.write();
        guard.delete_task(&task_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_work_packages(State(state): State<AppState>) -> Json<Vec<WorkPackage>> {
    let plan = state.plan();
    let work_packages = {
        let guard = plan.read();
        guard.work_packages().to_vec()
    };
    Json(work_packages)
}

async fn upsert_work_package(
    State(state): State<AppState>,
    Json(work_package): Json<WorkPackage>,
) -> (StatusCode, Json<WorkPackage>) {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard.upsert_work_package(work_package.clone());
    }
    (StatusCode::CREATED, Json(work_package))
}

async fn delete_work_package(
    State(state): State<AppState>,
    Path(work_package_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    let removed = {
        let mut guard = plan.write();
        guard.delete_work_package(&work_package_id)
    };
    if !removed {
        return Err(ApiError::not_found(format!(
            "work package {work_package_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_schedule(State(state): State<AppState>) -> Result<Json<ScheduleResult>, ApiError> {
    let plan = state.plan();
    let result = {
        let guard = plan.read();
        guard.compute()?
    };
    Ok(Json(result))
}

async fn set_start_date(
    State(state): State<AppState>,
    Json(payload): Json<StartDatePayload>,
) -> Result<Json<ProjectMetadata>, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard
            .set_project_start_date(payload.start_date)
            .map_err(ApiError::from)?;
    }
    let current = {
        let guard = plan.read();
        guard.metadata().clone()
    };
    Ok(Json(current))
}
