//! HTTP API.
//!
//! Exposes the pipeline and the stored results over JSON:
//!
//! | Route | Action |
//! |-------|--------|
//! | `GET /` | liveness string |
//! | `GET /health` | `{status, version}` |
//! | `POST /repo` | register → clone → aggregate → run |
//! | `GET /projects` | list `{project_id, project_name}` |
//! | `GET /projects/{id}/files` | stored per-file summaries |
//! | `GET /projects/{id}/readme` | stored README as a JSON string |
//!
//! CORS is open to all origins so a browser UI can call it directly.
//! Errors use the body `{"error": {"code", "message"}}`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use repodoc_core::error::Error;
use repodoc_core::models::{ProjectFile, ProjectSummary};

use crate::config::Config;
use crate::llm::create_model;
use crate::pipeline::Orchestrator;
use crate::sqlite_store::SqliteStore;
use crate::{db, migrate};

#[derive(Clone)]
struct AppState {
    orch: Arc<Orchestrator>,
}

/// Start the server on `[server].bind` with the SQLite store and the
/// configured model. Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;

    let store = Arc::new(SqliteStore::new(pool));
    let llm = create_model(&config.llm)?;
    let orch = Arc::new(Orchestrator::from_config(config, store, llm)?);

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind = %bind_addr, model = %config.llm.model, "server listening");
    println!("repodoc server listening on http://{}", bind_addr);

    axum::serve(listener, router(orch)).await?;
    Ok(())
}

pub fn router(orch: Arc<Orchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_home))
        .route("/health", get(handle_health))
        .route("/repo", post(handle_generate))
        .route("/projects", get(handle_list_projects))
        .route("/projects/{id}/files", get(handle_project_files))
        .route("/projects/{id}/readme", get(handle_project_readme))
        .layer(cors)
        .with_state(AppState { orch })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::ProjectNotFound(_) | Error::ArtifactNotFound(_) | Error::RepositoryNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::InvalidProjectName(_) | Error::InvalidGitUrl(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateProject(_) | Error::RunInProgress(_) => StatusCode::CONFLICT,
            Error::CloneFailed(_) | Error::ModelCall(_) | Error::StoreWrite(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!(code = err.code(), error = %err, "request failed");
        }
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ============ Handlers ============

async fn handle_home() -> Json<&'static str> {
    Json("The App is up and running")
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Deserialize)]
struct RepoRequest {
    project_name: String,
    git_url: String,
}

/// Body returned by `POST /repo` on success. Field names are part of the
/// API consumed by existing clients.
#[derive(Serialize)]
struct RepoResponse {
    message: String,
    #[serde(rename = "isSuccess")]
    is_success: bool,
    #[serde(rename = "statusCode")]
    status_code: u16,
}

async fn handle_generate(
    State(state): State<AppState>,
    Json(body): Json<RepoRequest>,
) -> Result<(StatusCode, Json<RepoResponse>), AppError> {
    info!(project = %body.project_name, url = %body.git_url, "generate requested");
    let report = state
        .orch
        .generate(&body.project_name, &body.git_url)
        .await?;
    info!(
        project = %report.project_name,
        files = report.files_summarized,
        failed = report.files_failed,
        "generate finished"
    );

    Ok((
        StatusCode::CREATED,
        Json(RepoResponse {
            message: "Success".to_string(),
            is_success: true,
            status_code: StatusCode::CREATED.as_u16(),
        }),
    ))
}

async fn handle_list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, AppError> {
    Ok(Json(state.orch.store().list_projects().await?))
}

async fn handle_project_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProjectFile>>, AppError> {
    Ok(Json(state.orch.store().get_files_by_project_id(&id).await?))
}

async fn handle_project_readme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<String>, AppError> {
    Ok(Json(state.orch.store().get_readme_by_project_id(&id).await?))
}
