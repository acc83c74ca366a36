//! Read-only HTTP endpoints over the stored teams and category tables.

use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Category;
use crate::store::{load_category_record, load_teams};

pub const MAX_TEAMS_LIMIT: u32 = 100;

/// Shared across workers; sqlite access is serialized through the mutex.
pub struct AppState {
    pub conn: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TeamsQuery {
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    MAX_TEAMS_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    pub season: String,
}

/// Browser access for the frontend at `origin`, credentials allowed.
pub fn cors(origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(origin)
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

/// Routes plus a query extractor that reports bad parameters in the JSON
/// error shape.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into());
    cfg.app_data(query_config)
        .route("/", web::get().to(read_root))
        .route("/teams", web::get().to(read_teams))
        .route("/teams/{team_id}/{category}", web::get().to(read_team_category));
}

async fn read_root() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "FBref stats API is running" }))
}

async fn read_teams(
    state: web::Data<AppState>,
    query: web::Query<TeamsQuery>,
) -> Result<HttpResponse, ApiError> {
    let TeamsQuery { offset, limit } = query.into_inner();
    if limit > MAX_TEAMS_LIMIT {
        return Err(ApiError::Validation(format!(
            "limit must be at most {MAX_TEAMS_LIMIT}, got {limit}"
        )));
    }
    let teams = with_conn(state, move |conn| load_teams(conn, offset, limit)).await?;
    Ok(HttpResponse::Ok().json(teams))
}

/// Returns the team's record for the season, or JSON `null` when none is stored.
async fn read_team_category(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<SeasonQuery>,
) -> Result<HttpResponse, ApiError> {
    let (team_id, slug) = path.into_inner();
    let category = Category::from_route_slug(&slug)
        .ok_or_else(|| ApiError::NotFound(format!("unknown category '{slug}'")))?;
    let season = query.into_inner().season;
    let record = with_conn(state, move |conn| {
        load_category_record(conn, category, &team_id, &season)
    })
    .await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn with_conn<T, F>(state: web::Data<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
{
    web::block(move || {
        let conn = state
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        f(&conn)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| ApiError::Internal(format!("{e:#}")))
}
