use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use agora_db::models::ProjectRow;
use agora_db::projects::ProjectChanges;
use agora_types::api::{
    AuthorRef, Claims, CreateProjectRequest, ProjectResponse, UpdateProjectRequest,
};
use agora_types::models::{TargetCategory, TargetStatus};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{parse_ts, parse_uuid};

/// Relation loading is opt-in: `?include=author` joins the author name.
#[derive(Debug, Deserialize, Default)]
pub struct IncludeQuery {
    pub include: Option<String>,
}

impl IncludeQuery {
    pub(crate) fn author(&self) -> bool {
        self.include.as_deref() == Some("author")
    }

    pub(crate) fn user(&self) -> bool {
        self.include.as_deref() == Some("user")
    }
}

fn project_response(row: ProjectRow) -> ProjectResponse {
    let author = row.author_name.as_ref().map(|name| AuthorRef {
        id: parse_uuid(&row.author_id),
        name: name.clone(),
    });
    ProjectResponse {
        id: parse_uuid(&row.id),
        title: row.title,
        description: row.description,
        category: TargetCategory::parse(&row.category).unwrap_or(TargetCategory::Other),
        status: TargetStatus::parse(&row.status).unwrap_or(TargetStatus::Draft),
        neighborhood: row.neighborhood,
        votes_for: row.votes_for,
        votes_against: row.votes_against,
        author_id: parse_uuid(&row.author_id),
        author,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    }
}

/// Creation is role-gated to councilors and admins at the router layer;
/// the author is always the authenticated caller.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title must not be empty"));
    }

    let id = Uuid::new_v4();
    let status = req.status.unwrap_or(TargetStatus::Draft);
    state.db.create_project(
        &id.to_string(),
        &req.title,
        &req.description,
        req.category.as_str(),
        status.as_str(),
        &req.neighborhood,
        &claims.sub.to_string(),
    )?;

    let project = state
        .db
        .get_project(&id.to_string(), false)?
        .ok_or_else(|| anyhow::anyhow!("project vanished after insert"))?;
    Ok((StatusCode::CREATED, Json(project_response(project))))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<IncludeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state.db.list_projects(query.author())?;
    Ok(Json(
        projects
            .into_iter()
            .map(project_response)
            .collect::<Vec<_>>(),
    ))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .db
        .get_project(&id.to_string(), query.author())?
        .ok_or(ApiError::NotFound("Project not found"))?;
    Ok(Json(project_response(project)))
}

pub async fn list_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state.db.list_projects_by_author(&author_id.to_string())?;
    Ok(Json(
        projects
            .into_iter()
            .map(project_response)
            .collect::<Vec<_>>(),
    ))
}

/// Only the author may mutate a project, regardless of role.
fn check_author(row: &ProjectRow, claims: &Claims) -> Result<(), ApiError> {
    if row.author_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden(
            "Only the author may modify this project",
        ));
    }
    Ok(())
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .db
        .get_project(&id.to_string(), false)?
        .ok_or(ApiError::NotFound("Project not found"))?;
    check_author(&project, &claims)?;

    let changes = ProjectChanges {
        title: req.title,
        description: req.description,
        category: req.category.map(|c| c.as_str().to_string()),
        neighborhood: req.neighborhood,
        status: req.status.map(|s| s.as_str().to_string()),
    };
    state.db.update_project(&id.to_string(), &changes)?;

    let project = state
        .db
        .get_project(&id.to_string(), false)?
        .ok_or(ApiError::NotFound("Project not found"))?;
    Ok(Json(project_response(project)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .db
        .get_project(&id.to_string(), false)?
        .ok_or(ApiError::NotFound("Project not found"))?;
    check_author(&project, &claims)?;

    state.db.delete_project(&id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}
