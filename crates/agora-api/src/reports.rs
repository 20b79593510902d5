use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use agora_db::models::ReportRow;
use agora_db::reports::ReportChanges;
use agora_types::api::{
    AuthorRef, Claims, CreateReportRequest, ReportResponse, UpdateReportRequest,
};
use agora_types::models::{ReportPriority, TargetCategory, TargetStatus};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::projects::IncludeQuery;
use crate::{parse_ts, parse_uuid};

fn report_response(row: ReportRow) -> ReportResponse {
    let author = row.author_name.as_ref().map(|name| AuthorRef {
        id: parse_uuid(&row.author_id),
        name: name.clone(),
    });
    ReportResponse {
        id: parse_uuid(&row.id),
        title: row.title,
        description: row.description,
        category: TargetCategory::parse(&row.category).unwrap_or(TargetCategory::Other),
        status: TargetStatus::parse(&row.status).unwrap_or(TargetStatus::Draft),
        priority: ReportPriority::parse(&row.priority).unwrap_or(ReportPriority::Medium),
        location: row.location,
        author_id: parse_uuid(&row.author_id),
        author,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title must not be empty"));
    }

    let id = Uuid::new_v4();
    let status = req.status.unwrap_or(TargetStatus::Active);
    let priority = req.priority.unwrap_or(ReportPriority::Medium);
    state.db.create_report(
        &id.to_string(),
        &req.title,
        &req.description,
        req.category.as_str(),
        status.as_str(),
        priority.as_str(),
        req.location.as_deref(),
        &claims.sub.to_string(),
    )?;

    let report = state
        .db
        .get_report(&id.to_string(), false)?
        .ok_or_else(|| anyhow::anyhow!("report vanished after insert"))?;
    Ok((StatusCode::CREATED, Json(report_response(report))))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<IncludeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = state.db.list_reports(query.author())?;
    Ok(Json(
        reports.into_iter().map(report_response).collect::<Vec<_>>(),
    ))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .db
        .get_report(&id.to_string(), query.author())?
        .ok_or(ApiError::NotFound("Report not found"))?;
    Ok(Json(report_response(report)))
}

pub async fn list_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = state.db.list_reports_by_author(&author_id.to_string())?;
    Ok(Json(
        reports.into_iter().map(report_response).collect::<Vec<_>>(),
    ))
}

fn check_author(row: &ReportRow, claims: &Claims) -> Result<(), ApiError> {
    if row.author_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden(
            "Only the author may modify this report",
        ));
    }
    Ok(())
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .db
        .get_report(&id.to_string(), false)?
        .ok_or(ApiError::NotFound("Report not found"))?;
    check_author(&report, &claims)?;

    let changes = ReportChanges {
        title: req.title,
        description: req.description,
        category: req.category.map(|c| c.as_str().to_string()),
        location: req.location,
        priority: req.priority.map(|p| p.as_str().to_string()),
        status: req.status.map(|s| s.as_str().to_string()),
    };
    state.db.update_report(&id.to_string(), &changes)?;

    let report = state
        .db
        .get_report(&id.to_string(), false)?
        .ok_or(ApiError::NotFound("Report not found"))?;
    Ok(Json(report_response(report)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .db
        .get_report(&id.to_string(), false)?
        .ok_or(ApiError::NotFound("Report not found"))?;
    check_author(&report, &claims)?;

    state.db.delete_report(&id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}
