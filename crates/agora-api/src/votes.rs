use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

use agora_db::models::VoteRow;
use agora_types::api::{ApiMessage, AuthorRef, CastVoteRequest, Claims, VoteResponse};
use agora_types::models::VoteDirection;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::projects::IncludeQuery;
use crate::{parse_ts, parse_uuid};

fn vote_response(row: VoteRow) -> VoteResponse {
    let user = row.user_name.as_ref().map(|name| AuthorRef {
        id: parse_uuid(&row.user_id),
        name: name.clone(),
    });
    VoteResponse {
        id: parse_uuid(&row.id),
        project_id: parse_uuid(&row.project_id),
        user_id: parse_uuid(&row.user_id),
        direction: VoteDirection::parse(&row.direction).unwrap_or(VoteDirection::Up),
        comment: row.comment,
        user,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    }
}

/// Cast or revise the caller's vote on a project. The ledger work is
/// blocking SQLite, so it runs off the async runtime.
pub async fn cast(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CastVoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let new_id = Uuid::new_v4().to_string();
    let user_id = claims.sub.to_string();
    let pid = project_id.to_string();

    let vote = tokio::task::spawn_blocking(move || {
        db.db
            .cast_vote(&new_id, &user_id, &pid, req.direction, req.comment.as_deref())
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        anyhow::anyhow!("vote task failed")
    })??;

    let vote = vote.ok_or(ApiError::NotFound("Project not found"))?;
    Ok((StatusCode::CREATED, Json(vote_response(vote))))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let pid = project_id.to_string();

    let removed = tokio::task::spawn_blocking(move || db.db.remove_vote(&user_id, &pid))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow::anyhow!("vote task failed")
        })??;

    if !removed {
        return Err(ApiError::NotFound("Vote not found"));
    }
    Ok(Json(ApiMessage {
        message: "Vote removed".into(),
    }))
}

/// The caller's own vote on a project; null when none exists.
pub async fn my_vote(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let vote = state
        .db
        .get_vote(&claims.sub.to_string(), &project_id.to_string())?;
    Ok(Json(vote.map(vote_response)))
}

/// Public listing of a project's votes, newest first. `?include=user`
/// attaches the voter's name.
pub async fn list_for_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<IncludeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let votes = state
        .db
        .get_votes_for_project(&project_id.to_string(), query.user())?;
    Ok(Json(
        votes.into_iter().map(vote_response).collect::<Vec<_>>(),
    ))
}

/// Every vote the caller has cast, newest first.
pub async fn my_votes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let votes = state.db.get_votes_by_user(&claims.sub.to_string())?;
    Ok(Json(
        votes.into_iter().map(vote_response).collect::<Vec<_>>(),
    ))
}
