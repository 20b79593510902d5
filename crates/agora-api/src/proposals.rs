use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use agora_db::models::ProposalRow;
use agora_db::proposals::ProposalChanges;
use agora_types::api::{
    CategoryCount, Claims, CreateProposalRequest, ProposalResponse, UpdateProposalRequest,
};
use agora_types::models::{TargetCategory, TargetStatus};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{parse_ts, parse_uuid};

fn proposal_response(row: ProposalRow) -> ProposalResponse {
    ProposalResponse {
        id: parse_uuid(&row.id),
        title: row.title,
        description: row.description,
        category: TargetCategory::parse(&row.category).unwrap_or(TargetCategory::Other),
        status: TargetStatus::parse(&row.status).unwrap_or(TargetStatus::Draft),
        neighborhood: row.neighborhood,
        author_id: parse_uuid(&row.author_id),
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title must not be empty"));
    }

    let id = Uuid::new_v4();
    state.db.create_proposal(
        &id.to_string(),
        &req.title,
        &req.description,
        req.category.as_str(),
        &req.neighborhood,
        &claims.sub.to_string(),
    )?;

    let proposal = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| anyhow::anyhow!("proposal vanished after insert"))?;
    Ok((StatusCode::CREATED, Json(proposal_response(proposal))))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let proposals = state.db.list_proposals()?;
    Ok(Json(
        proposals
            .into_iter()
            .map(proposal_response)
            .collect::<Vec<_>>(),
    ))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or(ApiError::NotFound("Proposal not found"))?;
    Ok(Json(proposal_response(proposal)))
}

pub async fn stats_by_category(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let counts = state.db.count_proposals_by_category()?;
    let counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: TargetCategory::parse(&category).unwrap_or(TargetCategory::Other),
            count,
        })
        .collect();
    Ok(Json(counts))
}

fn check_author(row: &ProposalRow, claims: &Claims) -> Result<(), ApiError> {
    if row.author_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden(
            "Only the author may modify this proposal",
        ));
    }
    Ok(())
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or(ApiError::NotFound("Proposal not found"))?;
    check_author(&proposal, &claims)?;

    let changes = ProposalChanges {
        title: req.title,
        description: req.description,
        category: req.category.map(|c| c.as_str().to_string()),
        neighborhood: req.neighborhood,
        status: req.status.map(|s| s.as_str().to_string()),
    };
    state.db.update_proposal(&id.to_string(), &changes)?;

    let proposal = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or(ApiError::NotFound("Proposal not found"))?;
    Ok(Json(proposal_response(proposal)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or(ApiError::NotFound("Proposal not found"))?;
    check_author(&proposal, &claims)?;

    state.db.delete_proposal(&id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}
