use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use agora_db::is_unique_violation;
use agora_db::models::UserRow;
use agora_db::users::UserChanges;
use agora_types::api::{Claims, CreateUserRequest, UpdateUserRequest, UserResponse};
use agora_types::models::UserRole;

use crate::auth::{AppState, hash_password};
use crate::error::ApiError;
use crate::{parse_ts, parse_uuid};

pub(crate) fn user_response(row: UserRow) -> UserResponse {
    UserResponse {
        id: parse_uuid(&row.id),
        email: row.email,
        name: row.name,
        cpf: row.cpf,
        role: UserRole::parse(&row.role).unwrap_or(UserRole::Citizen),
        is_active: row.is_active,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    }
}

fn validate_registration(req: &CreateUserRequest) -> Result<(), ApiError> {
    if !req.email.contains('@') {
        return Err(ApiError::Validation("Invalid email address"));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name must not be empty"));
    }
    if req.cpf.len() != 11 || !req.cpf.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::Validation("CPF must be exactly 11 digits"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}

/// Registration. Always produces a citizen; the UNIQUE columns are the
/// source of truth for duplicates, the pre-checks only pick the message.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_registration(&req)?;

    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered"));
    }
    if state.db.get_user_by_cpf(&req.cpf)?.is_some() {
        return Err(ApiError::Conflict("CPF already registered"));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    if let Err(e) = state.db.create_user(
        &user_id.to_string(),
        &req.email,
        &req.name,
        &req.cpf,
        &password_hash,
        UserRole::Citizen.as_str(),
    ) {
        // race loser: another registration with the same email or cpf
        // committed between the pre-check and this insert
        if is_unique_violation(&e) {
            return Err(ApiError::Conflict("Email or CPF already registered"));
        }
        return Err(e.into());
    }

    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| anyhow::anyhow!("user vanished after insert"))?;

    Ok((StatusCode::CREATED, Json(user_response(user))))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.db.list_users()?;
    Ok(Json(
        users.into_iter().map(user_response).collect::<Vec<_>>(),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user_response(user)))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&id.to_string())?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user_response(user)))
}

pub async fn get_by_cpf(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_cpf(&cpf)?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user_response(user)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(email) = &req.email
        && !email.contains('@')
    {
        return Err(ApiError::Validation("Invalid email address"));
    }
    if let Some(password) = &req.password
        && password.len() < 8
    {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters",
        ));
    }

    // password changes are re-hashed, never stored raw
    let password = req.password.as_deref().map(hash_password).transpose()?;

    let changes = UserChanges {
        email: req.email,
        name: req.name,
        password,
        is_active: req.is_active,
    };

    match state.db.update_user(&id.to_string(), &changes) {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::NotFound("User not found")),
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict("Email already registered"));
        }
        Err(e) => return Err(e.into()),
    }

    let user = state
        .db
        .get_user_by_id(&id.to_string())?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user_response(user)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_user(&id.to_string())? {
        return Err(ApiError::NotFound("User not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
