use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use agora_db::Database;
use agora_types::api::{Claims, LoginRequest, LoginResponse};
use agora_types::models::UserRole;

use crate::error::ApiError;
use crate::parse_uuid;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Tokens expire one hour after issuance.
const TOKEN_TTL_SECS: i64 = 3600;

/// One message for both an unknown cpf and a wrong password, so the
/// response never reveals which check failed.
fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials")
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.get_user_by_cpf(&req.cpf)?;

    // Hash even when the user is absent so the two failure paths cost
    // comparable work and stay indistinguishable through timing.
    let verified = match &user {
        Some(u) => verify_password(&req.password, &u.password),
        None => {
            burn_password(&req.password);
            false
        }
    };

    let user = match (user, verified) {
        (Some(u), true) => u,
        _ => return Err(invalid_credentials()),
    };

    let role = UserRole::parse(&user.role).unwrap_or(UserRole::Citizen);
    let token = create_token(&state.jwt_secret, parse_uuid(&user.id), role)?;

    Ok(Json(LoginResponse {
        access_token: token,
        role,
    }))
}

/// Argon2 verification against the stored PHC string. Fails closed on a
/// malformed hash.
fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

fn burn_password(plaintext: &str) {
    let salt = SaltString::generate(&mut OsRng);
    let _ = Argon2::default().hash_password(plaintext.as_bytes(), &salt);
}

pub(crate) fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub(crate) fn create_token(secret: &str, user_id: Uuid, role: UserRole) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        role,
        exp: (chrono::Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
