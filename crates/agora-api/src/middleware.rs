use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

pub use agora_types::api::Claims;
use agora_types::models::UserRole;

use crate::auth::AppState;
use crate::error::ApiError;

/// Extract the token from an `Authorization: Bearer <token>` value.
/// The scheme is case-sensitive with exactly one separating space.
fn bearer_token(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ")
}

fn decode_claims(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token"))
}

/// Access guard: validates the bearer token and attaches the claims to
/// the request. A request with no Authorization value is rejected before
/// the validator is ever invoked.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("Missing authentication token"))?;

    let token = bearer_token(value).ok_or(ApiError::Unauthorized("Missing authentication token"))?;

    let claims = decode_claims(token, &state.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Role guard for council-level operations; layered inside `require_auth`
/// so the claims extension is already present. Fails closed.
pub async fn require_council(req: Request, next: Next) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(ApiError::Unauthorized("Missing authentication token"))?;

    match claims.role {
        UserRole::Councilor | UserRole::Admin => Ok(next.run(req).await),
        UserRole::Citizen => Err(ApiError::Forbidden(
            "Operation restricted to councilors and administrators",
        )),
    }
}
