use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ReportPriority, TargetCategory, TargetStatus, UserRole, VoteDirection};

// -- JWT Claims --

/// Bearer-token claims shared between token issuance (login) and the
/// access guard middleware. Canonical definition lives here in agora-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub cpf: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: UserRole,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub cpf: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

/// Outward projection of a user. The password hash never appears here.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub cpf: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Slim author projection attached when `include=author` is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
}

// -- Projects --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub category: TargetCategory,
    pub neighborhood: String,
    pub status: Option<TargetStatus>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TargetCategory>,
    pub neighborhood: Option<String>,
    pub status: Option<TargetStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: TargetCategory,
    pub status: TargetStatus,
    pub neighborhood: String,
    pub votes_for: i64,
    pub votes_against: i64,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRef>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// -- Reports --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReportRequest {
    pub title: String,
    pub description: String,
    pub category: TargetCategory,
    pub location: Option<String>,
    pub priority: Option<ReportPriority>,
    pub status: Option<TargetStatus>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TargetCategory>,
    pub location: Option<String>,
    pub priority: Option<ReportPriority>,
    pub status: Option<TargetStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: TargetCategory,
    pub status: TargetStatus,
    pub priority: ReportPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRef>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// -- Community proposals --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProposalRequest {
    pub title: String,
    pub description: String,
    pub category: TargetCategory,
    pub neighborhood: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateProposalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TargetCategory>,
    pub neighborhood: Option<String>,
    pub status: Option<TargetStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: TargetCategory,
    pub status: TargetStatus,
    pub neighborhood: String,
    pub author_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Per-category proposal counts for the stats endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: TargetCategory,
    pub count: i64,
}

// -- Votes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CastVoteRequest {
    #[serde(rename = "type")]
    pub direction: VoteDirection,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub direction: VoteDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthorRef>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// -- Generic --

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}
