/// Database row types — these map directly to SQLite rows.
/// Distinct from agora-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub cpf: String,
    pub password: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub neighborhood: String,
    pub votes_for: i64,
    pub votes_against: i64,
    pub author_id: String,
    /// Populated only when the author join was requested.
    pub author_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ReportRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub priority: String,
    pub location: Option<String>,
    pub author_id: String,
    pub author_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ProposalRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub neighborhood: String,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct VoteRow {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub direction: String,
    pub comment: Option<String>,
    /// Populated only when the voter join was requested.
    pub user_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
