pub mod auth;
pub mod error;
pub mod middleware;
pub mod projects;
pub mod proposals;
pub mod reports;
pub mod routes;
pub mod users;
pub mod votes;

use tracing::warn;
use uuid::Uuid;

/// Row ids are stored as uuid strings; a corrupt value is logged rather
/// than failing the whole response.
pub(crate) fn parse_uuid(s: &str) -> Uuid {
    s.parse().unwrap_or_else(|e| {
        warn!("Corrupt uuid '{}': {}", s, e);
        Uuid::default()
    })
}

pub(crate) fn parse_ts(s: &str) -> chrono::DateTime<chrono::Utc> {
    s.parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", s, e);
            chrono::DateTime::default()
        })
}
