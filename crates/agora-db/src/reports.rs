use anyhow::Result;

use crate::models::ReportRow;
use crate::{Database, OptionalExt};

#[derive(Default)]
pub struct ReportChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn create_report(
        &self,
        id: &str,
        title: &str,
        description: &str,
        category: &str,
        status: &str,
        priority: &str,
        location: Option<&str>,
        author_id: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reports (id, title, description, category, status, priority, location, author_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                (id, title, description, category, status, priority, location, author_id),
            )?;
            Ok(())
        })
    }

    pub fn get_report(&self, id: &str, include_author: bool) -> Result<Option<ReportRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(include_author, "WHERE r.id = ?1"))?;
            let row = stmt.query_row([id], report_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_reports(&self, include_author: bool) -> Result<Vec<ReportRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(include_author, ""))?;
            let rows = stmt
                .query_map([], report_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_reports_by_author(&self, author_id: &str) -> Result<Vec<ReportRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(false, "WHERE r.author_id = ?1"))?;
            let rows = stmt
                .query_map([author_id], report_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_report(&self, id: &str, changes: &ReportChanges) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE reports SET
                     title = COALESCE(?2, title),
                     description = COALESCE(?3, description),
                     category = COALESCE(?4, category),
                     location = COALESCE(?5, location),
                     priority = COALESCE(?6, priority),
                     status = COALESCE(?7, status),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    changes.title,
                    changes.description,
                    changes.category,
                    changes.location,
                    changes.priority,
                    changes.status,
                ],
            )?;
            Ok(affected > 0)
        })
    }

    pub fn delete_report(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM reports WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}

fn select_sql(include_author: bool, filter: &str) -> String {
    let author_col = if include_author { "u.name" } else { "NULL" };
    let join = if include_author {
        "LEFT JOIN users u ON r.author_id = u.id"
    } else {
        ""
    };
    format!(
        "SELECT r.id, r.title, r.description, r.category, r.status, r.priority,
                r.location, r.author_id, {author_col}, r.created_at, r.updated_at
         FROM reports r {join} {filter}
         ORDER BY r.created_at DESC, r.rowid DESC"
    )
}

fn report_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<ReportRow, rusqlite::Error> {
    Ok(ReportRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        location: row.get(6)?,
        author_id: row.get(7)?,
        author_name: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_crud_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana@example.com", "Ana", "11122233344", "h", "citizen")
            .unwrap();
        db.create_report("r1", "Pothole", "Big pothole", "infrastructure", "active", "high", Some("Rua A, Centro"), "u1")
            .unwrap();

        let report = db.get_report("r1", false).unwrap().unwrap();
        assert_eq!(report.priority, "high");

        db.update_report(
            "r1",
            &ReportChanges {
                status: Some("approved".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let report = db.get_report("r1", false).unwrap().unwrap();
        assert_eq!(report.status, "approved");
        assert_eq!(report.title, "Pothole");

        assert!(db.delete_report("r1").unwrap());
        assert!(db.get_report("r1", false).unwrap().is_none());
    }
}
