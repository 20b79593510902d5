use anyhow::Result;
use rusqlite::Connection;

use crate::models::ProjectRow;
use crate::{Database, OptionalExt};

#[derive(Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    pub status: Option<String>,
}

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn create_project(
        &self,
        id: &str,
        title: &str,
        description: &str,
        category: &str,
        status: &str,
        neighborhood: &str,
        author_id: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (id, title, description, category, status, neighborhood, author_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (id, title, description, category, status, neighborhood, author_id),
            )?;
            Ok(())
        })
    }

    pub fn get_project(&self, id: &str, include_author: bool) -> Result<Option<ProjectRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(include_author, "WHERE p.id = ?1"))?;
            let row = stmt.query_row([id], project_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_projects(&self, include_author: bool) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(include_author, ""))?;
            let rows = stmt
                .query_map([], project_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_projects_by_author(&self, author_id: &str) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(false, "WHERE p.author_id = ?1"))?;
            let rows = stmt
                .query_map([author_id], project_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_project(&self, id: &str, changes: &ProjectChanges) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE projects SET
                     title = COALESCE(?2, title),
                     description = COALESCE(?3, description),
                     category = COALESCE(?4, category),
                     neighborhood = COALESCE(?5, neighborhood),
                     status = COALESCE(?6, status),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    changes.title,
                    changes.description,
                    changes.category,
                    changes.neighborhood,
                    changes.status,
                ],
            )?;
            Ok(affected > 0)
        })
    }

    pub fn delete_project(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}

/// Author loading is opt-in: the join runs only when the caller asked for
/// the author projection, so plain listings stay single-table scans.
fn select_sql(include_author: bool, filter: &str) -> String {
    let author_col = if include_author { "u.name" } else { "NULL" };
    let join = if include_author {
        "LEFT JOIN users u ON p.author_id = u.id"
    } else {
        ""
    };
    format!(
        "SELECT p.id, p.title, p.description, p.category, p.status, p.neighborhood,
                p.votes_for, p.votes_against, p.author_id, {author_col},
                p.created_at, p.updated_at
         FROM projects p {join} {filter}
         ORDER BY p.created_at DESC, p.rowid DESC"
    )
}

fn project_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<ProjectRow, rusqlite::Error> {
    Ok(ProjectRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        status: row.get(4)?,
        neighborhood: row.get(5)?,
        votes_for: row.get(6)?,
        votes_against: row.get(7)?,
        author_id: row.get(8)?,
        author_name: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

pub(crate) fn project_counters(conn: &Connection, id: &str) -> Result<Option<(i64, i64)>> {
    conn.query_row(
        "SELECT votes_for, votes_against FROM projects WHERE id = ?1",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana@example.com", "Ana", "11122233344", "h", "councilor")
            .unwrap();
        db
    }

    fn seed_project(db: &Database, id: &str) {
        db.create_project(id, "Bike lanes", "More bike lanes", "transportation", "draft", "Centro", "u1")
            .unwrap();
    }

    #[test]
    fn author_join_is_opt_in() {
        let db = db();
        seed_project(&db, "p1");

        let plain = db.get_project("p1", false).unwrap().unwrap();
        assert!(plain.author_name.is_none());

        let joined = db.get_project("p1", true).unwrap().unwrap();
        assert_eq!(joined.author_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn counters_start_at_zero() {
        let db = db();
        seed_project(&db, "p1");
        let p = db.get_project("p1", false).unwrap().unwrap();
        assert_eq!((p.votes_for, p.votes_against), (0, 0));
    }

    #[test]
    fn listing_by_author_filters() {
        let db = db();
        db.create_user("u2", "bia@example.com", "Bia", "55566677788", "h", "councilor")
            .unwrap();
        seed_project(&db, "p1");
        db.create_project("p2", "Park", "New park", "environment", "draft", "Sul", "u2")
            .unwrap();

        let mine = db.list_projects_by_author("u1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "p1");
    }
}
