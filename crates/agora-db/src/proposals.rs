use anyhow::Result;

use crate::models::ProposalRow;
use crate::{Database, OptionalExt};

#[derive(Default)]
pub struct ProposalChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    pub status: Option<String>,
}

impl Database {
    pub fn create_proposal(
        &self,
        id: &str,
        title: &str,
        description: &str,
        category: &str,
        neighborhood: &str,
        author_id: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            // proposals always start life as drafts
            conn.execute(
                "INSERT INTO community_proposals (id, title, description, category, status, neighborhood, author_id)
                 VALUES (?1, ?2, ?3, ?4, 'draft', ?5, ?6)",
                (id, title, description, category, neighborhood, author_id),
            )?;
            Ok(())
        })
    }

    pub fn get_proposal(&self, id: &str) -> Result<Option<ProposalRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql("WHERE id = ?1"))?;
            let row = stmt.query_row([id], proposal_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_proposals(&self) -> Result<Vec<ProposalRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(""))?;
            let rows = stmt
                .query_map([], proposal_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_proposal(&self, id: &str, changes: &ProposalChanges) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE community_proposals SET
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

    pub fn delete_proposal(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected =
                conn.execute("DELETE FROM community_proposals WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    /// Proposal counts grouped by category, for the stats endpoint.
    pub fn count_proposals_by_category(&self) -> Result<Vec<(String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT category, COUNT(id) FROM community_proposals
                 GROUP BY category ORDER BY category",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn select_sql(filter: &str) -> String {
    format!(
        "SELECT id, title, description, category, status, neighborhood, author_id,
                created_at, updated_at
         FROM community_proposals {filter}
         ORDER BY created_at DESC, rowid DESC"
    )
}

fn proposal_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<ProposalRow, rusqlite::Error> {
    Ok(ProposalRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        status: row.get(4)?,
        neighborhood: row.get(5)?,
        author_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
