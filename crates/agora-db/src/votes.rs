use anyhow::Result;
use rusqlite::{Connection, TransactionBehavior};

use agora_types::models::VoteDirection;

use crate::models::VoteRow;
use crate::projects::project_counters;
use crate::{Database, OptionalExt};

fn counter_column(direction: VoteDirection) -> &'static str {
    match direction {
        VoteDirection::Up => "votes_for",
        VoteDirection::Down => "votes_against",
    }
}

impl Database {
    /// Cast or revise a vote. The counter adjustment and the vote row
    /// always commit in one IMMEDIATE transaction; together with the
    /// connection mutex this serializes every read-modify-write on the
    /// (user, project) pair, so no increment can be lost.
    ///
    /// Returns `None` when the project does not exist (no side effects).
    /// `new_id` is used only when this is the user's first vote on the
    /// project.
    pub fn cast_vote(
        &self,
        new_id: &str,
        user_id: &str,
        project_id: &str,
        direction: VoteDirection,
        comment: Option<&str>,
    ) -> Result<Option<VoteRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if project_counters(&tx, project_id)?.is_none() {
                return Ok(None);
            }

            let existing: Option<(String, String)> = tx
                .query_row(
                    "SELECT id, direction FROM votes WHERE project_id = ?1 AND user_id = ?2",
                    [project_id, user_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let vote_id = match existing {
                None => {
                    tx.execute(
                        "INSERT INTO votes (id, project_id, user_id, direction, comment)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        rusqlite::params![new_id, project_id, user_id, direction.as_str(), comment],
                    )?;
                    let col = counter_column(direction);
                    tx.execute(
                        &format!(
                            "UPDATE projects SET {col} = {col} + 1, updated_at = datetime('now')
                             WHERE id = ?1"
                        ),
                        [project_id],
                    )?;
                    new_id.to_string()
                }
                Some((vote_id, old)) if old != direction.as_str() => {
                    // Direction flip: both counters move in one statement so
                    // no committed state ever reflects half the flip.
                    let inc = counter_column(direction);
                    let dec = match direction {
                        VoteDirection::Up => "votes_against",
                        VoteDirection::Down => "votes_for",
                    };
                    tx.execute(
                        &format!(
                            "UPDATE projects SET {inc} = {inc} + 1, {dec} = {dec} - 1,
                                 updated_at = datetime('now')
                             WHERE id = ?1"
                        ),
                        [project_id],
                    )?;
                    tx.execute(
                        "UPDATE votes SET direction = ?2, comment = COALESCE(?3, comment),
                             updated_at = datetime('now')
                         WHERE id = ?1",
                        rusqlite::params![vote_id, direction.as_str(), comment],
                    )?;
                    vote_id
                }
                Some((vote_id, _)) => {
                    // Same direction: counters untouched. Comment-only
                    // revision when one was supplied, otherwise a no-op.
                    if let Some(c) = comment {
                        tx.execute(
                            "UPDATE votes SET comment = ?2, updated_at = datetime('now')
                             WHERE id = ?1",
                            rusqlite::params![vote_id, c],
                        )?;
                    }
                    vote_id
                }
            };

            let row = query_vote_by_id(&tx, &vote_id)?;
            tx.commit()?;
            Ok(row)
        })
    }

    /// Remove a user's vote on a project. Returns false when no vote row
    /// exists (nothing is mutated). The matching counter is decremented
    /// with a floor of zero; a project deleted independently does not
    /// block deletion of the vote row.
    pub fn remove_vote(&self, user_id: &str, project_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let vote: Option<(String, String)> = tx
                .query_row(
                    "SELECT id, direction FROM votes WHERE project_id = ?1 AND user_id = ?2",
                    [project_id, user_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((vote_id, direction)) = vote else {
                return Ok(false);
            };

            let col = match direction.as_str() {
                "up" => "votes_for",
                _ => "votes_against",
            };
            // Affects zero rows when the project is already gone.
            tx.execute(
                &format!(
                    "UPDATE projects SET {col} = MAX({col} - 1, 0), updated_at = datetime('now')
                     WHERE id = ?1"
                ),
                [project_id],
            )?;
            tx.execute("DELETE FROM votes WHERE id = ?1", [&vote_id])?;

            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_vote(&self, user_id: &str, project_id: &str) -> Result<Option<VoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(
                false,
                "WHERE v.project_id = ?1 AND v.user_id = ?2",
            ))?;
            let row = stmt
                .query_row([project_id, user_id], vote_from_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Newest first. The voter's name is joined only on request.
    pub fn get_votes_for_project(
        &self,
        project_id: &str,
        include_user: bool,
    ) -> Result<Vec<VoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(include_user, "WHERE v.project_id = ?1"))?;
            let rows = stmt
                .query_map([project_id], vote_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Newest first.
    pub fn get_votes_by_user(&self, user_id: &str) -> Result<Vec<VoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(false, "WHERE v.user_id = ?1"))?;
            let rows = stmt
                .query_map([user_id], vote_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn select_sql(include_user: bool, filter: &str) -> String {
    let user_col = if include_user { "u.name" } else { "NULL" };
    let join = if include_user {
        "LEFT JOIN users u ON v.user_id = u.id"
    } else {
        ""
    };
    format!(
        "SELECT v.id, v.project_id, v.user_id, v.direction, v.comment, {user_col},
                v.created_at, v.updated_at
         FROM votes v {join} {filter}
         ORDER BY v.created_at DESC, v.rowid DESC"
    )
}

fn vote_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<VoteRow, rusqlite::Error> {
    Ok(VoteRow {
        id: row.get(0)?,
        project_id: row.get(1)?,
        user_id: row.get(2)?,
        direction: row.get(3)?,
        comment: row.get(4)?,
        user_name: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn query_vote_by_id(conn: &Connection, id: &str) -> Result<Option<VoteRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, user_id, direction, comment, NULL, created_at, updated_at
         FROM votes WHERE id = ?1",
    )?;
    let row = stmt.query_row([id], vote_from_row).optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("alice", "ana@example.com", "Ana", "11122233344", "h", "citizen")
            .unwrap();
        db.create_user("bob", "bob@example.com", "Bob", "55566677788", "h", "citizen")
            .unwrap();
        db.create_project("p1", "Bike lanes", "More bike lanes", "transportation", "voting", "Centro", "alice")
            .unwrap();
        db
    }

    fn counters(db: &Database, id: &str) -> (i64, i64) {
        let p = db.get_project(id, false).unwrap().unwrap();
        (p.votes_for, p.votes_against)
    }

    /// Counter invariant: counters always equal the per-direction row counts.
    fn assert_invariant(db: &Database, project_id: &str) {
        let votes = db.get_votes_for_project(project_id, false).unwrap();
        let up = votes.iter().filter(|v| v.direction == "up").count() as i64;
        let down = votes.iter().filter(|v| v.direction == "down").count() as i64;
        assert_eq!(counters(db, project_id), (up, down));
    }

    #[test]
    fn first_vote_creates_row_and_counts() {
        let db = db();
        let vote = db
            .cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap()
            .unwrap();
        assert_eq!(vote.direction, "up");
        assert_eq!(counters(&db, "p1"), (1, 0));
        assert_invariant(&db, "p1");
    }

    #[test]
    fn missing_project_has_no_side_effects() {
        let db = db();
        let out = db
            .cast_vote("v1", "alice", "nope", VoteDirection::Up, None)
            .unwrap();
        assert!(out.is_none());
        assert!(db.get_vote("alice", "nope").unwrap().is_none());
    }

    #[test]
    fn same_direction_without_comment_is_idempotent() {
        let db = db();
        let first = db
            .cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap()
            .unwrap();
        let second = db
            .cast_vote("v2", "alice", "p1", VoteDirection::Up, None)
            .unwrap()
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.updated_at, first.updated_at);
        assert_eq!(counters(&db, "p1"), (1, 0));
        assert_eq!(db.get_votes_for_project("p1", false).unwrap().len(), 1);
    }

    #[test]
    fn same_direction_with_comment_updates_comment_only() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        let vote = db
            .cast_vote("v2", "alice", "p1", VoteDirection::Up, Some("great idea"))
            .unwrap()
            .unwrap();

        assert_eq!(vote.id, "v1");
        assert_eq!(vote.comment.as_deref(), Some("great idea"));
        assert_eq!(counters(&db, "p1"), (1, 0));
    }

    #[test]
    fn direction_flip_moves_both_counters() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        let vote = db
            .cast_vote("v2", "alice", "p1", VoteDirection::Down, None)
            .unwrap()
            .unwrap();

        assert_eq!(vote.id, "v1");
        assert_eq!(vote.direction, "down");
        assert_eq!(counters(&db, "p1"), (0, 1));
        assert_eq!(db.get_votes_for_project("p1", false).unwrap().len(), 1);
        assert_invariant(&db, "p1");
    }

    #[test]
    fn flip_keeps_existing_comment_when_none_supplied() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, Some("yes"))
            .unwrap();
        let vote = db
            .cast_vote("v2", "alice", "p1", VoteDirection::Down, None)
            .unwrap()
            .unwrap();
        assert_eq!(vote.comment.as_deref(), Some("yes"));
    }

    #[test]
    fn remove_missing_vote_mutates_nothing() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();

        assert!(!db.remove_vote("bob", "p1").unwrap());
        assert_eq!(counters(&db, "p1"), (1, 0));
    }

    #[test]
    fn remove_decrements_matching_counter() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Down, None)
            .unwrap();

        assert!(db.remove_vote("alice", "p1").unwrap());
        assert_eq!(counters(&db, "p1"), (0, 0));
        assert!(db.get_vote("alice", "p1").unwrap().is_none());
        assert_invariant(&db, "p1");
    }

    #[test]
    fn remove_clamps_counter_at_zero() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        // simulate prior corruption
        db.with_conn(|conn| {
            conn.execute("UPDATE projects SET votes_for = 0 WHERE id = 'p1'", [])?;
            Ok(())
        })
        .unwrap();

        assert!(db.remove_vote("alice", "p1").unwrap());
        assert_eq!(counters(&db, "p1"), (0, 0));
    }

    #[test]
    fn remove_then_recast_round_trips() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        db.remove_vote("alice", "p1").unwrap();
        db.cast_vote("v2", "alice", "p1", VoteDirection::Up, None)
            .unwrap();

        assert_eq!(counters(&db, "p1"), (1, 0));
        let votes = db.get_votes_for_project("p1", false).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].direction, "up");
    }

    #[test]
    fn vote_survives_project_deletion_and_can_be_removed() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        assert!(db.delete_project("p1").unwrap());

        // the row is still readable and removable
        assert!(db.get_vote("alice", "p1").unwrap().is_some());
        assert!(db.remove_vote("alice", "p1").unwrap());
        assert!(db.get_vote("alice", "p1").unwrap().is_none());
    }

    #[test]
    fn two_users_worked_example() {
        let db = db();

        // A votes up: 0 -> 1
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        assert_eq!(counters(&db, "p1"), (1, 0));

        // A flips down: for 1 -> 0, against 0 -> 1
        db.cast_vote("v2", "alice", "p1", VoteDirection::Down, None)
            .unwrap();
        assert_eq!(counters(&db, "p1"), (0, 1));

        // B votes up: for 0 -> 1
        db.cast_vote("v3", "bob", "p1", VoteDirection::Up, None)
            .unwrap();
        assert_eq!(counters(&db, "p1"), (1, 1));

        // removing A's vote: against 1 -> 0
        db.remove_vote("alice", "p1").unwrap();
        assert_eq!(counters(&db, "p1"), (1, 0));
        assert_invariant(&db, "p1");
    }

    #[test]
    fn concurrent_casts_lose_no_increments() {
        use std::sync::Arc;
        use std::thread;

        let db = Arc::new(db());
        let voters = 8;
        for i in 0..voters {
            db.create_user(
                &format!("c{i}"),
                &format!("c{i}@example.com"),
                &format!("Voter {i}"),
                &format!("{:011}", 10000000000u64 + i),
                "h",
                "citizen",
            )
            .unwrap();
        }

        // Each voter casts up, flips down, flips back up, racing the
        // others on the same project's counters.
        let handles: Vec<_> = (0..voters)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    let user = format!("c{i}");
                    for (j, direction) in
                        [VoteDirection::Up, VoteDirection::Down, VoteDirection::Up]
                            .into_iter()
                            .enumerate()
                    {
                        db.cast_vote(&format!("v{i}-{j}"), &user, "p1", direction, None)
                            .unwrap()
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters(&db, "p1"), (voters as i64, 0));
        assert_eq!(
            db.get_votes_for_project("p1", false).unwrap().len(),
            voters as usize
        );
        assert_invariant(&db, "p1");
    }

    #[test]
    fn project_votes_listed_newest_first() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        db.cast_vote("v2", "bob", "p1", VoteDirection::Down, None)
            .unwrap();

        let votes = db.get_votes_for_project("p1", false).unwrap();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].user_id, "bob");
        assert_eq!(votes[1].user_id, "alice");
    }

    #[test]
    fn voter_name_join_is_opt_in() {
        let db = db();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();

        let plain = db.get_votes_for_project("p1", false).unwrap();
        assert!(plain[0].user_name.is_none());

        let joined = db.get_votes_for_project("p1", true).unwrap();
        assert_eq!(joined[0].user_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn my_votes_spans_projects() {
        let db = db();
        db.create_project("p2", "Park", "New park", "environment", "voting", "Sul", "alice")
            .unwrap();
        db.cast_vote("v1", "alice", "p1", VoteDirection::Up, None)
            .unwrap();
        db.cast_vote("v2", "alice", "p2", VoteDirection::Down, None)
            .unwrap();

        let mine = db.get_votes_by_user("alice").unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].project_id, "p2");
        assert_eq!(mine[1].project_id, "p1");
    }
}
