use anyhow::Result;
use rusqlite::Connection;

use crate::models::UserRow;
use crate::{Database, OptionalExt};

/// Optional column changes for a user update. `None` leaves the stored
/// value untouched; `password` must already be hashed by the caller.
#[derive(Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        name: &str,
        cpf: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, name, cpf, password, role) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, email, name, cpf, password_hash, role),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_cpf(&self, cpf: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "cpf", cpf))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Applies the supplied changes; returns false when the user is absent.
    pub fn update_user(&self, id: &str, changes: &UserChanges) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE users SET
                     email = COALESCE(?2, email),
                     name = COALESCE(?3, name),
                     password = COALESCE(?4, password),
                     is_active = COALESCE(?5, is_active),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    changes.email,
                    changes.name,
                    changes.password,
                    changes.is_active,
                ],
            )?;
            Ok(affected > 0)
        })
    }

    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, name, cpf, password, role, is_active, created_at, updated_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        cpf: row.get(3)?,
        password: row.get(4)?,
        role: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"
    ))?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_unique_violation;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn duplicate_email_rejected_by_constraint() {
        let db = db();
        db.create_user("u1", "ana@example.com", "Ana", "11122233344", "h", "citizen")
            .unwrap();

        // same email, fresh cpf: the UNIQUE column is the source of truth
        let err = db
            .create_user("u2", "ana@example.com", "Bia", "55566677788", "h", "citizen")
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn duplicate_cpf_rejected_by_constraint() {
        let db = db();
        db.create_user("u1", "ana@example.com", "Ana", "11122233344", "h", "citizen")
            .unwrap();

        let err = db
            .create_user("u2", "bia@example.com", "Bia", "11122233344", "h", "citizen")
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let db = db();
        db.create_user("u1", "ana@example.com", "Ana", "11122233344", "h", "citizen")
            .unwrap();

        let updated = db
            .update_user(
                "u1",
                &UserChanges {
                    name: Some("Ana Maria".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated);

        let user = db.get_user_by_id("u1").unwrap().unwrap();
        assert_eq!(user.name, "Ana Maria");
        assert_eq!(user.email, "ana@example.com");
        assert!(user.is_active);
    }

    #[test]
    fn update_missing_user_reports_absent() {
        let db = db();
        assert!(!db.update_user("nope", &UserChanges::default()).unwrap());
    }

    #[test]
    fn delete_reports_whether_row_existed() {
        let db = db();
        db.create_user("u1", "ana@example.com", "Ana", "11122233344", "h", "citizen")
            .unwrap();
        assert!(db.delete_user("u1").unwrap());
        assert!(!db.delete_user("u1").unwrap());
        assert!(db.get_user_by_id("u1").unwrap().is_none());
    }
}
