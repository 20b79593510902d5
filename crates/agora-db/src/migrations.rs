use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL,
            cpf         TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'citizen',
            is_active   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS projects (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            category        TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'draft',
            neighborhood    TEXT NOT NULL,
            votes_for       INTEGER NOT NULL DEFAULT 0,
            votes_against   INTEGER NOT NULL DEFAULT 0,
            author_id       TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_projects_author
            ON projects(author_id, created_at);

        CREATE TABLE IF NOT EXISTS reports (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            category        TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'draft',
            priority        TEXT NOT NULL DEFAULT 'medium',
            location        TEXT,
            author_id       TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_reports_author
            ON reports(author_id, created_at);

        CREATE TABLE IF NOT EXISTS community_proposals (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            category        TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'draft',
            neighborhood    TEXT NOT NULL,
            author_id       TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Vote rows reference users and projects by id only. No FOREIGN KEY
        -- on project_id: a vote row must still be removable after its
        -- project has been deleted independently.
        CREATE TABLE IF NOT EXISTS votes (
            id          TEXT PRIMARY KEY,
            project_id  TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            direction   TEXT NOT NULL,
            comment     TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(project_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_votes_project
            ON votes(project_id);
        CREATE INDEX IF NOT EXISTS idx_votes_user
            ON votes(user_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
