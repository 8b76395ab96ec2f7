//! SQLite-backed session and message log store via libsql.
//!
//! Two tables in one database file (`data/coach.db`): `sessions` keyed by the external session id,
//! and append-only `message_logs` ordered by (created_at, id).

use crate::domain::{Domain, DomainError, Role, StoredMessage};
use crate::ports::{MessageLogPort, SessionPort};
use libsql::{Database, params};
use std::path::Path;
use tracing::{debug, info};

const SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    survey_summary TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)"#;

const MESSAGE_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS message_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    domain TEXT,
    created_at INTEGER NOT NULL
)"#;
const MESSAGE_LOGS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_message_logs_session ON message_logs (session_id, created_at, id)";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Persistence(e.to_string())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

async fn has_column(
    conn: &libsql::Connection,
    table: &str,
    column: &str,
) -> Result<bool, DomainError> {
    let mut rows = conn
        .query(&format!("PRAGMA table_info({})", table), ())
        .await
        .map_err(repo_err)?;
    let mut found = false;
    while let Some(row) = rows.next().await.map_err(repo_err)? {
        let name: String = row.get(1).map_err(repo_err)?;
        found |= name == column;
    }
    Ok(found)
}

pub struct SqliteRepo {
    db: Database,
}

impl SqliteRepo {
    /// Connect to (or create) `coach.db` under `base_dir` and ensure the schema exists.
    /// Call once at startup; the returned repo is safe to share via Arc.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("coach.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row; use query and drain it (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Persistence(format!("WAL pragma failed: {}", e)))?;
        while wal_rows.next().await.map_err(repo_err)?.is_some() {}

        conn.execute(SESSIONS_TABLE, ()).await.map_err(repo_err)?;
        conn.execute(MESSAGE_LOGS_TABLE, ()).await.map_err(repo_err)?;
        conn.execute(MESSAGE_LOGS_INDEX, ()).await.map_err(repo_err)?;

        // Databases created before rows carried their domain.
        if !has_column(&conn, "message_logs", "domain").await? {
            conn.execute("ALTER TABLE message_logs ADD COLUMN domain TEXT", ())
                .await
                .map_err(repo_err)?;
            info!("message_logs: added domain column");
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db })
    }
}

#[async_trait::async_trait]
impl MessageLogPort for SqliteRepo {
    async fn append_messages(
        &self,
        session_id: &str,
        domain: Option<Domain>,
        rows: &[(Role, String)],
    ) -> Result<(), DomainError> {
        if rows.is_empty() {
            return Ok(());
        }
        let conn = self.db.connect().map_err(repo_err)?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        let created_at = now_millis();
        let domain = domain.map(|d| d.as_str());
        for (role, content) in rows {
            tx.execute(
                "INSERT INTO message_logs (session_id, role, content, domain, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![session_id, role.as_str(), content.as_str(), domain, created_at],
            )
            .await
            .map_err(repo_err)?;
        }
        tx.commit().await.map_err(repo_err)?;
        debug!(session_id, count = rows.len(), "appended message log rows");
        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, session_id, role, content, domain, created_at
                FROM message_logs
                WHERE session_id = ?1
                ORDER BY created_at ASC, id ASC
                "#,
                params![session_id],
            )
            .await
            .map_err(repo_err)?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            let role: String = row.get(2).map_err(repo_err)?;
            let domain: Option<String> = row.get(4).map_err(repo_err)?;
            messages.push(StoredMessage {
                id: row.get(0).map_err(repo_err)?,
                session_id: row.get(1).map_err(repo_err)?,
                role: Role::from_column(&role),
                content: row.get(3).map_err(repo_err)?,
                // Unknown ids (older schema, renamed domain) are kept as untagged rows.
                domain: domain.and_then(|d| d.parse().ok()),
                created_at: row.get(5).map_err(repo_err)?,
            });
        }
        Ok(messages)
    }
}

#[async_trait::async_trait]
impl SessionPort for SqliteRepo {
    async fn ensure_session(&self, session_id: &str) -> Result<(), DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        let now = now_millis();
        conn.execute(
            "INSERT INTO sessions (id, created_at, updated_at) VALUES (?1, ?2, ?2) ON CONFLICT (id) DO NOTHING",
            params![session_id, now],
        )
        .await
        .map_err(repo_err)?;
        Ok(())
    }

    async fn upsert_summary(&self, session_id: &str, summary: &str) -> Result<(), DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        let now = now_millis();
        conn.execute(
            r#"
            INSERT INTO sessions (id, survey_summary, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (id) DO UPDATE SET
                survey_summary = excluded.survey_summary,
                updated_at = excluded.updated_at
            "#,
            params![session_id, summary, now],
        )
        .await
        .map_err(repo_err)?;
        Ok(())
    }

    async fn get_summary(&self, session_id: &str) -> Result<Option<String>, DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        let mut rows = conn
            .query(
                "SELECT survey_summary FROM sessions WHERE id = ?1",
                params![session_id],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => row.get::<Option<String>>(0).map_err(repo_err),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_round_trip_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();

        repo.append_messages(
            "a",
            Some(Domain::SelfAwareness),
            &[(Role::User, "一つ目".into()), (Role::Assistant, "二つ目".into())],
        )
        .await
        .unwrap();
        repo.append_messages("b", None, &[(Role::User, "別セッション".into())])
            .await
            .unwrap();
        repo.append_messages("a", Some(Domain::Info), &[(Role::User, "三つ目".into())])
            .await
            .unwrap();

        let rows = repo.list_messages("a").await.unwrap();
        let got: Vec<(Role, &str, Option<Domain>)> = rows
            .iter()
            .map(|r| (r.role, r.content.as_str(), r.domain))
            .collect();
        assert_eq!(
            got,
            vec![
                (Role::User, "一つ目", Some(Domain::SelfAwareness)),
                (Role::Assistant, "二つ目", Some(Domain::SelfAwareness)),
                (Role::User, "三つ目", Some(Domain::Info)),
            ]
        );
        assert!(rows.iter().all(|r| r.session_id == "a"));
        assert_eq!(repo.list_messages("b").await.unwrap()[0].domain, None);
    }

    #[tokio::test]
    async fn session_summary_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();

        repo.ensure_session("s").await.unwrap();
        assert_eq!(repo.get_summary("s").await.unwrap(), None);
        assert_eq!(repo.get_summary("missing").await.unwrap(), None);

        repo.upsert_summary("s", "学年: 1年").await.unwrap();
        repo.upsert_summary("s", "学年: 2年").await.unwrap();
        repo.ensure_session("s").await.unwrap();
        assert_eq!(repo.get_summary("s").await.unwrap().as_deref(), Some("学年: 2年"));
    }

    #[tokio::test]
    async fn legacy_log_table_gains_domain_column() {
        let dir = tempfile::tempdir().unwrap();
        {
            let path = dir.path().join("coach.db");
            let db = libsql::Builder::new_local(path.to_string_lossy().as_ref())
                .build()
                .await
                .unwrap();
            let conn = db.connect().unwrap();
            conn.execute(
                "CREATE TABLE message_logs (id INTEGER PRIMARY KEY AUTOINCREMENT, session_id TEXT NOT NULL, role TEXT NOT NULL, content TEXT NOT NULL, created_at INTEGER NOT NULL)",
                (),
            )
            .await
            .unwrap();
            conn.execute(
                "INSERT INTO message_logs (session_id, role, content, created_at) VALUES ('s', 'user', '古い行', 1)",
                (),
            )
            .await
            .unwrap();
        }

        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        repo.append_messages("s", Some(Domain::Plan), &[(Role::User, "新しい行".into())])
            .await
            .unwrap();

        let rows = repo.list_messages("s").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].domain, None);
        assert_eq!(rows[1].domain, Some(Domain::Plan));
    }

    #[tokio::test]
    async fn null_summary_reads_as_none_but_bad_content_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        let conn = repo.db.connect().unwrap();
        conn.execute(
            "INSERT INTO message_logs (session_id, role, content, created_at) VALUES ('s', 'user', X'00', 1)",
            (),
        )
        .await
        .unwrap();

        repo.ensure_session("s").await.unwrap();
        assert_eq!(repo.get_summary("s").await.unwrap(), None);
        assert!(matches!(
            repo.list_messages("s").await,
            Err(DomainError::Persistence(_))
        ));
    }
}
