//! In-process session and message log store. Used with `storage = "memory"` and in tests.
//!
//! Contents are lost on restart.

use crate::domain::{Domain, DomainError, Role, StoredMessage};
use crate::ports::{MessageLogPort, SessionPort};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryData {
    next_id: i64,
    messages: Vec<StoredMessage>,
    /// session_id -> survey summary
    sessions: HashMap<String, Option<String>>,
}

#[derive(Debug, Default)]
pub struct MemoryRepo {
    data: RwLock<MemoryData>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MessageLogPort for MemoryRepo {
    async fn append_messages(
        &self,
        session_id: &str,
        domain: Option<Domain>,
        rows: &[(Role, String)],
    ) -> Result<(), DomainError> {
        let created_at = chrono::Utc::now().timestamp_millis();
        let mut data = self.data.write().await;
        for (role, content) in rows {
            data.next_id += 1;
            let id = data.next_id;
            data.messages.push(StoredMessage {
                id,
                session_id: session_id.to_string(),
                role: *role,
                content: content.clone(),
                domain,
                created_at,
            });
        }
        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, DomainError> {
        let data = self.data.read().await;
        Ok(data
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl SessionPort for MemoryRepo {
    async fn ensure_session(&self, session_id: &str) -> Result<(), DomainError> {
        self.data
            .write()
            .await
            .sessions
            .entry(session_id.to_string())
            .or_insert(None);
        Ok(())
    }

    async fn upsert_summary(&self, session_id: &str, summary: &str) -> Result<(), DomainError> {
        self.data
            .write()
            .await
            .sessions
            .insert(session_id.to_string(), Some(summary.to_string()));
        Ok(())
    }

    async fn get_summary(&self, session_id: &str) -> Result<Option<String>, DomainError> {
        Ok(self
            .data
            .read()
            .await
            .sessions
            .get(session_id)
            .cloned()
            .flatten())
    }
}
