//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Domain, DomainError, Role, StoredMessage};

/// Text completion service. Prompt in, reply out.
#[async_trait::async_trait]
pub trait CompletionPort: Send + Sync {
    /// Single awaited call, no streaming. Any failure maps to `DomainError::Upstream`.
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Append-only message log, one row per utterance.
#[async_trait::async_trait]
pub trait MessageLogPort: Send + Sync {
    /// Append rows for a session in the given order, tagged with the domain they were spoken in.
    async fn append_messages(
        &self,
        session_id: &str,
        domain: Option<Domain>,
        rows: &[(Role, String)],
    ) -> Result<(), DomainError>;

    /// All rows of a session, oldest first.
    async fn list_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, DomainError>;
}

/// Session records keyed by the externally issued session id.
#[async_trait::async_trait]
pub trait SessionPort: Send + Sync {
    /// Create the session row if missing. No-op otherwise.
    async fn ensure_session(&self, session_id: &str) -> Result<(), DomainError>;

    /// Insert or replace the session's survey summary.
    async fn upsert_summary(&self, session_id: &str, summary: &str) -> Result<(), DomainError>;

    /// Survey summary, `None` when the session or summary is absent.
    async fn get_summary(&self, session_id: &str) -> Result<Option<String>, DomainError>;
}
