//! Wire types for the HTTP API. camelCase on the wire.

use crate::domain::{ChatMessage, Domain, DomainError, registry};
use serde::{Deserialize, Serialize};

/// `POST /api/chat` body. Transcript and turn count are client-held and re-sent every request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "mode")]
    pub domain: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub turn_count: Option<u32>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// When present, the exchange is appended to this session's log after the reply.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// `POST /api/sessions/{id}/chat` body. The transcript comes from storage.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "mode")]
    pub domain: Option<String>,
    #[serde(default)]
    pub turn_count: Option<u32>,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub summary: String,
}

/// Missing domain means the first one.
pub fn parse_domain(raw: Option<&str>) -> Result<Domain, DomainError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse(),
        None => Ok(Domain::default()),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainDto {
    pub id: Domain,
    pub display_name: &'static str,
    pub description: &'static str,
    pub opening: &'static str,
    pub required_elements: &'static [&'static str],
    pub next: Option<Domain>,
}

impl From<&registry::DomainEntry> for DomainDto {
    fn from(entry: &registry::DomainEntry) -> Self {
        Self {
            id: entry.domain,
            display_name: entry.display_name,
            description: entry.description,
            opening: entry.opening,
            required_elements: entry.required_labels,
            next: entry.successor,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
