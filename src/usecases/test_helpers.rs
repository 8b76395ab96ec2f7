//! Port doubles shared by use-case and adapter tests.

use crate::domain::{Domain, DomainError, Role, StoredMessage};
use crate::ports::{CompletionPort, MessageLogPort};
use std::sync::Mutex;

/// Returns a fixed reply and records every prompt it receives.
pub struct RecordingCompletion {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionPort for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub struct FailingCompletion;

#[async_trait::async_trait]
impl CompletionPort for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, DomainError> {
        Err(DomainError::Upstream("API error 503: unavailable".to_string()))
    }
}

/// Message log whose writes always fail; reads return nothing.
#[derive(Default)]
pub struct FailingLog;

#[async_trait::async_trait]
impl MessageLogPort for FailingLog {
    async fn append_messages(
        &self,
        _session_id: &str,
        _domain: Option<Domain>,
        _rows: &[(Role, String)],
    ) -> Result<(), DomainError> {
        Err(DomainError::Persistence("disk full".to_string()))
    }

    async fn list_messages(&self, _session_id: &str) -> Result<Vec<StoredMessage>, DomainError> {
        Ok(Vec::new())
    }
}
