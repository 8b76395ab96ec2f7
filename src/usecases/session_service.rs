//! Storage-backed coaching sessions.
//!
//! Rebuilds the transcript from the message log, delegates the turn to the stateless handler,
//! then appends the exchange tagged with its domain. The prompt sees the whole session, but
//! goal evaluation and the turn count only see rows of the current domain.
//! Log writes happen only after a reply exists, and a failed write never discards that reply.

use crate::domain::{
    ChatMessage, Domain, DomainError, Role, StoredMessage, TurnInput, TurnOutcome, prompt,
};
use crate::ports::{CompletionPort, MessageLogPort, SessionPort, TurnHandlerPort};
use crate::usecases::CoachingService;
use std::sync::Arc;
use tracing::{info, warn};

/// A turn against a stored session. Transcript comes from storage, not the caller.
#[derive(Debug, Clone, Default)]
pub struct SessionTurn {
    pub message: String,
    pub domain: Domain,
    /// Defaults to the number of stored user rows in this domain plus one.
    pub turn_count: Option<u32>,
    pub user_name: Option<String>,
}

pub struct SessionService {
    turns: Arc<dyn TurnHandlerPort>,
    completion: Arc<dyn CompletionPort>,
    log: Arc<dyn MessageLogPort>,
    sessions: Arc<dyn SessionPort>,
}

impl SessionService {
    pub fn new(
        turns: Arc<dyn TurnHandlerPort>,
        completion: Arc<dyn CompletionPort>,
        log: Arc<dyn MessageLogPort>,
        sessions: Arc<dyn SessionPort>,
    ) -> Self {
        Self {
            turns,
            completion,
            log,
            sessions,
        }
    }

    fn validate_session_id(session_id: &str) -> Result<(), DomainError> {
        if session_id.trim().is_empty() {
            return Err(DomainError::Validation("セッションIDが空です。".to_string()));
        }
        Ok(())
    }

    /// Handle a turn for a stored session and append the exchange on success.
    pub async fn chat(&self, session_id: &str, turn: SessionTurn) -> Result<TurnOutcome, DomainError> {
        Self::validate_session_id(session_id)?;
        CoachingService::validate_message(&turn.message)?;

        let rows = self.log.list_messages(session_id).await?;
        let prior_transcript: Vec<ChatMessage> = rows.iter().map(ChatMessage::from).collect();
        let domain_user_turns: Vec<String> = rows
            .iter()
            .filter(|r| r.role == Role::User && r.domain == Some(turn.domain))
            .map(|r| r.content.clone())
            .collect();
        let turn_count = turn.turn_count.unwrap_or_else(|| {
            u32::try_from(domain_user_turns.len())
                .unwrap_or(u32::MAX)
                .saturating_add(1)
        });

        let message = turn.message;
        let domain = turn.domain;
        let outcome = self
            .turns
            .handle_turn(TurnInput {
                message: message.clone(),
                domain,
                prior_transcript,
                turn_count,
                user_name: turn.user_name,
                domain_user_turns: Some(domain_user_turns),
            })
            .await?;

        self.record_exchange(session_id, domain, &message, &outcome.reply)
            .await;
        Ok(outcome)
    }

    /// Append a user/assistant pair tagged with `domain`. Failures are logged, never returned.
    pub async fn record_exchange(
        &self,
        session_id: &str,
        domain: Domain,
        message: &str,
        reply: &str,
    ) {
        let rows = [
            (Role::User, message.to_string()),
            (Role::Assistant, reply.to_string()),
        ];
        if let Err(e) = self
            .log
            .append_messages(session_id, Some(domain), &rows)
            .await
        {
            warn!(session_id, error = %e, "failed to persist exchange; reply still returned");
        }
    }

    /// Ordered message log. A session with no messages gets a generated greeting first.
    ///
    /// Greeting failures are logged and yield whatever the log holds.
    pub async fn messages_or_greeting(
        &self,
        session_id: &str,
    ) -> Result<Vec<StoredMessage>, DomainError> {
        Self::validate_session_id(session_id)?;
        self.sessions.ensure_session(session_id).await?;

        let rows = self.log.list_messages(session_id).await?;
        if !rows.is_empty() {
            return Ok(rows);
        }

        let summary = self.sessions.get_summary(session_id).await?;
        let greeting = match self
            .completion
            .complete(&prompt::greeting_prompt(summary.as_deref()))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(session_id, error = %e, "initial greeting generation failed");
                return Ok(rows);
            }
        };

        if let Err(e) = self
            .log
            .append_messages(session_id, None, &[(Role::Assistant, greeting)])
            .await
        {
            warn!(session_id, error = %e, "failed to persist initial greeting");
            return Ok(rows);
        }
        info!(session_id, "initial greeting stored");

        match self.log.list_messages(session_id).await {
            Ok(refreshed) => Ok(refreshed),
            Err(e) => {
                warn!(session_id, error = %e, "failed to reload messages after greeting");
                Ok(rows)
            }
        }
    }

    /// Insert or replace the session's survey summary.
    pub async fn update_summary(&self, session_id: &str, summary: &str) -> Result<(), DomainError> {
        Self::validate_session_id(session_id)?;
        self.sessions.upsert_summary(session_id, summary.trim()).await?;
        info!(session_id, summary_len = summary.len(), "session summary updated");
        Ok(())
    }
}
