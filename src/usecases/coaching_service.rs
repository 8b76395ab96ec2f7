//! Conversation turn handler.
//!
//! Validate -> evaluate accumulated user text -> assemble prompt -> one completion call.
//! Stateless: turn count and transcript arrive with every call. No persistence here.

use crate::domain::{DomainError, GoalEvaluator, TurnInput, TurnOutcome, prompt};
use crate::ports::{CompletionPort, TurnHandlerPort};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct CoachingService {
    evaluator: Arc<dyn GoalEvaluator>,
    completion: Arc<dyn CompletionPort>,
}

impl CoachingService {
    /// # Arguments
    /// * `evaluator` - Goal evaluation strategy (keyword table by default)
    /// * `completion` - Completion service adapter (Gemini, OpenAI-compatible, mock)
    pub fn new(evaluator: Arc<dyn GoalEvaluator>, completion: Arc<dyn CompletionPort>) -> Self {
        Self {
            evaluator,
            completion,
        }
    }

    /// Reject empty or whitespace-only messages before any other work.
    pub fn validate_message(message: &str) -> Result<(), DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::Validation("メッセージが空です。".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TurnHandlerPort for CoachingService {
    async fn handle_turn(&self, input: TurnInput) -> Result<TurnOutcome, DomainError> {
        Self::validate_message(&input.message)?;

        let evaluation = self
            .evaluator
            .evaluate(input.domain, &input.accumulated_user_text());

        let instruction = prompt::base_instruction(input.domain, input.user_name.as_deref());
        let composed = prompt::assemble(
            input.domain,
            &instruction,
            &input.prior_transcript,
            &input.message,
            &evaluation,
            input.turn_count,
        );

        info!(
            domain = %input.domain,
            turn_count = input.turn_count,
            goal_met = evaluation.goal_met,
            missing = evaluation.missing_elements.len(),
            "coaching turn evaluated"
        );
        debug!(prompt_len = composed.len(), "prompt assembled");

        let reply = self.completion.complete(&composed).await.map_err(|e| {
            warn!(error = %e, domain = %input.domain, "completion call failed");
            match e {
                DomainError::Upstream(_) => e,
                other => DomainError::Upstream(other.to_string()),
            }
        })?;

        Ok(TurnOutcome { reply, evaluation })
    }
}
