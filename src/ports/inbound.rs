//! Inbound port. The HTTP adapter calls into the application through this.

use crate::domain::{DomainError, TurnInput, TurnOutcome};

/// Handles one coaching turn with caller-supplied session state.
#[async_trait::async_trait]
pub trait TurnHandlerPort: Send + Sync {
    async fn handle_turn(&self, input: TurnInput) -> Result<TurnOutcome, DomainError>;
}
