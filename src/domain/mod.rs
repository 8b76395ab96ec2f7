//! Core domain layer. No external I/O dependencies.
//!
//! Domain table, goal heuristics, escalation bands and prompt assembly live here.
//! Everything is synchronous and pure; dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod escalation;
pub mod evaluator;
pub mod prompt;
pub mod registry;

pub use entities::{
    ChatMessage, Domain, EvaluationResult, Role, StoredMessage, TurnInput, TurnOutcome,
};
pub use errors::DomainError;
pub use escalation::EscalationBand;
pub use evaluator::{GoalEvaluator, KeywordGoalEvaluator};
