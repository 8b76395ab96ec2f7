//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Rejected before any evaluation, prompt work or collaborator call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Completion service failure (network, non-success status, malformed payload). Never retried here.
    #[error("Completion service error: {0}")]
    Upstream(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Message safe to show to the end user. Only validation errors echo their detail.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Validation(msg) => msg.clone(),
            DomainError::Upstream(_) => "AI応答の生成に失敗しました。".to_string(),
            DomainError::Persistence(_) | DomainError::Config(_) => {
                "サーバーエラーが発生しました。".to_string()
            }
        }
    }
}
