//! Mock completion adapter for running without an API key.
//!
//! Returns a canned coaching reply after a configurable delay.

use crate::domain::DomainError;
use crate::ports::CompletionPort;
use std::time::Duration;
use tracing::info;

pub struct MockCompletionAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockCompletionAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockCompletionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CompletionPort for MockCompletionAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        info!(prompt_len = prompt.len(), "[MOCK] Simulating completion");

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        Ok(format!(
            "[MOCK] お話ししてくれてありがとうございます。もう少し詳しく教えてもらえますか？（プロンプト {} 文字）",
            prompt.chars().count()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_adapter() {
        let adapter = MockCompletionAdapter::with_delay(1);
        let reply = adapter.complete("あいう").await.unwrap();
        assert!(reply.starts_with("[MOCK]"));
        assert!(reply.contains("3 文字"));
    }
}
