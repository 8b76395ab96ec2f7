//! Completion adapters. Implement CompletionPort for LLM integration.
//!
//! Gemini (default), OpenAI-compatible, and a mock adapter for running without a key.

pub mod gemini_adapter;
pub mod mock_adapter;
pub mod openai_adapter;

pub use gemini_adapter::GeminiAdapter;
pub use mock_adapter::MockCompletionAdapter;
pub use openai_adapter::OpenAiAdapter;
