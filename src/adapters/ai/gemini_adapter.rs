//! Gemini `generateContent` adapter.
//!
//! Endpoint: `https://generativelanguage.googleapis.com/{version}/models/{model}:generateContent?key=...`.
//! An empty candidate list is not an error: the user gets a fixed apology instead.

use crate::domain::DomainError;
use crate::ports::CompletionPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Reply used when the API answers successfully but without any text.
pub const EMPTY_REPLY_FALLBACK: &str = "申し訳ありません。うまく応答を生成できませんでした。";

pub struct GeminiAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiAdapter {
    /// # Arguments
    /// * `api_key` - Gemini API key
    /// * `model` - Model name (e.g., "gemini-1.5-flash-latest")
    /// * `api_version` - API version path segment (e.g., "v1")
    pub fn new(api_key: String, model: &str, api_version: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: Self::endpoint_for(API_BASE, model, api_version),
            api_key,
        }
    }

    fn endpoint_for(base: &str, model: &str, api_version: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            base.trim_end_matches('/'),
            api_version,
            model
        )
    }

    fn build_request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }

    /// First candidate's first text part, trimmed; the fallback when absent or blank.
    fn extract_reply(response: GenerateResponse) -> String {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string())
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait::async_trait]
impl CompletionPort for GeminiAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        info!(
            endpoint = %self.endpoint,
            prompt_len = prompt.len(),
            "sending prompt to Gemini"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&Self::build_request(prompt))
            .send()
            .await
            .map_err(|e| DomainError::Upstream(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Gemini API returned error");
            return Err(DomainError::Upstream(format!(
                "Gemini API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Upstream(format!("Failed to parse Gemini response: {}", e)))?;

        let reply = Self::extract_reply(payload);
        debug!(reply_len = reply.len(), "received Gemini reply");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn endpoint_layout() {
        assert_eq!(
            GeminiAdapter::endpoint_for("https://example.test/", "gemini-1.5-flash-latest", "v1"),
            "https://example.test/v1/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn request_shape() {
        let json = serde_json::to_value(GeminiAdapter::build_request("やあ")).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "やあ");
    }

    #[test]
    fn extracts_first_text_part() {
        let r = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":" 一緒に考えましょう \n"},{"text":"x"}]}}]}"#,
        );
        assert_eq!(GeminiAdapter::extract_reply(r), "一緒に考えましょう");
    }

    #[test]
    fn missing_text_falls_back() {
        for json in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"content":null}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#,
        ] {
            assert_eq!(GeminiAdapter::extract_reply(parse(json)), EMPTY_REPLY_FALLBACK);
        }
    }
}
