//! Domain entities. Pure data structures for the coaching core.
//!
//! No HTTP/storage types here; adapters map their wire formats onto these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DomainError;

/// One coaching topic in the fixed progression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    #[default]
    SelfAwareness,
    Info,
    Goal,
    Plan,
    Problem,
    Finished,
}

impl Domain {
    /// Every domain in progression order.
    pub const ALL: [Domain; 6] = [
        Domain::SelfAwareness,
        Domain::Info,
        Domain::Goal,
        Domain::Plan,
        Domain::Problem,
        Domain::Finished,
    ];

    /// Wire identifier (e.g. `self-awareness`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::SelfAwareness => "self-awareness",
            Domain::Info => "info",
            Domain::Goal => "goal",
            Domain::Plan => "plan",
            Domain::Problem => "problem",
            Domain::Finished => "finished",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s.trim())
            .ok_or_else(|| DomainError::Validation(format!("不明なテーマです: {}", s)))
    }
}

/// Any incoming role other than `user` reads as the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a stored role column. Anything that is not `user` is treated as the assistant.
    pub fn from_column(s: &str) -> Self {
        if s == "user" { Role::User } else { Role::Assistant }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::from_column(&s)
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything the orchestrator needs for one turn. Built per request, never persisted by the core.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    pub message: String,
    pub domain: Domain,
    pub prior_transcript: Vec<ChatMessage>,
    pub turn_count: u32,
    pub user_name: Option<String>,
    /// Prior user turns spoken in `domain`, when the transcript spans several domains.
    /// `None` means every user turn in `prior_transcript` counts.
    pub domain_user_turns: Option<Vec<String>>,
}

impl TurnInput {
    /// Prior user turns of this domain plus the current message, space separated.
    /// Assistant turns are excluded.
    pub fn accumulated_user_text(&self) -> String {
        let mut parts: Vec<&str> = match &self.domain_user_turns {
            Some(turns) => turns.iter().map(String::as_str).collect(),
            None => self
                .prior_transcript
                .iter()
                .filter(|m| m.role == Role::User)
                .map(|m| m.content.as_str())
                .collect(),
        };
        parts.push(self.message.as_str());
        parts.join(" ")
    }
}

/// Outcome of scoring the accumulated user text against a domain's requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    #[serde(rename = "isGoalMet")]
    pub goal_met: bool,
    pub missing_elements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl EvaluationResult {
    /// Build a result from the unsatisfied labels; the goal is met iff none are missing.
    pub fn from_missing(missing_elements: Vec<String>) -> Self {
        Self {
            goal_met: missing_elements.is_empty(),
            missing_elements,
            feedback: None,
        }
    }
}

/// Reply plus the evaluation that shaped the prompt.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub evaluation: EvaluationResult,
}

/// A persisted message log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: i64,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Domain the row was spoken in. `None` for the session greeting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    pub created_at: i64,
}

impl From<&StoredMessage> for ChatMessage {
    fn from(m: &StoredMessage) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_parses_wire_ids() {
        for d in Domain::ALL {
            assert_eq!(d.as_str().parse::<Domain>().unwrap(), d);
        }
        assert!(matches!(
            "career".parse::<Domain>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn accumulated_text_skips_assistant_turns() {
        let input = TurnInput {
            message: "今".to_string(),
            prior_transcript: vec![
                ChatMessage::user("前"),
                ChatMessage::assistant("AIの発言"),
                ChatMessage::user("次"),
            ],
            ..Default::default()
        };
        assert_eq!(input.accumulated_user_text(), "前 次 今");
    }

    #[test]
    fn domain_turns_replace_transcript_for_accumulation() {
        let input = TurnInput {
            message: "今".to_string(),
            prior_transcript: vec![ChatMessage::user("別テーマ、の話"), ChatMessage::assistant("AI")],
            domain_user_turns: Some(vec!["同じテーマ".to_string()]),
            ..Default::default()
        };
        assert_eq!(input.accumulated_user_text(), "同じテーマ 今");
    }

    #[test]
    fn unknown_roles_read_as_assistant() {
        let msgs: Vec<ChatMessage> = serde_json::from_str(
            r#"[{"role":"user","content":"a"},{"role":"model","content":"b"},{"role":"system","content":"c"}]"#,
        )
        .unwrap();
        let roles: Vec<Role> = msgs.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Assistant]);
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), "assistant");
    }

    #[test]
    fn evaluation_serializes_wire_names() {
        let eval = EvaluationResult::from_missing(vec!["期限".to_string()]);
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["isGoalMet"], false);
        assert_eq!(json["missingElements"][0], "期限");
        assert!(json.get("feedback").is_none());
    }
}
