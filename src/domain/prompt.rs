//! Prompt assembly. Builds the single instruction string handed to the completion service.
//!
//! Layout:
//!
//! ```text
//! [personalization line]
//! <domain template>
//! [escalation notice]            (only while the goal is unmet)
//!
//! 【これまでの会話】
//! User: ...
//! AI: ...
//!
//! 【今回のユーザー発言】
//! User: <message>
//! [goal-achieved directive]      (only when the goal is met)
//! ```

use super::entities::{ChatMessage, Domain, EvaluationResult, Role};
use super::{escalation, registry};

pub const TRANSCRIPT_HEADER: &str = "【これまでの会話】";
pub const CURRENT_MESSAGE_HEADER: &str = "【今回のユーザー発言】";
pub const GOAL_ACHIEVED_HEADER: &str = "【システム通知: ゴール達成】";

/// Shown in place of a missing survey summary.
pub const SURVEY_FALLBACK: &str = "アンケート情報なし";

const USER_PREFIX: &str = "User: ";
const ASSISTANT_PREFIX: &str = "AI: ";

/// Personalization line for a known display name. Blank names are ignored.
pub fn personalization(user_name: Option<&str>) -> Option<String> {
    user_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!("ユーザーの名前は「{}」さんです。会話の中で自然に名前で呼びかけてください。", n))
}

/// Domain template, optionally prefixed with the personalization line.
pub fn base_instruction(domain: Domain, user_name: Option<&str>) -> String {
    let template = registry::template_of(domain);
    match personalization(user_name) {
        Some(line) => format!("{}\n\n{}", line, template),
        None => template.to_string(),
    }
}

/// Render the transcript as `User:` / `AI:` lines in chronological order.
pub fn render_transcript(transcript: &[ChatMessage]) -> String {
    transcript
        .iter()
        .map(|m| {
            let prefix = match m.role {
                Role::User => USER_PREFIX,
                Role::Assistant => ASSISTANT_PREFIX,
            };
            format!("{}{}", prefix, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Closing-and-handoff directive for a met goal.
pub fn goal_achieved_directive(domain: Domain) -> String {
    let name = registry::display_name_of(domain);
    let next = registry::next_step_label(domain);
    format!(
        "{GOAL_ACHIEVED_HEADER}\n\
         ユーザーの発言により、このテーマ（{name}）のゴール条件が満たされました。\n\
         これ以上、このテーマについて質問を繰り返さないでください。\n\n\
         以下の手順で回答を作成してください：\n\
         1. **総評**: これまでの会話から、ユーザーの強みや考えを具体的に引用してまとめてください。\n\
         2. **確認**: 褒めるだけで終わらせず、「この結論で納得できていますか？」とユーザーが満足しているかを確認してください。\n\
         3. **次のステップの提案**: 「よければ、次は『{next}』について考えてみましょうか？」と提案してください。無理に進めず、ユーザーが望む場合だけ進んでください。"
    )
}

/// Opening message prompt for a fresh session, grounded on the survey summary.
pub fn greeting_prompt(survey_summary: Option<&str>) -> String {
    let summary = survey_summary
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(SURVEY_FALLBACK);
    format!(
        "{}\n\nアンケート要約: {}\n\n初回メッセージとして、アンケート内容に触れながら親しみやすく挨拶し、\
         取り組みたいテーマ（{}）を選ぶよう促してください。200文字程度で簡潔にまとめてください。",
        registry::base_role(),
        summary,
        registry::all()
            .iter()
            .filter(|s| s.successor.is_some())
            .map(|s| s.display_name)
            .collect::<Vec<_>>()
            .join("・"),
    )
}

/// Compose the final prompt.
///
/// `instruction` is the base instruction (usually [`base_instruction`]). The escalation notice is
/// appended only while the goal is unmet; the goal-achieved directive only when it is met.
pub fn assemble(
    domain: Domain,
    instruction: &str,
    transcript: &[ChatMessage],
    message: &str,
    evaluation: &EvaluationResult,
    turn_count: u32,
) -> String {
    let mut prompt = String::from(instruction);

    if !evaluation.goal_met {
        if let Some(notice) = escalation::augmentation(domain, evaluation, turn_count) {
            prompt.push_str("\n\n");
            prompt.push_str(&notice);
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(TRANSCRIPT_HEADER);
    prompt.push('\n');
    prompt.push_str(&render_transcript(transcript));
    prompt.push_str("\n\n");
    prompt.push_str(CURRENT_MESSAGE_HEADER);
    prompt.push('\n');
    prompt.push_str(USER_PREFIX);
    prompt.push_str(message);

    if evaluation.goal_met {
        prompt.push_str("\n\n");
        prompt.push_str(&goal_achieved_directive(domain));
    }

    prompt
}

/// Re-derive the transcript section of an assembled prompt.
///
/// A line starting with a role prefix opens a new entry; any other line continues the previous one.
/// The section ends at the first current-message header, so the current message may contain
/// the header text, but a prior entry may not.
pub fn parse_transcript(prompt: &str) -> Vec<ChatMessage> {
    let Some(start) = prompt.find(TRANSCRIPT_HEADER) else {
        return Vec::new();
    };
    let body = &prompt[start + TRANSCRIPT_HEADER.len()..];
    let body = body.strip_prefix('\n').unwrap_or(body);
    let end = body
        .find(&format!("\n\n{}\n{}", CURRENT_MESSAGE_HEADER, USER_PREFIX))
        .unwrap_or(body.len());
    let section = &body[..end];

    let mut messages: Vec<ChatMessage> = Vec::new();
    for line in section.split('\n') {
        if let Some(rest) = line.strip_prefix(USER_PREFIX) {
            messages.push(ChatMessage::user(rest));
        } else if let Some(rest) = line.strip_prefix(ASSISTANT_PREFIX) {
            messages.push(ChatMessage::assistant(rest));
        } else if let Some(last) = messages.last_mut() {
            last.content.push('\n');
            last.content.push_str(line);
        }
    }
    messages
}
