//! Turn-count driven escalation. Re-derived every turn from (goal met, turn count); nothing persisted.
//!
//! The completion service has no notion of a turn budget, so these notices are the only lever
//! against an open-ended back-and-forth when the evaluator keeps reporting the goal as unmet.

use super::entities::{Domain, EvaluationResult};
use super::registry;

pub const SUPPORT_FROM: u32 = 5;
pub const CONVERGE_FROM: u32 = 20;
pub const FORCE_CLOSE_FROM: u32 = 25;

pub const SUPPORT_HEADER: &str = "【システム通知: サポートモード】";
pub const CONVERGE_HEADER: &str = "【システム通知: 収束モード】";
pub const FORCE_CLOSE_HEADER: &str = "【システム通知: まとめモード】";

/// Mutually exclusive augmentation bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationBand {
    None,
    Support,
    Converge,
    ForceClose,
}

impl EscalationBand {
    /// Band for this turn. A met goal suppresses escalation entirely.
    pub fn select(goal_met: bool, turn_count: u32) -> Self {
        if goal_met {
            return EscalationBand::None;
        }
        match turn_count {
            n if n >= FORCE_CLOSE_FROM => EscalationBand::ForceClose,
            n if n >= CONVERGE_FROM => EscalationBand::Converge,
            n if n >= SUPPORT_FROM => EscalationBand::Support,
            _ => EscalationBand::None,
        }
    }
}

/// Augmentation text appended to the instruction, or `None` for the quiet band.
pub fn augmentation(
    domain: Domain,
    evaluation: &EvaluationResult,
    turn_count: u32,
) -> Option<String> {
    let missing = evaluation.missing_elements.join(", ");
    match EscalationBand::select(evaluation.goal_met, turn_count) {
        EscalationBand::None => None,
        EscalationBand::Support => Some(format!(
            "{SUPPORT_HEADER}\n\
             ユーザーは既に{SUPPORT_FROM}回以上やり取りしていますが、まだゴール条件（{missing}）に到達していません。\n\
             ユーザーが答えに詰まっているか、迷っている可能性があります。\n\
             新しい質問を重ねるのではなく、**これまでの会話の文脈を踏まえて**、ゴールに近づくための「具体的な回答例」を2〜3個提示してください。\n\
             例：「例えば、先ほど部活の話が出ましたが、そこでの経験は強みになりませんか？」\n\
             例：「もし思いつかない場合は、〇〇という視点で考えてみるのはどうでしょう？」"
        )),
        EscalationBand::Converge => Some(format!(
            "{CONVERGE_HEADER}\n\
             やり取りが{CONVERGE_FROM}回に達しました。まだ不足している要素があります（{missing}）。\n\
             話題を広げず、これまでのユーザーの発言を短く言い換えて「つまり、〇〇ということですね？」と確認してください。\n\
             ユーザーが頷けば、その内容を不足している要素の答えとして扱い、ゴールに向けてまとめに入ってください。"
        )),
        EscalationBand::ForceClose => {
            let next = registry::next_step_label(domain);
            Some(format!(
                "{FORCE_CLOSE_HEADER}\n\
                 やり取りが{FORCE_CLOSE_FROM}回に達しました。これ以上の質問は控えてください。\n\
                 これまでの会話をもとに、ユーザーに代わって暫定的な結論（{missing}を含む）を提案し、\n\
                 「ひとまずこの内容で進めてみませんか？」と確認してください。\n\
                 ユーザーが受け入れたら、次のテーマ『{next}』に進むことを提案してください。"
            ))
        }
    }
}
