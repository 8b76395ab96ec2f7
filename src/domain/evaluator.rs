//! Goal evaluation. Deterministic keyword/pattern scan over everything the user said in a domain.
//!
//! Each domain is a row of binary requirements; the goal is met when every requirement matches.
//! The scan sits behind [`GoalEvaluator`] so another strategy can replace it without touching
//! escalation or prompt assembly.

use super::entities::{Domain, EvaluationResult};

/// Scores accumulated user text against a domain's completion criteria.
pub trait GoalEvaluator: Send + Sync {
    /// Never fails; absence of matches yields `goal_met = false` with the unsatisfied labels.
    fn evaluate(&self, domain: Domain, accumulated_user_text: &str) -> EvaluationResult;
}

/// How a single requirement is matched against the text.
#[derive(Debug)]
pub enum Matcher {
    /// At least one keyword occurs.
    AnyKeyword(&'static [&'static str]),
    /// At least one keyword occurs, or any of the separators does (a listed item is a proxy for intent).
    KeywordOrSeparator {
        keywords: &'static [&'static str],
        separators: &'static [&'static str],
    },
    /// Total occurrences of the separators reach `min`.
    SeparatorCount {
        separators: &'static [&'static str],
        min: usize,
    },
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::AnyKeyword(keywords) => contains_any(text, keywords),
            Matcher::KeywordOrSeparator {
                keywords,
                separators,
            } => contains_any(text, keywords) || contains_any(text, separators),
            Matcher::SeparatorCount { separators, min } => {
                let count: usize = separators.iter().map(|s| text.matches(s).count()).sum();
                count >= *min
            }
        }
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// One labelled requirement of a domain's goal.
#[derive(Debug)]
pub struct Requirement {
    pub label: &'static str,
    pub matcher: Matcher,
}

const SELF_AWARENESS: &[Requirement] = &[
    Requirement {
        label: "具体的な行動",
        matcher: Matcher::AnyKeyword(&[
            "まとめた", "説明した", "提案した", "作成した", "調整した", "企画した", "頑張った",
            "取り組んだ", "リーダー", "係",
        ]),
    },
    Requirement {
        label: "自分の強み",
        matcher: Matcher::AnyKeyword(&[
            "協調性", "計画性", "主体性", "責任感", "コミュ力", "粘り強さ", "分析力", "優しさ",
            "真面目", "元気",
        ]),
    },
];

const INFO: &[Requirement] = &[
    Requirement {
        label: "知りたいこと(3つ程度)",
        matcher: Matcher::KeywordOrSeparator {
            keywords: &["知りたい", "わからない", "気になる", "教えて", "疑問"],
            separators: &["・", "、"],
        },
    },
    Requirement {
        label: "調べ方",
        matcher: Matcher::AnyKeyword(&[
            "YouTube", "OB訪問", "大学HP", "パンフ", "検索", "ネット", "先生", "先輩",
        ]),
    },
];

const GOAL: &[Requirement] = &[
    Requirement {
        label: "期限",
        matcher: Matcher::AnyKeyword(&["今月", "今年", "月まで", "日までに", "夏休み", "冬休み"]),
    },
    Requirement {
        label: "目標の内容",
        matcher: Matcher::AnyKeyword(&["決める", "比較する", "選ぶ", "合格", "提出"]),
    },
];

const PLAN: &[Requirement] = &[
    Requirement {
        label: "具体的な日時",
        matcher: Matcher::AnyKeyword(&[
            "金曜", "土曜", "放課後", "日", "今日", "明日", "明後日", "時",
        ]),
    },
    Requirement {
        label: "行動",
        matcher: Matcher::AnyKeyword(&["見る", "調べる", "聞く", "比較する", "行く", "書く", "申し込む"]),
    },
];

const PROBLEM: &[Requirement] = &[
    Requirement {
        label: "障害・壁",
        matcher: Matcher::AnyKeyword(&["時間", "やる気", "情報", "お金", "成績", "親", "自信"]),
    },
    Requirement {
        label: "対策(2つ以上)",
        matcher: Matcher::SeparatorCount {
            separators: &["、", "。", "・", "とか", "たり"],
            min: 1,
        },
    },
];

/// Requirement row for a domain, in declared label order. `finished` has none.
pub fn requirements_of(domain: Domain) -> &'static [Requirement] {
    match domain {
        Domain::SelfAwareness => SELF_AWARENESS,
        Domain::Info => INFO,
        Domain::Goal => GOAL,
        Domain::Plan => PLAN,
        Domain::Problem => PROBLEM,
        Domain::Finished => &[],
    }
}

/// Keyword-table evaluator: one generic fold over [`requirements_of`].
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordGoalEvaluator;

impl KeywordGoalEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl GoalEvaluator for KeywordGoalEvaluator {
    fn evaluate(&self, domain: Domain, accumulated_user_text: &str) -> EvaluationResult {
        let missing = requirements_of(domain)
            .iter()
            .filter(|r| !r.matcher.matches(accumulated_user_text))
            .map(|r| r.label.to_string())
            .collect();
        EvaluationResult::from_missing(missing)
    }
}
