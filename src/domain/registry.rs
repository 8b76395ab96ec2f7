//! Static domain table: progression order, display names and instruction templates.

use super::entities::Domain;

/// Label used when a domain has no successor.
pub const NEXT_STEP_FALLBACK: &str = "次のステップ";

/// Immutable description of one coaching domain.
#[derive(Debug)]
pub struct DomainEntry {
    pub domain: Domain,
    pub display_name: &'static str,
    pub successor: Option<Domain>,
    /// Short description shown on the domain selector.
    pub description: &'static str,
    /// Opening line posted when the user switches to this domain.
    pub opening: &'static str,
    pub template: &'static str,
    /// Requirement labels in declared order. Must match the evaluator table.
    pub required_labels: &'static [&'static str],
}

/// Coaching persona shared by every template.
macro_rules! base_role {
    () => {
        "あなたは高校生の進路選択を支援する、日本語で話すキャリアコーチです。\
相手の言葉を否定せず、短い質問を一つずつ投げかけて、本人が自分で答えにたどり着けるように導いてください。\
一度の返答は200文字程度にまとめてください。"
    };
}

const BASE_ROLE: &str = base_role!();

static DOMAINS: [DomainEntry; 6] = [
    DomainEntry {
        domain: Domain::SelfAwareness,
        display_name: "自己認識",
        successor: Some(Domain::Info),
        description: "強みを見つける",
        opening: "【自己認識】のテーマですね！\nまずはリラックスして考えてみましょう。\n最近、学校生活や趣味の中で「これは楽しかったな」とか「自分、結構やるじゃん」と思えた瞬間はありましたか？些細なことでも大丈夫ですよ。",
        template: concat!(
            base_role!(),
            "\n\n",
            "【テーマ: 自己認識】\n",
            "このテーマのゴールは、ユーザーが「具体的な行動（エピソード）」と、そこから見える「自分の強み」を自分の言葉で語れるようになることです。\n",
            "部活・委員会・文化祭・アルバイトなど、実際にやったことを思い出してもらい、その行動の裏にある強み（協調性、計画性、責任感など）を一緒に言葉にしてください。"
        ),
        required_labels: &["具体的な行動", "自分の強み"],
    },
    DomainEntry {
        domain: Domain::Info,
        display_name: "情報収集",
        successor: Some(Domain::Goal),
        description: "知りたいことを探す",
        opening: "【情報収集】のテーマですね！\n世の中には色々な仕事や学校がありますよね。\n今、ふと気になっている「キーワード」や「分野」はありますか？「なんとなく」でも構いません。",
        template: concat!(
            base_role!(),
            "\n\n",
            "【テーマ: 情報収集】\n",
            "このテーマのゴールは、ユーザーが進路について「知りたいこと」を3つ程度挙げ、それぞれの「調べ方」（学校のHP、オープンキャンパス、先生や先輩への相談など）を決めることです。\n",
            "漠然とした関心を具体的な疑問に分解し、実際に使える情報源を一緒に考えてください。"
        ),
        required_labels: &["知りたいこと(3つ程度)", "調べ方"],
    },
    DomainEntry {
        domain: Domain::Goal,
        display_name: "目標選択",
        successor: Some(Domain::Plan),
        description: "目標を決める",
        opening: "【目標選択】のテーマですね！\n少し先の未来を想像してみましょう。\n高校を卒業する時、あるいは次の学年に上がる時、「どうなっていたい」ですか？",
        template: concat!(
            base_role!(),
            "\n\n",
            "【テーマ: 目標選択】\n",
            "このテーマのゴールは、ユーザーが「いつまでに」「何をするか」がはっきりした目標を一つ決めることです。\n",
            "大きな夢は尊重しつつ、今月・今学期・夏休みなど手の届く期限に区切った目標に落とし込んでください。"
        ),
        required_labels: &["期限", "目標の内容"],
    },
    DomainEntry {
        domain: Domain::Plan,
        display_name: "計画作成",
        successor: Some(Domain::Problem),
        description: "行動計画を立てる",
        opening: "【計画作成】のテーマですね！\n千里の道も一歩からです。\n目標に近づくために、「今週」できそうな小さなアクションを一緒に考えてみませんか？",
        template: concat!(
            base_role!(),
            "\n\n",
            "【テーマ: 計画作成】\n",
            "このテーマのゴールは、目標に向けて今週やる具体的な「行動」と、それを実行する「日時」を決めることです。\n",
            "行動はできるだけ小さく具体的にし、曜日や時間帯まで決めてもらってください。"
        ),
        required_labels: &["具体的な日時", "行動"],
    },
    DomainEntry {
        domain: Domain::Problem,
        display_name: "問題解決",
        successor: Some(Domain::Finished),
        description: "壁を乗り越える",
        opening: "【問題解決】のテーマですね！\n不安や悩みは、言葉にすると軽くなることがあります。\n今、進路について「ちょっと気が重いな」と感じていることや、壁に感じていることはありますか？",
        template: concat!(
            base_role!(),
            "\n\n",
            "【テーマ: 問題解決】\n",
            "このテーマのゴールは、計画の実行を妨げそうな「障害・壁」（時間、やる気、お金、親の意見など）を特定し、それに対する対策を2つ以上考えることです。\n",
            "不安な気持ちに共感したうえで、小さく試せる対策を一緒に挙げてください。"
        ),
        required_labels: &["障害・壁", "対策(2つ以上)"],
    },
    DomainEntry {
        domain: Domain::Finished,
        display_name: "完了",
        successor: None,
        description: "ふりかえり",
        opening: "すべてのテーマお疲れさまでした！\nここまでの対話をふりかえって、気づいたことや決めたことを一緒に確認しましょう。",
        template: concat!(
            base_role!(),
            "\n\n",
            "【テーマ: ふりかえり】\n",
            "ユーザーはすべてのテーマを終えました。これまでに見つけた強み、目標、計画、対策をふりかえり、\n",
            "本人の言葉を引用しながら前向きに締めくくってください。新しい課題は増やさないでください。"
        ),
        required_labels: &[],
    },
];

/// Full table in progression order.
pub fn all() -> &'static [DomainEntry] {
    &DOMAINS
}

pub fn entry_of(domain: Domain) -> &'static DomainEntry {
    // DOMAINS is indexed in Domain::ALL order.
    &DOMAINS[domain as usize]
}

pub fn successor_of(domain: Domain) -> Option<Domain> {
    entry_of(domain).successor
}

pub fn display_name_of(domain: Domain) -> &'static str {
    entry_of(domain).display_name
}

pub fn template_of(domain: Domain) -> &'static str {
    entry_of(domain).template
}

pub fn required_labels_of(domain: Domain) -> &'static [&'static str] {
    entry_of(domain).required_labels
}

/// Display name of the successor, or the generic next-step label for the terminal domain.
pub fn next_step_label(domain: Domain) -> &'static str {
    successor_of(domain)
        .map(display_name_of)
        .unwrap_or(NEXT_STEP_FALLBACK)
}

/// Coaching persona shared by every template; also used for the initial greeting.
pub fn base_role() -> &'static str {
    BASE_ROLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_in_progression_order() {
        for (i, d) in Domain::ALL.into_iter().enumerate() {
            assert_eq!(all()[i].domain, d);
            assert_eq!(entry_of(d).domain, d);
        }
    }

    #[test]
    fn successor_chain() {
        let mut chain = vec![Domain::SelfAwareness];
        while let Some(next) = successor_of(*chain.last().unwrap()) {
            chain.push(next);
        }
        assert_eq!(chain, Domain::ALL.to_vec());
        assert_eq!(successor_of(Domain::Problem), Some(Domain::Finished));
        assert_eq!(successor_of(Domain::Finished), None);
    }

    #[test]
    fn next_step_label_falls_back_for_terminal_domain() {
        assert_eq!(next_step_label(Domain::SelfAwareness), "情報収集");
        assert_eq!(next_step_label(Domain::Problem), "完了");
        assert_eq!(next_step_label(Domain::Finished), NEXT_STEP_FALLBACK);
    }

    #[test]
    fn templates_start_with_base_role() {
        for entry in all() {
            assert!(entry.template.starts_with(base_role()), "{}", entry.domain);
        }
    }
}
