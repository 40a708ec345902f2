//! Prompt templates and the text renderings of conversation history.

use crate::core::models::{ConversationTurn, Role, UserAgentInfo};

/// System instruction for session titles (12 characters max, Japanese).
pub const TITLE_SYSTEM_PROMPT: &str = "12文字以内で、この質問に対するタイトルを生成してください。";

const CHAT_INSTRUCTIONS: &str = "
# 指示
日本語で回答してください。
あなたはITに詳しいアシスタントです。
あなたは、ユーザーとの会話履歴を長期間保存する機能を有しています。
IT に関する質問が来た際には IT に詳しくない人でも理解しやすいように可能な限りIT用語を避けて説明します。
相手の質問に対して、100文字以内で1つの解決策を出力してください。
不足している情報があれば、ヒアリングしてください。
インターネット上の情報を参照した場合には下三行のフォーマットで参考にしたサイトのURLを出力してください。
## 参考になるサイト
- https://example.com
- https://wikipedia.com
";

const SUMMARY_INSTRUCTIONS: &str = "# 指示
日本語で回答してください。
会話履歴に示した AI と 人間のやり取りを要約し、サマリーレポートを出力してください。
質問者が何を理解していて、何を理解していないのかを整理してください。
会話の中に質問者の使用している端末などの固有名詞が出現した場合には、箇条書きで出力してください。
会話履歴内でやり取りされている問題に対して、解決策になり得ることがあれば出力してください。

会話履歴内に出現した URL を以下3行のフォーマットに合わせて末尾に出力してください。
## 参考になるサイト
- https://example.com
- https://wikipedia.com
";

const REACT_HEADER: &str =
    "Answer the following questions as best you can. You have access to the following tools:";

const REACT_FORMAT: &str = "Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!";

/// Renders history as `Human:` / `AI:` lines, one per turn, in stored order.
#[must_use]
pub fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| {
            let prefix = match turn.role {
                Role::User => "Human",
                Role::Assistant => "AI",
            };
            format!("{prefix}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Client/device block added on the first turn of a session.
#[must_use]
pub fn render_user_agent_block(user_agent: &UserAgentInfo) -> String {
    format!(
        "\n# ユーザーの情報\nOS: {}\n使用ブラウザ: {}\n使用デバイス: {}\n",
        user_agent.os_name, user_agent.browser_name, user_agent.device_name
    )
}

/// Conversation prompt: instructions, prior history, the new message and,
/// when present, the first-turn device block appended at the end.
#[must_use]
pub fn render_chat_prompt(
    history: &[ConversationTurn],
    message: &str,
    user_agent_block: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{CHAT_INSTRUCTIONS}\n# 過去の会話履歴\n{}\n\n# 新しいメッセージ\n{message}\n",
        render_history(history)
    );
    if let Some(block) = user_agent_block {
        prompt.push_str(block);
    }
    prompt
}

#[must_use]
pub fn render_summary_prompt(history: &[ConversationTurn]) -> String {
    format!(
        "{SUMMARY_INSTRUCTIONS}\n# 過去の会話履歴\n{}\n\n",
        render_history(history)
    )
}

#[must_use]
pub fn render_react_prompt(
    tool_descriptions: &str,
    tool_names: &[&str],
    input: &str,
    scratchpad: &str,
) -> String {
    let format_block = REACT_FORMAT.replace("{tool_names}", &tool_names.join(", "));
    format!(
        "{REACT_HEADER}\n\n{tool_descriptions}\n\n{format_block}\n\nQuestion: {input}\nThought:{scratchpad}"
    )
}
