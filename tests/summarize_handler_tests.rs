mod common;

use std::sync::Arc;

use common::{FakeSecretStore, InMemorySessionStore, ScriptedModel, harness};
use makeit::api::summarize::summarize_session;
use makeit::core::models::ConversationTurn;
use serde_json::{Value, json};

fn body(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_summary_uses_full_history_in_one_call() {
    let history = vec![
        ConversationTurn::user("メールが送れません"),
        ConversationTurn::assistant("送信先のアドレスを確認してください。"),
        ConversationTurn::user("Outlookを使っています"),
        ConversationTurn::assistant("送信トレイを確認してください。"),
    ];
    let model = Arc::new(ScriptedModel::new(&["## サマリー\nOutlookでメール送信不可"]));
    let h = harness(
        InMemorySessionStore::with_history("s1", history),
        FakeSecretStore::with_value("unused"),
        model.clone(),
    );

    let response = summarize_session(&h.ctx, &json!({"body": {"sessionId": "s1"}}))
        .await
        .unwrap();

    assert_eq!(response["statusCode"], 200);
    assert_eq!(
        body(&response),
        json!({"summarizedText": "## サマリー\nOutlookでメール送信不可"})
    );

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, 4096);
    assert_eq!(requests[0].temperature, Some(0.1));
    let prompt = &requests[0].messages[0].content;
    assert!(prompt.contains("Human: メールが送れません"));
    assert!(prompt.contains("AI: 送信先のアドレスを確認してください。"));
    assert!(prompt.contains("Human: Outlookを使っています"));
    assert!(prompt.contains("AI: 送信トレイを確認してください。"));

    let summary_writes: Vec<String> = h
        .sessions
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("set_summary"))
        .collect();
    assert_eq!(summary_writes, vec!["set_summary:s1"]);
    assert_eq!(
        h.sessions.session("s1").summary.as_deref(),
        Some("## サマリー\nOutlookでメール送信不可")
    );
}

#[tokio::test]
async fn test_llm_failure_is_502_without_summary_write() {
    let model = Arc::new(ScriptedModel::new(&[]));
    let h = harness(
        InMemorySessionStore::with_history("s1", vec![ConversationTurn::user("hi")]),
        FakeSecretStore::with_value("unused"),
        model,
    );

    let err = summarize_session(&h.ctx, &json!({"body": {"sessionId": "s1"}}))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 502);
    assert!(!h.sessions.calls().iter().any(|c| c.starts_with("set_summary")));
}
