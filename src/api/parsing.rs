use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::HandlerError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Decodes the request `body`, which arrives either as a JSON object or as a
/// JSON-encoded string.
///
/// # Errors
///
/// Returns `EmptyInput` when there is no body and `BadRequest` when it does not
/// match `T`.
pub fn parse_body<T: DeserializeOwned>(event: &Value) -> Result<T, HandlerError> {
    let body = match event.get("body") {
        None | Some(Value::Null) => return Err(HandlerError::EmptyInput),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Err(HandlerError::EmptyInput),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)?,
        Some(other) => other.clone(),
    };
    Ok(serde_json::from_value(body)?)
}

/// Non-empty path parameter, e.g. `sessionId` in `/sessions/{sessionId}`.
pub fn path_param<'a>(event: &'a Value, name: &str) -> Option<&'a str> {
    v_str(event, &["pathParameters", name]).filter(|s| !s.is_empty())
}

pub fn query_param<'a>(event: &'a Value, name: &str) -> Option<&'a str> {
    v_str(event, &["queryStringParameters", name]).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::SummarizeRequest;
    use serde_json::json;

    #[test]
    fn body_may_be_object_or_string() {
        let obj: SummarizeRequest = parse_body(&json!({"body": {"sessionId": "s1"}})).unwrap();
        assert_eq!(obj.session_id, "s1");

        let s: SummarizeRequest =
            parse_body(&json!({"body": "{\"sessionId\":\"s2\"}"})).unwrap();
        assert_eq!(s.session_id, "s2");
    }

    #[test]
    fn missing_or_malformed_body_is_rejected() {
        assert!(matches!(
            parse_body::<SummarizeRequest>(&json!({})),
            Err(HandlerError::EmptyInput)
        ));
        assert!(matches!(
            parse_body::<SummarizeRequest>(&json!({"body": "{not json"})),
            Err(HandlerError::BadRequest(_))
        ));
        assert!(matches!(
            parse_body::<SummarizeRequest>(&json!({"body": {"other": 1}})),
            Err(HandlerError::BadRequest(_))
        ));
    }

    #[test]
    fn params_ignore_empty_values() {
        let event = json!({
            "pathParameters": {"sessionId": ""},
            "queryStringParameters": {"userId": "u1"}
        });
        assert_eq!(path_param(&event, "sessionId"), None);
        assert_eq!(query_param(&event, "userId"), Some("u1"));
    }
}
