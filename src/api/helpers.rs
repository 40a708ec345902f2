//! Response builders shared by the handlers.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::errors::HandlerError;

/// API Gateway proxy response with a JSON body.
#[must_use]
pub fn json_response<T: Serialize>(status_code: u16, body: &T) -> Value {
    let body = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    json!({
        "statusCode": status_code,
        "body": body,
        "headers": { "content-type": "application/json" },
        "isBase64Encoded": false
    })
}

#[must_use]
pub fn ok<T: Serialize>(body: &T) -> Value {
    json_response(200, body)
}

/// Structured `{message}` error response for a non-fatal handler error.
#[must_use]
pub fn error_response(error: &HandlerError) -> Value {
    json_response(error.status_code(), &json!({ "message": error.to_string() }))
}

/// Converts a handler result into the Lambda result.
///
/// Fatal errors abort the invocation; everything else becomes a response.
///
/// # Errors
///
/// Returns the error itself when it is fatal.
pub fn finish(result: Result<Value, HandlerError>) -> Result<Value, lambda_runtime::Error> {
    match result {
        Ok(response) => Ok(response),
        Err(e) if e.is_fatal() => {
            error!(error = %e, "Fatal handler error");
            Err(lambda_runtime::Error::from(e))
        }
        Err(e) => {
            error!(error = %e, status = e.status_code(), "Handler error");
            Ok(error_response(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_envelope_has_json_headers() {
        let resp = ok(&json!({ "message": "こんにちは" }));
        assert_eq!(resp["statusCode"], 200);
        assert_eq!(resp["headers"]["content-type"], "application/json");
        assert_eq!(resp["isBase64Encoded"], false);
        assert_eq!(resp["body"], r#"{"message":"こんにちは"}"#);
    }

    #[test]
    fn empty_input_maps_to_400_message() {
        let resp = error_response(&HandlerError::EmptyInput);
        assert_eq!(resp["statusCode"], 400);
        assert_eq!(resp["body"], r#"{"message":"Empty request body"}"#);
    }

    #[test]
    fn fatal_errors_are_not_turned_into_responses() {
        assert!(finish(Err(HandlerError::SecretAccess("denied".into()))).is_err());
        let resp = finish(Err(HandlerError::StoreAccess("throttled".into()))).unwrap();
        assert_eq!(resp["statusCode"], 502);
    }
}
