//! # Response Envelope
//!
//! Uniform wire shape for every bound endpoint:
//!
//! ```json
//! {"status": "ok", "content": ...}
//! {"status": "error", "msg": "..."}
//! {"status": "error", "code": "VALIDATION_ERROR", "msg": "..."}
//! ```
//!
//! Errors have a single structured form, [`ErrorPayload`] (`code` optional,
//! `message` required). [`error`] and [`error_with_code`] both build it.
//! Success replies are HTTP 200; error replies default to HTTP 400 and can
//! be overridden with [`Reply::with_status`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON body of every bound endpoint's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Ok {
        content: Value,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        msg: String,
    },
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Structured error: an optional machine-readable code and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPayload {
    pub code: Option<String>,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl From<ErrorPayload> for Envelope {
    fn from(payload: ErrorPayload) -> Self {
        Envelope::Error {
            code: payload.code,
            msg: payload.message,
        }
    }
}

/// An envelope paired with its transport status code.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    envelope: Envelope,
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Override the transport status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl From<ErrorPayload> for Reply {
    fn from(payload: ErrorPayload) -> Self {
        Reply {
            status: StatusCode::BAD_REQUEST,
            envelope: payload.into(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// `{"status":"ok","content":...}`, HTTP 200.
pub fn ok(content: Value) -> Reply {
    Reply {
        status: StatusCode::OK,
        envelope: Envelope::Ok { content },
    }
}

/// `{"status":"error","msg":...}`, HTTP 400.
pub fn error(message: impl Into<String>) -> Reply {
    ErrorPayload::new(message).into()
}

/// `{"status":"error","code":...,"msg":...}`, HTTP 400.
pub fn error_with_code(code: impl Into<String>, message: impl Into<String>) -> Reply {
    ErrorPayload::with_code(code, message).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[test]
    fn ok_shape() {
        let reply = ok(json!({"reply": "1"}));
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(reply.envelope()).unwrap(),
            json!({"status": "ok", "content": {"reply": "1"}})
        );
    }

    #[test]
    fn ok_with_empty_content() {
        let reply = ok(Value::String(String::new()));
        assert_eq!(
            serde_json::to_value(reply.envelope()).unwrap(),
            json!({"status": "ok", "content": ""})
        );
    }

    #[test]
    fn plain_error_shape() {
        let reply = error("boom");
        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(reply.envelope()).unwrap(),
            json!({"status": "error", "msg": "boom"})
        );
    }

    #[test]
    fn coded_error_shape() {
        let reply = error_with_code("E42", "bad thing");
        assert_eq!(
            serde_json::to_value(reply.envelope()).unwrap(),
            json!({"status": "error", "code": "E42", "msg": "bad thing"})
        );
    }

    #[test]
    fn status_can_be_overridden() {
        let reply = error("gone").with_status(StatusCode::NOT_FOUND);
        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        assert!(!reply.envelope().is_ok());
    }

    #[test]
    fn envelope_deserializes_both_error_shapes() {
        let plain: Envelope = serde_json::from_value(json!({"status": "error", "msg": "m"})).unwrap();
        assert_eq!(
            plain,
            Envelope::Error {
                code: None,
                msg: "m".into()
            }
        );
        let coded: Envelope =
            serde_json::from_value(json!({"status": "error", "code": "C", "msg": "m"})).unwrap();
        assert_eq!(
            coded,
            Envelope::Error {
                code: Some("C".into()),
                msg: "m".into()
            }
        );
    }

    #[tokio::test]
    async fn into_response_writes_status_and_body() {
        let response = error_with_code("X", "y").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Envelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            Envelope::Error {
                code: Some("X".into()),
                msg: "y".into()
            }
        );
    }
}
