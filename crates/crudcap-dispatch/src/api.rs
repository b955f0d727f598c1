//! JSON request handling in front of a [`CommandDispatcher`].
//!
//! A request is a `POST` whose body is `{"token": "...", "params": ...}`.
//! The response body is the command result plus `"success": true`, or
//! `{"success": false, "errmsg": "..."}`.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::dispatcher::CommandDispatcher;
use crate::error::{DispatchError, ErrorKind};
use crate::params::Params;

/// HTTP status for successful requests.
pub const STATUS_OK: u16 = 200;

/// HTTP status for every rejected request.
pub const STATUS_FAILED: u16 = 404;

/// A handler response: status code and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl ApiResponse {
    /// A success response carrying `data` plus `"success": true`.
    #[must_use]
    pub fn success(mut data: Map<String, Value>) -> Self {
        data.insert("success".into(), Value::Bool(true));
        Self {
            status: STATUS_OK,
            body: Value::Object(data),
        }
    }

    /// A failure response with an error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_FAILED,
            body: json!({ "success": false, "errmsg": message.into() }),
        }
    }

    /// Whether the request succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.body.get("success").and_then(Value::as_bool) == Some(true)
    }

    /// The error message, if the request failed.
    #[must_use]
    pub fn errmsg(&self) -> Option<&str> {
        self.body.get("errmsg").and_then(Value::as_str)
    }
}

/// Request handler for one entity type.
#[derive(Debug, Clone)]
pub struct CrudApi {
    dispatcher: CommandDispatcher,
}

impl CrudApi {
    /// Wrap a dispatcher.
    #[must_use]
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self { dispatcher }
    }

    /// The wrapped dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// Handle one request.
    ///
    /// Non-`POST` methods, undecodable bodies and a missing `token` are
    /// rejected before the token is looked at.
    #[must_use]
    pub fn handle(&self, method: &str, body: &[u8]) -> ApiResponse {
        if method != "POST" {
            return ApiResponse::error("request must be POST");
        }
        let request: Value = match std::str::from_utf8(body)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(text).map_err(|e| e.to_string()))
        {
            Ok(value) => value,
            Err(e) => return ApiResponse::error(format!("could not json-decode request body [{e}]")),
        };
        let Some(token) = request.get("token").and_then(Value::as_str) else {
            return ApiResponse::error("missing token");
        };
        // A string is JSON text still to be parsed.
        let params = match request.get("params") {
            Some(Value::String(text)) => Params::Text(text.clone()),
            other => Params::from(other.cloned()),
        };

        match self.dispatcher.execute(token, params) {
            Ok(result) => ApiResponse::success(result),
            Err(e) => {
                debug!(kind = %e.kind(), "request rejected");
                ApiResponse::error(error_message(&e))
            },
        }
    }
}

/// Message prefix for each error kind.
fn error_message(err: &DispatchError) -> String {
    let kind = err.kind();
    let prefix = match kind {
        ErrorKind::Signature => "token signature error",
        ErrorKind::Format => "token format error",
        ErrorKind::Content => "token content error",
        ErrorKind::Permission => "token permission error",
        ErrorKind::Params => "parameter error",
        ErrorKind::DoesNotExist => "item does not exist",
        ErrorKind::Definition
        | ErrorKind::NotImplemented
        | ErrorKind::Schema
        | ErrorKind::Storage => {
            return format!("error executing token [{kind}::{err}]");
        },
    };
    format!("{prefix} [{err}]")
}
