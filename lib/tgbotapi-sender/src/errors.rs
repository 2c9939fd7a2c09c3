// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use serde_json::Value;
use std::fmt;
use std::io;

/// Placeholder used when the server omits an error code or description.
pub const NOT_SET_BY_API: &str = "Not set by API";

/// The configuration cannot be used to build a sender.
#[derive(Debug)]
pub enum ConfigurationError {
    /// The bot token is empty.
    MissingToken,

    /// The proxy URL was rejected.
    InvalidProxy(reqwest::Error),

    /// The underlying HTTP client could not be built.
    HttpClient(reqwest::Error),
}

impl std::error::Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "configuration error: token is mandatory"),
            Self::InvalidProxy(err) => write!(f, "configuration error, bad proxy: {err}"),
            Self::HttpClient(err) => write!(f, "configuration error, http client: {err}"),
        }
    }
}

/// The error reported by the Bot API when it answers with `"ok": false`.
#[derive(Clone, Debug, PartialEq)]
pub struct RpcError {
    /// The `error_code` sent by the server, if any.
    pub code: Option<i64>,

    /// The `description` sent by the server, or [`NOT_SET_BY_API`].
    pub description: String,

    /// The whole response body.
    pub body: Value,
}

impl std::error::Error for RpcError {}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "rpc error {code}: {}", self.description),
            None => write!(f, "rpc error {NOT_SET_BY_API}: {}", self.description),
        }
    }
}

impl RpcError {
    /// Builds the error out of a response body that reported failure.
    pub fn from_body(body: Value) -> Self {
        Self {
            code: body.get("error_code").and_then(Value::as_i64),
            description: body
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or(NOT_SET_BY_API)
                .to_string(),
            body,
        }
    }

    /// Retry delay suggested by the server on flood errors (`parameters.retry_after`).
    pub fn retry_after(&self) -> Option<u64> {
        self.body
            .get("parameters")
            .and_then(|p| p.get("retry_after"))
            .and_then(Value::as_u64)
    }
}

/// This error occurs when invoking a remote method was unsuccessful.
///
/// No invocation is ever retried by the sender itself.
#[derive(Debug)]
pub enum InvocationError {
    /// The request could not be sent or its response could not be read, including timeouts.
    Transport(reqwest::Error),

    /// A file to be uploaded could not be read.
    Io(io::Error),

    /// The response body was not valid JSON.
    Parse,

    /// The server answered with a non-200 status and no `ok` indicator.
    Http { status: u16, body: Value },

    /// The server explicitly reported failure.
    Rpc(RpcError),
}

impl std::error::Error for InvocationError {}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request error: {err}"),
            Self::Io(err) => write!(f, "request error, reading file: {err}"),
            Self::Parse => write!(f, "request error: bad response"),
            Self::Http { status, .. } => write!(f, "request error: http status {status}"),
            Self::Rpc(err) => write!(f, "request error: {err}"),
        }
    }
}

impl From<reqwest::Error> for InvocationError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<io::Error> for InvocationError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<RpcError> for InvocationError {
    fn from(error: RpcError) -> Self {
        Self::Rpc(error)
    }
}

impl InvocationError {
    /// The numeric code of the failure, if the server gave one.
    ///
    /// Responses that could not be parsed report `0`.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Transport(err) => err.status().map(|s| s.as_u16().into()),
            Self::Io(_) => None,
            Self::Parse => Some(0),
            Self::Http { status, .. } => Some((*status).into()),
            Self::Rpc(err) => err.code,
        }
    }

    /// The response body, when one was received and understood.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => Some(body),
            Self::Rpc(err) => Some(&err.body),
            _ => None,
        }
    }

    /// Whether the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_rpc_error_parsing() {
        let body = json!({"ok": false, "error_code": 300, "description": "hello"});
        assert_eq!(
            RpcError::from_body(body.clone()),
            RpcError {
                code: Some(300),
                description: "hello".into(),
                body,
            }
        );

        let body = json!({"ok": false});
        assert_eq!(
            RpcError::from_body(body.clone()),
            RpcError {
                code: None,
                description: NOT_SET_BY_API.into(),
                body,
            }
        );
    }

    #[test]
    fn check_rpc_error_display() {
        let err = RpcError::from_body(json!({"ok": false, "description": "Bad Request"}));
        assert_eq!(err.to_string(), "rpc error Not set by API: Bad Request");

        let err = RpcError::from_body(json!({"ok": false, "error_code": 400}));
        assert_eq!(err.to_string(), "rpc error 400: Not set by API");
    }

    #[test]
    fn check_retry_after() {
        let err = RpcError::from_body(json!({
            "ok": false,
            "error_code": 429,
            "parameters": {"retry_after": 17}
        }));
        assert_eq!(err.retry_after(), Some(17));
    }

    #[test]
    fn check_codes() {
        assert_eq!(InvocationError::Parse.code(), Some(0));
        assert_eq!(
            InvocationError::Http {
                status: 502,
                body: json!({})
            }
            .code(),
            Some(502)
        );
    }
}
