// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::errors::{InvocationError, RpcError};
use log::{debug, trace};
use serde_json::Value;

const HTTP_OK: u16 = 200;

/// Classifies a Bot API response into its result or an error.
///
/// The checks happen in order:
///
/// 1. A body that is not JSON is [`InvocationError::Parse`].
/// 2. A body without `ok` that came with a status other than 200 is
///    [`InvocationError::Http`].
/// 3. `"ok": false` is [`InvocationError::Rpc`].
/// 4. Anything else yields the `result` member (`null` if absent).
pub fn parse_response(status: u16, body: &[u8]) -> Result<Value, InvocationError> {
    let mut json = match serde_json::from_slice::<Value>(body) {
        Ok(json) => json,
        Err(err) => {
            debug!("failed to parse response from the bot api: {err}");
            return Err(InvocationError::Parse);
        }
    };

    let ok = json.get("ok").cloned();
    if ok.is_none() && status != HTTP_OK {
        debug!("bot api returned http status {status}");
        return Err(InvocationError::Http { status, body: json });
    }

    if ok == Some(Value::Bool(false)) {
        debug!("bot api returned ok == false");
        return Err(RpcError::from_body(json).into());
    }

    trace!("bot api returned {json}");
    Ok(json
        .get_mut("result")
        .map(Value::take)
        .unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn ok_resolves_with_result() {
        let result = parse_response(200, &body(json!({"ok": true, "result": [{"update_id": 1}]})));
        assert_eq!(result.unwrap(), json!([{"update_id": 1}]));
    }

    #[test]
    fn ok_false_rejects_with_code_and_description() {
        let raw = json!({"ok": false, "error_code": 300, "description": "hello"});
        match parse_response(400, &body(raw.clone())) {
            Err(InvocationError::Rpc(err)) => {
                assert_eq!(err.code, Some(300));
                assert_eq!(err.description, "hello");
                assert_eq!(err.body, raw);
            }
            x => panic!("expected rpc error, got {x:?}"),
        }
    }

    #[test]
    fn ok_false_without_details() {
        match parse_response(200, &body(json!({"ok": false}))) {
            Err(InvocationError::Rpc(err)) => {
                assert_eq!(err.code, None);
                assert_eq!(err.description, crate::NOT_SET_BY_API);
            }
            x => panic!("expected rpc error, got {x:?}"),
        }
    }

    #[test]
    fn missing_ok_with_bad_status() {
        match parse_response(502, &body(json!({"message": "bad gateway"}))) {
            Err(InvocationError::Http { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, json!({"message": "bad gateway"}));
            }
            x => panic!("expected http error, got {x:?}"),
        }
    }

    #[test]
    fn missing_ok_with_good_status_resolves() {
        assert_eq!(parse_response(200, &body(json!({"result": 5}))).unwrap(), json!(5));
        assert_eq!(parse_response(200, &body(json!({}))).unwrap(), Value::Null);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let result = parse_response(200, b"<html>nope</html>");
        assert!(matches!(result, Err(InvocationError::Parse)));
        assert_eq!(result.unwrap_err().code(), Some(0));
    }
}
