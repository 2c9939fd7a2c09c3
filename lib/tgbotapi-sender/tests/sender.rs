// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs the sender against an in-process server that echoes back every form field
//! it receives, so that the wire format can be checked without reaching Telegram.
use axum::Router;
use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Map, Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tgbotapi_sender::{Configuration, InputFile, InvocationError, Params, Sender};
use tokio::net::TcpListener;

const TOKEN: &str = "123:abc";

async fn handle(Path((bot, method)): Path<(String, String)>, mut multipart: Multipart) -> Response {
    let mut fields = Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let text = field.text().await.unwrap_or_default();
        let value = match file_name {
            Some(file_name) => json!({"file_name": file_name, "contents": text}),
            None => Value::String(text),
        };
        fields.insert(name, value);
    }

    let reply = |status: StatusCode, body: Value| (status, axum::Json(body)).into_response();
    match method.as_str() {
        "echo" => reply(
            StatusCode::OK,
            json!({"ok": true, "result": {"bot": bot, "fields": fields}}),
        ),
        "fail" => reply(
            StatusCode::BAD_REQUEST,
            json!({"ok": false, "error_code": 300, "description": "hello"}),
        ),
        "gateway" => reply(StatusCode::BAD_GATEWAY, json!({"message": "bad gateway"})),
        "garbage" => (StatusCode::OK, "<html>surprise</html>").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            reply(StatusCode::OK, json!({"ok": true, "result": true}))
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/{bot}/{method}", post(handle));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn sender() -> Sender {
    // Several tests share the process, only the first one gets to install the logger.
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();

    let addr = spawn_server().await;
    Sender::new(&Configuration {
        token: TOKEN.into(),
        base_url: format!("http://{addr}"),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn fields_are_normalized_on_the_wire() {
    let sender = sender().await;
    let params = Params::from_json(json!({
        "chat_id": 42,
        "text": "hi",
        "disable_notification": true,
        "reply_markup": {"a": 1},
        "allowed_updates": [1, 2],
        "skipped": null,
    }))
    .with("animation", InputFile::from_bytes("celebi.gif", b"GIF89a".to_vec()));

    let result = sender.call("echo", params, None).await.unwrap();
    assert_eq!(result["bot"], json!(format!("bot{TOKEN}")));
    assert_eq!(
        result["fields"],
        json!({
            "chat_id": "42",
            "text": "hi",
            "disable_notification": "true",
            "reply_markup": "{\"a\":1}",
            "allowed_updates": "[1,2]",
            "animation": {"file_name": "celebi.gif", "contents": "GIF89a"},
        })
    );
}

#[tokio::test]
async fn empty_params_still_post() {
    let sender = sender().await;
    let result = sender.call("echo", Params::new(), None).await.unwrap();
    assert_eq!(result["fields"], json!({}));
}

#[tokio::test]
async fn remote_failure_is_reported() {
    let sender = sender().await;
    match sender.call("fail", Params::new(), None).await {
        Err(InvocationError::Rpc(err)) => {
            assert_eq!(err.code, Some(300));
            assert_eq!(err.description, "hello");
            assert_eq!(
                err.body,
                json!({"ok": false, "error_code": 300, "description": "hello"})
            );
        }
        x => panic!("expected rpc error, got {x:?}"),
    }
}

#[tokio::test]
async fn unexpected_status_is_reported() {
    let sender = sender().await;
    match sender.call("gateway", Params::new(), None).await {
        Err(InvocationError::Http { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, json!({"message": "bad gateway"}));
        }
        x => panic!("expected http error, got {x:?}"),
    }
}

#[tokio::test]
async fn unparsable_body_is_reported() {
    let sender = sender().await;
    let err = sender.call("garbage", Params::new(), None).await.unwrap_err();
    assert!(matches!(err, InvocationError::Parse));
    assert_eq!(err.code(), Some(0));
}

#[tokio::test]
async fn timeout_override_applies() {
    let sender = sender().await;
    let err = sender
        .call("slow", Params::new(), Some(Duration::from_millis(50)))
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sender = Sender::new(&Configuration {
        token: TOKEN.into(),
        base_url: format!("http://{addr}"),
        ..Default::default()
    })
    .unwrap();
    let err = sender.call("getMe", Params::new(), None).await.unwrap_err();
    assert!(matches!(err, InvocationError::Transport(_)));
}
