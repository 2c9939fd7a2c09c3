// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Example to echo user text messages, receiving them through long-polling. Runnable as:
//!
//! ```sh
//! cargo run --example echo -- BOT_TOKEN
//! ```
use log::warn;
use serde_json::Value;
use std::env;
use tgbotapi_client::{Client, Configuration, EventKind, LongPoll, Params, PollConfiguration};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

fn echo(client: &Client, message: &Value) {
    let Some(text) = message["text"].as_str() else {
        return;
    };
    println!("Responding to {}", message["chat"]["id"]);

    let client = client.clone();
    let params = Params::new()
        .with("chat_id", message["chat"]["id"].clone())
        .with("text", text)
        .with("reply_to_message_id", message["message_id"].clone());
    tokio::spawn(async move {
        if let Err(err) = client.send_message(params).await {
            warn!("failed to respond: {err}");
        }
    });
}

#[tokio::main]
async fn main() -> Result {
    simple_logger::init_with_level(log::Level::Debug).expect("failed to setup logging");

    let token = env::args().nth(1).expect("token missing");
    let client = Client::new(Configuration::new(token))?;

    let responder = client.clone();
    client.on(EventKind::Message, move |message| echo(&responder, message));
    client.set_message_provider(LongPoll::new(PollConfiguration {
        allowed_updates: Some(vec!["message".into()]),
        ..Default::default()
    }));

    client.start().await?;
    println!("Waiting for messages...");

    tokio::signal::ctrl_c().await?;
    client.stop().await?;
    Ok(())
}
