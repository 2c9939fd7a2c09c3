// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Example to log every update, receiving them through a webhook. Runnable as:
//!
//! ```sh
//! cargo run --example webhook -- webhook.toml
//! ```
//!
//! The configuration file looks like this:
//!
//! ```toml
//! [bot]
//! token = "123:abc"
//!
//! [webhook]
//! port = 8080
//! url = "https://bot.example.com"
//! allowed_updates = ["message", "callback_query"]
//! ```
use serde::Deserialize;
use std::env;
use tgbotapi_client::{Client, Configuration, EventKind, Webhook, WebhookConfiguration};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

#[derive(Deserialize)]
struct Settings {
    bot: Configuration,
    #[serde(default)]
    webhook: WebhookConfiguration,
}

#[tokio::main]
async fn main() -> Result {
    simple_logger::init_with_level(log::Level::Info).expect("failed to setup logging");

    let path = env::args().nth(1).expect("configuration path missing");
    let settings: Settings = toml::from_str(&std::fs::read_to_string(path)?)?;

    let client = Client::new(settings.bot)?;
    client.on(EventKind::Update, |update| println!("Update: {update}"));
    client.on(EventKind::InlineCallbackQuery, |query| {
        println!("Callback query from {}", query["from"]["id"])
    });
    client.set_message_provider(Webhook::new(settings.webhook)?);

    client.start().await?;
    println!("Waiting for updates...");

    tokio::signal::ctrl_c().await?;
    client.stop().await?;
    Ok(())
}
