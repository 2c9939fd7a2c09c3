// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This library is a high level client for the [Telegram Bot API].
//!
//! A [`Client`] can invoke any method of the Bot API, either by name through
//! [`Client::invoke`] or through one of the functions generated for every entry of
//! [`METHODS`], such as [`Client::send_message`].
//!
//! Updates are received through a message provider, either [`LongPoll`] or [`Webhook`],
//! and raised as events to the listeners registered with [`Client::on`]:
//!
//! ```no_run
//! use tgbotapi_client::{Client, Configuration, EventKind, LongPoll, Params};
//!
//! # async fn f() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(Configuration::new("123:abc"))?;
//!
//! let sender = client.clone();
//! client.on(EventKind::Message, move |message| {
//!     let sender = sender.clone();
//!     let params = Params::new()
//!         .with("chat_id", message["chat"]["id"].clone())
//!         .with("text", message["text"].clone());
//!     tokio::spawn(async move { sender.send_message(params).await });
//! });
//!
//! client.set_message_provider(LongPoll::default());
//! client.start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [Telegram Bot API]: https://core.telegram.org/bots/api
mod client;
mod errors;
pub mod providers;
#[cfg(test)]
mod testing;

pub use client::{Client, EventKind, METHODS, UnknownEvent};
pub use errors::ProviderError;
pub use providers::{LongPoll, PollConfiguration, UpdateProvider, Webhook, WebhookConfiguration};
pub use tgbotapi_sender::{
    Configuration, ConfigurationError, InputFile, InvocationError, ParamValue, Params,
    ProxyConfiguration, RpcError, Transport,
};
