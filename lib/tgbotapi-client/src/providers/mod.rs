// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Update providers deliver incoming updates to a [`Client`].
//!
//! Two providers exist: [`LongPoll`] repeatedly asks for updates, while [`Webhook`] runs an
//! HTTP server and lets Telegram push them. A provider serves at most one client at a time.
mod long_poll;
mod webhook;

use crate::Client;
use crate::errors::ProviderError;
use futures_util::future::BoxFuture;

pub use long_poll::{LongPoll, PollConfiguration};
pub use webhook::{ALLOWED_PORTS, Webhook, WebhookConfiguration};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::LongPoll {}
    impl Sealed for super::Webhook {}
}

/// A source of updates that can be attached to a [`Client`].
///
/// This trait is sealed. The only providers are [`LongPoll`] and [`Webhook`].
pub trait UpdateProvider: sealed::Sealed + Send + Sync {
    /// Attaches the provider to `client` and begins delivering updates to it.
    fn start<'a>(&'a self, client: &'a Client) -> BoxFuture<'a, Result<(), ProviderError>>;

    /// Stops delivering updates and detaches the provider from its client.
    fn stop(&self) -> BoxFuture<'_, Result<(), ProviderError>>;
}
