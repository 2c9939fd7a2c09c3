// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::events::{EventKind, Listeners};
use crate::errors::ProviderError;
use crate::providers::UpdateProvider;
use log::info;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tgbotapi_sender::{
    Configuration, ConfigurationError, InvocationError, Params, Sender, Transport,
};

pub(crate) struct ClientInner {
    pub(crate) configuration: Configuration,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) listeners: Listeners,
    pub(crate) provider: Mutex<Option<Arc<dyn UpdateProvider>>>,
}

/// A client capable of calling Bot API methods and receiving updates.
///
/// Cloning the client is cheap and every clone refers to the same bot, listeners and
/// message provider.
///
/// Updates are received once a message provider is set and started:
///
/// ```no_run
/// use tgbotapi_client::{Client, Configuration, EventKind, LongPoll, PollConfiguration};
///
/// # async fn f() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new(Configuration::new("123:abc"))?;
/// client.on(EventKind::Message, |message| println!("got {message}"));
/// client.set_message_provider(LongPoll::new(PollConfiguration::default()));
/// client.start().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client(pub(crate) Arc<ClientInner>);

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.0.configuration.base_url)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Client {
    /// Creates a client that sends its requests over HTTP.
    pub fn new(configuration: Configuration) -> Result<Self, ConfigurationError> {
        let sender = Sender::new(&configuration)?;
        Self::with_transport(configuration, Arc::new(sender))
    }

    /// Creates a client that sends its requests through the given transport.
    ///
    /// The transport is trusted to honor the configuration's base URL and proxy.
    pub fn with_transport(
        configuration: Configuration,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigurationError> {
        if configuration.token.is_empty() {
            return Err(ConfigurationError::MissingToken);
        }

        Ok(Self(Arc::new(ClientInner {
            configuration,
            transport,
            listeners: Listeners::default(),
            provider: Mutex::new(None),
        })))
    }

    pub fn token(&self) -> &str {
        &self.0.configuration.token
    }

    /// The URL every method name is appended to, `{base_url}/bot{token}/`.
    pub fn base_path(&self) -> String {
        self.0.configuration.base_path()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.0.configuration
    }

    /// Invokes a Bot API method by name, resolving to its `result`.
    ///
    /// Every method of the table forwards here, so it can also be used for methods that
    /// were added to the Bot API after this crate was released.
    pub async fn invoke(&self, method: &str, params: Params) -> Result<Value, InvocationError> {
        self.0.transport.invoke(method, params, None).await
    }

    /// Like [`Client::invoke`], with a timeout other than the configured one.
    pub async fn invoke_with_timeout(
        &self,
        method: &str,
        params: Params,
        timeout: Duration,
    ) -> Result<Value, InvocationError> {
        self.0.transport.invoke(method, params, Some(timeout)).await
    }

    /// Sets the provider that [`Client::start`] and [`Client::stop`] will operate on.
    ///
    /// Replacing a provider does not stop the previous one.
    pub fn set_message_provider<P: UpdateProvider + 'static>(&self, provider: P) {
        *self.0.provider.lock().unwrap() = Some(Arc::new(provider));
    }

    fn message_provider(&self) -> Result<Arc<dyn UpdateProvider>, ProviderError> {
        self.0
            .provider
            .lock()
            .unwrap()
            .clone()
            .ok_or(ProviderError::NotSet)
    }

    /// Starts receiving updates through the message provider.
    pub async fn start(&self) -> Result<(), ProviderError> {
        let provider = self.message_provider()?;
        provider.start(self).await?;
        info!("client started receiving updates");
        Ok(())
    }

    /// Stops receiving updates through the message provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        let provider = self.message_provider()?;
        provider.stop().await?;
        info!("client stopped receiving updates");
        Ok(())
    }

    /// Registers a listener for an event.
    ///
    /// Listeners are called in registration order from the task that received the update,
    /// so they should hand long work off to a task of their own.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.0.listeners.add(kind, Arc::new(listener));
    }

    /// Removes every listener of an event.
    pub fn remove_listeners(&self, kind: EventKind) {
        self.0.listeners.clear(kind);
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.0.listeners.count(kind)
    }
}
