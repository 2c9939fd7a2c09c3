// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::UpdateProvider;
use crate::Client;
use crate::errors::ProviderError;
use futures_util::future::BoxFuture;
use log::{debug, info, trace, warn};
use serde::Deserialize;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tgbotapi_sender::Params;
use tokio::task::AbortHandle;

/// Delay before the first request after starting.
const FIRST_POLL_DELAY: Duration = Duration::from_millis(100);

/// Delay between a successful request and the next one.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Delay between a failed request and the next one.
const RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Margin given to the request on top of the time the server may hold it.
const REQUEST_MARGIN: Duration = Duration::from_millis(1000);

/// Seconds the server may hold a request open unless configured otherwise.
const DEFAULT_POLL_TIMEOUT: u32 = 60;

/// Configuration for [`LongPoll`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollConfiguration {
    /// Maximum amount of updates per request. The server default applies when unset.
    pub limit: Option<u32>,

    /// Seconds the server may hold a request open while waiting for updates.
    ///
    /// Zero is treated as unset and uses the default of 60 seconds.
    pub timeout: u32,

    /// Kinds of updates to receive. The server default applies when unset.
    pub allowed_updates: Option<Vec<String>>,
}

impl Default for PollConfiguration {
    fn default() -> Self {
        Self {
            limit: None,
            timeout: DEFAULT_POLL_TIMEOUT,
            allowed_updates: None,
        }
    }
}

struct Attachment {
    client: Client,
    generation: u64,
    task: Option<AbortHandle>,
}

#[derive(Default)]
struct PollState {
    /// Identifier of the first update not yet received.
    offset: i64,
    /// Incremented on every start, so that leftovers of a previous run can be told apart.
    generation: u64,
    attached: Option<Attachment>,
}

impl PollState {
    fn current(&self, generation: u64) -> Option<&Attachment> {
        self.attached
            .as_ref()
            .filter(|attachment| attachment.generation == generation)
    }
}

struct Shared {
    configuration: PollConfiguration,
    state: Mutex<PollState>,
}

/// Receives updates by repeatedly calling `getUpdates`.
///
/// Requests are made one at a time from a background task, and failed requests are retried
/// until the provider is stopped. The offset survives restarts, so updates confirmed once are
/// not received again by the same instance.
#[derive(Clone)]
pub struct LongPoll(Arc<Shared>);

impl Default for LongPoll {
    fn default() -> Self {
        Self::new(PollConfiguration::default())
    }
}

impl LongPoll {
    pub fn new(configuration: PollConfiguration) -> Self {
        Self(Arc::new(Shared {
            configuration,
            state: Mutex::new(PollState::default()),
        }))
    }

    pub fn configuration(&self) -> &PollConfiguration {
        &self.0.configuration
    }

    /// The offset that will be sent with the next request.
    pub fn offset(&self) -> i64 {
        self.state().offset
    }

    pub fn is_started(&self) -> bool {
        self.state().attached.is_some()
    }

    fn state(&self) -> MutexGuard<'_, PollState> {
        self.0.state.lock().unwrap()
    }

    /// How long a single request may take before it is given up.
    fn request_timeout(&self) -> Duration {
        REQUEST_MARGIN + Duration::from_secs(self.poll_timeout().into())
    }

    fn poll_timeout(&self) -> u32 {
        match self.0.configuration.timeout {
            0 => DEFAULT_POLL_TIMEOUT,
            timeout => timeout,
        }
    }

    fn params(&self, offset: i64) -> Params {
        let configuration = &self.0.configuration;
        let mut params = Params::new().with("offset", offset);
        if let Some(limit) = configuration.limit {
            params.set("limit", limit);
        }
        params.set("timeout", self.poll_timeout());
        if let Some(allowed_updates) = configuration.allowed_updates.as_ref() {
            params.set("allowed_updates", Value::from(allowed_updates.clone()));
        }
        params
    }

    async fn attach(&self, client: &Client) -> Result<(), ProviderError> {
        let generation = {
            let mut state = self.state();
            if state.attached.is_some() {
                return Err(ProviderError::AlreadyStarted);
            }
            state.generation += 1;
            state.attached = Some(Attachment {
                client: client.clone(),
                generation: state.generation,
                task: None,
            });
            state.generation
        };

        // A registered webhook would make every `getUpdates` fail.
        match client.invoke("deleteWebhook", Params::new()).await {
            Ok(result) => debug!("removed any previous webhook: {result}"),
            Err(err) => warn!("failed to remove previous webhook: {err}"),
        }

        let task = tokio::spawn(self.clone().run(generation));
        let mut state = self.state();
        match state.attached.as_mut() {
            Some(attachment) if attachment.generation == generation => {
                attachment.task = Some(task.abort_handle());
                info!("started polling for updates");
            }
            _ => {
                debug!("polling was stopped before it began");
                task.abort();
            }
        }
        Ok(())
    }

    fn detach(&self) -> Result<(), ProviderError> {
        let attachment = self
            .state()
            .attached
            .take()
            .ok_or(ProviderError::NotStarted)?;
        if let Some(task) = attachment.task {
            task.abort();
        }
        info!("stopped polling for updates");
        Ok(())
    }

    async fn run(self, generation: u64) {
        let mut delay = FIRST_POLL_DELAY;
        loop {
            tokio::time::sleep(delay).await;
            match self.poll_once(generation).await {
                Some(next) => delay = next,
                None => break,
            }
        }
        trace!("polling task {generation} finished");
    }

    /// Performs a single `getUpdates` cycle.
    ///
    /// Returns how long to wait before the next cycle, or `None` if polling should end.
    async fn poll_once(&self, generation: u64) -> Option<Duration> {
        let (client, offset) = {
            let state = self.state();
            let attachment = state.current(generation)?;
            (attachment.client.clone(), state.offset)
        };

        trace!("getting updates from offset {offset}");
        let result = client
            .invoke_with_timeout("getUpdates", self.params(offset), self.request_timeout())
            .await;

        match result {
            Ok(Value::Array(updates)) => {
                for update in updates {
                    if !self.advance(generation, &update) {
                        debug!("dropping updates received after polling stopped");
                        return None;
                    }
                    let dispatched =
                        panic::catch_unwind(AssertUnwindSafe(|| client.dispatch(&update)));
                    if dispatched.is_err() {
                        warn!("a listener panicked while handling {}", update["update_id"]);
                        return Some(RETRY_INTERVAL);
                    }
                }
                Some(POLL_INTERVAL)
            }
            Ok(result) => {
                warn!("getUpdates returned something other than a list: {result}");
                Some(RETRY_INTERVAL)
            }
            Err(err) => {
                warn!("failed to get updates: {err}");
                Some(RETRY_INTERVAL)
            }
        }
    }

    /// Moves the offset past `update`, unless polling is no longer current.
    fn advance(&self, generation: u64, update: &Value) -> bool {
        let mut state = self.state();
        if state.current(generation).is_none() {
            return false;
        }
        match update.get("update_id").and_then(Value::as_i64) {
            Some(id) => state.offset = state.offset.max(id.saturating_add(1)),
            None => warn!("received update without update_id: {update}"),
        }
        true
    }
}

impl UpdateProvider for LongPoll {
    fn start<'a>(&'a self, client: &'a Client) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.attach(client))
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), ProviderError>> {
        let result = self.detach();
        Box::pin(async move { result })
    }
}
