// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::Client;
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tgbotapi_sender::{Configuration, InvocationError, Params, Transport};

pub(crate) const TOKEN: &str = "123:abc";

type Handler = Box<dyn Fn(&str, &Params) -> Result<Value, InvocationError> + Send + Sync>;

#[derive(Clone, Debug)]
pub(crate) struct Call {
    pub(crate) method: String,
    pub(crate) params: Params,
    pub(crate) timeout: Option<Duration>,
}

/// A transport that records every call and answers through a handler.
pub(crate) struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<Call>>,
    delays: Mutex<Vec<(String, Duration)>>,
}

impl MockTransport {
    pub(crate) fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&str, &Params) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            delays: Mutex::new(Vec::new()),
        })
    }

    /// Answers every call with the same result.
    pub(crate) fn ok(result: Value) -> Arc<Self> {
        Self::new(move |_, _| Ok(result.clone()))
    }

    /// Makes calls to `method` take `delay` before their result is ready.
    pub(crate) fn delay(&self, method: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .push((method.to_string(), delay));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }
}

impl Transport for MockTransport {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        params: Params,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<Value, InvocationError>> {
        let result = (self.handler)(method, &params);
        self.calls.lock().unwrap().push(Call {
            method: method.to_string(),
            params,
            timeout,
        });
        let delay = self
            .delays
            .lock()
            .unwrap()
            .iter()
            .find_map(|(name, delay)| (name == method).then_some(*delay));
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

pub(crate) fn client_with(transport: Arc<MockTransport>) -> Client {
    Client::with_transport(Configuration::new(TOKEN), transport).unwrap()
}
