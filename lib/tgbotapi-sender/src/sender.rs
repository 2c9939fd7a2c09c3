// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::configuration::Configuration;
use crate::errors::{ConfigurationError, InvocationError};
use crate::params::{FileSource, InputFile, ParamValue, Params};
use crate::response::parse_response;
use futures_util::future::BoxFuture;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Anything capable of invoking a named Bot API method.
///
/// [`Sender`] is the implementation that talks HTTP. Other implementations can be used
/// to route calls elsewhere, such as a scripted transport in tests.
pub trait Transport: Send + Sync {
    /// Invokes `method` with `params`, resolving to the `result` of the response.
    ///
    /// `timeout` overrides the default request timeout when given.
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        params: Params,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<Value, InvocationError>>;
}

/// Performs Bot API calls over HTTP.
///
/// Every call is one `POST {base_url}/bot{token}/{method}` request with a
/// `multipart/form-data` body.
#[derive(Clone)]
pub struct Sender {
    client: reqwest::Client,
    base_path: String,
    timeout: Duration,
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The base path contains the token, which should stay out of logs.
        f.debug_struct("Sender")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Sender {
    pub fn new(configuration: &Configuration) -> Result<Self, ConfigurationError> {
        if configuration.token.is_empty() {
            return Err(ConfigurationError::MissingToken);
        }

        // Only the configured proxy is used, never one picked up from the environment.
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(proxy) = configuration.proxy.as_ref() {
            let url = proxy.url();
            info!("sending requests through proxy {}:{}", proxy.host, proxy.port);
            builder = builder
                .proxy(reqwest::Proxy::all(url).map_err(ConfigurationError::InvalidProxy)?);
        }

        Ok(Self {
            client: builder.build().map_err(ConfigurationError::HttpClient)?,
            base_path: configuration.base_path(),
            timeout: configuration.timeout,
        })
    }

    /// The URL every method name is appended to.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Invokes a method and waits for its result.
    pub async fn call(
        &self,
        method: &str,
        params: Params,
        timeout: Option<Duration>,
    ) -> Result<Value, InvocationError> {
        debug!("invoking {method} with {} parameter(s)", params.len());
        let form = build_form(params).await?;

        let response = self
            .client
            .post(format!("{}{}", self.base_path, method))
            .multipart(form)
            .timeout(timeout.unwrap_or(self.timeout))
            .send()
            .await
            .inspect_err(|err| debug!("{method} failed to send: {err}"))?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        parse_response(status, &body)
    }
}

impl Transport for Sender {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        params: Params,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<Value, InvocationError>> {
        Box::pin(self.call(method, params, timeout))
    }
}

async fn file_part(file: InputFile) -> Result<Part, InvocationError> {
    let bytes = match file.source {
        FileSource::Memory(bytes) => bytes.to_vec(),
        FileSource::Path(path) => tokio::fs::read(&path).await?,
    };
    Ok(Part::bytes(bytes).file_name(file.name))
}

async fn build_form(params: Params) -> Result<Form, InvocationError> {
    let mut form = Form::new();
    for (name, value) in params.into_entries() {
        form = match value {
            ParamValue::File(file) => form.part(name, file_part(file).await?),
            other => match other.form_text() {
                Some(text) => form.text(name, text),
                None => form,
            },
        };
    }
    Ok(form)
}
